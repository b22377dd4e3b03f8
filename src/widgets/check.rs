/// Checkbox state.
#[derive(Debug, Clone, Copy)]
pub struct CheckField {
    pub value: bool,
}

impl CheckField {
    pub fn new(value: bool) -> Self {
        Self { value }
    }

    pub fn toggle(&mut self) {
        self.value = !self.value;
    }

    pub fn display(&self) -> &'static str {
        if self.value { "[x]" } else { "[ ]" }
    }
}
