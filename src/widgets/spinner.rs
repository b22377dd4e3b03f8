use crate::markup::SpinnerParams;

/// Numeric stepper state for both spinner variants.
#[derive(Debug, Clone, Copy)]
pub struct SpinnerField {
    pub float: bool,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SpinnerField {
    pub fn from_params(params: &SpinnerParams) -> Self {
        // f64::clamp panics on a reversed or NaN range, and markup authors
        // control both bounds.
        let mut min = if params.min.is_finite() { params.min } else { 0.0 };
        let mut max = if params.max.is_finite() { params.max } else { 99.0 };
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        let mut field = Self {
            float: params.float,
            value: params.value,
            min,
            max,
            step: params.step.abs(),
        };
        field.set(params.value);
        field
    }

    /// Clamp into range; integer spinners round to whole values.
    pub fn set(&mut self, value: f64) {
        let mut v = value.clamp(self.min, self.max);
        if !self.float {
            v = v.round();
        }
        self.value = v;
    }

    pub fn increment(&mut self) {
        self.set(self.value + self.step);
    }

    pub fn decrement(&mut self) {
        self.set(self.value - self.step);
    }

    pub fn display(&self) -> String {
        if self.float {
            format!("{:.2}", self.value)
        } else {
            format!("{}", self.value as i64)
        }
    }
}
