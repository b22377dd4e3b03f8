use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::markup::Rgb;
use crate::tab::{ActionButton, BodyItem, GroupBody};
use crate::ui::app::{App, FocusTarget};
use crate::ui::input::{help_text, InputMode};
use crate::widgets::{CheckField, InputWidget, SpinnerField, TextField, WidgetState};

/// Black background style - forced dark mode
fn dark_bg() -> Style {
    Style::default().bg(Color::Black)
}

/// Dark mode block with black background
fn dark_block<'a>(title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::Cyan)))
        .style(dark_bg())
}

/// Dark mode block with highlighted border
fn dark_block_highlight<'a>(title: &'a str, color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .style(dark_bg())
}

fn rgb_or(color: Option<Rgb>, fallback: Color) -> Color {
    match color {
        Some(Rgb(r, g, b)) => Color::Rgb(r, g, b),
        None => fallback,
    }
}

/// Immutable per-frame state the item renderers need.
struct DrawCtx<'a> {
    target: Option<FocusTarget>,
    editing: Option<(usize, usize)>,
    edit_text: &'a str,
}

pub fn draw(f: &mut Frame, app: &mut App) {
    // Fill entire screen with black background
    let area = f.size();
    f.render_widget(Clear, area);
    f.render_widget(Block::default().style(dark_bg()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Length(3), // Filter line
            Constraint::Min(3),    // Body
            Constraint::Length(3), // Status
        ])
        .split(area);

    draw_tab_bar(f, app, chunks[0]);
    draw_search(f, app, chunks[1]);

    if app.show_console {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[2]);
        draw_body(f, app, split[0]);
        draw_console(f, app, split[1]);
    } else {
        draw_body(f, app, chunks[2]);
    }

    draw_status(f, app, chunks[3]);

    match app.mode {
        InputMode::Help => draw_help(f),
        InputMode::Include => draw_include(f, app),
        _ => {}
    }
}

fn draw_tab_bar(f: &mut Frame, app: &App, area: Rect) {
    if app.tabs.is_empty() {
        f.render_widget(dark_block("Scrib"), area);
        return;
    }
    let titles: Vec<Line> = app
        .tabs
        .iter()
        .map(|tab| {
            let color = tab
                .body()
                .and_then(|b| b.settings.color)
                .map(|Rgb(r, g, b)| Color::Rgb(r, g, b))
                .unwrap_or(Color::Gray);
            let marker = if tab.error_text().is_some() { "! " } else { "" };
            Line::from(Span::styled(
                format!("{marker}{}", tab.name()),
                Style::default().fg(color),
            ))
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active)
        .block(dark_block("Scrib"))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn draw_search(f: &mut Frame, app: &App, area: Rect) {
    let active = app.mode == InputMode::Search;
    let content = if active {
        app.search.display_with_cursor()
    } else {
        app.search.text.clone()
    };
    let block = if active {
        dark_block_highlight("Filter", Color::Yellow)
    } else {
        dark_block("Filter ('/' edits; comma keys; 'not ' negates)")
    };
    let input = Paragraph::new(content)
        .style(Style::default().fg(Color::Yellow).bg(Color::Black))
        .block(block);
    f.render_widget(input, area);
}

fn draw_body(f: &mut Frame, app: &mut App, area: Rect) {
    if app.tabs.is_empty() {
        draw_placeholder(f, area);
        return;
    }

    // Probe into plain data first so the scroll update can mutate freely.
    enum BodyKind {
        Error,
        Built { visible: Vec<usize>, heights: Vec<u16> },
        Other,
    }
    let kind = {
        let tab = &app.tabs[app.active];
        if tab.error_text().is_some() {
            BodyKind::Error
        } else if let Some(body) = tab.body() {
            let visible: Vec<usize> = body
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.visible())
                .map(|(i, _)| i)
                .collect();
            let heights: Vec<u16> = visible.iter().map(|&i| item_height(&body.items[i])).collect();
            BodyKind::Built { visible, heights }
        } else {
            BodyKind::Other
        }
    };

    let (visible, heights) = match kind {
        BodyKind::Error => {
            let tab = &app.tabs[app.active];
            if let Some(text) = tab.error_text() {
                let name = tab.name().to_string();
                let body = Paragraph::new(text.to_string())
                    .style(Style::default().fg(Color::LightRed).bg(Color::Black))
                    .block(dark_block_highlight(&name, Color::Red));
                f.render_widget(body, area);
            }
            return;
        }
        BodyKind::Other => return,
        BodyKind::Built { visible, heights } => (visible, heights),
    };

    if visible.is_empty() {
        let tab = &app.tabs[app.active];
        let empty_source = tab.body().map(|b| b.items.is_empty()).unwrap_or(true);
        let message = if empty_source {
            "script defines no callables and no instructions"
        } else {
            "nothing matches the filter"
        };
        let body = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray).bg(Color::Black))
            .block(dark_block(""));
        f.render_widget(body, area);
        return;
    }

    update_scroll(app, &visible, &heights, area.height);

    let edit_display = app.edit.display_with_cursor();
    let ctx = DrawCtx {
        target: app.focus_target(),
        editing: app.editing(),
        edit_text: &edit_display,
    };
    let tab = &app.tabs[app.active];
    let Some(body) = tab.body() else {
        return;
    };

    let mut y = area.y;
    for (pos, &idx) in visible.iter().enumerate().skip(app.scroll) {
        let h = heights[pos];
        if y + h > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x, y, area.width, h);
        match &body.items[idx] {
            BodyItem::Button(button) => draw_top_button(f, &ctx, idx, button, rect),
            BodyItem::Group(group) => draw_group(f, &ctx, idx, group, rect),
        }
        y = y.saturating_add(h + 1);
    }
}

fn draw_placeholder(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No tabs configured.",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Add one with:  scrib tabs add <name> <script.lua>",
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            "Or pass script paths on the command line.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(dark_bg())
        .block(dark_block(""));
    f.render_widget(body, area);
}

/// Keep the focused top-level item inside the viewport after focus moves.
fn update_scroll(app: &mut App, visible: &[usize], heights: &[u16], viewport_h: u16) {
    let max_scroll = visible.len().saturating_sub(1);
    if app.scroll > max_scroll {
        app.scroll = max_scroll;
    }
    if !app.snap_focus {
        return;
    }
    app.snap_focus = false;
    let Some(target) = app.focus_target() else {
        return;
    };
    let Some(pos) = visible.iter().position(|&i| i == target.item_index()) else {
        return;
    };
    if pos < app.scroll {
        app.scroll = pos;
        return;
    }
    while app.scroll < pos {
        let used: u32 = heights[app.scroll..=pos]
            .iter()
            .map(|&h| h as u32 + 1)
            .sum();
        if used.saturating_sub(1) <= viewport_h as u32 {
            break;
        }
        app.scroll += 1;
    }
}

fn item_height(item: &BodyItem) -> u16 {
    match item {
        BodyItem::Button(_) => 1,
        BodyItem::Group(group) => {
            let rows: u16 = group
                .widget_rows
                .iter()
                .map(|row| widget_row_height(row, &group.widgets))
                .sum();
            2 + rows + group.button_rows.len() as u16
        }
    }
}

/// Rows holding a real input render bordered (3 lines); purely structural
/// rows collapse to a single line.
fn widget_row_height(row: &[usize], widgets: &[InputWidget]) -> u16 {
    let tall = row.iter().any(|&i| {
        matches!(
            widgets.get(i).map(|w| &w.state),
            Some(WidgetState::Text(_)) | Some(WidgetState::Spinner(_)) | Some(WidgetState::Check(_))
        )
    });
    if tall {
        3
    } else {
        1
    }
}

fn draw_top_button(f: &mut Frame, ctx: &DrawCtx, item: usize, button: &ActionButton, rect: Rect) {
    let focused = ctx.target == Some(FocusTarget::Item { item });
    let mut style = Style::default()
        .fg(rgb_or(button.color, Color::White))
        .bg(Color::Black);
    if focused {
        style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
    }
    let line = Line::from(Span::styled(
        format!("▶ {}", button.display_label()),
        style,
    ));
    f.render_widget(Paragraph::new(line).style(dark_bg()), rect);
}

fn draw_group(f: &mut Frame, ctx: &DrawCtx, item: usize, group: &GroupBody, rect: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb_or(group.color, Color::DarkGray)))
        .title(Span::styled(
            format!(" {} ", group.label),
            Style::default().fg(rgb_or(group.color, Color::Cyan)),
        ))
        .style(dark_bg());
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let mut y = inner.y;
    for row in &group.widget_rows {
        let h = widget_row_height(row, &group.widgets);
        if y + h > inner.y + inner.height {
            return;
        }
        draw_widget_row(f, ctx, item, group, row, Rect::new(inner.x, y, inner.width, h));
        y += h;
    }
    for row in &group.button_rows {
        if y >= inner.y + inner.height {
            return;
        }
        draw_button_row(f, ctx, item, group, row, Rect::new(inner.x, y, inner.width, 1));
        y += 1;
    }
}

fn draw_widget_row(
    f: &mut Frame,
    ctx: &DrawCtx,
    item: usize,
    group: &GroupBody,
    row: &[usize],
    rect: Rect,
) {
    let stretchy = row
        .iter()
        .filter(|&&i| {
            !matches!(
                group.widgets[i].state,
                WidgetState::Spacer { .. } | WidgetState::Separator { .. }
            )
        })
        .count()
        .max(1);
    let share = (100 / stretchy as u16).max(1);
    let constraints: Vec<Constraint> = row
        .iter()
        .map(|&i| match &group.widgets[i].state {
            WidgetState::Spacer { size } => Constraint::Length(*size),
            WidgetState::Separator { .. } => Constraint::Length(1),
            _ => Constraint::Percentage(share),
        })
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(rect);

    for (cell, &wi) in cells.iter().zip(row) {
        let widget = &group.widgets[wi];
        match &widget.state {
            WidgetState::Stretch | WidgetState::Spacer { .. } => {}
            WidgetState::Separator { vertical } => draw_separator(f, *vertical, *cell),
            WidgetState::Text(field) => draw_field_cell(f, ctx, item, wi, widget, field, *cell),
            WidgetState::Spinner(spinner) => {
                draw_spinner_cell(f, ctx, item, wi, widget, spinner, *cell)
            }
            WidgetState::Check(check) => draw_check_cell(f, ctx, item, wi, widget, check, *cell),
        }
    }
}

fn draw_separator(f: &mut Frame, vertical: bool, cell: Rect) {
    if vertical {
        let bar = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(Color::DarkGray))
            .style(dark_bg());
        f.render_widget(bar, cell);
    } else if cell.height > 0 {
        let rule = "─".repeat(cell.width as usize);
        let y = cell.y + cell.height / 2;
        f.render_widget(
            Paragraph::new(rule).style(Style::default().fg(Color::DarkGray).bg(Color::Black)),
            Rect::new(cell.x, y, cell.width, 1),
        );
    }
}

fn widget_border(focused: bool, editing: bool) -> Color {
    if editing {
        Color::Yellow
    } else if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }
}

fn draw_field_cell(
    f: &mut Frame,
    ctx: &DrawCtx,
    item: usize,
    wi: usize,
    widget: &InputWidget,
    field: &TextField,
    cell: Rect,
) {
    let focused = ctx.target == Some(FocusTarget::Widget { item, widget: wi });
    let editing = ctx.editing == Some((item, wi));

    let (field_rect, button_rect) = if field.has_command() && cell.width > 12 {
        let width = (field.button_label.trim().width() as u16 + 2).min(cell.width / 2);
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(width)])
            .split(cell);
        (parts[0], Some(parts[1]))
    } else {
        (cell, None)
    };

    let title = widget.label.as_deref().unwrap_or("");
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(widget_border(focused, editing)))
        .title(Span::styled(
            title,
            Style::default().fg(rgb_or(widget.color, Color::Gray)),
        ))
        .style(dark_bg());
    let content = if editing {
        Line::from(Span::styled(
            ctx.edit_text.to_string(),
            Style::default().fg(Color::Yellow),
        ))
    } else if field.text.is_empty() {
        match &field.placeholder {
            Some(hint) => Line::from(Span::styled(
                hint.clone(),
                Style::default().fg(Color::DarkGray),
            )),
            None => Line::from(""),
        }
    } else {
        Line::from(Span::styled(
            field.text.clone(),
            Style::default().fg(Color::White),
        ))
    };
    f.render_widget(Paragraph::new(content).block(block).style(dark_bg()), field_rect);

    if let Some(rect) = button_rect {
        let style = Style::default().fg(if focused { Color::Cyan } else { Color::Gray });
        let button = Paragraph::new(Span::styled(field.button_label.trim().to_string(), style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(dark_bg()),
            );
        f.render_widget(button, rect);
    }
}

fn draw_spinner_cell(
    f: &mut Frame,
    ctx: &DrawCtx,
    item: usize,
    wi: usize,
    widget: &InputWidget,
    spinner: &SpinnerField,
    cell: Rect,
) {
    let focused = ctx.target == Some(FocusTarget::Widget { item, widget: wi });
    let editing = ctx.editing == Some((item, wi));
    let text = if editing {
        ctx.edit_text.to_string()
    } else {
        format!("[-] {} [+]", spinner.display())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(widget_border(focused, editing)))
        .title(Span::styled(
            widget.label.as_deref().unwrap_or(""),
            Style::default().fg(rgb_or(widget.color, Color::Gray)),
        ))
        .style(dark_bg());
    let body = Paragraph::new(Span::styled(
        text,
        Style::default().fg(if editing { Color::Yellow } else { Color::White }),
    ))
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(body, cell);
}

fn draw_check_cell(
    f: &mut Frame,
    ctx: &DrawCtx,
    item: usize,
    wi: usize,
    widget: &InputWidget,
    check: &CheckField,
    cell: Rect,
) {
    let focused = ctx.target == Some(FocusTarget::Widget { item, widget: wi });
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(widget_border(focused, false)))
        .title(Span::styled(
            widget.label.as_deref().unwrap_or(""),
            Style::default().fg(rgb_or(widget.color, Color::Gray)),
        ))
        .style(dark_bg());
    let body = Paragraph::new(Span::styled(
        check.display(),
        Style::default().fg(Color::White),
    ))
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(body, cell);
}

fn draw_button_row(
    f: &mut Frame,
    ctx: &DrawCtx,
    item: usize,
    group: &GroupBody,
    row: &[usize],
    rect: Rect,
) {
    let share = (100 / row.len().max(1) as u16).max(1);
    let constraints: Vec<Constraint> = row.iter().map(|_| Constraint::Percentage(share)).collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(rect);

    for (cell, &bi) in cells.iter().zip(row) {
        let Some(button) = group.buttons.get(bi) else {
            continue;
        };
        let focused = ctx.target == Some(FocusTarget::Button { item, button: bi });
        let mut style = Style::default()
            .fg(rgb_or(button.color, Color::White))
            .bg(Color::Black);
        if focused {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        let body = Paragraph::new(Span::styled(
            format!("▶ {}", button.display_label()),
            style,
        ))
        .alignment(Alignment::Center)
        .style(dark_bg());
        f.render_widget(body, *cell);
    }
}

fn draw_console(f: &mut Frame, app: &App, area: Rect) {
    let capacity = area.height.saturating_sub(2) as usize;
    let lines = app.console.tail(capacity);
    let items: Vec<ListItem> = lines
        .iter()
        .map(|line| {
            let style = if line.starts_with("warning:") {
                Style::default().fg(Color::Yellow)
            } else if line.starts_with('#') {
                Style::default().fg(Color::LightRed)
            } else {
                Style::default().fg(Color::Gray)
            };
            ListItem::new(Line::from(Span::styled(line.clone(), style.bg(Color::Black))))
        })
        .collect();
    f.render_widget(List::new(items).block(dark_block("Console")).style(dark_bg()), area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.transient.is_some() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let status = Paragraph::new(Span::styled(app.status_line(), style.bg(Color::Black)))
        .block(dark_block(""));
    f.render_widget(status, area);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(72, 80, f.size());
    f.render_widget(Clear, area);
    let lines: Vec<Line> = help_text().into_iter().map(Line::from).collect();
    let help = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray).bg(Color::Black))
        .block(dark_block("Help"));
    f.render_widget(help, area);
}

fn draw_include(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 50, f.size());
    f.render_widget(Clear, area);
    let items: Vec<ListItem> = app
        .include_items
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let style = if i == app.include_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(Color::Black).fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(name.clone(), style)))
        })
        .collect();
    let list = List::new(items)
        .block(dark_block_highlight(
            "Bring back excluded function",
            Color::Yellow,
        ))
        .style(dark_bg());
    f.render_widget(list, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
