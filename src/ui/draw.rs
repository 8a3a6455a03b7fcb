use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::line::NORMAL as LINE;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
use tui_widgets::popup::Popup;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::{EmptyQuery, RgbColor};
use crate::contact::Chip;

use super::app::{App, Focus};
use super::hit::Hit;

const SEARCH_LABEL: &str = "SEARCH: ";
const INPUT_HELP: &str =
    "Type to filter  Up/Down: move  Enter: add  Backspace: remove last  F1: help  Esc: done";
const CHIPS_HELP: &str = "Left/Right: move  x/Del: remove  Esc/Tab: back to input";
const HELP_MODAL_FOOTER: &str = "j/k: scroll  Esc/q: close";

/// Where one chip sits in the chips row, relative to the row's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipSlot {
    pub index: usize,
    pub id: u64,
    pub row: u16,
    pub x: u16,
    pub width: u16,
    pub label: String,
    /// Offset of the remove glyph from `x`
    pub remove_offset: u16,
    pub remove_width: u16,
}

/// Lay chips out left to right as ` name × `, wrapping onto new rows.
pub fn layout_chips(chips: &[Chip], width: u16, remove_icon: &str) -> Vec<ChipSlot> {
    let mut slots = Vec::with_capacity(chips.len());
    if width == 0 {
        return slots;
    }

    let icon_width = remove_icon.width() as u16;
    // " " name " " icon " "
    let chrome = icon_width + 3;
    let max_label = width.saturating_sub(chrome).max(1);

    let mut row = 0u16;
    let mut x = 0u16;
    for (index, chip) in chips.iter().enumerate() {
        let label = truncate_to_width(&chip.name, max_label as usize);
        let chip_width = (label.width() as u16 + chrome).min(width);

        if x > 0 && x + chip_width > width {
            row += 1;
            x = 0;
        }

        slots.push(ChipSlot {
            index,
            id: chip.id,
            row,
            x,
            width: chip_width,
            remove_offset: label.width() as u16 + 2,
            remove_width: icon_width,
            label,
        });

        x = x.saturating_add(chip_width + 1);
    }
    slots
}

fn truncate_to_width(value: &str, max_width: usize) -> String {
    if value.width() <= max_width {
        return value.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in value.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    app.hits.clear();

    let size = frame.area();
    let inner_width = size.width.saturating_sub(2);
    let slots = layout_chips(app.field.chips(), inner_width, &app.ui_icons().chip_remove);
    let chip_rows = slots.last().map(|slot| slot.row + 1).unwrap_or(0);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(chip_rows + 3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_field(frame, layout[1], app, &slots, chip_rows);
    draw_suggestions(frame, layout[2], app);
    draw_footer(frame, layout[3], app);
    draw_help_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let text = format!(
        "CONTACTS {}/{}",
        app.field.chips().len(),
        app.field.catalog().len()
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, header_text_style(app)))),
        area,
    );
}

fn draw_field(frame: &mut Frame<'_>, area: Rect, app: &mut App, slots: &[ChipSlot], chip_rows: u16) {
    let active = app.focus == Focus::Input;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active))
        .title(Span::styled(" TO ", header_text_style(app)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let chip_style = chip_style(app);
    let focused_style = selection_style(app);
    let icon = app.ui_icons().chip_remove.clone();

    for slot in slots {
        if slot.row >= inner.height.saturating_sub(1) {
            break;
        }
        let rect = Rect {
            x: inner.x + slot.x,
            y: inner.y + slot.row,
            width: slot.width.min(inner.width.saturating_sub(slot.x)),
            height: 1,
        };
        let style = if app.focus == Focus::Chips && slot.index == app.chip_cursor {
            focused_style
        } else {
            chip_style
        };
        let line = Line::from(vec![
            Span::styled(format!(" {} ", slot.label), style),
            Span::styled(icon.clone(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" ", style),
        ]);
        frame.render_widget(Paragraph::new(line), rect);

        app.hits.push(rect, Hit::Chip(slot.index));
        app.hits.push(
            Rect {
                x: rect.x + slot.remove_offset,
                y: rect.y,
                width: slot.remove_width,
                height: 1,
            },
            Hit::ChipRemove(slot.id),
        );
    }

    let input_row = Rect {
        x: inner.x,
        y: inner.y + chip_rows.min(inner.height - 1),
        width: inner.width,
        height: 1,
    };
    draw_input(frame, input_row, app, active);
    app.hits.push(input_row, Hit::Input);
}

fn draw_input(frame: &mut Frame<'_>, area: Rect, app: &App, active: bool) {
    let label_width = (SEARCH_LABEL.width() as u16).min(area.width);
    let label_area = Rect {
        width: label_width,
        ..area
    };
    let value_area = Rect {
        x: area.x + label_width,
        width: area.width - label_width,
        ..area
    };
    frame.render_widget(
        Paragraph::new(Span::styled(SEARCH_LABEL, header_text_style(app))),
        label_area,
    );

    if app.search.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                app.ui_icons().placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            )),
            value_area,
        );
    }

    // one column stays free for the cursor
    let scroll = app
        .search
        .visual_scroll(value_area.width.saturating_sub(1) as usize);
    if !app.search.is_empty() {
        frame.render_widget(
            Paragraph::new(app.search.value()).scroll((0, scroll as u16)),
            value_area,
        );
    }

    if active && app.help_modal.is_none() && value_area.width > 0 {
        let column = app.search.visual_cursor().saturating_sub(scroll) as u16;
        let x = value_area.x + column.min(value_area.width - 1);
        frame.set_cursor_position((x, area.y));
    }
}

fn draw_suggestions(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let count = app.field.suggestions().len();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, false))
        .title(Span::styled(
            format!(" SUGGESTIONS ({}) ", count),
            header_text_style(app),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if count == 0 {
        let message = empty_message(app);
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let avatar_style = chip_style(app);
    let items: Vec<ListItem> = app
        .field
        .suggestions()
        .iter()
        .map(|contact| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<2} ", contact.initials()), avatar_style),
                Span::raw(" "),
                Span::styled(contact.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::raw(contact.email.clone()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(app.field.highlighted());

    let list = List::new(items)
        .highlight_style(selection_style(app))
        .highlight_symbol(" ")
        .repeat_highlight_symbol(false);

    frame.render_stateful_widget(list, inner, &mut state);

    let offset = state.offset();
    let visible = (inner.height as usize).min(count.saturating_sub(offset));
    for row in 0..visible {
        let contact = &app.field.suggestions()[offset + row];
        let rect = Rect {
            x: inner.x,
            y: inner.y + row as u16,
            width: inner.width,
            height: 1,
        };
        let id = contact.id;
        app.hits.push(rect, Hit::Suggestion(id));
    }
}

fn empty_message(app: &App) -> &'static str {
    if app.typed_anything() {
        "No matches"
    } else if app.field.catalog().is_empty() {
        "No contacts"
    } else if app.field.chips().len() == app.field.catalog().len() {
        "Every contact is selected"
    } else if app.config_empty_query() == EmptyQuery::Hidden {
        "Start typing to search by name or email"
    } else {
        "No matches"
    }
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let message: String = match (&app.status, app.focus) {
        (Some(status), _) => status.clone(),
        (None, Focus::Input) => INPUT_HELP.to_string(),
        (None, Focus::Chips) => CHIPS_HELP.to_string(),
    };
    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);

    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_help_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.help_modal.is_none() {
        return;
    }

    let header_style = header_text_style(app);
    let border_s = border_style(app, true);
    let width = area.width.saturating_mul(2).saturating_div(3).max(40).min(area.width);
    let content_width = width.saturating_sub(4) as usize;
    let action_width = 20usize;

    let sections = app.help_entries();
    let mut lines: Vec<Line> = Vec::new();
    for (section_idx, section) in sections.iter().enumerate() {
        let header_text = format!(" {} ", section.title);
        let padding_total = content_width.saturating_sub(header_text.len());
        let left_pad = padding_total / 2;
        let right_pad = padding_total - left_pad;
        lines.push(Line::from(Span::styled(
            format!(
                "{}{}{}",
                LINE.horizontal.repeat(left_pad),
                header_text,
                LINE.horizontal.repeat(right_pad)
            ),
            header_style,
        )));

        for entry in &section.entries {
            lines.push(Line::from(vec![
                Span::raw(format!("{:<width$}", entry.action, width = action_width)),
                Span::styled(entry.keys.clone(), header_style),
            ]));
        }

        if section_idx < sections.len() - 1 {
            lines.push(Line::from(""));
        }
    }

    // borders (2) + footer line (1)
    let max_height = area.height.saturating_mul(4).saturating_div(5);
    let viewport_height = (max_height.saturating_sub(3) as usize).max(1);

    let Some(modal) = app.help_modal.as_mut() else {
        return;
    };
    modal.total_lines = lines.len();
    modal.viewport_height = viewport_height;
    let max_scroll = modal.total_lines.saturating_sub(modal.viewport_height);
    if modal.scroll > max_scroll {
        modal.scroll = max_scroll;
    }

    let scroll_indicator = match (modal.can_scroll_up(), modal.can_scroll_down()) {
        (true, true) => "▲▼",
        (true, false) => "▲ ",
        (false, true) => " ▼",
        (false, false) => "  ",
    };

    let mut visible: Vec<Line> = lines
        .into_iter()
        .skip(modal.scroll)
        .take(modal.viewport_height)
        .collect();
    visible.push(Line::from(Span::styled(HELP_MODAL_FOOTER, header_style)));

    let title = Line::from(vec![
        Span::styled(" HELP ", header_style),
        Span::styled(scroll_indicator, header_style),
    ]);
    let popup = Popup::new(Text::from(visible))
        .title(title)
        .border_style(border_s);

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn chip_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.chip_fg))
        .bg(color(colors.chip_bg))
}

fn border_style(app: &App, active: bool) -> Style {
    let colors = app.ui_colors();
    let style = Style::default().fg(color(colors.border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.border))
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
