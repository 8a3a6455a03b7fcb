use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tui_widgets::popup::PopupState;

use crate::chips::ChipField;
use crate::config::{Config, EmptyQuery, UiColors, UiIcons};
use crate::contact::{Catalog, Chip};

use super::draw;
use super::hit::{Hit, HitMap};
use super::search_box::SearchBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Chips,
}

/// How the picker was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    /// Selection committed
    Done(Vec<Chip>),
    Aborted,
}

/// Help modal state with scroll support
#[derive(Debug, Clone)]
pub struct HelpModal {
    /// Current scroll offset (line index at top of viewport)
    pub scroll: usize,
    /// Total number of content lines
    pub total_lines: usize,
    /// Viewport height (set during rendering)
    pub viewport_height: usize,
}

impl HelpModal {
    pub fn new(total_lines: usize) -> Self {
        Self {
            scroll: 0,
            total_lines,
            viewport_height: 10, // Will be updated during render
        }
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        self.scroll = (self.scroll + lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.total_lines.saturating_sub(self.viewport_height);
    }

    pub fn can_scroll_up(&self) -> bool {
        self.scroll > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.scroll + self.viewport_height < self.total_lines
    }
}

/// A section in the help modal (e.g., "Global", "Chips")
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

/// A single help entry (action name + key bindings)
pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

pub struct App<'a> {
    config: &'a Config,
    pub field: ChipField,
    pub search: SearchBox,
    pub focus: Focus,
    pub chip_cursor: usize,
    pub status: Option<String>,
    pub help_modal: Option<HelpModal>,
    pub modal_popup: PopupState,
    pub hits: HitMap,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, catalog: Catalog) -> Self {
        Self {
            config,
            field: ChipField::new(catalog, config.empty_query),
            search: SearchBox::default(),
            // the input owns focus from the first frame
            focus: Focus::Input,
            chip_cursor: 0,
            status: None,
            help_modal: None,
            modal_popup: PopupState::default(),
            hits: HitMap::default(),
        }
    }

    pub fn run(&mut self) -> Result<Exit> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<Exit>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(250))? {
                let exit = match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse);
                        None
                    }
                    _ => None,
                };
                if let Some(exit) = exit {
                    log::info!("picker closed: {:?}", exit);
                    return Ok(exit);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Exit> {
        // Ctrl+C always aborts (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Some(Exit::Aborted);
        }

        if self.help_modal.is_some() {
            self.handle_help_modal_key(key);
            return None;
        }

        if key_matches_any(&key, &self.config.keys.global.help) {
            self.show_help();
            return None;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Chips => {
                self.handle_chips_key(key);
                None
            }
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Option<Exit> {
        let config = self.config;
        let keys = &config.keys;

        if key_matches_any(&key, &keys.global.done) {
            return Some(Exit::Done(self.field.chips().to_vec()));
        }

        if key_matches_any(&key, &keys.input.confirm) {
            let name = self.field.highlighted_contact().map(|c| c.name.clone());
            if self.field.select_highlighted() {
                self.sync_search();
                if let Some(name) = name {
                    self.set_status(format!("Added {}", name));
                }
            } else {
                self.set_status("No suggestion to add");
            }
            return None;
        }

        if key_matches_any(&key, &keys.input.next) {
            self.field.highlight_next();
            return None;
        }
        if key_matches_any(&key, &keys.input.prev) {
            self.field.highlight_prev();
            return None;
        }

        if key_matches_any(&key, &keys.input.focus_chips) {
            if self.field.chips().is_empty() {
                self.set_status("No chips yet");
            } else {
                self.focus = Focus::Chips;
                self.chip_cursor = self.field.chips().len() - 1;
            }
            return None;
        }

        // Only special on an empty query; otherwise it edits text
        if self.search.is_empty() && key_matches_any(&key, &keys.input.remove_last) {
            let name = self.field.chips().last().map(|chip| chip.name.clone());
            if self.field.on_backspace() {
                if let Some(name) = name {
                    self.set_status(format!("Removed {}", name));
                }
            }
            return None;
        }

        if self.search.handle_key_event(key) {
            self.field.on_type(self.search.value());
        }
        None
    }

    fn handle_chips_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.chips;

        if key_matches_any(&key, &keys.cancel) {
            self.focus = Focus::Input;
            return;
        }

        let count = self.field.chips().len();
        if key_matches_any(&key, &keys.next) {
            if count > 0 {
                self.chip_cursor = (self.chip_cursor + 1).min(count - 1);
            }
            return;
        }
        if key_matches_any(&key, &keys.prev) {
            self.chip_cursor = self.chip_cursor.saturating_sub(1);
            return;
        }

        if key_matches_any(&key, &keys.remove) {
            if let Some(chip) = self.field.chips().get(self.chip_cursor).cloned() {
                self.remove_chip(chip.id);
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {}
            MouseEventKind::Moved if self.help_modal.is_none() => {
                self.hover(mouse.column, mouse.row);
                return;
            }
            MouseEventKind::ScrollDown if self.help_modal.is_none() => {
                self.field.highlight_next();
                return;
            }
            MouseEventKind::ScrollUp if self.help_modal.is_none() => {
                self.field.highlight_prev();
                return;
            }
            _ => return,
        }
        if self.help_modal.is_some() {
            self.help_modal = None;
            return;
        }

        match self.hits.at(mouse.column, mouse.row) {
            Some(Hit::Suggestion(id)) => {
                let name = self.field.catalog().get(id).map(|c| c.name.clone());
                if self.field.select(id) {
                    self.sync_search();
                    self.focus = Focus::Input;
                    if let Some(name) = name {
                        self.set_status(format!("Added {}", name));
                    }
                } else if self.field.is_selected(id) {
                    if let Some(name) = name {
                        self.set_status(format!("{} is already added", name));
                    }
                }
            }
            Some(Hit::ChipRemove(id)) => self.remove_chip(id),
            Some(Hit::Chip(index)) => {
                if index < self.field.chips().len() {
                    self.focus = Focus::Chips;
                    self.chip_cursor = index;
                }
            }
            Some(Hit::Input) => self.focus = Focus::Input,
            None => {}
        }
    }

    /// Pointer over a suggestion row highlights it.
    fn hover(&mut self, column: u16, row: u16) {
        if let Some(Hit::Suggestion(id)) = self.hits.at(column, row) {
            if let Some(index) = self
                .field
                .suggestions()
                .iter()
                .position(|contact| contact.id == id)
            {
                self.field.highlight(index);
            }
        }
    }

    fn remove_chip(&mut self, id: u64) {
        let name = self
            .field
            .chips()
            .iter()
            .find(|chip| chip.id == id)
            .map(|chip| chip.name.clone());
        if !self.field.remove(id) {
            return;
        }
        if let Some(name) = name {
            self.set_status(format!("Removed {}", name));
        }

        let count = self.field.chips().len();
        if count == 0 {
            self.chip_cursor = 0;
            self.focus = Focus::Input;
        } else if self.chip_cursor >= count {
            self.chip_cursor = count - 1;
        }
    }

    /// Selection clears the query; mirror that in the text box.
    fn sync_search(&mut self) {
        if self.field.query().is_empty() {
            self.search.reset();
        } else if self.search.value() != self.field.query() {
            let query = self.field.query().to_string();
            self.search.set_value(&query);
        }
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    pub fn ui_icons(&self) -> &UiIcons {
        &self.config.ui.icons
    }

    pub fn config_empty_query(&self) -> EmptyQuery {
        self.config.empty_query
    }

    pub fn typed_anything(&self) -> bool {
        !self.field.query().is_empty()
    }

    // =========================================================================
    // Help Modal
    // =========================================================================

    /// Generate help content from current keybindings configuration
    pub fn help_entries(&self) -> Vec<HelpSection> {
        let keys = &self.config.keys;

        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    HelpEntry {
                        action: "Done",
                        keys: keys.global.done.join(", "),
                    },
                    HelpEntry {
                        action: "Abort",
                        keys: "Ctrl+C".to_string(),
                    },
                    HelpEntry {
                        action: "Help",
                        keys: keys.global.help.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Search Input",
                entries: vec![
                    HelpEntry {
                        action: "Add suggestion",
                        keys: keys.input.confirm.join(", "),
                    },
                    HelpEntry {
                        action: "Next suggestion",
                        keys: keys.input.next.join(", "),
                    },
                    HelpEntry {
                        action: "Prev suggestion",
                        keys: keys.input.prev.join(", "),
                    },
                    HelpEntry {
                        action: "Remove last chip",
                        keys: format!("{} (empty input)", keys.input.remove_last.join(", ")),
                    },
                    HelpEntry {
                        action: "Focus chips",
                        keys: keys.input.focus_chips.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Chips",
                entries: vec![
                    HelpEntry {
                        action: "Next chip",
                        keys: keys.chips.next.join(", "),
                    },
                    HelpEntry {
                        action: "Prev chip",
                        keys: keys.chips.prev.join(", "),
                    },
                    HelpEntry {
                        action: "Remove chip",
                        keys: keys.chips.remove.join(", "),
                    },
                    HelpEntry {
                        action: "Back to input",
                        keys: keys.chips.cancel.join(", "),
                    },
                ],
            },
            HelpSection {
                title: "Mouse",
                entries: vec![
                    HelpEntry {
                        action: "Add suggestion",
                        keys: "Click row".to_string(),
                    },
                    HelpEntry {
                        action: "Remove chip",
                        keys: format!("Click {}", self.config.ui.icons.chip_remove),
                    },
                    HelpEntry {
                        action: "Move highlight",
                        keys: "Hover, wheel".to_string(),
                    },
                ],
            },
        ]
    }

    /// Calculate total number of lines in help content
    fn help_total_lines(&self) -> usize {
        let sections = self.help_entries();
        let mut total = 0;
        for section in &sections {
            total += 1; // Section header
            total += section.entries.len(); // Entries
        }
        // Blank line between sections
        total + sections.len().saturating_sub(1)
    }

    /// Open the help modal
    pub fn show_help(&mut self) {
        let total_lines = self.help_total_lines();
        self.modal_popup = PopupState::default();
        self.help_modal = Some(HelpModal::new(total_lines));
    }

    /// Handle keys when help modal is open
    fn handle_help_modal_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc) || matches!(key.code, KeyCode::Char('q')) {
            self.help_modal = None;
            return;
        }

        let Some(modal) = self.help_modal.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => modal.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => modal.scroll_up(1),
            KeyCode::PageDown => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_down(page);
            }
            KeyCode::PageUp => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_up(page);
            }
            KeyCode::Char('g') | KeyCode::Home => modal.scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => modal.scroll_to_bottom(),
            _ => {}
        }
    }
}

/// Check if the key event matches any of the bindings in the list
pub fn key_matches_any(event: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|b| key_matches_single(event, b))
}

/// Check if the key event matches a single binding string
fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Ctrl/Alt/Super chords are never bindings
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "delete" | "del" => matches!(event.code, KeyCode::Delete),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        name if name.len() > 1 && name.starts_with('f') => match name[1..].parse::<u8>() {
            Ok(n) if (1..=12).contains(&n) => matches!(event.code, KeyCode::F(k) if k == n),
            _ => false,
        },
        // Single character - case-sensitive (m != M, since M requires Shift)
        _ => {
            let mut chars = trimmed.chars();
            if let (Some(first), None) = (chars.next(), chars.next()) {
                matches!(event.code, KeyCode::Char(c) if c == first)
            } else {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Contact;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn chip_ids(app: &App) -> Vec<u64> {
        app.field.chips().iter().map(|c| c.id).collect()
    }

    fn suggestion_ids(app: &App) -> Vec<u64> {
        app.field.suggestions().iter().map(|c| c.id).collect()
    }

    fn two_contacts() -> Catalog {
        Catalog::new(vec![
            Contact::new(1, "Ayushman Singh", "ayush@example.com", ""),
            Contact::new(2, "Ravi Kumar", "ravi@example.com", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_input_focused_on_mount() {
        let config = Config::default();
        let app = App::new(&config, Catalog::builtin());
        assert_eq!(app.focus, Focus::Input);
        assert!(app.search.is_empty());
    }

    #[test]
    fn test_typing_filters_suggestions() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());

        type_text(&mut app, "ravi");
        assert_eq!(app.search.value(), "ravi");
        assert_eq!(app.field.query(), "ravi");
        assert_eq!(suggestion_ids(&app), vec![2]);
    }

    #[test]
    fn test_ravi_scenario_with_keys() {
        let config = Config::default();
        let mut app = App::new(&config, two_contacts());

        type_text(&mut app, "ravi");
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(chip_ids(&app), vec![2]);
        assert!(app.search.is_empty());
        assert!(!suggestion_ids(&app).contains(&2));
        assert_eq!(app.status.as_deref(), Some("Added Ravi Kumar"));

        app.handle_key(key(KeyCode::Backspace));
        assert!(app.field.chips().is_empty());
        assert_eq!(suggestion_ids(&app), vec![1, 2]);
    }

    #[test]
    fn test_backspace_edits_text_before_removing_chips() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.field.select(1);

        type_text(&mut app, "ra");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.search.value(), "r");
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.search.value(), "");
        assert_eq!(chip_ids(&app), vec![1]);

        app.handle_key(key(KeyCode::Backspace));
        assert!(app.field.chips().is_empty());
    }

    #[test]
    fn test_backspace_without_chips_does_nothing() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        assert!(app.handle_key(key(KeyCode::Backspace)).is_none());
        assert!(app.status.is_none());
        assert_eq!(suggestion_ids(&app), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_arrow_keys_move_highlight() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.field.highlighted(), Some(1));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(chip_ids(&app), vec![2]);
    }

    #[test]
    fn test_enter_without_suggestions() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        type_text(&mut app, "nobody");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.field.chips().is_empty());
        assert_eq!(app.search.value(), "nobody");
        assert_eq!(app.status.as_deref(), Some("No suggestion to add"));
    }

    #[test]
    fn test_done_returns_chips_in_order() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.field.select(3);
        app.field.select(1);

        match app.handle_key(key(KeyCode::Esc)) {
            Some(Exit::Done(chips)) => {
                let ids: Vec<u64> = chips.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![3, 1]);
            }
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn test_ctrl_c_aborts() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        let exit = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(exit, Some(Exit::Aborted));
    }

    #[test]
    fn test_chips_focus_and_remove() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.field.select(1);
        app.field.select(2);
        app.field.select(3);

        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.focus, Focus::Chips);
        assert_eq!(app.chip_cursor, 2);

        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(chip_ids(&app), vec![1, 3]);
        assert_eq!(app.chip_cursor, 1);

        app.handle_key(key(KeyCode::Delete));
        assert_eq!(chip_ids(&app), vec![1]);
        assert_eq!(app.chip_cursor, 0);

        app.handle_key(key(KeyCode::Backspace));
        assert!(app.field.chips().is_empty());
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn test_escape_in_chips_returns_to_input() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.field.select(4);
        app.handle_key(key(KeyCode::BackTab));

        assert!(app.handle_key(key(KeyCode::Esc)).is_none());
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(chip_ids(&app), vec![4]);
    }

    #[test]
    fn test_focus_chips_when_empty() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(app.status.as_deref(), Some("No chips yet"));
    }

    #[test]
    fn test_mouse_clicks_use_recorded_hits() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.hits.push(ratatui::layout::Rect::new(0, 5, 20, 1), Hit::Suggestion(3));

        app.handle_mouse(click(4, 5));
        assert_eq!(chip_ids(&app), vec![3]);

        app.hits.clear();
        app.hits.push(ratatui::layout::Rect::new(10, 1, 1, 1), Hit::ChipRemove(3));
        app.handle_mouse(click(10, 1));
        assert!(app.field.chips().is_empty());
    }

    #[test]
    fn test_stale_suggestion_click_is_noop() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.field.select(2);
        app.hits.push(ratatui::layout::Rect::new(0, 5, 20, 1), Hit::Suggestion(2));

        app.handle_mouse(click(1, 5));
        assert_eq!(chip_ids(&app), vec![2]);
        assert_eq!(app.status.as_deref(), Some("Ravi Kumar is already added"));
    }

    #[test]
    fn test_hover_and_wheel_move_highlight() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.hits.push(ratatui::layout::Rect::new(0, 7, 20, 1), Hit::Suggestion(3));

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            ..click(2, 7)
        });
        assert_eq!(app.field.highlighted(), Some(2));

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            ..click(0, 0)
        });
        assert_eq!(app.field.highlighted(), Some(1));
        assert!(app.field.chips().is_empty());
    }

    #[test]
    fn test_chip_click_focuses_chip() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());
        app.field.select(1);
        app.field.select(2);
        app.hits.push(ratatui::layout::Rect::new(0, 1, 8, 1), Hit::Chip(0));

        app.handle_mouse(click(2, 1));
        assert_eq!(app.focus, Focus::Chips);
        assert_eq!(app.chip_cursor, 0);
    }

    #[test]
    fn test_help_modal_scroll_and_close() {
        let config = Config::default();
        let mut app = App::new(&config, Catalog::builtin());

        app.handle_key(key(KeyCode::F(1)));
        let modal = app.help_modal.as_mut().unwrap();
        // 4 sections, 15 entries, 3 separators
        assert_eq!(modal.total_lines, 22);
        modal.viewport_height = 5;
        assert!(modal.can_scroll_down());

        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.help_modal.as_ref().unwrap().scroll, 1);
        // keys do not reach the input while help is open
        assert!(app.search.is_empty());

        app.handle_key(key(KeyCode::Char('G')));
        let modal = app.help_modal.as_ref().unwrap();
        assert_eq!(modal.scroll, modal.total_lines - 5);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.help_modal.is_none());
    }

    #[test]
    fn test_hidden_empty_query() {
        let config = Config {
            empty_query: EmptyQuery::Hidden,
            ..Config::default()
        };
        let mut app = App::new(&config, Catalog::builtin());
        assert!(app.field.suggestions().is_empty());
        assert!(!app.typed_anything());

        type_text(&mut app, "ku");
        assert_eq!(suggestion_ids(&app), vec![2]);
        assert!(app.typed_anything());
    }

    #[test]
    fn test_key_matching() {
        let enter = key(KeyCode::Enter);
        assert!(key_matches_any(&enter, &["Enter".to_string()]));
        assert!(key_matches_any(&enter, &["x".to_string(), "ENTER".to_string()]));
        assert!(!key_matches_any(&enter, &["Tab".to_string()]));

        assert!(key_matches_single(&key(KeyCode::F(1)), "F1"));
        assert!(key_matches_single(&key(KeyCode::F(12)), "f12"));
        assert!(!key_matches_single(&key(KeyCode::F(2)), "F1"));
        assert!(!key_matches_single(&key(KeyCode::Char('f')), "F13"));

        assert!(key_matches_single(&key(KeyCode::Char('x')), "x"));
        assert!(!key_matches_single(&key(KeyCode::Char('X')), "x"));
        assert!(key_matches_single(&key(KeyCode::Delete), "Del"));

        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert!(!key_matches_single(&ctrl_x, "x"));
    }
}
