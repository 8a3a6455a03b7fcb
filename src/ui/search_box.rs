use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Text box holding the live query.
#[derive(Debug, Default)]
pub struct SearchBox {
    input: Input,
}

impl SearchBox {
    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    pub fn visual_cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    /// Columns hidden on the left so the cursor fits in `width`.
    pub fn visual_scroll(&self, width: usize) -> usize {
        self.input.visual_scroll(width)
    }

    pub fn reset(&mut self) {
        self.input.reset();
    }

    /// Replace the text, leaving the cursor at the end.
    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    /// Feed a key to the text editor. Returns true when the text changed.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        self.input
            .handle_event(&Event::Key(key))
            .map(|change| change.value)
            .unwrap_or(false)
    }
}
