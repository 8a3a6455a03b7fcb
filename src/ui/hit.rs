use ratatui::layout::Rect;

/// Clickable things on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Input,
    /// Chip body, by position in the chips row
    Chip(usize),
    /// Remove glyph of the chip with this contact id
    ChipRemove(u64),
    /// Suggestion row for this contact id
    Suggestion(u64),
}

/// Regions recorded while drawing, queried on mouse clicks.
#[derive(Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Hit)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, area: Rect, hit: Hit) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((area, hit));
        }
    }

    /// Topmost region at the position; later pushes win.
    pub fn at(&self, column: u16, row: u16) -> Option<Hit> {
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| contains(*area, column, row))
            .map(|(_, hit)| *hit)
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && row >= area.y
        && (column as u32) < area.x as u32 + area.width as u32
        && (row as u32) < area.y as u32 + area.height as u32
}
