//! Ephemeral drag-and-drop state for the page grid
//!
//! Hovering only updates this struct. The registry is touched once, on drop,
//! so counts and plans read mid-drag always reflect a consistent order.

/// A move to apply to the registry: `(source, target)` display positions
pub type PendingMove = (usize, usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    dragged: Option<usize>,
    hover: Option<usize>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, position: usize) {
        self.dragged = Some(position);
        self.hover = None;
    }

    pub fn hover(&mut self, position: usize) {
        if self.dragged.is_some() {
            self.hover = Some(position);
        }
    }

    pub fn dragged(&self) -> Option<usize> {
        self.dragged
    }

    pub fn hover_target(&self) -> Option<usize> {
        self.hover
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Finish the drag over `target` and return the move to commit, if any
    pub fn drop_on(&mut self, target: usize) -> Option<PendingMove> {
        let source = self.dragged.take();
        self.hover = None;
        match source {
            Some(source) if source != target => Some((source, target)),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
        self.hover = None;
    }
}
