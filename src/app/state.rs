use crate::storage::NoteId;
use crate::ui::{DeskLayout, PreviewSlot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Filter,
    List,
    Note(NoteId),
}

impl Focus {
    pub fn label(&self) -> &'static str {
        match self {
            Focus::Filter => "filter",
            Focus::List => "list",
            Focus::Note(_) => "note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteNoteOverlay {
    pub id: NoteId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    ConfirmDelete(DeleteNoteOverlay),
}

/// Desk-level UI state that is not owned by the toolbar or a window.
#[derive(Debug)]
pub struct DeskState {
    pub focus: Focus,
    overlay: Option<OverlayState>,
    status_message: Option<String>,
    selected: usize,
    list_offset: usize,
    grab: Option<NoteId>,
    layout: Option<DeskLayout>,
    slots: Vec<PreviewSlot>,
}

impl Default for DeskState {
    fn default() -> Self {
        Self {
            focus: Focus::List,
            overlay: None,
            status_message: None,
            selected: 0,
            list_offset: 0,
            grab: None,
            layout: None,
            slots: Vec::new(),
        }
    }
}

impl DeskState {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn list_offset(&self) -> usize {
        self.list_offset
    }

    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index;
        self.clamp_selection(len);
    }

    pub fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.list_offset = 0;
            return;
        }
        self.selected = self.selected.min(len - 1);
        self.list_offset = self.list_offset.min(len - 1);
    }

    pub fn scroll(&mut self, delta: isize, len: usize) {
        let max = len.saturating_sub(1) as isize;
        self.list_offset = (self.list_offset as isize + delta).clamp(0, max) as usize;
    }

    /// Moves the list window so that the selection lands inside the
    /// `visible` previews shown last frame.
    pub fn scroll_into_view(&mut self, visible: usize) {
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        } else if visible > 0 && self.selected >= self.list_offset + visible {
            self.list_offset = self.selected + 1 - visible;
        }
    }

    pub fn cycle_focus(&mut self, topmost: Option<NoteId>) {
        self.focus = match (&self.focus, topmost) {
            (Focus::Filter, _) => Focus::List,
            (Focus::List, Some(id)) => Focus::Note(id),
            (Focus::List, None) | (Focus::Note(_), _) => Focus::Filter,
        };
    }

    pub fn focused_note(&self) -> Option<&NoteId> {
        match &self.focus {
            Focus::Note(id) => Some(id),
            _ => None,
        }
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.overlay.as_ref()
    }

    pub fn open_delete_note(&mut self, id: NoteId, title: String) {
        self.overlay = Some(OverlayState::ConfirmDelete(DeleteNoteOverlay { id, title }));
    }

    pub fn close_overlay(&mut self) -> Option<OverlayState> {
        self.overlay.take()
    }

    pub fn grab(&mut self, id: NoteId) {
        self.grab = Some(id);
    }

    pub fn grabbed(&self) -> Option<&NoteId> {
        self.grab.as_ref()
    }

    pub fn release_grab(&mut self) -> Option<NoteId> {
        self.grab.take()
    }

    pub fn record_layout(&mut self, layout: DeskLayout, slots: Vec<PreviewSlot>) {
        self.layout = Some(layout);
        self.slots = slots;
    }

    pub fn layout(&self) -> Option<&DeskLayout> {
        self.layout.as_ref()
    }

    pub fn slots(&self) -> &[PreviewSlot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = DeskState::default();
        state.move_selection(-1, 3);
        assert_eq!(state.selected(), 0);
        state.move_selection(5, 3);
        assert_eq!(state.selected(), 2);
        state.clamp_selection(1);
        assert_eq!(state.selected(), 0);
        state.move_selection(1, 0);
        assert_eq!(state.selected(), 0);
    }

    #[test]
    fn scroll_into_view_follows_selection() {
        let mut state = DeskState::default();
        state.select(7, 10);
        state.scroll_into_view(3);
        assert_eq!(state.list_offset(), 5);
        state.select(2, 10);
        state.scroll_into_view(3);
        assert_eq!(state.list_offset(), 2);
        state.scroll(20, 10);
        assert_eq!(state.list_offset(), 9);
    }

    #[test]
    fn focus_cycles_through_open_note() {
        let mut state = DeskState::default();
        let id = NoteId::from("n1");
        state.cycle_focus(Some(id.clone()));
        assert_eq!(state.focus, Focus::Note(id.clone()));
        state.cycle_focus(Some(id));
        assert_eq!(state.focus, Focus::Filter);
        state.cycle_focus(None);
        assert_eq!(state.focus, Focus::List);
        state.cycle_focus(None);
        assert_eq!(state.focus, Focus::Filter);
    }
}
