pub mod chrome;
pub mod content;
pub mod editor;
pub mod geometry;

use crossbeam_channel::Sender;

use crate::config::AppConfig;
use crate::storage::{Geometry, NoteId, NoteRecord};

use self::chrome::{Chrome, ChromeHit};
use self::editor::EditorState;
pub use self::geometry::{hit_test, resize, CursorShape, Edges, Interaction, Point, Size};

/// Messages a note window sends to the toolbar that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    Updated { id: NoteId, record: NoteRecord },
    Deleted { id: NoteId },
}

/// Per-window limits taken from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    pub resize_margin: i32,
    pub min_size: Size,
    pub preview_lines: usize,
}

impl From<&AppConfig> for WindowSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            resize_margin: config.window.resize_margin,
            min_size: Size::new(config.window.min_width, config.window.min_height),
            preview_lines: config.preview_lines(),
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Text editing commands a window understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    WordLeft,
    WordRight,
}

impl EditCommand {
    fn mutates(self) -> bool {
        matches!(
            self,
            EditCommand::Insert(_)
                | EditCommand::Newline
                | EditCommand::Backspace
                | EditCommand::Delete
        )
    }
}

/// What a mouse press on a window did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Resizing(Edges),
    Dragging,
    Close,
    Minimize,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    Body,
    Outside,
}

/// A floating editor bound to one note record.
#[derive(Debug)]
pub struct NoteWindow {
    record: NoteRecord,
    editor: EditorState,
    label: String,
    geometry: Geometry,
    settings: WindowSettings,
    interaction: Interaction,
    cursor_shape: CursorShape,
    hover: Option<Point>,
    visible: bool,
    confirming_delete: bool,
    closed: bool,
    events: Sender<NoteEvent>,
}

impl NoteWindow {
    pub fn open(record: NoteRecord, settings: WindowSettings, events: Sender<NoteEvent>) -> Self {
        let editor = EditorState::new(content::to_plain_text(&record.content));
        let label = content::chrome_label(&record.display_title()).to_string();
        let geometry = Geometry {
            width: record.geometry.width.max(settings.min_size.width),
            height: record.geometry.height.max(settings.min_size.height),
            ..record.geometry
        };
        tracing::debug!(id = %record.id, ?geometry, "opened note window");
        Self {
            record,
            editor,
            label,
            geometry,
            settings,
            interaction: Interaction::Idle,
            cursor_shape: CursorShape::Default,
            hover: None,
            visible: true,
            confirming_delete: false,
            closed: false,
            events,
        }
    }

    pub fn id(&self) -> &NoteId {
        &self.record.id
    }

    pub fn record(&self) -> &NoteRecord {
        &self.record
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn chrome(&self) -> Chrome {
        Chrome::for_size(self.geometry.width, self.geometry.height)
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn cursor_shape(&self) -> CursorShape {
        self.cursor_shape
    }

    pub fn hover_point(&self) -> Option<Point> {
        self.hover
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.closed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirming_delete
    }

    pub fn contains(&self, point: Point) -> bool {
        self.is_visible() && self.geometry.contains(point.x, point.y)
    }

    /// Runs an editing command. Returns whether the buffer or cursor changed;
    /// content changes are pushed to the toolbar.
    pub fn edit(&mut self, command: EditCommand) -> bool {
        if self.closed {
            return false;
        }
        let editor = &mut self.editor;
        let changed = match command {
            EditCommand::Insert(ch) => editor.insert_char(ch),
            EditCommand::Newline => editor.insert_newline(),
            EditCommand::Backspace => editor.backspace(),
            EditCommand::Delete => editor.delete(),
            EditCommand::Left => editor.move_left(),
            EditCommand::Right => editor.move_right(),
            EditCommand::Up => editor.move_up(),
            EditCommand::Down => editor.move_down(),
            EditCommand::Home => editor.move_home(),
            EditCommand::End => editor.move_end(),
            EditCommand::WordLeft => editor.move_word_left(),
            EditCommand::WordRight => editor.move_word_right(),
        };
        if changed && command.mutates() {
            self.content_changed();
        }
        changed
    }

    fn content_changed(&mut self) {
        self.record.content = self.editor.buffer().to_string();
        self.record.title = content::derive_title(
            &self.record.content,
            self.settings.preview_lines,
            &self.record.id,
        );
        self.label = content::chrome_label(&self.record.title).to_string();
        self.record.geometry = self.geometry;
        self.notify(NoteEvent::Updated {
            id: self.record.id.clone(),
            record: self.record.clone(),
        });
    }

    /// Handles a left press at a desk position.
    pub fn press(&mut self, point: Point) -> PressOutcome {
        if !self.contains(point) {
            return PressOutcome::Outside;
        }
        let edges = self.grip_at(point);
        if !edges.is_empty() {
            self.interaction = Interaction::Resizing {
                edges,
                start: point,
                origin: self.geometry,
            };
            self.cursor_shape = edges.cursor_shape();
            return PressOutcome::Resizing(edges);
        }

        let local = point - Point::new(self.geometry.x, self.geometry.y);
        match self.chrome().hit(local.x, local.y, self.confirming_delete) {
            Some(ChromeHit::TitleBar) => {
                self.interaction = Interaction::Dragging { anchor: point };
                PressOutcome::Dragging
            }
            Some(ChromeHit::Close) => {
                self.close();
                PressOutcome::Close
            }
            Some(ChromeHit::Minimize) => {
                self.minimize();
                PressOutcome::Minimize
            }
            Some(ChromeHit::Delete) => {
                self.request_delete();
                PressOutcome::RequestDelete
            }
            Some(ChromeHit::ConfirmYes) => {
                self.confirm_delete();
                PressOutcome::ConfirmDelete
            }
            Some(ChromeHit::ConfirmNo) => {
                self.cancel_delete();
                PressOutcome::CancelDelete
            }
            Some(ChromeHit::Body | ChromeHit::Footer) | None => PressOutcome::Body,
        }
    }

    /// Resize edges under `point`. Title bar and footer controls win over
    /// the grip, so a margin wider than the border never hides them.
    fn grip_at(&self, point: Point) -> Edges {
        let local = point - Point::new(self.geometry.x, self.geometry.y);
        match self.chrome().hit(local.x, local.y, self.confirming_delete) {
            Some(ChromeHit::Body | ChromeHit::Footer) | None => {
                hit_test(point, self.geometry, self.settings.resize_margin)
            }
            Some(_) => Edges::empty(),
        }
    }

    /// Pointer moved with the button held. Returns whether the window moved
    /// or changed size.
    pub fn drag_to(&mut self, point: Point) -> bool {
        match self
            .interaction
            .track(point, self.geometry, self.settings.min_size)
        {
            Some(next) => {
                self.geometry = next;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self) {
        if !self.interaction.is_idle() {
            tracing::trace!(id = %self.record.id, geometry = ?self.geometry, "interaction finished");
        }
        self.interaction = Interaction::Idle;
        self.cursor_shape = CursorShape::Default;
    }

    /// Pointer moved without a button. Updates the resize cursor while idle.
    pub fn hover(&mut self, point: Point) {
        if !self.interaction.is_idle() {
            return;
        }
        if !self.contains(point) {
            self.leave();
            return;
        }
        let edges = self.grip_at(point);
        self.cursor_shape = edges.cursor_shape();
        self.hover = (!edges.is_empty()).then_some(point);
    }

    pub fn leave(&mut self) {
        if self.interaction.is_resizing() {
            return;
        }
        self.cursor_shape = CursorShape::Default;
        self.hover = None;
    }

    pub fn request_delete(&mut self) {
        self.confirming_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = false;
    }

    /// Emits the delete event and closes without a final update. Does nothing
    /// unless a confirmation is pending.
    pub fn confirm_delete(&mut self) -> bool {
        if !self.confirming_delete || self.closed {
            return false;
        }
        self.confirming_delete = false;
        tracing::info!(id = %self.record.id, "note deleted from its window");
        self.notify(NoteEvent::Deleted {
            id: self.record.id.clone(),
        });
        self.dismiss();
        true
    }

    /// Snapshots geometry into the record, tells the toolbar, then hides.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.record.geometry = self.geometry;
        self.notify(NoteEvent::Updated {
            id: self.record.id.clone(),
            record: self.record.clone(),
        });
        self.dismiss();
    }

    /// Closes without telling anyone; used when the note is already gone.
    pub fn dismiss(&mut self) {
        self.closed = true;
        self.visible = false;
        self.confirming_delete = false;
        self.interaction = Interaction::Idle;
        self.cursor_shape = CursorShape::Default;
        self.hover = None;
    }

    pub fn minimize(&mut self) {
        self.visible = false;
        self.interaction = Interaction::Idle;
        self.cursor_shape = CursorShape::Default;
        self.hover = None;
    }

    pub fn restore(&mut self) {
        if !self.closed {
            self.visible = true;
        }
    }

    fn notify(&self, event: NoteEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!(id = %self.record.id, "toolbar is gone, dropping note event");
        }
    }
}
