use std::io::Stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};

use crate::config::themes::{Palette, ThemeRegistry};
use crate::config::AppConfig;
use crate::storage::NoteId;
use crate::toolbar::Toolbar;
use crate::ui::{self, ToolbarHit};
use crate::window::{Point, PressOutcome};

mod actions;
pub mod state;

use actions::{Action, KeyContext};
pub use state::{DeskState, Focus, OverlayState};

pub struct App {
    pub config: Arc<AppConfig>,
    palette: Palette,
    toolbar: Toolbar,
    state: DeskState,
    should_quit: bool,
}

impl App {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let toolbar = Toolbar::new(&config);
        let palette = ThemeRegistry::default().palette(&config.theme);
        let mut state = DeskState::default();
        state.set_status_message(Some(format!("{} note(s) loaded", toolbar.store().len())));
        Self {
            config,
            palette,
            toolbar,
            state,
            should_quit: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn state(&self) -> &DeskState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal
                .draw(|frame| self.draw(frame))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let event = event::read().context("reading terminal event")?;
            self.handle_event(event);
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        ui::draw_desk(
            frame,
            &self.toolbar,
            &mut self.state,
            &self.config,
            &self.palette,
        );
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(_, _) => {
                // next draw lays out against the new size
            }
            _ => {}
        }
        self.after_event();
    }

    fn after_event(&mut self) {
        self.toolbar.pump_events();
        if let Focus::Note(id) = &self.state.focus {
            let visible = self
                .toolbar
                .window(id)
                .map(|window| window.is_visible())
                .unwrap_or(false);
            if !visible {
                self.state.focus = Focus::List;
            }
        }
        if let Some(id) = self.state.grabbed() {
            if self.toolbar.window(id).is_none() {
                self.state.release_grab();
            }
        }
        self.state.clamp_selection(self.toolbar.previews().len());
    }

    fn key_context(&self) -> KeyContext {
        if self.state.overlay().is_some() {
            return KeyContext::Confirming;
        }
        match &self.state.focus {
            Focus::Filter => KeyContext::Filter,
            Focus::List => KeyContext::List,
            Focus::Note(id) => {
                let confirming = self
                    .toolbar
                    .window(id)
                    .map(|window| window.is_confirming_delete())
                    .unwrap_or(false);
                if confirming {
                    KeyContext::Confirming
                } else {
                    KeyContext::Note
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let Some(action) = actions::map_key(key, self.key_context()) {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        let len = self.toolbar.previews().len();
        match action {
            Action::Quit => self.quit(),
            Action::AddNote => self.add_note(),
            Action::CycleFocus => self.state.cycle_focus(self.toolbar.topmost()),
            Action::SelectNext => {
                self.state.move_selection(1, len);
                self.state.scroll_into_view(self.state.slots().len());
            }
            Action::SelectPrevious => {
                self.state.move_selection(-1, len);
                self.state.scroll_into_view(self.state.slots().len());
            }
            Action::OpenSelected => self.open_selected(),
            Action::DeleteSelected => self.request_delete_selected(),
            Action::FocusFilter => self.state.focus = Focus::Filter,
            Action::FocusList => self.state.focus = Focus::List,
            Action::FilterPush(ch) => {
                self.toolbar.push_filter_char(ch);
                self.state.select(0, self.toolbar.previews().len());
            }
            Action::FilterPop => {
                if self.toolbar.pop_filter_char() {
                    self.state.select(0, self.toolbar.previews().len());
                }
            }
            Action::FilterClear => {
                self.toolbar.clear_filter();
                self.state.select(0, self.toolbar.previews().len());
            }
            Action::Edit(command) => {
                if let Some(id) = self.state.focused_note().cloned() {
                    if let Some(window) = self.toolbar.window_mut(&id) {
                        window.edit(command);
                    }
                }
            }
            Action::CloseNote => {
                if let Some(id) = self.state.focused_note().cloned() {
                    self.toolbar.close_note(&id);
                    self.state.focus = Focus::List;
                    self.state.set_status_message(Some("Note closed"));
                }
            }
            Action::MinimizeNote => {
                if let Some(id) = self.state.focused_note().cloned() {
                    self.toolbar.minimize_note(&id);
                    self.state.focus = Focus::List;
                    self.state.set_status_message(Some("Note minimized"));
                }
            }
            Action::DeleteNote => {
                if let Some(id) = self.state.focused_note().cloned() {
                    if let Some(window) = self.toolbar.window_mut(&id) {
                        window.request_delete();
                    }
                }
            }
            Action::Confirm => self.confirm_delete(),
            Action::Cancel => self.cancel_delete(),
        }
    }

    fn quit(&mut self) {
        self.toolbar.close();
        self.should_quit = true;
    }

    fn add_note(&mut self) {
        let id = self.toolbar.add_note();
        if let Some(index) = self.preview_index(&id) {
            self.state.select(index, self.toolbar.previews().len());
        }
        self.state.focus = Focus::Note(id);
        self.state.set_status_message(Some("Created a new note"));
    }

    fn preview_index(&self, id: &NoteId) -> Option<usize> {
        self.toolbar
            .previews()
            .iter()
            .position(|preview| &preview.id == id)
    }

    fn open_selected(&mut self) {
        let Some(preview) = self.toolbar.previews().get(self.state.selected()) else {
            return;
        };
        let id = preview.id.clone();
        if self.toolbar.open_note(&id) {
            self.state.focus = Focus::Note(id);
        } else {
            self.state.set_status_message(Some("Note not found!"));
        }
    }

    fn request_delete_selected(&mut self) {
        if let Some(preview) = self.toolbar.previews().get(self.state.selected()) {
            self.state
                .open_delete_note(preview.id.clone(), preview.title.clone());
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(OverlayState::ConfirmDelete(draft)) = self.state.close_overlay() {
            if self.toolbar.delete_note(&draft.id) {
                self.state.set_status_message(Some("Note deleted"));
            } else {
                self.state.set_status_message(Some("Note not found!"));
            }
            return;
        }
        if let Some(id) = self.state.focused_note().cloned() {
            let deleted = self
                .toolbar
                .window_mut(&id)
                .map(|window| window.confirm_delete())
                .unwrap_or(false);
            if deleted {
                self.state.focus = Focus::List;
                self.state.set_status_message(Some("Note deleted"));
            }
        }
    }

    fn cancel_delete(&mut self) {
        if self.state.close_overlay().is_some() {
            self.state.set_status_message(Some("Delete canceled"));
            return;
        }
        if let Some(id) = self.state.focused_note().cloned() {
            if let Some(window) = self.toolbar.window_mut(&id) {
                window.cancel_delete();
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = Point::new(i32::from(mouse.column), i32::from(mouse.row));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_press(point, mouse.column, mouse.row)
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(id) = self.state.grabbed().cloned() {
                    if let Some(window) = self.toolbar.window_mut(&id) {
                        window.drag_to(point);
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(id) = self.state.release_grab() {
                    if let Some(window) = self.toolbar.window_mut(&id) {
                        window.release();
                    }
                }
            }
            MouseEventKind::Moved => self.handle_hover(point),
            MouseEventKind::ScrollDown => self.scroll_list(mouse.column, mouse.row, 1),
            MouseEventKind::ScrollUp => self.scroll_list(mouse.column, mouse.row, -1),
            _ => {}
        }
    }

    fn handle_press(&mut self, point: Point, column: u16, row: u16) {
        if self.state.overlay().is_some() {
            return;
        }
        if let Some(id) = self.toolbar.window_at(point) {
            self.toolbar.raise(&id);
            self.state.focus = Focus::Note(id.clone());
            let outcome = self
                .toolbar
                .window_mut(&id)
                .map(|window| window.press(point))
                .unwrap_or(PressOutcome::Outside);
            match outcome {
                PressOutcome::Resizing(_) | PressOutcome::Dragging => self.state.grab(id),
                PressOutcome::Close => {
                    self.state.focus = Focus::List;
                    self.state.set_status_message(Some("Note closed"));
                }
                PressOutcome::Minimize => {
                    self.state.focus = Focus::List;
                    self.state.set_status_message(Some("Note minimized"));
                }
                PressOutcome::ConfirmDelete => {
                    self.state.focus = Focus::List;
                    self.state.set_status_message(Some("Note deleted"));
                }
                PressOutcome::RequestDelete
                | PressOutcome::CancelDelete
                | PressOutcome::Body
                | PressOutcome::Outside => {}
            }
            return;
        }

        let Some(layout) = self.state.layout().copied() else {
            return;
        };
        let len = self.toolbar.previews().len();
        match layout.toolbar_hit(self.state.slots(), column, row) {
            Some(ToolbarHit::Close) => self.quit(),
            Some(ToolbarHit::Filter) => self.state.focus = Focus::Filter,
            Some(ToolbarHit::AddNote) => self.add_note(),
            Some(ToolbarHit::Preview(index)) => {
                self.state.select(index, len);
                self.open_selected();
            }
            Some(ToolbarHit::DeletePreview(index)) => {
                self.state.select(index, len);
                self.request_delete_selected();
            }
            Some(ToolbarHit::TitleBar | ToolbarHit::List | ToolbarHit::Frame) => {
                self.state.focus = Focus::List;
            }
            None => {}
        }
    }

    fn handle_hover(&mut self, point: Point) {
        let top = self.toolbar.window_at(point);
        let ids: Vec<NoteId> = self
            .toolbar
            .windows()
            .map(|window| window.id().clone())
            .collect();
        for id in ids {
            if let Some(window) = self.toolbar.window_mut(&id) {
                if top.as_ref() == Some(&id) {
                    window.hover(point);
                } else {
                    window.leave();
                }
            }
        }
    }

    fn scroll_list(&mut self, column: u16, row: u16, delta: isize) {
        let over_list = self
            .state
            .layout()
            .map(|layout| {
                matches!(
                    layout.toolbar_hit(self.state.slots(), column, row),
                    Some(ToolbarHit::List | ToolbarHit::Preview(_) | ToolbarHit::DeletePreview(_))
                )
            })
            .unwrap_or(false);
        if over_list {
            self.state.scroll(delta, self.toolbar.previews().len());
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    Ok(())
}
