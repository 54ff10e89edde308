use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::window::EditCommand;

/// Everything a key press can ask the desk to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    AddNote,
    CycleFocus,
    SelectNext,
    SelectPrevious,
    OpenSelected,
    DeleteSelected,
    FocusFilter,
    FocusList,
    FilterPush(char),
    FilterPop,
    FilterClear,
    Edit(EditCommand),
    CloseNote,
    MinimizeNote,
    DeleteNote,
    Confirm,
    Cancel,
}

/// What has the keyboard when a key arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    /// The delete dialog or a window's delete prompt is showing.
    Confirming,
    Filter,
    List,
    Note,
}

fn plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

pub fn map_key(key: KeyEvent, context: KeyContext) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('n') if context != KeyContext::Confirming => {
                return Some(Action::AddNote)
            }
            _ => {}
        }
    }

    match context {
        KeyContext::Confirming => match key.code {
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Char('y' | 'Y') if plain(&key) => Some(Action::Confirm),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Char('n' | 'N') if plain(&key) => Some(Action::Cancel),
            _ => None,
        },
        KeyContext::Filter => match key.code {
            KeyCode::Tab => Some(Action::CycleFocus),
            KeyCode::Esc => Some(Action::FilterClear),
            KeyCode::Enter | KeyCode::Down => Some(Action::FocusList),
            KeyCode::Backspace => Some(Action::FilterPop),
            KeyCode::Char(ch) if plain(&key) => Some(Action::FilterPush(ch)),
            _ => None,
        },
        KeyContext::List => match key.code {
            KeyCode::Tab => Some(Action::CycleFocus),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Enter => Some(Action::OpenSelected),
            KeyCode::Char('o') if plain(&key) => Some(Action::OpenSelected),
            KeyCode::Delete => Some(Action::DeleteSelected),
            KeyCode::Char('d') if plain(&key) => Some(Action::DeleteSelected),
            KeyCode::Char('a') if plain(&key) => Some(Action::AddNote),
            KeyCode::Char('/') if plain(&key) => Some(Action::FocusFilter),
            KeyCode::Char('q') if plain(&key) => Some(Action::Quit),
            _ => None,
        },
        KeyContext::Note => map_note_key(key),
    }
}

fn map_note_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('w') => Some(Action::CloseNote),
            KeyCode::Char('b') => Some(Action::MinimizeNote),
            KeyCode::Char('d') => Some(Action::DeleteNote),
            KeyCode::Left => Some(Action::Edit(EditCommand::WordLeft)),
            KeyCode::Right => Some(Action::Edit(EditCommand::WordRight)),
            _ => None,
        };
    }
    let command = match key.code {
        KeyCode::Esc => return Some(Action::FocusList),
        KeyCode::Tab => return Some(Action::CycleFocus),
        KeyCode::Enter => EditCommand::Newline,
        KeyCode::Backspace => EditCommand::Backspace,
        KeyCode::Delete => EditCommand::Delete,
        KeyCode::Left => EditCommand::Left,
        KeyCode::Right => EditCommand::Right,
        KeyCode::Up => EditCommand::Up,
        KeyCode::Down => EditCommand::Down,
        KeyCode::Home => EditCommand::Home,
        KeyCode::End => EditCommand::End,
        KeyCode::Char(ch) if plain(&key) => EditCommand::Insert(ch),
        _ => return None,
    };
    Some(Action::Edit(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn global_chords_work_everywhere_but_prompts_block_add() {
        for context in [KeyContext::Filter, KeyContext::List, KeyContext::Note] {
            assert_eq!(map_key(ctrl('q'), context), Some(Action::Quit));
            assert_eq!(map_key(ctrl('n'), context), Some(Action::AddNote));
        }
        assert_eq!(map_key(ctrl('q'), KeyContext::Confirming), Some(Action::Quit));
        assert_eq!(map_key(ctrl('n'), KeyContext::Confirming), None);
    }

    #[test]
    fn letters_mean_commands_in_the_list_and_text_elsewhere() {
        let q = key(KeyCode::Char('q'));
        assert_eq!(map_key(q, KeyContext::List), Some(Action::Quit));
        assert_eq!(map_key(q, KeyContext::Filter), Some(Action::FilterPush('q')));
        assert_eq!(
            map_key(q, KeyContext::Note),
            Some(Action::Edit(EditCommand::Insert('q')))
        );
        assert_eq!(map_key(key(KeyCode::Char('d')), KeyContext::List), Some(Action::DeleteSelected));
        assert_eq!(map_key(key(KeyCode::Char('/')), KeyContext::List), Some(Action::FocusFilter));
    }

    #[test]
    fn prompts_take_yes_and_no() {
        let ctx = KeyContext::Confirming;
        assert_eq!(map_key(key(KeyCode::Char('y')), ctx), Some(Action::Confirm));
        assert_eq!(map_key(key(KeyCode::Enter), ctx), Some(Action::Confirm));
        assert_eq!(map_key(key(KeyCode::Char('n')), ctx), Some(Action::Cancel));
        assert_eq!(map_key(key(KeyCode::Esc), ctx), Some(Action::Cancel));
        assert_eq!(map_key(key(KeyCode::Char('x')), ctx), None);
    }

    #[test]
    fn note_chords_manage_the_window() {
        let ctx = KeyContext::Note;
        assert_eq!(map_key(ctrl('w'), ctx), Some(Action::CloseNote));
        assert_eq!(map_key(ctrl('b'), ctx), Some(Action::MinimizeNote));
        assert_eq!(map_key(ctrl('d'), ctx), Some(Action::DeleteNote));
        assert_eq!(map_key(key(KeyCode::Esc), ctx), Some(Action::FocusList));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL), ctx),
            Some(Action::Edit(EditCommand::WordLeft))
        );
    }

    #[test]
    fn filter_keys_edit_and_leave() {
        let ctx = KeyContext::Filter;
        assert_eq!(map_key(key(KeyCode::Backspace), ctx), Some(Action::FilterPop));
        assert_eq!(map_key(key(KeyCode::Esc), ctx), Some(Action::FilterClear));
        assert_eq!(map_key(key(KeyCode::Down), ctx), Some(Action::FocusList));
        assert_eq!(map_key(key(KeyCode::Tab), ctx), Some(Action::CycleFocus));
    }
}
