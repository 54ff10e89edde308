use crate::storage::Geometry;

pub const MINIMIZE_LABEL: &str = "[_]";
pub const CLOSE_LABEL: &str = "[X]";
pub const DELETE_LABEL: &str = "[Delete Note]";
pub const CONFIRM_PROMPT: &str = "Delete note? ";
pub const CONFIRM_YES_LABEL: &str = "[Yes]";
pub const CONFIRM_NO_LABEL: &str = "[No]";

/// Window-relative layout of a note window's decorations.
///
/// Row 0, row `h-1`, column 0 and column `w-1` are the border (and resize
/// grips). Row 1 is the title bar and row `h-2` the footer; the editor body
/// sits between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub title_bar: Geometry,
    pub minimize_button: Geometry,
    pub close_button: Geometry,
    pub body: Geometry,
    pub footer: Geometry,
    pub delete_button: Geometry,
    pub confirm_yes: Geometry,
    pub confirm_no: Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeHit {
    TitleBar,
    Minimize,
    Close,
    Body,
    Delete,
    ConfirmYes,
    ConfirmNo,
    Footer,
}

impl Chrome {
    pub fn for_size(width: i32, height: i32) -> Self {
        let inner_width = (width - 2).max(0);
        let title_bar = Geometry::new(1, 1, inner_width, 1);
        let close_x = width - 1 - label_width(CLOSE_LABEL);
        let close_button = Geometry::new(close_x, 1, label_width(CLOSE_LABEL), 1);
        let minimize_x = close_x - label_width(MINIMIZE_LABEL);
        let minimize_button = Geometry::new(minimize_x, 1, label_width(MINIMIZE_LABEL), 1);

        let footer_y = (height - 2).max(2);
        let body = Geometry::new(1, 2, inner_width, (footer_y - 2).max(0));
        let footer = Geometry::new(1, footer_y, inner_width, 1);
        let delete_x = width - 1 - label_width(DELETE_LABEL);
        let delete_button = Geometry::new(delete_x.max(1), footer_y, label_width(DELETE_LABEL), 1);

        let yes_x = 1 + label_width(CONFIRM_PROMPT);
        let confirm_yes = Geometry::new(yes_x, footer_y, label_width(CONFIRM_YES_LABEL), 1);
        let no_x = yes_x + label_width(CONFIRM_YES_LABEL) + 1;
        let confirm_no = Geometry::new(no_x, footer_y, label_width(CONFIRM_NO_LABEL), 1);

        Self {
            title_bar,
            minimize_button,
            close_button,
            body,
            footer,
            delete_button,
            confirm_yes,
            confirm_no,
        }
    }

    /// What sits under a window-relative point. Border cells are not part of
    /// the chrome and yield `None`.
    pub fn hit(&self, x: i32, y: i32, confirming: bool) -> Option<ChromeHit> {
        if self.close_button.contains(x, y) {
            return Some(ChromeHit::Close);
        }
        if self.minimize_button.contains(x, y) {
            return Some(ChromeHit::Minimize);
        }
        if self.title_bar.contains(x, y) {
            return Some(ChromeHit::TitleBar);
        }
        if self.footer.contains(x, y) {
            let hit = if confirming {
                if self.confirm_yes.contains(x, y) {
                    ChromeHit::ConfirmYes
                } else if self.confirm_no.contains(x, y) {
                    ChromeHit::ConfirmNo
                } else {
                    ChromeHit::Footer
                }
            } else if self.delete_button.contains(x, y) {
                ChromeHit::Delete
            } else {
                ChromeHit::Footer
            };
            return Some(hit);
        }
        if self.body.contains(x, y) {
            return Some(ChromeHit::Body);
        }
        None
    }
}

fn label_width(label: &str) -> i32 {
    label.chars().count() as i32
}
