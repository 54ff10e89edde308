use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap};
use ratatui::Frame;
use regex::Regex;
use time::{macros::format_description, OffsetDateTime};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::state::{DeskState, Focus, OverlayState};
use crate::config::themes::Palette;
use crate::config::AppConfig;
use crate::highlight::{build_filter_regex, split_matches};
use crate::storage::{Geometry, SaveStatus};
use crate::toolbar::{Preview, Toolbar};
use crate::window::chrome::{
    CLOSE_LABEL, CONFIRM_NO_LABEL, CONFIRM_PROMPT, CONFIRM_YES_LABEL, DELETE_LABEL, MINIMIZE_LABEL,
};
use crate::window::NoteWindow;

pub const STATUS_HEIGHT: u16 = 2;
pub const ADD_NOTE_LABEL: &str = "[ Add New Note ]";
pub const PREVIEW_DELETE_LABEL: &str = "[Delete]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarLayout {
    pub frame: Rect,
    pub title_bar: Rect,
    pub close_button: Rect,
    pub filter: Rect,
    pub add_button: Rect,
    pub list: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskLayout {
    pub desk: Rect,
    pub toolbar: ToolbarLayout,
    pub status: Rect,
}

/// Screen area of one rendered preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSlot {
    pub index: usize,
    pub area: Rect,
    pub delete_button: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarHit {
    Close,
    TitleBar,
    Filter,
    AddNote,
    Preview(usize),
    DeletePreview(usize),
    List,
    Frame,
}

pub fn desk_layout(area: Rect, toolbar_width: u16) -> DeskLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATUS_HEIGHT)])
        .split(area);
    let width = toolbar_width.min(rows[0].width);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(width)])
        .split(rows[0]);
    DeskLayout {
        desk: columns[0],
        toolbar: toolbar_layout(columns[1]),
        status: rows[1],
    }
}

pub fn toolbar_layout(area: Rect) -> ToolbarLayout {
    let inner = Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    let title_bar = band(inner, 0, 1);
    let close_width = label_width(CLOSE_LABEL).min(title_bar.width);
    let close_button = Rect::new(
        title_bar.right() - close_width,
        title_bar.y,
        close_width,
        title_bar.height,
    );
    ToolbarLayout {
        frame: area,
        title_bar,
        close_button,
        filter: band(inner, 1, 3),
        add_button: band(inner, 4, 1),
        list: band(inner, 5, inner.height.saturating_sub(5)),
    }
}

fn band(inner: Rect, top: u16, height: u16) -> Rect {
    let y = inner.y.saturating_add(top).min(inner.bottom());
    Rect::new(inner.x, y, inner.width, height.min(inner.bottom() - y))
}

/// Rows taken by each visible preview, starting at `offset`. A blank row
/// separates consecutive previews.
pub fn preview_slots(
    list: Rect,
    previews: &[Preview],
    offset: usize,
    preview_lines: usize,
) -> Vec<PreviewSlot> {
    let mut slots = Vec::new();
    let mut y = list.y;
    let delete_width = label_width(PREVIEW_DELETE_LABEL).min(list.width);
    for (index, preview) in previews.iter().enumerate().skip(offset) {
        if y >= list.bottom() {
            break;
        }
        let lines = preview.title.lines().count().clamp(1, preview_lines.max(1)) as u16;
        let height = lines.min(list.bottom() - y);
        let area = Rect::new(list.x, y, list.width, height);
        let delete_button = Rect::new(area.right() - delete_width, y, delete_width, 1);
        slots.push(PreviewSlot {
            index,
            area,
            delete_button,
        });
        y = y.saturating_add(height + 1);
    }
    slots
}

impl DeskLayout {
    pub fn toolbar_hit(&self, slots: &[PreviewSlot], x: u16, y: u16) -> Option<ToolbarHit> {
        let toolbar = &self.toolbar;
        if !rect_contains(toolbar.frame, x, y) {
            return None;
        }
        let hit = if rect_contains(toolbar.close_button, x, y) {
            ToolbarHit::Close
        } else if rect_contains(toolbar.title_bar, x, y) {
            ToolbarHit::TitleBar
        } else if rect_contains(toolbar.filter, x, y) {
            ToolbarHit::Filter
        } else if rect_contains(toolbar.add_button, x, y) {
            ToolbarHit::AddNote
        } else if let Some(slot) = slots.iter().find(|slot| rect_contains(slot.area, x, y)) {
            if rect_contains(slot.delete_button, x, y) {
                ToolbarHit::DeletePreview(slot.index)
            } else {
                ToolbarHit::Preview(slot.index)
            }
        } else if rect_contains(toolbar.list, x, y) {
            ToolbarHit::List
        } else {
            ToolbarHit::Frame
        };
        Some(hit)
    }
}

fn rect_contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom()
}

fn label_width(label: &str) -> u16 {
    UnicodeWidthStr::width(label) as u16
}

pub fn draw_desk(
    frame: &mut Frame,
    toolbar: &Toolbar,
    state: &mut DeskState,
    config: &AppConfig,
    palette: &Palette,
) {
    let layout = desk_layout(frame.size(), config.toolbar.width);
    state.clamp_selection(toolbar.previews().len());
    let slots = preview_slots(
        layout.toolbar.list,
        toolbar.previews(),
        state.list_offset(),
        config.preview_lines(),
    );

    if toolbar.windows().next().is_none() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Ctrl-n or \"Add New Note\" creates a sticky note",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center);
        let hint_area = Rect::new(
            layout.desk.x,
            layout.desk.y + layout.desk.height / 2,
            layout.desk.width,
            1.min(layout.desk.height),
        );
        frame.render_widget(hint, hint_area);
    }

    draw_toolbar(frame, &layout.toolbar, &slots, toolbar, state, config, palette);

    let focused = state.focused_note().cloned();
    for window in toolbar.windows().filter(|window| window.is_visible()) {
        let is_focused = focused.as_ref() == Some(window.id());
        draw_window(frame, window, palette, is_focused);
    }

    frame.render_widget(
        Paragraph::new(build_status_line(toolbar, state)),
        layout.status,
    );
    render_overlay(frame, state);
    state.record_layout(layout, slots);
}

fn draw_toolbar(
    frame: &mut Frame,
    layout: &ToolbarLayout,
    slots: &[PreviewSlot],
    toolbar: &Toolbar,
    state: &DeskState,
    config: &AppConfig,
    palette: &Palette,
) {
    let list_focused = matches!(state.focus, Focus::List);
    let filter_focused = matches!(state.focus, Focus::Filter);
    let frame_style = if list_focused || filter_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(palette.border)
    };
    frame.render_widget(
        Block::default().borders(Borders::ALL).border_style(frame_style),
        layout.frame,
    );

    let title_style = Style::default()
        .bg(palette.title_bar)
        .fg(palette.text)
        .add_modifier(Modifier::BOLD);
    frame.render_widget(
        Paragraph::new(format!(" {}", config.toolbar.title)).style(title_style),
        layout.title_bar,
    );
    frame.render_widget(
        Paragraph::new(CLOSE_LABEL).style(title_style.fg(palette.accent)),
        layout.close_button,
    );

    let filter_line = if toolbar.filter().is_empty() && !filter_focused {
        Line::from(Span::styled(
            "Type / to filter…",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut text = toolbar.filter().to_string();
        if filter_focused {
            text.push('▌');
        }
        Line::from(text)
    };
    let filter_border = if filter_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(
        Paragraph::new(filter_line).block(
            Block::default()
                .title("Filter")
                .borders(Borders::ALL)
                .border_style(filter_border),
        ),
        layout.filter,
    );

    frame.render_widget(
        Paragraph::new(Span::styled(
            ADD_NOTE_LABEL,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        layout.add_button,
    );

    let previews = toolbar.previews();
    if previews.is_empty() {
        let message = if toolbar.store().is_empty() {
            "No notes yet. Press 'a' to add one."
        } else {
            "No notes match the filter."
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true }),
            layout.list,
        );
        return;
    }

    let regex = build_filter_regex(toolbar.filter());
    for slot in slots {
        let Some(preview) = previews.get(slot.index) else {
            continue;
        };
        let selected = slot.index == state.selected();
        let base = if selected {
            Style::default().bg(palette.body).fg(palette.text)
        } else {
            Style::default()
        };
        let highlight = base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let lines: Vec<Line> = preview
            .title
            .lines()
            .take(usize::from(slot.area.height))
            .map(|line| Line::from(highlight_line(line, regex.as_ref(), highlight, base)))
            .collect();
        frame.render_widget(Paragraph::new(lines).style(base), slot.area);
        frame.render_widget(
            Paragraph::new(PREVIEW_DELETE_LABEL).style(base.fg(palette.accent)),
            slot.delete_button,
        );
    }
}

fn draw_window(frame: &mut Frame, window: &NoteWindow, palette: &Palette, focused: bool) {
    let geometry = window.geometry();
    if geometry.width <= 0 || geometry.height <= 0 {
        return;
    }
    let local = Rect::new(
        0,
        0,
        clamp_u16(geometry.width),
        clamp_u16(geometry.height),
    );
    let mut buffer = Buffer::empty(local);
    render_window(&mut buffer, window, palette, focused);
    blit(&buffer, geometry.x, geometry.y, frame.buffer_mut());
}

/// Copies `src` onto `dst` with its top-left cell at (`x`, `y`), dropping
/// cells that fall outside `dst`.
pub(crate) fn blit(src: &Buffer, x: i32, y: i32, dst: &mut Buffer) {
    let bounds = dst.area;
    for ly in 0..src.area.height {
        for lx in 0..src.area.width {
            let dx = x + i32::from(lx);
            let dy = y + i32::from(ly);
            if dx < i32::from(bounds.x)
                || dy < i32::from(bounds.y)
                || dx >= i32::from(bounds.right())
                || dy >= i32::from(bounds.bottom())
            {
                continue;
            }
            *dst.get_mut(dx as u16, dy as u16) = src.get(lx, ly).clone();
        }
    }
}

fn render_window(buf: &mut Buffer, window: &NoteWindow, palette: &Palette, focused: bool) {
    let area = buf.area;
    let body_style = Style::default().bg(palette.body).fg(palette.text);
    let border_type = if focused {
        BorderType::Thick
    } else {
        BorderType::Plain
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(palette.border).bg(palette.body))
        .style(body_style)
        .render(area, buf);

    let chrome = window.chrome();
    let title_style = Style::default()
        .bg(palette.title_bar)
        .fg(palette.text)
        .add_modifier(Modifier::BOLD);
    let title_bar = local_rect(chrome.title_bar);
    buf.set_style(title_bar, title_style);
    let label_room = (chrome.minimize_button.x - chrome.title_bar.x - 2).max(0) as usize;
    put(buf, chrome.title_bar.x + 1, chrome.title_bar.y, window.label(), label_room, title_style);
    put_label(buf, chrome.minimize_button, MINIMIZE_LABEL, title_style);
    put_label(buf, chrome.close_button, CLOSE_LABEL, title_style.fg(palette.accent));

    let body = local_rect(chrome.body);
    if body.width > 0 && body.height > 0 {
        let width = usize::from(body.width);
        let lines = wrap_text(window.editor().buffer(), width);
        let (row, col) = window.editor().cursor_position(width);
        let scroll = row.saturating_sub(usize::from(body.height) - 1);
        for (offset, line) in lines
            .iter()
            .skip(scroll)
            .take(usize::from(body.height))
            .enumerate()
        {
            buf.set_stringn(body.x, body.y + offset as u16, line, width, body_style);
        }
        if focused && col < width {
            let cursor_x = body.x + col as u16;
            let cursor_y = body.y + (row - scroll) as u16;
            buf.get_mut(cursor_x, cursor_y)
                .set_style(Style::default().add_modifier(Modifier::REVERSED));
        }
    }

    let accent = body_style.fg(palette.accent).add_modifier(Modifier::BOLD);
    if window.is_confirming_delete() {
        put(
            buf,
            chrome.footer.x,
            chrome.footer.y,
            CONFIRM_PROMPT,
            CONFIRM_PROMPT.len(),
            body_style.add_modifier(Modifier::BOLD),
        );
        put_label(buf, chrome.confirm_yes, CONFIRM_YES_LABEL, accent);
        put_label(buf, chrome.confirm_no, CONFIRM_NO_LABEL, accent);
    } else {
        put_label(buf, chrome.delete_button, DELETE_LABEL, accent);
    }

    if let (Some(point), Some(glyph)) = (window.hover_point(), window.cursor_shape().glyph()) {
        let geometry = window.geometry();
        let mut scratch = [0u8; 4];
        put(
            buf,
            point.x - geometry.x,
            point.y - geometry.y,
            glyph.encode_utf8(&mut scratch),
            1,
            Style::default().fg(palette.accent).bg(palette.body),
        );
    }
}

fn put_label(buf: &mut Buffer, at: Geometry, label: &str, style: Style) {
    put(buf, at.x, at.y, label, at.width.max(0) as usize, style);
}

fn put(buf: &mut Buffer, x: i32, y: i32, text: &str, max_width: usize, style: Style) {
    let area = buf.area;
    if x < i32::from(area.x)
        || y < i32::from(area.y)
        || x >= i32::from(area.right())
        || y >= i32::from(area.bottom())
    {
        return;
    }
    let room = (i32::from(area.right()) - x) as usize;
    buf.set_stringn(x as u16, y as u16, text, max_width.min(room), style);
}

fn local_rect(geometry: Geometry) -> Rect {
    Rect::new(
        clamp_u16(geometry.x),
        clamp_u16(geometry.y),
        clamp_u16(geometry.width),
        clamp_u16(geometry.height),
    )
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

/// Hard-wraps `text` at `width` cells the same way the editor places its
/// cursor.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = vec![String::new()];
    let mut col = 0;
    for grapheme in text.graphemes(true) {
        if grapheme == "\n" {
            lines.push(String::new());
            col = 0;
            continue;
        }
        let glyph_width = UnicodeWidthStr::width(grapheme);
        if glyph_width > 0 && col + glyph_width > width {
            lines.push(String::new());
            col = 0;
        }
        if let Some(line) = lines.last_mut() {
            line.push_str(grapheme);
        }
        col += glyph_width;
    }
    lines
}

fn build_status_line(toolbar: &Toolbar, state: &DeskState) -> Text<'static> {
    let mut spans = vec![Span::styled(
        format!("Focus: {}", state.focus.label()),
        Style::default().fg(Color::Cyan),
    )];
    if !toolbar.filter().is_empty() {
        spans.push(Span::raw(" • "));
        spans.push(Span::raw(format!("Filter: {}", toolbar.filter())));
    }
    spans.push(Span::raw(" • "));
    spans.push(match toolbar.store().save_status() {
        SaveStatus::Never => Span::styled("Not saved yet", Style::default().fg(Color::Gray)),
        SaveStatus::Saved { at, count } => Span::styled(
            format!("Saved {count} note(s) at {}", format_time_short(*at)),
            Style::default().fg(Color::Green),
        ),
        SaveStatus::Failed { at, .. } => Span::styled(
            format!("Save failed at {}", format_time_short(*at)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    });
    if let Some(message) = state.status_message() {
        spans.push(Span::raw(" • "));
        spans.push(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }

    let hints = match (&state.focus, state.overlay()) {
        (_, Some(_)) => "Enter/y delete • Esc/n cancel",
        (Focus::Filter, _) => "Type to filter • Esc clear • Enter list • Tab focus • Ctrl-q quit",
        (Focus::List, _) => {
            "j/k move • Enter open • a add • d delete • / filter • Tab focus • q quit"
        }
        (Focus::Note(_), _) => {
            "Esc list • Ctrl-w close • Ctrl-b minimize • Ctrl-d delete • Ctrl-q quit"
        }
    };
    Text::from(vec![
        Line::from(spans),
        Line::from(Span::styled(hints, Style::default().fg(Color::Gray))),
    ])
}

fn format_time_short(dt: OffsetDateTime) -> String {
    dt.format(&format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}

fn highlight_line(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    split_matches(text, regex)
        .into_iter()
        .map(|(segment, matched)| {
            let style = if matched { highlight_style } else { base_style };
            Span::styled(segment.to_string(), style)
        })
        .collect()
}

fn render_overlay(frame: &mut Frame, state: &DeskState) {
    let Some(OverlayState::ConfirmDelete(draft)) = state.overlay() else {
        return;
    };
    let area = centered_rect(50, 30, frame.size());
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            "Delete note?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(draft.title.lines().next().unwrap_or_default().to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/y to delete • Esc/n to cancel",
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(
        Block::default()
            .title("Delete Note")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
