use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane};
use crate::tui::AppEvent;
use crate::ui;

const SCROLL_STEP: u16 = 3;
const PAGE_STEP: u16 = 10;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('t') => {
                app.toggle_theme();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => {
            app.toggle_focus();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_answer_down(PAGE_STEP);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_answer_up(PAGE_STEP);
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Input => handle_input_key(app, key),
        FocusPane::History => handle_history_key(app, key),
    }
}

/// Editing keys for the question box. Enter submits.
fn handle_input_key(app: &mut App, key: KeyEvent) {
    let char_count = app.session.input().chars().count();
    app.input_cursor = app.input_cursor.min(char_count);

    match key.code {
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Esc => app.focus_history(),
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(app.session.input(), app.input_cursor);
                app.session.input_mut().remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(app.session.input(), app.input_cursor);
                app.session.input_mut().remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = char_count;
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(app.session.input(), app.input_cursor);
            app.session.input_mut().insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.history_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.history_nav_up(),
        KeyCode::Enter => app.recall_selected_history(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_history(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('i') | KeyCode::Esc => app.focus_input(),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_history = app.history_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_answer = app.answer_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_ask = app.ask_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_history {
                app.history_nav_down();
            } else if in_answer {
                app.scroll_answer_down(SCROLL_STEP);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_history {
                app.history_nav_up();
            } else if in_answer {
                app.scroll_answer_up(SCROLL_STEP);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if in_ask {
                app.submit();
            } else if let Some(area) = app.history_area.filter(|_| in_history) {
                if let Some(index) = history_row_at(app, area, y) {
                    if on_delete_glyph(app, area, index, x) {
                        app.delete_history(index);
                    } else {
                        app.focus = FocusPane::History;
                        app.recall_history(index);
                    }
                }
            }
        }
        _ => {}
    }
}

/// History entry under screen row `y`. Rows start below the top border,
/// one entry per row, and stop above the bottom border.
fn history_row_at(app: &App, area: Rect, y: u16) -> Option<usize> {
    if y <= area.y {
        return None;
    }
    let row = (y - area.y - 1) as usize;
    if row >= area.height.saturating_sub(2) as usize {
        return None;
    }
    let index = app.history_state.offset() + row;
    (index < app.session.history().len()).then_some(index)
}

/// The glyph is only drawn on the selected row while the panel has focus.
fn on_delete_glyph(app: &App, area: Rect, index: usize, x: u16) -> bool {
    if app.focus != FocusPane::History || app.history_state.selected() != Some(index) {
        return false;
    }
    let question = &app.session.history()[index].question;
    x == area.x + 1 + ui::delete_glyph_offset(question)
}
