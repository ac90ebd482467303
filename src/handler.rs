use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Focus, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.poll_tasks().await;
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_mode_picker {
        handle_mode_picker(app, key);
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.focus_prev();
            return;
        }
        _ => {}
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_mode_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_mode_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.mode_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.mode_picker_nav_up(),
        KeyCode::Enter => app.select_mode_from_picker(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back into the query box from anywhere
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus = Focus::Query;
            app.input_mode = InputMode::Editing;
            app.form.cursor = app.form.input.chars().count();
        }

        KeyCode::Char('m') => app.open_mode_picker(),
        KeyCode::Char('r') => app.check_health(),

        KeyCode::Enter => match app.focus {
            Focus::Mode => app.open_mode_picker(),
            _ => {
                app.submit_query();
            }
        },

        KeyCode::Left | KeyCode::Char('h') if app.focus == Focus::Mode => app.prev_mode(),
        KeyCode::Right | KeyCode::Char('l') if app.focus == Focus::Mode => app.next_mode(),

        // Half-page scroll (must be before plain 'd'/'u' to match first)
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.focus {
        Focus::Query => handle_query_editing(app, key),
        Focus::Attachment => handle_attachment_editing(app, key),
        Focus::Mode | Focus::Answer => app.input_mode = InputMode::Normal,
    }
}

fn handle_query_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            // Ignored while a request is in flight or the text is blank
            app.submit_query();
        }
        _ => edit_line(&mut app.form.input, &mut app.form.cursor, key),
    }
}

fn handle_attachment_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_attachment();
        }
        _ => edit_line(&mut app.attachment_input, &mut app.attachment_cursor, key),
    }
}

/// Single-line editing shared by the query and attachment fields.
fn edit_line(text: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = text.chars().count();
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = text.chars().count();
            *cursor = (*cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = text.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(text, *cursor);
            text.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_answer = app
        .answer_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_answer {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            for _ in 0..3 {
                app.scroll_down();
            }
        }
        MouseEventKind::ScrollUp => {
            for _ in 0..3 {
                app.scroll_up();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use ragask::Config;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "día";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3);
        assert_eq!(char_to_byte_index(s, 9), s.len());
    }

    #[test]
    fn test_typing_and_cursor_edits() {
        let mut app = App::new(&Config::new());
        type_text(&mut app, "tort");
        handle_key(&mut app, press(KeyCode::Home));
        type_text(&mut app, "é ");
        handle_key(&mut app, press(KeyCode::End));
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.form.input, "é tor");
        assert_eq!(app.form.cursor, 5);
    }

    #[test]
    fn test_q_types_while_editing_and_quits_in_normal() {
        let mut app = App::new(&Config::new());
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.form.input, "q");

        handle_key(&mut app, press(KeyCode::Esc));
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = App::new(&Config::new());
        let mut key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        key.kind = KeyEventKind::Press;
        handle_key(&mut app, key);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_enter_on_blank_query_does_not_submit() {
        let mut app = App::new(&Config::new());
        type_text(&mut app, "   ");
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.query_task.is_none());
        assert!(!app.form.is_pending());
    }

    #[test]
    fn test_mode_picker_keys() {
        let mut app = App::new(&Config::new());
        handle_key(&mut app, press(KeyCode::Esc));
        handle_key(&mut app, press(KeyCode::Char('m')));
        assert!(app.show_mode_picker);
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(!app.show_mode_picker);
    }
}
