use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{char_to_byte_index, App, Focus, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('g') if !app.show_api_key_input => {
                app.generate();
                return;
            }
            _ => {}
        }
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    if app.show_help {
        // Any key closes help
        app.show_help = false;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),

        KeyCode::Enter | KeyCode::Char('i') => app.start_editing(),

        KeyCode::Char('g') => app.generate(),
        KeyCode::Char('c') => app.copy_letter(),

        // Letter pane scrolls; elsewhere j/k walk the form
        KeyCode::Char('j') | KeyCode::Down => {
            if app.focus == Focus::Letter {
                app.scroll_letter_down(1);
            } else {
                app.focus_next();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.focus == Focus::Letter {
                app.scroll_letter_up(1);
            } else {
                app.focus_prev();
            }
        }

        // Half-page scroll for the letter
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_letter_down(app.letter_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_letter_up(app.letter_height / 2);
        }

        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('K') => app.open_api_key_input(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => {
            app.focus_next();
            app.start_editing();
        }
        KeyCode::BackTab => {
            app.focus_prev();
            app.start_editing();
        }
        KeyCode::Enter => {
            if app.focus.is_multiline() {
                app.insert_char('\n');
            } else {
                app.focus_next();
                app.start_editing();
            }
        }
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if !has_command_modifier(key) => app.insert_char(c),
        _ => {}
    }
}

/// Ctrl/Alt chords are commands, never text
fn has_command_modifier(key: KeyEvent) -> bool {
    key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_api_key_input(),
        KeyCode::Enter => app.save_api_key(),
        KeyCode::Backspace => {
            if app.api_key_input_cursor > 0 {
                app.api_key_input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
                app.api_key_input.remove(byte_pos);
            }
        }
        KeyCode::Char(c) if !has_command_modifier(key) => {
            let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
            app.api_key_input.insert(byte_pos, c);
            app.api_key_input_cursor += 1;
        }
        KeyCode::Left => {
            app.api_key_input_cursor = app.api_key_input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.api_key_input.chars().count();
            app.api_key_input_cursor = (app.api_key_input_cursor + 1).min(char_count);
        }
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.show_api_key_input {
        let key = text.trim();
        let byte_pos = char_to_byte_index(&app.api_key_input, app.api_key_input_cursor);
        app.api_key_input.insert_str(byte_pos, key);
        app.api_key_input_cursor += key.chars().count();
        return;
    }

    // Pasting into a field implies editing it
    if app.focus.is_input() {
        app.input_mode = InputMode::Editing;
        app.insert_str(text);
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_letter = app
        .letter_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_letter => app.scroll_letter_down(3),
        MouseEventKind::ScrollUp if in_letter => app.scroll_letter_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covergen_core::{Config, SessionEvent};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn new_app() -> (App, UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = Config {
            gemini_api_key: Some("test-key".to_string()),
            api_url: Some("http://127.0.0.1:9/generate".to_string()),
        };
        (App::new(config, tx), rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        press_with(app, code, KeyModifiers::NONE);
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        let key = KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_on_name_moves_to_next_field() {
        let (mut app, _rx) = new_app();
        type_str(&mut app, "Jane Doe");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, Focus::Skills);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.session.profile().name, "Jane Doe");
    }

    #[test]
    fn test_enter_in_multiline_inserts_newline() {
        let (mut app, _rx) = new_app();
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "Go");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "Rust");
        assert_eq!(app.session.profile().skills, "Go\nRust");
    }

    #[test]
    fn test_normal_mode_keys_do_not_type() {
        let (mut app, _rx) = new_app();
        type_str(&mut app, "Jane");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.session.profile().name, "Jane");
        assert_eq!(app.focus, Focus::Skills);
    }

    #[test]
    fn test_modified_chars_do_not_type() {
        let (mut app, _rx) = new_app();
        type_str(&mut app, "Jane");
        press_with(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        press_with(&mut app, KeyCode::Char('x'), KeyModifiers::ALT);
        press_with(&mut app, KeyCode::Char('D'), KeyModifiers::SHIFT);
        assert_eq!(app.session.profile().name, "JaneD");

        app.open_api_key_input();
        press_with(&mut app, KeyCode::Char('v'), KeyModifiers::CONTROL);
        assert_eq!(app.api_key_input, "");
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = new_app();
        press_with(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let (mut app, _rx) = new_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit, "q types a letter while editing");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_generate_with_incomplete_form_is_silent() {
        let (mut app, mut rx) = new_app();
        type_str(&mut app, "Jane Doe");
        press_with(&mut app, KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert!(!app.session.is_loading());
        assert_eq!(app.session.error_message(), "");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_generate_from_editing_mode() {
        let (mut app, _rx) = new_app();
        type_str(&mut app, "Jane Doe");
        handle_event(&mut app, AppEvent::Key(KeyEvent::from(KeyCode::BackTab))).unwrap();
        handle_event(&mut app, AppEvent::Key(KeyEvent::from(KeyCode::BackTab))).unwrap();
        assert_eq!(app.focus, Focus::JobDescription);
        handle_event(&mut app, AppEvent::Paste("Backend Engineer at Acme".to_string())).unwrap();
        press_with(&mut app, KeyCode::Char('g'), KeyModifiers::CONTROL);
        assert!(app.session.is_loading());

        // Still editable while the request is out
        type_str(&mut app, "!");
        assert_eq!(app.session.job_description(), "Backend Engineer at Acme!");
    }

    #[test]
    fn test_stale_result_keeps_focus() {
        let (mut app, _rx) = new_app();
        app.letter_scroll = 7;
        // No submit happened, so this outcome is ignored
        app.on_session_event(SessionEvent::Generated {
            request: 1,
            outcome: Ok("Dear Hiring Manager...".to_string()),
        });
        assert_eq!(app.focus, Focus::Name);
        assert_eq!(app.letter_scroll, 7);
        assert_eq!(app.session.result(), "");
    }

    #[test]
    fn test_api_key_popup_captures_keys() {
        let (mut app, _rx) = new_app();
        app.open_api_key_input();
        type_str(&mut app, "abcq");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.api_key_input, "abc");
        assert!(!app.should_quit);
        assert_eq!(app.session.profile().name, "");

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_api_key_input);
        assert_eq!(app.api_key_input, "");
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let (mut app, _rx) = new_app();
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.show_help);
    }

    #[test]
    fn test_mouse_scroll_only_over_letter() {
        let (mut app, _rx) = new_app();
        app.letter_area = Some(Rect::new(40, 1, 40, 20));
        app.total_letter_lines = 50;
        app.letter_height = 18;

        let scroll = |column| MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_event(&mut app, AppEvent::Mouse(scroll(10))).unwrap();
        assert_eq!(app.letter_scroll, 0);
        handle_event(&mut app, AppEvent::Mouse(scroll(50))).unwrap();
        assert_eq!(app.letter_scroll, 3);
    }
}
