use std::path::PathBuf;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use covergen_core::{
    Config, GeminiClient, Notice, ProfileField, Session, SessionEvent, Submit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Which pane has focus, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Skills,
    Experience,
    JobDescription,
    Letter,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Name,
        Focus::Skills,
        Focus::Experience,
        Focus::JobDescription,
        Focus::Letter,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn is_input(self) -> bool {
        self != Focus::Letter
    }

    /// The name field is the only single-line input
    pub fn is_multiline(self) -> bool {
        matches!(self, Focus::Skills | Focus::Experience | Focus::JobDescription)
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Name => ProfileField::Name.label(),
            Focus::Skills => ProfileField::Skills.label(),
            Focus::Experience => ProfileField::Experience.label(),
            Focus::JobDescription => "Job Description",
            Focus::Letter => "Your Generated Cover Letter",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Focus::Name => ProfileField::Name.placeholder(),
            Focus::Skills => ProfileField::Skills.placeholder(),
            Focus::Experience => ProfileField::Experience.placeholder(),
            Focus::JobDescription => "Paste the job description here...",
            Focus::Letter => "Your cover letter will appear here.",
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub cursor: usize, // char position in the focused input

    // Form and generation state
    pub session: Session,
    pub config: Config,
    /// Where an entered API key is saved; None keeps it in memory only
    pub config_path: Option<PathBuf>,

    // Letter pane
    pub letter_scroll: u16,
    pub letter_height: u16,
    pub total_letter_lines: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Popups
    pub show_help: bool,
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    // Letter pane area for mouse hit-testing (updated during render)
    pub letter_area: Option<Rect>,
}

impl App {
    pub fn new(config: Config, events: UnboundedSender<SessionEvent>) -> Self {
        let api_key = config.api_key();
        let client = GeminiClient::new(config.endpoint(), api_key.as_deref().unwrap_or_default());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: Focus::Name,
            cursor: 0,

            session: Session::new(client, events),
            // Ask for a key up front; every request would fail without one
            show_api_key_input: api_key.is_none(),
            config,
            config_path: None,

            letter_scroll: 0,
            letter_height: 0,
            total_letter_lines: 0,

            animation_frame: 0,

            show_help: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            letter_area: None,
        }
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    // Field access
    pub fn text_for(&self, focus: Focus) -> &str {
        match focus {
            Focus::Name => &self.session.profile().name,
            Focus::Skills => &self.session.profile().skills,
            Focus::Experience => &self.session.profile().experience,
            Focus::JobDescription => self.session.job_description(),
            Focus::Letter => self.session.result(),
        }
    }

    fn set_text(&mut self, focus: Focus, value: String) {
        match focus {
            Focus::Name => self.session.update_profile_field(ProfileField::Name, value),
            Focus::Skills => self.session.update_profile_field(ProfileField::Skills, value),
            Focus::Experience => self.session.update_profile_field(ProfileField::Experience, value),
            Focus::JobDescription => self.session.update_job_description(value),
            Focus::Letter => {}
        }
    }

    pub fn focused_text(&self) -> &str {
        self.text_for(self.focus)
    }

    // Focus
    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        // Cursor at end of existing text
        self.cursor = self.focused_text().chars().count();
        if !focus.is_input() {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn start_editing(&mut self) {
        if self.focus.is_input() {
            self.input_mode = InputMode::Editing;
            self.cursor = self.cursor.min(self.focused_text().chars().count());
        }
    }

    // Editing at the cursor
    pub fn insert_char(&mut self, c: char) {
        if !self.focus.is_input() {
            return;
        }
        let mut text = self.focused_text().to_string();
        let byte_pos = char_to_byte_index(&text, self.cursor);
        text.insert(byte_pos, c);
        self.set_text(self.focus, text);
        self.cursor += 1;
    }

    /// Insert pasted text. The name field keeps to one line.
    pub fn insert_str(&mut self, pasted: &str) {
        if !self.focus.is_input() {
            return;
        }
        // Terminals send \r for newlines inside bracketed paste
        let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
        let pasted = if self.focus.is_multiline() {
            normalized
        } else {
            normalized.lines().collect::<Vec<_>>().join(" ")
        };

        let mut text = self.focused_text().to_string();
        let byte_pos = char_to_byte_index(&text, self.cursor);
        text.insert_str(byte_pos, &pasted);
        self.set_text(self.focus, text);
        self.cursor += pasted.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 || !self.focus.is_input() {
            return;
        }
        let mut text = self.focused_text().to_string();
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&text, self.cursor);
        text.remove(byte_pos);
        self.set_text(self.focus, text);
    }

    pub fn delete(&mut self) {
        if !self.focus.is_input() {
            return;
        }
        let mut text = self.focused_text().to_string();
        if self.cursor < text.chars().count() {
            let byte_pos = char_to_byte_index(&text, self.cursor);
            text.remove(byte_pos);
            self.set_text(self.focus, text);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.focused_text().chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.focused_text().chars().count();
    }

    /// (line, column) of the cursor within the focused text, in chars
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before: String = self.focused_text().chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0);
        (line, col)
    }

    // Generation
    pub fn generate(&mut self) {
        match self.session.submit() {
            Submit::Started => {
                self.animation_frame = 0;
            }
            Submit::Incomplete => log::debug!("generate ignored: form incomplete"),
            Submit::InFlight => log::debug!("generate ignored: request in flight"),
        }
    }

    pub fn copy_letter(&mut self) {
        self.session.copy_result();
    }

    pub fn on_session_event(&mut self, event: SessionEvent) {
        if let Some(Notice::ResultReady) = self.session.apply(event) {
            // Bring the new letter into view
            self.letter_scroll = 0;
            self.focus = Focus::Letter;
            self.input_mode = InputMode::Normal;
        }
    }

    // API key popup
    pub fn open_api_key_input(&mut self) {
        self.show_api_key_input = true;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    pub fn close_api_key_input(&mut self) {
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    /// Use the typed key from now on and remember it in the config file
    pub fn save_api_key(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if key.is_empty() {
            return;
        }

        self.config.gemini_api_key = Some(key.clone());
        match &self.config_path {
            Some(path) => {
                if let Err(err) = self.config.save_to(path) {
                    log::warn!("could not save config to {}: {}", path.display(), err);
                }
            }
            None => log::warn!("API key kept for this run only; config file is not writable"),
        }
        self.session
            .set_client(GeminiClient::new(self.config.endpoint(), &key));
        self.close_api_key_input();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Letter scrolling
    fn max_letter_scroll(&self) -> u16 {
        self.total_letter_lines.saturating_sub(self.letter_height)
    }

    pub fn scroll_letter_down(&mut self, lines: u16) {
        self.letter_scroll = self
            .letter_scroll
            .saturating_add(lines)
            .min(self.max_letter_scroll());
    }

    pub fn scroll_letter_up(&mut self, lines: u16) {
        self.letter_scroll = self.letter_scroll.saturating_sub(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = Config {
            gemini_api_key: Some("test-key".to_string()),
            api_url: Some("http://127.0.0.1:9/generate".to_string()),
        };
        App::new(config, tx)
    }

    #[test]
    fn test_saved_key_is_written_and_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("covergen").join("config.json");
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Config::new(), tx).with_config_path(path.clone());

        app.open_api_key_input();
        app.api_key_input = "  new-key ".to_string();
        app.save_api_key();

        assert!(!app.show_api_key_input);
        assert!(app.session.client().has_api_key());
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.gemini_api_key.as_deref(), Some("new-key"));
    }

    #[test]
    fn test_focus_cycles_both_ways() {
        assert_eq!(Focus::Name.next(), Focus::Skills);
        assert_eq!(Focus::Letter.next(), Focus::Name);
        assert_eq!(Focus::Name.prev(), Focus::Letter);
        assert_eq!(Focus::JobDescription.prev(), Focus::Experience);
    }

    #[test]
    fn test_typing_updates_session() {
        let mut app = app();
        for c in "Jané".chars() {
            app.insert_char(c);
        }
        assert_eq!(app.session.profile().name, "Jané");
        assert_eq!(app.cursor, 4);

        app.cursor_left();
        app.backspace();
        assert_eq!(app.session.profile().name, "Jaé");

        app.cursor_home();
        app.delete();
        assert_eq!(app.session.profile().name, "aé");
    }

    #[test]
    fn test_paste_into_name_stays_single_line() {
        let mut app = app();
        app.insert_str("Jane\r\nDoe");
        assert_eq!(app.session.profile().name, "Jane Doe");
    }

    #[test]
    fn test_paste_into_job_description_keeps_lines() {
        let mut app = app();
        app.set_focus(Focus::JobDescription);
        app.insert_str("Backend Engineer\r\nAcme\rRemote");
        assert_eq!(app.session.job_description(), "Backend Engineer\nAcme\nRemote");
        assert_eq!(app.cursor_line_col(), (2, 6));
    }

    #[test]
    fn test_letter_pane_is_read_only() {
        let mut app = app();
        app.set_focus(Focus::Letter);
        assert_eq!(app.input_mode, InputMode::Normal);
        app.insert_char('x');
        app.insert_str("pasted");
        assert_eq!(app.session.result(), "");
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = app();
        app.total_letter_lines = 30;
        app.letter_height = 10;
        app.scroll_letter_down(50);
        assert_eq!(app.letter_scroll, 20);
        app.scroll_letter_up(100);
        assert_eq!(app.letter_scroll, 0);
    }
}
