use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use covergen_core::{Config, SessionEvent};
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    logging::initialize();

    let (config, config_path) = load_config();

    let (session_tx, mut session_rx) = mpsc::unbounded_channel();
    let mut app = App::new(config, session_tx);
    if let Some(path) = config_path {
        app = app.with_config_path(path);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    log::info!("covergen started, endpoint {}", app.session.client().api_url());
    let result = run(&mut terminal, &mut app, &mut events, &mut session_rx).await;

    tui::restore()?;
    log::info!("covergen exiting");
    result
}

/// Load the config file, and return its path only if it is safe to write back.
///
/// A file that exists but can't be read is left alone; a key entered this run
/// then lives in memory only.
fn load_config() -> (Config, Option<PathBuf>) {
    let path = match Config::config_path() {
        Ok(path) => path,
        Err(err) => {
            log::warn!("no config directory, settings won't be saved: {}", err);
            return (Config::new(), None);
        }
    };

    load_config_at(path)
}

fn load_config_at(path: PathBuf) -> (Config, Option<PathBuf>) {
    match Config::load_from(&path) {
        Ok(config) => (config, Some(path)),
        Err(err) => {
            log::warn!(
                "could not read {}, using defaults and leaving the file untouched: {}",
                path.display(),
                err
            );
            (Config::new(), None)
        }
    }
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    session_rx: &mut UnboundedReceiver<SessionEvent>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event)?,
            Some(event) = session_rx.recv() => app.on_session_event(event),
            else => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_is_writable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let (config, save_path) = load_config_at(path.clone());
        assert_eq!(config, Config::new());
        assert_eq!(save_path, Some(path));
    }

    #[test]
    fn test_unreadable_config_is_not_written_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let (config, save_path) = load_config_at(path.clone());
        assert_eq!(config, Config::new());
        assert_eq!(save_path, None);

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(config, tx);
        app.open_api_key_input();
        app.api_key_input = "new-key".to_string();
        app.save_api_key();

        assert!(app.session.client().has_api_key());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
