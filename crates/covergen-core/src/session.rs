//! The generation controller
//!
//! A [`Session`] owns everything the form shows: the inputs, the last letter,
//! the error line and the loading/copied flags. It is driven from one place
//! (the UI event loop). Background work never touches it directly; the
//! request task and the copy-reset timer report back with a [`SessionEvent`]
//! which the loop hands to [`Session::apply`].

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ai::GeminiClient;
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::error::GenerationError;
use crate::prompt::compose_prompt;
use crate::state::{ProfileField, UserProfile};

/// How long the "Copied!" confirmation stays up.
pub const COPY_RESET: Duration = Duration::from_millis(2000);

/// Reported by background tasks, applied on the owning loop
#[derive(Debug)]
pub enum SessionEvent {
    Generated {
        request: u64,
        outcome: Result<String, GenerationError>,
    },
    CopyExpired {
        copy: u64,
    },
}

/// What `submit` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    Started,
    /// Name or job description missing; nothing sent, nothing shown.
    Incomplete,
    /// A request is already in flight.
    InFlight,
}

/// What the presentation layer should react to after `apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A new letter is in `result()`; bring it into view.
    ResultReady,
    GenerationFailed,
    CopyReset,
}

pub struct Session {
    profile: UserProfile,
    job_description: String,
    result: String,
    error_message: String,
    loading: bool,
    copied: bool,

    client: GeminiClient,
    clipboard: Box<dyn Clipboard>,
    events: UnboundedSender<SessionEvent>,

    request_id: u64,
    copy_id: u64,
    copy_reset: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(client: GeminiClient, events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            profile: UserProfile::default(),
            job_description: String::new(),
            result: String::new(),
            error_message: String::new(),
            loading: false,
            copied: false,

            client,
            clipboard: Box::new(SystemClipboard),
            events,

            request_id: 0,
            copy_id: 0,
            copy_reset: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn set_client(&mut self, client: GeminiClient) {
        self.client = client;
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    // Read side
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    // Inputs stay editable while loading; the request already owns its prompt.
    pub fn update_profile_field(&mut self, field: ProfileField, value: impl Into<String>) {
        self.profile.set(field, value.into());
    }

    pub fn update_job_description(&mut self, value: impl Into<String>) {
        self.job_description = value.into();
    }

    fn is_complete(&self) -> bool {
        !self.profile.name.is_empty() && !self.job_description.trim().is_empty()
    }

    /// Whether the Generate control should be enabled
    pub fn can_submit(&self) -> bool {
        self.is_complete() && !self.loading
    }

    /// Start a generation for the current inputs.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self) -> Submit {
        if self.loading {
            return Submit::InFlight;
        }
        if !self.is_complete() {
            return Submit::Incomplete;
        }

        self.loading = true;
        self.error_message.clear();
        self.request_id += 1;

        let request = self.request_id;
        let prompt = compose_prompt(&self.profile, &self.job_description);
        let client = self.client.clone();
        let events = self.events.clone();

        log::info!("starting generation request {} ({} byte prompt)", request, prompt.len());

        tokio::spawn(async move {
            let outcome = client.generate(&prompt).await;
            // Receiver gone means the UI has shut down
            let _ = events.send(SessionEvent::Generated { request, outcome });
        });

        Submit::Started
    }

    /// Fold a background event into the state
    pub fn apply(&mut self, event: SessionEvent) -> Option<Notice> {
        match event {
            SessionEvent::Generated { request, outcome } => {
                if !self.loading || request != self.request_id {
                    log::debug!("ignoring stale generation result {}", request);
                    return None;
                }

                self.loading = false;
                match outcome {
                    Ok(text) => {
                        log::info!("generation request {} succeeded", request);
                        self.result = text;
                        self.error_message.clear();
                        Some(Notice::ResultReady)
                    }
                    Err(err) => {
                        log::error!("generation request {} failed: {}", request, err);
                        self.error_message = err.user_message().to_string();
                        Some(Notice::GenerationFailed)
                    }
                }
            }
            SessionEvent::CopyExpired { copy } => {
                if copy != self.copy_id {
                    return None;
                }
                self.copied = false;
                self.copy_reset = None;
                Some(Notice::CopyReset)
            }
        }
    }

    /// Put the letter on the clipboard and flash the confirmation.
    ///
    /// Returns false when there is no letter or the clipboard write failed.
    /// Must be called from within a tokio runtime.
    pub fn copy_result(&mut self) -> bool {
        if self.result.is_empty() {
            return false;
        }

        if let Err(err) = self.clipboard.write_text(&self.result) {
            log::warn!("clipboard write failed: {}", err);
            return false;
        }

        self.copied = true;
        self.schedule_copy_reset();
        true
    }

    fn schedule_copy_reset(&mut self) {
        if let Some(pending) = self.copy_reset.take() {
            pending.abort();
        }

        self.copy_id += 1;
        let copy = self.copy_id;
        let events = self.events.clone();
        // Fixed now so the window doesn't depend on when the task first runs
        let deadline = Instant::now() + COPY_RESET;

        self.copy_reset = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = events.send(SessionEvent::CopyExpired { copy });
        }));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(pending) = self.copy_reset.take() {
            pending.abort();
        }
    }
}
