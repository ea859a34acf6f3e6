//! Status messages shown above the grid.

use crate::error::FetchError;
use crate::response::RowBatch;

/// Error banners. At most one of each kind is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Banner {
    /// The server answered with its login page.
    SessionExpired,
    /// The server could not be reached.
    ConnectionProblem,
}

impl Banner {
    pub fn message(&self) -> &'static str {
        match self {
            Banner::SessionExpired => {
                "It looks like your authentication session has expired. You can reload the page."
            }
            Banner::ConnectionProblem => {
                "Error reaching the server. This is probably a temporary error. If your network \
                 connection resumes, the error state should resolve by itself. You can also \
                 reload the page."
            }
        }
    }
}

/// A flash message sent along with a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub message: String,
    /// Queue name, used as the alert kind (`success`, `danger`, ...).
    pub queue: String,
}

/// Error banners and the flash slot.
#[derive(Debug, Default)]
pub struct StatusBoard {
    banners: Vec<Banner>,
    flash: Option<Flash>,
    reload_prompt: bool,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    /// Takes a pending "reload the page to log in again" prompt.
    pub fn take_reload_prompt(&mut self) -> bool {
        std::mem::take(&mut self.reload_prompt)
    }

    /// Reacts to a failed fetch. Returns the banner shown, if a new one was
    /// added.
    pub fn handle_error(&mut self, error: &FetchError) -> Option<Banner> {
        let banner = if error.is_session_expired() {
            Banner::SessionExpired
        } else if error.is_connection_problem() {
            Banner::ConnectionProblem
        } else {
            return None;
        };
        if self.banners.contains(&banner) {
            return None;
        }
        if banner == Banner::SessionExpired {
            self.reload_prompt = true;
        }
        log::debug!("showing {banner:?} banner");
        self.banners.push(banner);
        Some(banner)
    }

    /// Reacts to a finished load. Error banners go away and a flash message
    /// in the batch replaces the current one.
    pub fn handle_loaded(&mut self, batch: Option<&RowBatch>) {
        if let Some((message, queue)) = batch.and_then(RowBatch::flash_message) {
            self.flash = Some(Flash {
                message: message.to_string(),
                queue: queue.to_string(),
            });
        }
        self.clear_errors();
    }

    /// Removes every error banner.
    pub fn clear_errors(&mut self) {
        self.banners.clear();
    }

    /// Dismisses the flash message.
    pub fn dismiss_flash(&mut self) {
        self.flash = None;
    }

    /// Dismisses one banner.
    pub fn dismiss(&mut self, banner: Banner) {
        self.banners.retain(|b| *b != banner);
    }
}
