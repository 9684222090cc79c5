//! View-side state: what a page shows while data loads, and the toast
//! notices raised when a request fails.

use crate::bridge::BridgeError;
use crate::constants::{messages, view};
use crate::poller::PollEvent;
use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Debug, PartialEq)]
pub enum LoadState<T> {
    /// No response yet
    Loading,
    /// Host answered with nothing to show
    Empty,
    Ready(T),
    /// First load failed; nothing to show
    Failed(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    pub fn from_result(result: Result<T, BridgeError>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match result {
            Ok(v) if is_empty(&v) => LoadState::Empty,
            Ok(v) => LoadState::Ready(v),
            Err(e) => LoadState::Failed(e.to_string()),
        }
    }

    /// Fold a poller event into the state. Failures after data was shown keep
    /// the data on screen and only raise a notice.
    pub fn apply(
        &mut self,
        event: PollEvent<T>,
        context: &str,
        is_empty: impl FnOnce(&T) -> bool,
    ) -> Option<Notice> {
        match event {
            PollEvent::Updated(v) => {
                *self = if is_empty(&v) {
                    LoadState::Empty
                } else {
                    LoadState::Ready(v)
                };
                None
            }
            PollEvent::Failed(e) => {
                if matches!(self, LoadState::Loading) {
                    *self = LoadState::Failed(e.to_string());
                }
                Some(Notice::from_error(context, &e))
            }
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// Empty-state text for pages without data.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            LoadState::Loading => Some(messages::LOADING),
            LoadState::Empty => Some(messages::NO_DATA),
            LoadState::Failed(_) => Some(messages::LOAD_FAILED),
            LoadState::Ready(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient toast notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice {
            level,
            title: title.into(),
            description: description.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice::new(NoticeLevel::Success, title, description)
    }

    /// Toast for a failed request. Logical failures carry the host's message;
    /// everything else is reported as the server being unreachable.
    pub fn from_error(context: &str, err: &BridgeError) -> Self {
        match err {
            BridgeError::Rejected(msg) => Notice::new(
                NoticeLevel::Warning,
                messages::REQUEST_REJECTED,
                format!("{context}: {msg}"),
            ),
            BridgeError::Cancelled => {
                Notice::new(NoticeLevel::Info, context, err.to_string())
            }
            _ => Notice::new(
                NoticeLevel::Error,
                messages::HOST_UNREACHABLE,
                format!("{context}: {err}"),
            ),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.raised_at >= Duration::seconds(view::NOTICE_DURATION_SECS)
    }
}
