// components/media_downloader/src/lifecycle.rs
//! Download lifecycle as an explicit state machine.
//!
//! ```text
//! Idle -> Fetching -> Downloading -> Succeeded | Failed | Cancelled
//!            \-> Failed | Cancelled
//! ```
//!
//! Terminal states accept no further events. A [`StateTracker`] owns the
//! current state and publishes every change to whoever renders it.

use crate::types::Progress;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DownloadState {
    #[default]
    Idle,
    Fetching,
    Downloading(Progress),
    Succeeded { file: Option<PathBuf> },
    Failed { reason: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    FetchStarted,
    InfoReady,
    Progress(Progress),
    Finished { file: Option<PathBuf> },
    Failed(String),
    Cancelled,
}

#[derive(Debug, Error, PartialEq)]
#[error("cannot apply {event:?} while {state:?}")]
pub struct InvalidTransition {
    pub state: DownloadState,
    pub event: DownloadEvent,
}

impl DownloadState {
    pub fn apply(&self, event: DownloadEvent) -> Result<DownloadState, InvalidTransition> {
        use DownloadState as S;

        let next = match (self, &event) {
            (S::Idle, DownloadEvent::FetchStarted) => Some(S::Fetching),
            (S::Fetching, DownloadEvent::InfoReady) => Some(S::Downloading(Progress::default())),
            (S::Downloading(_), DownloadEvent::Progress(progress)) => {
                Some(S::Downloading(progress.clone()))
            }
            (S::Downloading(_), DownloadEvent::Finished { file }) => {
                Some(S::Succeeded { file: file.clone() })
            }
            (S::Fetching | S::Downloading(_), DownloadEvent::Failed(reason)) => Some(S::Failed {
                reason: reason.clone(),
            }),
            (S::Fetching | S::Downloading(_), DownloadEvent::Cancelled) => Some(S::Cancelled),
            _ => None,
        };

        next.ok_or_else(|| InvalidTransition {
            state: self.clone(),
            event,
        })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadState::Succeeded { .. } | DownloadState::Failed { .. } | DownloadState::Cancelled
        )
    }

    /// Headline for a notification showing this state
    pub fn title(&self) -> &'static str {
        match self {
            DownloadState::Idle => "Ready",
            DownloadState::Fetching => "Fetching video info",
            DownloadState::Downloading(_) => "Downloading",
            DownloadState::Succeeded { .. } => "Download Complete",
            DownloadState::Failed { .. } => "Download Failed",
            DownloadState::Cancelled => "Download Cancelled",
        }
    }
}

/// Holds the current [`DownloadState`] and publishes each change
#[derive(Debug, Default)]
pub struct StateTracker {
    state: DownloadState,
    updates: Option<UnboundedSender<DownloadState>>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_updates(updates: UnboundedSender<DownloadState>) -> Self {
        Self {
            state: DownloadState::Idle,
            updates: Some(updates),
        }
    }

    pub fn state(&self) -> &DownloadState {
        &self.state
    }

    /// Apply an event. Returns false, leaving the state untouched, when the
    /// transition is not allowed.
    pub fn advance(&mut self, event: DownloadEvent) -> bool {
        match self.state.apply(event) {
            Ok(next) => {
                tracing::debug!("Download state: {:?} -> {:?}", self.state, next);
                self.state = next;
                if let Some(updates) = &self.updates {
                    // Nobody listening is fine
                    let _ = updates.send(self.state.clone());
                }
                true
            }
            Err(invalid) => {
                tracing::warn!("Ignoring download event: {}", invalid);
                false
            }
        }
    }
}
