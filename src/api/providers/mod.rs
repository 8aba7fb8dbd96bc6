//! Provider trait definitions for external service integrations
//!
//! This module defines the trait interfaces for the two provider
//! categories the guide depends on:
//! - Advisor providers (text and image-grounded advice)
//! - Avatar providers (talking-head video rendering)

use std::sync::Arc;

use tokio::sync::watch;

pub mod advisor;
pub mod avatar;

// Re-export commonly used types
pub use advisor::{AdviceRequest, AdvisorProvider, ImageAttachment};
pub use avatar::{AvatarIdentity, AvatarInfo, AvatarProvider, VoiceInfo};

/// Cooperative cancellation signal for long-running provider calls.
///
/// Clones share the same signal; `cancel` is sticky and wakes every
/// waiter. Render poll loops check the token between polls, so
/// cancellation takes effect at the next poll boundary.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal cancellation to all holders of this token.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is signalled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
