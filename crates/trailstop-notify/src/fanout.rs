//! Fan-out over all configured notification channels.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{NotifyError, NotifyResult};
use crate::Notifier;

/// Broadcasts each alert to every configured channel.
///
/// One channel's failure is logged and does not block the others. The
/// broadcast counts as delivered if at least one channel succeeded.
#[derive(Default)]
pub struct NotifierSet {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: Box<dyn Notifier>) {
        self.channels.push(channel);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Send through every channel, returning how many delivered.
    pub async fn broadcast(&self, message: &str, recipient: &str, subject: &str) -> usize {
        let mut delivered = 0;
        for channel in &self.channels {
            match channel.send(message, recipient, subject).await {
                Ok(()) => {
                    info!(channel = channel.name(), "Alert delivered");
                    delivered += 1;
                }
                Err(e) => {
                    warn!(channel = channel.name(), error = %e, "Alert delivery failed");
                }
            }
        }
        delivered
    }
}

#[async_trait]
impl Notifier for NotifierSet {
    /// A set delivers if any member channel delivers.
    async fn send(&self, message: &str, recipient: &str, subject: &str) -> NotifyResult<()> {
        if self.broadcast(message, recipient, subject).await > 0 {
            Ok(())
        } else {
            Err(NotifyError::AllChannelsFailed)
        }
    }

    fn name(&self) -> &str {
        "fanout"
    }
}
