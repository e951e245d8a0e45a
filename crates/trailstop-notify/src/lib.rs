//! Notification channels for trailstop alerts.
//!
//! Defines the `Notifier` port and a fan-out `NotifierSet` over the
//! configured channels. Delivery mechanics beyond the bundled ntfy push
//! channel live outside this system; additional transports plug in by
//! implementing `Notifier`.

pub mod error;
pub mod fanout;
pub mod ntfy;

pub use error::{NotifyError, NotifyResult};
pub use fanout::NotifierSet;
pub use ntfy::NtfyNotifier;

use async_trait::async_trait;

/// A single notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message. A failure is isolated to this channel.
    async fn send(&self, message: &str, recipient: &str, subject: &str) -> NotifyResult<()>;

    /// Channel name for logs.
    fn name(&self) -> &str;
}
