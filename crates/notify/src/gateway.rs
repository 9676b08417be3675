//! Best-effort fan-out over the configured delivery channels.

use crate::channel::{Channel, Message, Recipient};

/// Routes a notification to every configured channel that can reach the
/// recipient. Failures are logged and swallowed: the workflow transition
/// that triggered the send must never roll back because a transport was
/// down.
pub struct NotificationGateway {
    channels: Vec<Box<dyn Channel>>,
}

impl NotificationGateway {
    /// Build a gateway over an explicit channel list (tests inject a
    /// recording channel here).
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }

    /// Build a gateway from the environment: email when SMTP is
    /// configured, SMS when the provider is. An empty gateway is valid --
    /// every notify() then reports `false`.
    pub fn from_env() -> Self {
        let mut channels: Vec<Box<dyn Channel>> = Vec::new();
        if let Some(config) = crate::email::EmailConfig::from_env() {
            channels.push(Box::new(crate::email::EmailChannel::new(config)));
        }
        if let Some(config) = crate::sms::SmsConfig::from_env() {
            channels.push(Box::new(crate::sms::SmsChannel::new(config)));
        }
        if channels.is_empty() {
            tracing::warn!("No notification channels configured, sends will be skipped");
        }
        Self { channels }
    }

    /// Number of configured channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver `message` to `recipient` on every channel that has an
    /// address for them. Returns whether at least one channel succeeded.
    pub async fn notify(&self, recipient: &Recipient, message: &Message) -> bool {
        if recipient.is_unreachable() {
            tracing::debug!("Recipient has no contact channel, skipping notification");
            return false;
        }

        let mut delivered = false;
        for channel in &self.channels {
            match channel.send(recipient, message).await {
                Ok(()) => {
                    tracing::info!(channel = channel.name(), "Notification delivered");
                    delivered = true;
                }
                Err(crate::channel::ChannelError::NoAddress) => {
                    tracing::debug!(
                        channel = channel.name(),
                        "Recipient has no address for channel"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        channel = channel.name(),
                        error = %err,
                        "Notification delivery failed"
                    );
                }
            }
        }
        delivered
    }
}
