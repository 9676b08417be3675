//! The delivery channel contract.

/// Where a notification can be delivered.
#[derive(Debug, Clone, Default)]
pub struct Recipient {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Recipient {
    /// True when no contact channel is known at all.
    pub fn is_unreachable(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// A notification to deliver. The subject only applies to channels that
/// have one; SMS channels send the body alone.
#[derive(Debug, Clone)]
pub struct Message {
    pub subject: String,
    pub body: String,
}

/// Error type for delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The recipient has no address this channel can use.
    #[error("Recipient has no address for this channel")]
    NoAddress,

    /// Transport-level failure (SMTP, HTTP, ...).
    #[error("Delivery transport error: {0}")]
    Transport(String),
}

/// A single delivery transport (SMTP email, HTTP SMS provider, ...).
#[async_trait::async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for logging.
    fn name(&self) -> &'static str;

    /// Deliver `message` to `recipient`, or explain why it could not be.
    async fn send(&self, recipient: &Recipient, message: &Message) -> Result<(), ChannelError>;
}
