//! SMS delivery via an HTTP SMS provider.
//!
//! Posts JSON to the provider's messages endpoint with an API token. If
//! `SMS_API_URL` is not set, [`SmsConfig::from_env`] returns `None` and no
//! channel should be constructed.

use crate::channel::{Channel, ChannelError, Message, Recipient};

/// Configuration for the HTTP SMS channel.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Provider endpoint receiving the send request.
    pub api_url: String,
    /// Provider API token.
    pub api_token: String,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both `SMS_API_URL` and `SMS_API_TOKEN` are
    /// set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: std::env::var("SMS_API_URL").ok()?,
            api_token: std::env::var("SMS_API_TOKEN").ok()?,
        })
    }
}

/// Sends workflow notification texts through the provider API.
pub struct SmsChannel {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsChannel {
    /// Create a new SMS channel with the given configuration.
    pub fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl Channel for SmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, recipient: &Recipient, message: &Message) -> Result<(), ChannelError> {
        let Some(phone) = recipient.phone.as_deref() else {
            return Err(ChannelError::NoAddress);
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&serde_json::json!({
                "api_token": self.config.api_token,
                "phone_number": phone,
                "message": message.body,
            }))
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Transport(format!(
                "provider returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
