//! Notification gateway: best-effort email/SMS delivery for workflow
//! transitions.
//!
//! Delivery is an external collaborator to the clearance core. Channels
//! implement the [`Channel`] contract; [`NotificationGateway`] fans a
//! message out to whichever channels can reach the recipient, logs
//! failures, and never propagates them -- a failed send must not fail the
//! state transition that triggered it.

pub mod channel;
pub mod email;
pub mod gateway;
pub mod sms;

pub use channel::{Channel, ChannelError, Message, Recipient};
pub use email::{EmailChannel, EmailConfig};
pub use gateway::NotificationGateway;
pub use sms::{SmsChannel, SmsConfig};
