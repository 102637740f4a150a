use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Outbound transactional messages. Returns the transport's message id.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<String, NotifyError>;
}

/// Writes each notification to the log as a structured event.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> Result<String, NotifyError> {
        if !notification.to.contains('@') {
            return Err(NotifyError::InvalidRecipient(notification.to));
        }
        let message_id = format!("<{}@fornix-api>", Uuid::new_v4());
        info!(
            message_id = %message_id,
            to = %notification.to,
            from = %notification.from,
            reply_to = ?notification.reply_to,
            subject = %notification.subject,
            body = %notification.text,
            "Notification dispatched"
        );
        Ok(message_id)
    }
}
