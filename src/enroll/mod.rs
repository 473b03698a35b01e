//! Enrollment requests and their delivery.
//!
//! The server only renders the request and hands it to an
//! [`EnrollmentNotifier`]. Delivery is fire-and-forget: a failed delivery is
//! reported to the caller once and never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// A prospective student's enrollment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// A rendered notification, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub reply_to: String,
}

impl EnrollmentRequest {
    pub fn notification(&self) -> Notification {
        let message = self
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("No additional message");

        Notification {
            subject: format!("New Enrollment Request for {}", self.course),
            body: format!(
                "New Enrollment Request\n\nName: {}\nEmail: {}\nPhone: {}\nCourse: {}\nMessage: {}\n",
                self.name, self.email, self.phone, self.course, message
            ),
            reply_to: self.email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Delivers rendered enrollment notifications.
#[async_trait]
pub trait EnrollmentNotifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Emits each notification as a structured log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl EnrollmentNotifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            subject = %notification.subject,
            reply_to = %notification.reply_to,
            body = %notification.body,
            "enrollment request"
        );
        Ok(())
    }
}
