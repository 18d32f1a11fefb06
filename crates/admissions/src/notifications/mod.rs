//! Applicant notifications fanned out to open server-sent-event streams.

pub mod hub;
pub mod router;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::applications::ApplicationId;

pub use hub::NotificationHub;
pub use router::notification_router;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationSubmitted,
    ApplicationApproved,
    ApplicationRejected,
    ApplicationWithdrawn,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::ApplicationSubmitted => "application_submitted",
            NotificationKind::ApplicationApproved => "application_approved",
            NotificationKind::ApplicationRejected => "application_rejected",
            NotificationKind::ApplicationWithdrawn => "application_withdrawn",
        }
    }
}

/// Message delivered to a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub created_at: DateTime<Utc>,
}

/// Outbound notification hook. The in-process [`NotificationHub`] only
/// reaches streams held by this process; a multi-instance deployment plugs a
/// broker in here instead.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
