use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ProgramId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Lifecycle of an application. Only `Pending` and `Approved` occupy a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

/// Statuses counted against a program's capacity.
pub const SEAT_HOLDING_STATUSES: [ApplicationStatus; 2] =
    [ApplicationStatus::Pending, ApplicationStatus::Approved];

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }

    pub const fn holds_seat(self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Approved)
    }

    /// Pending applications can be decided or withdrawn; an approved offer can
    /// still be declined. Rejected and withdrawn are terminal.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Approved)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
                | (ApplicationStatus::Pending, ApplicationStatus::Withdrawn)
                | (ApplicationStatus::Approved, ApplicationStatus::Withdrawn)
        )
    }
}

/// A stored application row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub program_id: ProgramId,
    pub applicant_id: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn pending(
        id: ApplicationId,
        program_id: ProgramId,
        applicant_id: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            program_id,
            applicant_id: applicant_id.into(),
            status: ApplicationStatus::Pending,
            submitted_at,
            reviewed_by: None,
            reviewed_at: None,
        }
    }
}

/// Request body for a new application. The applicant is the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub program_id: ProgramId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn target_status(self) -> ApplicationStatus {
        match self {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
}
