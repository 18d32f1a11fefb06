//! Application intake and review. Seats are claimed through the capacity
//! aggregator so a program can never be admitted past its limit.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, ReviewDecision,
    ReviewRequest, SEAT_HOLDING_STATUSES,
};
pub use import::{load_applications, load_applications_from_path, ApplicationImportError};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
