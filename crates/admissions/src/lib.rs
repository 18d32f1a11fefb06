//! Admissions portal back end: program catalog, application intake, and
//! seat-capacity accounting for departments and programs.

pub mod applications;
pub mod auth;
pub mod capacity;
pub mod catalog;
pub mod config;
pub mod error;
pub mod memory;
pub mod notifications;
pub mod response;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;
