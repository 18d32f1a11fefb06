//! Seat-capacity accounting for programs and departments.
//!
//! Capacity figures are derived on every request: seat-holding applications
//! are counted per program and compared against the program's limit, which is
//! either a stored override or the certification-type policy table. Department
//! summaries roll the program figures up.

pub mod domain;
pub mod policy;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{DepartmentCapacity, ProgramAvailability, ProgramCapacity};
pub use policy::{apportion, CapacityLimitPolicy, DEFAULT_PROGRAM_LIMIT};
pub use router::capacity_router;
pub use service::{CapacityError, CapacityService};
pub use store::{CapacityLimitStore, LimitStoreError};
