use crate::catalog::ProgramId;

/// Durable per-program seat limits that override the certification policy.
pub trait CapacityLimitStore: Send + Sync {
    fn limit_for(&self, program_id: ProgramId) -> Result<Option<u32>, LimitStoreError>;

    /// Stores every entry or none of them.
    fn set_limits(&self, limits: &[(ProgramId, u32)]) -> Result<(), LimitStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LimitStoreError {
    #[error("capacity limit store unavailable: {0}")]
    Unavailable(String),
}
