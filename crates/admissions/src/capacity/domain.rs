use serde::{Deserialize, Serialize};

use crate::catalog::{Program, ProgramId};

/// Capacity figures for a single program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramCapacity {
    pub program_id: ProgramId,
    pub certification_type: String,
    pub capacity: u32,
    pub current_applications: u32,
    /// Negative when a program is oversubscribed, e.g. after its limit was lowered.
    pub remaining_slots: i64,
}

impl ProgramCapacity {
    pub fn new(program: &Program, capacity: u32, current_applications: u32) -> Self {
        Self {
            program_id: program.id,
            certification_type: program.certification_type.clone(),
            capacity,
            current_applications,
            remaining_slots: i64::from(capacity) - i64::from(current_applications),
        }
    }

    pub fn has_remaining_slots(&self) -> bool {
        self.remaining_slots > 0
    }
}

/// Department roll-up of its programs' capacity figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCapacity {
    pub department: String,
    pub total_capacity: u64,
    pub current_applications: u64,
    pub remaining_slots: i64,
    pub programs: Vec<ProgramCapacity>,
}

impl DepartmentCapacity {
    pub fn from_programs(department: impl Into<String>, programs: Vec<ProgramCapacity>) -> Self {
        let total_capacity: u64 = programs.iter().map(|p| u64::from(p.capacity)).sum();
        let current_applications: u64 = programs
            .iter()
            .map(|p| u64::from(p.current_applications))
            .sum();

        Self {
            department: department.into(),
            total_capacity,
            current_applications,
            remaining_slots: total_capacity as i64 - current_applications as i64,
            programs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramAvailability {
    pub program_id: ProgramId,
    pub available: bool,
}
