use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub u64);

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A program offered by a department, e.g. a nursing diploma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub certification_type: String,
}

impl Program {
    /// Department names match case-insensitively, ignoring surrounding whitespace.
    pub fn in_department(&self, department: &str) -> bool {
        self.department
            .trim()
            .eq_ignore_ascii_case(department.trim())
    }
}
