use std::collections::BTreeMap;

use super::domain::{Program, ProgramId};

/// Read-mostly storage for catalog programs.
pub trait ProgramCatalog: Send + Sync {
    fn insert(&self, program: Program) -> Result<Program, CatalogError>;
    fn fetch(&self, id: ProgramId) -> Result<Option<Program>, CatalogError>;
    /// Every program, ordered by id.
    fn all(&self) -> Result<Vec<Program>, CatalogError>;

    fn by_department(&self, department: &str) -> Result<Vec<Program>, CatalogError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|program| program.in_department(department))
            .collect())
    }

    /// Distinct department names, sorted case-insensitively. The spelling of
    /// the lowest-id program wins when departments differ only by case.
    fn departments(&self) -> Result<Vec<String>, CatalogError> {
        let mut departments = BTreeMap::new();
        for program in self.all()? {
            let name = program.department.trim();
            if name.is_empty() {
                continue;
            }
            departments
                .entry(name.to_ascii_lowercase())
                .or_insert_with(|| name.to_string());
        }
        Ok(departments.into_values().collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("program already exists")]
    Conflict,
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}
