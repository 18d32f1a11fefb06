//! Program catalog: the reference data capacity accounting reads from.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;

pub use domain::{Program, ProgramId};
pub use import::{load_programs, load_programs_from_path, CatalogImportError};
pub use repository::{CatalogError, ProgramCatalog};
pub use router::catalog_router;
