use crate::applications::{ApplicationImportError, RepositoryError};
use crate::capacity::CapacityError;
use crate::catalog::{CatalogError, CatalogImportError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Top-level error for process start-up and the offline CLI commands.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    CatalogImport(CatalogImportError),
    ApplicationImport(ApplicationImportError),
    Catalog(CatalogError),
    Repository(RepositoryError),
    Capacity(CapacityError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::CatalogImport(err) => write!(f, "catalog import error: {}", err),
            AppError::ApplicationImport(err) => write!(f, "application import error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Repository(err) => write!(f, "repository error: {}", err),
            AppError::Capacity(err) => write!(f, "capacity error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::CatalogImport(err) => Some(err),
            AppError::ApplicationImport(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Capacity(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CatalogImportError> for AppError {
    fn from(value: CatalogImportError) -> Self {
        Self::CatalogImport(value)
    }
}

impl From<ApplicationImportError> for AppError {
    fn from(value: ApplicationImportError) -> Self {
        Self::ApplicationImport(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<CapacityError> for AppError {
    fn from(value: CapacityError) -> Self {
        Self::Capacity(value)
    }
}
