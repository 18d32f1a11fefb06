use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{Application, ApplicationId, ApplicationStatus};
use crate::catalog::ProgramId;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationImportError {
    #[error("failed to read applications export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applications row {row}: {source}")]
    Row { row: usize, source: csv::Error },
    #[error("applications row {row} has unknown status '{status}'")]
    UnknownStatus { row: usize, status: String },
    #[error("applications row {row} has an invalid submitted_at '{value}'")]
    InvalidTimestamp { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    id: String,
    program_id: u64,
    applicant_id: String,
    status: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    submitted_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}

/// Parses an applications export with header
/// `id,program_id,applicant_id,status[,submitted_at]`. Rows without a
/// timestamp are stamped with `imported_at`.
pub fn load_applications<R: Read>(
    reader: R,
    imported_at: DateTime<Utc>,
) -> Result<Vec<Application>, ApplicationImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut applications = Vec::new();
    for (index, row) in reader.deserialize::<ApplicationRow>().enumerate() {
        let line = index + 2;
        let row = row.map_err(|source| ApplicationImportError::Row { row: line, source })?;

        let status = ApplicationStatus::parse(&row.status).ok_or_else(|| {
            ApplicationImportError::UnknownStatus {
                row: line,
                status: row.status.clone(),
            }
        })?;

        let submitted_at = match row.submitted_at {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| ApplicationImportError::InvalidTimestamp {
                    row: line,
                    value: raw,
                })?,
            None => imported_at,
        };

        let mut application = Application::pending(
            ApplicationId(row.id),
            ProgramId(row.program_id),
            row.applicant_id,
            submitted_at,
        );
        application.status = status;
        applications.push(application);
    }

    Ok(applications)
}

pub fn load_applications_from_path(
    path: impl AsRef<Path>,
    imported_at: DateTime<Utc>,
) -> Result<Vec<Application>, ApplicationImportError> {
    let file = File::open(path)?;
    load_applications(file, imported_at)
}
