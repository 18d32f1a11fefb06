use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{Program, ProgramId};

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read program catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid program catalog row {row}: {source}")]
    Row { row: usize, source: csv::Error },
    #[error("program catalog row {row} has an empty {field}")]
    MissingField { row: usize, field: &'static str },
}

#[derive(Debug, Deserialize)]
struct ProgramRow {
    id: u64,
    name: String,
    department: String,
    #[serde(default)]
    certification_type: String,
}

/// Parses a catalog CSV with header `id,name,department,certification_type`.
/// Any malformed row fails the whole import.
pub fn load_programs<R: Read>(reader: R) -> Result<Vec<Program>, CatalogImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut programs = Vec::new();
    for (index, row) in reader.deserialize::<ProgramRow>().enumerate() {
        // Header occupies line 1.
        let line = index + 2;
        let row = row.map_err(|source| CatalogImportError::Row { row: line, source })?;

        if row.name.is_empty() {
            return Err(CatalogImportError::MissingField {
                row: line,
                field: "name",
            });
        }
        if row.department.is_empty() {
            return Err(CatalogImportError::MissingField {
                row: line,
                field: "department",
            });
        }

        programs.push(Program {
            id: ProgramId(row.id),
            name: row.name,
            department: row.department,
            certification_type: row.certification_type,
        });
    }

    Ok(programs)
}

pub fn load_programs_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<Program>, CatalogImportError> {
    let file = File::open(path)?;
    load_programs(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_rows_and_keeps_blank_certification_types() {
        let csv = "id,name,department,certification_type\n\
                   1,Nursing Diploma,Nursing,Diploma\n\
                   2, Nursing Degree ,Nursing,Degree\n\
                   3,Bridging Course,Nursing,\n";

        let programs = load_programs(Cursor::new(csv)).expect("catalog parses");

        assert_eq!(programs.len(), 3);
        assert_eq!(programs[1].name, "Nursing Degree");
        assert_eq!(programs[1].certification_type, "Degree");
        assert_eq!(programs[2].certification_type, "");
        assert_eq!(programs[2].id, ProgramId(3));
    }

    #[test]
    fn reports_row_number_of_bad_id() {
        let csv = "id,name,department,certification_type\n\
                   1,Nursing Diploma,Nursing,Diploma\n\
                   two,Nursing Degree,Nursing,Degree\n";

        match load_programs(Cursor::new(csv)) {
            Err(CatalogImportError::Row { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_department() {
        let csv = "id,name,department,certification_type\n1,Orphan Program,,Degree\n";

        match load_programs(Cursor::new(csv)) {
            Err(CatalogImportError::MissingField { row, field }) => {
                assert_eq!(row, 2);
                assert_eq!(field, "department");
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }
}
