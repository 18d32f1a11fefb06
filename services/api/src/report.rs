use crate::infra::{
    InMemoryApplicationRepository, InMemoryCapacityLimitStore, InMemoryProgramCatalog,
};
use admissions::applications::{load_applications_from_path, ApplicationRepository};
use admissions::capacity::{CapacityLimitPolicy, CapacityService, DepartmentCapacity};
use admissions::catalog::{load_programs_from_path, ProgramCatalog};
use admissions::error::AppError;
use chrono::Utc;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CapacityReportArgs {
    /// Program catalog CSV (id,name,department,certification_type)
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Applications export CSV (id,program_id,applicant_id,status[,submitted_at])
    #[arg(long)]
    pub(crate) applications: Option<PathBuf>,
}

pub(crate) fn run_capacity_report(args: CapacityReportArgs) -> Result<(), AppError> {
    let CapacityReportArgs {
        catalog: catalog_path,
        applications,
    } = args;

    let catalog = Arc::new(InMemoryProgramCatalog::default());
    for program in load_programs_from_path(&catalog_path)? {
        catalog.insert(program)?;
    }

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let imported = match applications {
        Some(path) => {
            let records = load_applications_from_path(&path, Utc::now())?;
            let count = records.len();
            for record in records {
                repository.insert(record)?;
            }
            count
        }
        None => 0,
    };

    let service = CapacityService::new(
        catalog,
        repository,
        Arc::new(InMemoryCapacityLimitStore::default()),
        CapacityLimitPolicy::standard(),
    );
    let departments = service.department_capacities()?;

    println!("Capacity report");
    println!("Catalog: {}", catalog_path.display());
    println!("Applications imported: {imported}");
    print!("{}", render_capacity_report(&departments));
    Ok(())
}

pub(crate) fn render_capacity_report(departments: &[DepartmentCapacity]) -> String {
    let mut out = String::new();
    if departments.is_empty() {
        out.push_str("\nNo departments in catalog\n");
        return out;
    }

    for department in departments {
        let _ = writeln!(
            out,
            "\n{}: {}/{} seats taken, {} remaining",
            department.department,
            department.current_applications,
            department.total_capacity,
            department.remaining_slots
        );
        for program in &department.programs {
            let certification = if program.certification_type.is_empty() {
                "unspecified"
            } else {
                program.certification_type.as_str()
            };
            let _ = writeln!(
                out,
                "- program {} ({}): {}/{} seats taken, {} remaining{}",
                program.program_id,
                certification,
                program.current_applications,
                program.capacity,
                program.remaining_slots,
                if program.has_remaining_slots() {
                    ""
                } else {
                    " [full]"
                }
            );
        }
    }
    out
}
