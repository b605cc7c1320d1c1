// Operator utility: bulk-load prospectus rows from a CSV file.
//
// Usage:
//   cargo run --bin import_prospectus -- <csv_path> [db_path]
//
// Prints the import summary as JSON. Exits non-zero when any row was rejected.

use registrar_engine::app::{get_default_db_path, AppState};
use registrar_engine::logging;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let csv_path = args
        .next()
        .map(PathBuf::from)
        .ok_or("usage: import_prospectus <csv_path> [db_path]")?;
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path)?;
    let summary = state.curriculum_api.import_csv(&csv_path)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    if !summary.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
