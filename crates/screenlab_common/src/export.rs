//! CSV export of the decision log.
//!
//! One row per decision, UTF-8, comma-separated, header required:
//!
//! ```text
//! Round,Mode,Threat,User_Reject,Result,Time
//! 1,Manual,true,false,ERROR,1.234
//! ```
//!
//! The file is the only artifact crossing the system boundary and carries
//! no participant-identifying fields.

use std::fs;
use std::path::Path;

use crate::decision_log::DecisionRecord;
use crate::error::StudyError;

/// Export header, exact column order.
pub const CSV_HEADER: &str = "Round,Mode,Threat,User_Reject,Result,Time";

/// Serialize records to CSV, header first, append order preserved.
pub fn to_csv(records: &[DecisionRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        let result = if record.correct { "CORRECT" } else { "ERROR" };
        out.push_str(&format!(
            "{},{},{},{},{},{:.3}\n",
            record.round,
            record.mode.as_str(),
            record.ground_truth_threat,
            record.user_rejected,
            result,
            record.reaction_time_secs
        ));
    }

    out
}

/// Write the export file.
pub fn write_csv(path: &Path, records: &[DecisionRecord]) -> Result<(), StudyError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_csv(records))?;
    Ok(())
}

/// Parse an exported file back into records.
///
/// Backs the `report` subcommand and the round-trip property check. The
/// Result column is cross-checked against the decision columns; a mismatch
/// means the file was edited and is rejected.
pub fn parse_csv(content: &str) -> Result<Vec<DecisionRecord>, StudyError> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| StudyError::Export("empty export file".to_string()))?;
    if header.trim() != CSV_HEADER {
        return Err(StudyError::Export(format!(
            "unexpected header '{}'",
            header.trim()
        )));
    }

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Rows are 1-based and follow the header.
        let row = idx + 2;

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 6 {
            return Err(StudyError::Export(format!(
                "row {}: expected 6 fields, found {}",
                row,
                fields.len()
            )));
        }

        let round: u32 = fields[0]
            .parse()
            .map_err(|_| StudyError::Export(format!("row {}: bad round '{}'", row, fields[0])))?;
        let mode = fields[1].parse()?;
        let ground_truth_threat = parse_bool(fields[2], row, "Threat")?;
        let user_rejected = parse_bool(fields[3], row, "User_Reject")?;
        let correct = match fields[4] {
            "CORRECT" => true,
            "ERROR" => false,
            other => {
                return Err(StudyError::Export(format!(
                    "row {}: bad result '{}'",
                    row, other
                )))
            }
        };
        let reaction_time_secs: f64 = fields[5]
            .parse()
            .map_err(|_| StudyError::Export(format!("row {}: bad time '{}'", row, fields[5])))?;

        if correct != (user_rejected == ground_truth_threat) {
            return Err(StudyError::Export(format!(
                "row {}: result column disagrees with the decision columns",
                row
            )));
        }
        if reaction_time_secs < 0.0 {
            return Err(StudyError::Export(format!(
                "row {}: negative reaction time",
                row
            )));
        }

        records.push(DecisionRecord {
            round,
            mode,
            ground_truth_threat,
            user_rejected,
            correct,
            reaction_time_secs,
        });
    }

    Ok(records)
}

fn parse_bool(field: &str, row: usize, column: &str) -> Result<bool, StudyError> {
    match field {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(StudyError::Export(format!(
            "row {}: bad {} '{}'",
            row, column, other
        ))),
    }
}
