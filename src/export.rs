//! Spreadsheet export sink.
//!
//! Writes the aggregated records to a CSV file with a fixed column
//! order. The sink never raises past this boundary: every failure is
//! logged and reported as `false` so the caller can react.

use std::path::Path;

use tracing::{info, warn};

use crate::models::JobRecord;

/// Output column order. The serial index is always first and always
/// contiguous starting at 1.
const COLUMNS: &[&str] = &[
    "Sr. No.",
    "Title",
    "Company",
    "Location",
    "Email",
    "Phone",
    "Source URL",
];

/// Export records to a spreadsheet file.
///
/// Returns `false` immediately, without touching the filesystem, when
/// `records` is empty; returns `false` on any I/O failure.
pub fn write_spreadsheet(records: &[JobRecord], path: &Path) -> bool {
    if records.is_empty() {
        warn!("No records to export");
        return false;
    }

    match write_rows(records, path) {
        Ok(()) => {
            info!("Exported {} records to {}", records.len(), path.display());
            true
        }
        Err(err) => {
            warn!("Failed to export to {}: {}", path.display(), err);
            false
        }
    }
}

fn write_rows(records: &[JobRecord], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(COLUMNS)?;

    for (index, record) in records.iter().enumerate() {
        let serial = (index + 1).to_string();
        writer.write_record(&[
            serial.as_str(),
            record.title.as_str(),
            record.company.as_str(),
            record.location.as_str(),
            record.email.as_str(),
            record.phone.as_str(),
            record.source_url.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NA;

    fn sample_records() -> Vec<JobRecord> {
        vec![
            JobRecord::new("Engineer", "Acme", "Berlin", "https://example.com/1"),
            JobRecord::new("Analyst", NA, "Hamburg", NA),
        ]
    }

    #[test]
    fn empty_input_returns_false_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        assert!(!write_spreadsheet(&[], &path));
        assert!(!path.exists());
    }

    #[test]
    fn writes_header_and_serial_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        assert!(write_spreadsheet(&sample_records(), &path));

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Sr. No.,Title,Company,Location,Email,Phone,Source URL"
        );
        assert!(lines.next().unwrap().starts_with("1,Engineer,Acme,Berlin"));
        assert!(lines.next().unwrap().starts_with("2,Analyst,N/A,Hamburg"));
    }

    #[test]
    fn blank_contact_fields_export_as_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");

        write_spreadsheet(&sample_records(), &path);

        let contents = std::fs::read_to_string(&path).unwrap();
        let row: Vec<&str> = contents.lines().nth(1).unwrap().split(',').collect();

        // Columns: serial, title, company, location, email, phone, url.
        assert_eq!(row[4], "");
        assert_eq!(row[5], "");
        assert_eq!(row[6], "https://example.com/1");
    }

    #[test]
    fn unwritable_path_returns_false() {
        let records = sample_records();
        let path = Path::new("/nonexistent-dir/jobs.csv");

        assert!(!write_spreadsheet(&records, path));
    }
}
