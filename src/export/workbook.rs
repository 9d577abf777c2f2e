use flate2::write::GzEncoder;
use flate2::Compression;

use crate::export::{table_to_csv, ExportError};
use crate::reports::Table;

/// Bundle one CSV per table into a single gzipped tar archive — the
/// "workbook" download, one sheet per dataset. Entry names come from the
/// table titles, lowercased with spaces collapsed to underscores.
pub fn tables_to_workbook(tables: &[Table]) -> Result<Vec<u8>, ExportError> {
    let mut archive_bytes = Vec::new();
    {
        let gz = GzEncoder::new(&mut archive_bytes, Compression::default());
        let mut tar = tar::Builder::new(gz);

        for table in tables {
            let csv_bytes = table_to_csv(table)?;
            let name = format!("{}.csv", sheet_name(&table.title));

            let mut header = tar::Header::new_gnu();
            header.set_size(csv_bytes.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, &name, csv_bytes.as_slice())?;
        }

        tar.into_inner()?.finish()?;
    }
    Ok(archive_bytes)
}

fn sheet_name(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn table(title: &str) -> Table {
        Table {
            title: title.into(),
            columns: vec!["chart_number".into()],
            rows: vec![vec!["CH-0042".into()]],
        }
    }

    #[test]
    fn sheet_names_are_filesystem_safe() {
        assert_eq!(sheet_name("Patient Demographics"), "patient_demographics");
        assert_eq!(sheet_name("Prenatal Care Records"), "prenatal_care_records");
        assert_eq!(sheet_name("Education & Prevention"), "education_prevention");
    }

    #[test]
    fn archive_contains_one_csv_per_table() {
        let bytes = tables_to_workbook(&[
            table("Patient Demographics"),
            table("Appointments"),
        ])
        .unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["patient_demographics.csv", "appointments.csv"]);
    }

    #[test]
    fn entries_round_trip_their_csv() {
        let bytes = tables_to_workbook(&[table("Appointments")]).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();

        assert!(content.starts_with("chart_number"));
        assert!(content.contains("CH-0042"));
    }

    #[test]
    fn empty_workbook_is_a_valid_archive() {
        let bytes = tables_to_workbook(&[]).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        assert_eq!(archive.entries().unwrap().count(), 0);
    }
}
