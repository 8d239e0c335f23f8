//! Export command handler

use crate::cli::ExportFormat;
use anyhow::{Context, Result};
use droprate::calc::to_approx_fraction;
use droprate::{DropIndex, ExportError, ExportRow, ExportSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: [&str; 5] = ["monster", "item", "rate", "percent", "note"];

/// Written ahead of CSV and TSV so spreadsheet tools detect UTF-8
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV or TSV rows with a header line
struct DelimitedSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DelimitedSink<W> {
    fn new(inner: W, delimiter: u8) -> Result<Self, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(inner);
        writer.write_record(HEADER).map_err(sink_error)?;
        Ok(Self { writer })
    }

    fn finish(mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> ExportSink for DelimitedSink<W> {
    fn write_row(&mut self, row: &ExportRow) -> Result<(), ExportError> {
        let rate = format!("1/{}", to_approx_fraction(row.probability));
        let percent = format!("{:.6}", row.probability * 100.0);
        let note = if row.grouped { "child" } else { "" };

        self.writer
            .write_record([
                row.monster.as_str(),
                row.item.as_str(),
                rate.as_str(),
                percent.as_str(),
                note,
            ])
            .map_err(sink_error)
    }
}

fn sink_error(e: csv::Error) -> ExportError {
    ExportError::Sink(Box::new(e))
}

/// Write every row of `index` to `out` in `format`. Returns the row count.
fn write_export<W: Write>(index: &DropIndex, mut out: W, format: ExportFormat) -> Result<usize> {
    match format {
        ExportFormat::Csv | ExportFormat::Tsv => {
            out.write_all(UTF8_BOM)?;
            let delimiter = if format == ExportFormat::Tsv { b'\t' } else { b',' };
            let mut sink = DelimitedSink::new(out, delimiter)?;
            let rows = index.export_all(&mut sink)?;
            sink.finish()?;
            Ok(rows)
        }
        ExportFormat::Json => {
            let mut rows: Vec<ExportRow> = Vec::new();
            index.export_all(&mut rows)?;
            serde_json::to_writer_pretty(&mut out, &rows)?;
            out.flush()?;
            Ok(rows.len())
        }
    }
}

/// Handle the export command
pub fn handle(index: &DropIndex, output: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let rows = write_export(index, BufWriter::new(file), format)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    println!("Wrote {} rows to {}", rows, output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use droprate::MonsterRecord;

    fn index() -> DropIndex {
        let mut orc = MonsterRecord::new("Orc");
        orc.add_entry("Sword", 0.001);
        orc.add_child_group(0.1, ["Ring", "Gem"]);
        DropIndex::from_records([orc])
    }

    fn export_string(format: ExportFormat) -> String {
        let mut out = Vec::new();
        write_export(&index(), &mut out, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_csv_export() {
        let csv = export_string(ExportFormat::Csv);
        let csv = csv.strip_prefix('\u{feff}').unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "monster,item,rate,percent,note",
                "Orc,Sword,1/1000,0.100000,",
                "Orc,Ring,1/20,5.000000,child",
                "Orc,Gem,1/20,5.000000,child",
            ]
        );
    }

    #[test]
    fn test_tsv_export() {
        let tsv = export_string(ExportFormat::Tsv);
        assert!(tsv.starts_with("\u{feff}monster\titem\trate\tpercent\tnote\n"));
        assert!(tsv.contains("Orc\tSword\t1/1000\t0.100000\t\n"));
    }

    #[test]
    fn test_json_export() {
        let json = export_string(ExportFormat::Json);
        assert!(json.starts_with('['));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["monster"], "Orc");
        assert_eq!(rows[0]["item"], "Sword");
        assert_eq!(rows[1]["grouped"], true);
    }

    #[test]
    fn test_handle_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("drops.csv");
        handle(&index(), &path, ExportFormat::Csv).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(UTF8_BOM));
        assert_eq!(String::from_utf8(written).unwrap().lines().count(), 4);
    }
}
