//! Destinations for extraction results
//!
//! `RecordTable` is the in-memory attribute table with columns
//! `date, year, month, day, median_value, sensor`; `CsvSink` streams the
//! same columns to any writer as results arrive.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::series::ExtractionResult;
use crate::utils::write_utils::{csv_field, json_number, json_string};

/// Column names shared by every table output
pub const COLUMNS: [&str; 6] = ["date", "year", "month", "day", "median_value", "sensor"];

/// Receives each successful result, in processing order
pub trait ResultSink {
    fn append(&mut self, result: &ExtractionResult) -> io::Result<()>;
}

impl ResultSink for Vec<ExtractionResult> {
    fn append(&mut self, result: &ExtractionResult) -> io::Result<()> {
        self.push(result.clone());
        Ok(())
    }
}

/// Output formats a `RecordTable` can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    pub fn from_name(name: &str) -> io::Result<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            _ => Err(io::Error::new(io::ErrorKind::InvalidInput,
                                    format!("Unsupported table format: {}", name))),
        }
    }
}

fn write_csv_header(writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "{}", COLUMNS.join(","))
}

/// An undefined median is an empty field, never a number
fn write_csv_row(writer: &mut impl Write, result: &ExtractionResult) -> io::Result<()> {
    let median = result.median_value.map(|value| value.to_string()).unwrap_or_default();
    writeln!(writer, "{},{},{},{},{},{}",
             result.date_string(), result.year(), result.month(), result.day(),
             median, csv_field(&result.sensor))
}

/// In-memory, append-only table of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<ExtractionResult>,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ExtractionResult] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn write_csv(&self, writer: &mut impl Write) -> io::Result<()> {
        write_csv_header(writer)?;
        for record in &self.records {
            write_csv_row(writer, record)?;
        }
        Ok(())
    }

    /// Writes the table as a JSON array of objects
    pub fn write_json(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "[")?;

        for (index, record) in self.records.iter().enumerate() {
            write!(writer, "  {{\"date\": {}, \"year\": {}, \"month\": {}, \"day\": {}, \"median_value\": {}, \"sensor\": {}}}",
                   json_string(&record.date_string()), record.year(), record.month(), record.day(),
                   json_number(record.median_value), json_string(&record.sensor))?;

            if index + 1 < self.records.len() {
                writeln!(writer, ",")?;
            } else {
                writeln!(writer)?;
            }
        }

        writeln!(writer, "]")?;
        Ok(())
    }

    /// Saves the table to `path` as `csv` or `json`
    pub fn save_to_file(&self, path: &Path, format: &str) -> io::Result<()> {
        let format = TableFormat::from_name(format)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        match format {
            TableFormat::Csv => self.write_csv(&mut writer)?,
            TableFormat::Json => self.write_json(&mut writer)?,
        }

        writer.flush()
    }
}

impl ResultSink for RecordTable {
    fn append(&mut self, result: &ExtractionResult) -> io::Result<()> {
        self.records.push(result.clone());
        Ok(())
    }
}

/// Streams CSV rows to a writer; the header is written on creation
pub struct CsvSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        write_csv_header(&mut writer)?;
        Ok(CsvSink { writer })
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn append(&mut self, result: &ExtractionResult) -> io::Result<()> {
        write_csv_row(&mut self.writer, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::AcquisitionDate;

    fn result(token: &str, sensor: &str, median: Option<f64>) -> ExtractionResult {
        ExtractionResult::new(AcquisitionDate::from_token(token).unwrap(), sensor, median)
    }

    fn sample_table() -> RecordTable {
        let mut table = RecordTable::new();
        table.append(&result("20010421", "Landsat4/5 (TM)", Some(0.5))).unwrap();
        table.append(&result("20020105", "Landsat7 (ETM+)", None)).unwrap();
        table
    }

    #[test]
    fn test_csv_leaves_undefined_median_empty() {
        let mut out = Vec::new();
        sample_table().write_csv(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(),
                   "date,year,month,day,median_value,sensor\n\
                    21-04-2001,2001,4,21,0.5,Landsat4/5 (TM)\n\
                    05-01-2002,2002,1,5,,Landsat7 (ETM+)\n");
    }

    #[test]
    fn test_json_uses_null_for_undefined_median() {
        let mut out = Vec::new();
        sample_table().write_json(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"median_value\": 0.5"));
        assert!(text.contains("\"median_value\": null"));
        assert!(text.trim_end().ends_with(']'));
    }

    #[test]
    fn test_csv_sink_streams_rows() {
        let mut sink = CsvSink::new(Vec::new()).unwrap();
        sink.append(&result("20010421", "L5", Some(0.25))).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        assert_eq!(text, "date,year,month,day,median_value,sensor\n21-04-2001,2001,4,21,0.25,L5\n");
    }

    #[test]
    fn test_save_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let err = sample_table().save_to_file(&dir.path().join("out.xml"), "xml").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
