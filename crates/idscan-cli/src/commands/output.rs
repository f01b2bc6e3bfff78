//! Record output formats.

use std::io::Write;

use idscan_core::extraction::rules::format_cpf;
use idscan_core::ExtractionRecord;

/// Separator printed after each JSON record on the console.
pub const RECORD_SEPARATOR: &str = "————————————————————————————————————————";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

const CSV_HEADER: [&str; 5] = ["fileFullName", "textLanguage", "Name", "CPF", "DOB"];

/// Writes records one at a time in the chosen format.
pub enum RecordWriter {
    /// Pretty JSON per record followed by a separator line.
    JsonStream(Box<dyn Write>),
    /// Records collected and written as one JSON array on finish.
    JsonArray {
        out: Box<dyn Write>,
        records: Vec<ExtractionRecord>,
    },
    /// CSV with a header row.
    Csv(csv::Writer<Box<dyn Write>>),
    /// Human-readable blocks.
    Text(Box<dyn Write>),
}

impl RecordWriter {
    /// Create a writer. `console` selects the streaming JSON layout.
    pub fn new(format: OutputFormat, out: Box<dyn Write>, console: bool) -> anyhow::Result<Self> {
        Ok(match format {
            OutputFormat::Json if console => RecordWriter::JsonStream(out),
            OutputFormat::Json => RecordWriter::JsonArray { out, records: Vec::new() },
            OutputFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(out);
                wtr.write_record(CSV_HEADER)?;
                RecordWriter::Csv(wtr)
            }
            OutputFormat::Text => RecordWriter::Text(out),
        })
    }

    pub fn write(&mut self, record: &ExtractionRecord) -> anyhow::Result<()> {
        match self {
            RecordWriter::JsonStream(out) => {
                writeln!(out, "{}", serde_json::to_string_pretty(record)?)?;
                writeln!(out, "{}", RECORD_SEPARATOR)?;
                out.flush()?;
            }
            RecordWriter::JsonArray { records, .. } => records.push(record.clone()),
            RecordWriter::Csv(wtr) => {
                wtr.write_record(csv_row(record))?;
                wtr.flush()?;
            }
            RecordWriter::Text(out) => {
                write!(out, "{}", format_record_text(record))?;
                out.flush()?;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> anyhow::Result<()> {
        match self {
            RecordWriter::JsonArray { mut out, records } => {
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
                out.flush()?;
            }
            RecordWriter::Csv(mut wtr) => wtr.flush()?,
            RecordWriter::JsonStream(mut out) | RecordWriter::Text(mut out) => out.flush()?,
        }
        Ok(())
    }
}

fn csv_row(record: &ExtractionRecord) -> [&str; 5] {
    [
        &record.file_full_name,
        &record.text_language,
        &record.name,
        &record.cpf,
        &record.dob,
    ]
}

/// Format one record for the text output.
pub fn format_record_text(record: &ExtractionRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", record.file_full_name));
    output.push_str(&format!("  Name:          {}\n", record.name));
    output.push_str(&format!("  CPF:           {}\n", format_cpf(&record.cpf)));
    output.push_str(&format!("  Date of birth: {}\n", record.dob));
    output.push_str(&format!("  Language:      {}\n", record.text_language));
    output.push('\n');

    output
}

/// Render a single record to a string.
pub fn format_record(record: &ExtractionRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(CSV_HEADER)?;
            wtr.write_record(csv_row(record))?;
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(format_record_text(record)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record() -> ExtractionRecord {
        ExtractionRecord {
            file_full_name: "images/01.jpg".to_string(),
            text_language: "Portuguese".to_string(),
            name: "Jane Doe".to_string(),
            cpf: "52998224725".to_string(),
            dob: "1990-05-14".to_string(),
        }
    }

    #[test]
    fn test_json_stream_layout() {
        let buf = SharedBuf::default();
        let mut writer =
            RecordWriter::new(OutputFormat::Json, Box::new(buf.clone()), true).unwrap();
        writer.write(&record()).unwrap();
        writer.write(&ExtractionRecord::unknown("images/02.jpg")).unwrap();
        writer.finish().unwrap();

        let out = buf.contents();
        assert_eq!(out.matches(RECORD_SEPARATOR).count(), 2);
        assert!(out.starts_with("{\n  \"fileFullName\": \"images/01.jpg\",\n  \"textLanguage\""));
    }

    #[test]
    fn test_json_array_on_finish() {
        let buf = SharedBuf::default();
        let mut writer =
            RecordWriter::new(OutputFormat::Json, Box::new(buf.clone()), false).unwrap();
        writer.write(&record()).unwrap();
        assert!(buf.contents().is_empty());
        writer.finish().unwrap();

        let parsed: Vec<ExtractionRecord> = serde_json::from_str(&buf.contents()).unwrap();
        assert_eq!(parsed, vec![record()]);
    }

    #[test]
    fn test_csv_rows() {
        let buf = SharedBuf::default();
        let mut writer =
            RecordWriter::new(OutputFormat::Csv, Box::new(buf.clone()), true).unwrap();
        writer.write(&record()).unwrap();
        writer.finish().unwrap();

        assert_eq!(
            buf.contents(),
            "fileFullName,textLanguage,Name,CPF,DOB\nimages/01.jpg,Portuguese,Jane Doe,52998224725,1990-05-14\n"
        );
    }

    #[test]
    fn test_text_format() {
        let text = format_record_text(&record());
        assert!(text.contains("CPF:           529.982.247-25"));
        assert!(text.contains("Date of birth: 1990-05-14"));

        let unknown = format_record_text(&ExtractionRecord::unknown("x.png"));
        assert!(unknown.contains("CPF:           Unknown"));
    }
}
