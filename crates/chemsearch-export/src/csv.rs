//! CSV serialization of result rows.
//!
//! The dialect is fixed: comma delimiter, `\n` row terminator, embedded line
//! breaks rewritten to the two characters `\n`, and fields quoted with `"`
//! only when they contain a comma or a quote.

use std::borrow::Cow;

use chemsearch_storage::Record;
use serde_json::Value;

use crate::{ExportError, Result};

/// A serialized collection, ready to be written to transient storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvArtifact {
    /// File name, `<collection>.csv`.
    pub name: String,
    /// UTF-8 CSV text.
    pub content: Vec<u8>,
    /// Number of data rows (header excluded).
    pub row_count: usize,
}

impl CsvArtifact {
    /// Serializes `records` for `collection`.
    ///
    /// Returns `Ok(None)` for an empty sequence; no header-only file is ever
    /// produced.
    pub fn from_records(collection: &str, records: &[Record]) -> Result<Option<Self>> {
        let Some(content) = CsvSerializer::new().serialize(records)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            name: format!("{collection}.csv"),
            content,
            row_count: records.len(),
        }))
    }
}

/// Serializer for homogeneous record sequences.
#[derive(Debug, Clone)]
pub struct CsvSerializer {
    /// Field delimiter (default: comma).
    pub delimiter: u8,

    /// Quote character (default: double quote).
    pub quote: u8,
}

impl Default for CsvSerializer {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize records into CSV bytes.
    ///
    /// The header comes from the first record's key order. Every other record
    /// must carry exactly the same field names; values are emitted in header
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Serialization` if a record's fields differ from
    /// the header, or if the underlying writer fails.
    pub fn serialize(&self, records: &[Record]) -> Result<Option<Vec<u8>>> {
        let Some(first) = records.first() else {
            return Ok(None);
        };
        let header: Vec<&str> = first.keys().map(String::as_str).collect();

        let mut writer = ::csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .quote_style(::csv::QuoteStyle::Necessary)
            .terminator(::csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(Vec::new());

        writer
            .write_record(header.iter().map(|h| escape_newlines(h).into_owned()))
            .map_err(|e| ExportError::serialization(e.to_string()))?;

        for (index, record) in records.iter().enumerate() {
            check_shape(index, record, &header)?;
            let fields = header.iter().map(|h| {
                let text = record.get(*h).map(value_to_text).unwrap_or_default();
                escape_newlines(&text).into_owned()
            });
            writer
                .write_record(fields)
                .map_err(|e| ExportError::serialization(e.to_string()))?;
        }

        writer
            .into_inner()
            .map(Some)
            .map_err(|e| ExportError::serialization(e.to_string()))
    }
}

fn check_shape(index: usize, record: &Record, header: &[&str]) -> Result<()> {
    if record.len() != header.len() || header.iter().any(|h| !record.contains_key(*h)) {
        let fields: Vec<&str> = record.keys().map(String::as_str).collect();
        return Err(ExportError::serialization(format!(
            "row {index} has fields [{}], expected [{}]",
            fields.join(", "),
            header.join(", ")
        )));
    }
    Ok(())
}

/// Convert a JSON value to the text emitted in a CSV cell.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // Rows are flat; anything nested is written as compact JSON.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Replace CR/LF sequences with the literal two-character escape `\n`.
pub fn escape_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains(['\r', '\n']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\\n").replace(['\r', '\n'], "\\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(rows: Value) -> Vec<Record> {
        serde_json::from_value(rows).unwrap()
    }

    fn to_string(records: &[Record]) -> String {
        let bytes = CsvSerializer::new().serialize(records).unwrap().unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_empty_sequence_produces_nothing() {
        assert!(CsvSerializer::new().serialize(&[]).unwrap().is_none());
        assert!(CsvArtifact::from_records("chemical", &[]).unwrap().is_none());
    }

    #[test]
    fn test_header_and_rows() {
        let rows = records(json!([
            {"Substance_Name": "Caffeine", "Structure_MolWt": 194.19},
            {"Substance_Name": "Bisphenol A", "Structure_MolWt": 228.29},
        ]));
        assert_eq!(
            to_string(&rows),
            "Substance_Name,Structure_MolWt\nCaffeine,194.19\nBisphenol A,228.29\n"
        );
    }

    #[test]
    fn test_null_renders_empty() {
        let rows = records(json!([{"a": null, "b": 1, "c": true}]));
        assert_eq!(to_string(&rows), "a,b,c\n,1,true\n");
    }

    #[test]
    fn test_comma_is_quoted() {
        let rows = records(json!([{"name": "1,3,7-trimethylxanthine", "id": 1}]));
        assert_eq!(to_string(&rows), "name,id\n\"1,3,7-trimethylxanthine\",1\n");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let rows = records(json!([{"name": "say \"hi\", then", "id": 1}]));
        assert_eq!(to_string(&rows), "name,id\n\"say \"\"hi\"\", then\",1\n");
    }

    #[test]
    fn test_newlines_are_escaped() {
        let rows = records(json!([{"note": "line1\nline2\r\nline3\rline4", "id": 7}]));
        let out = to_string(&rows);
        assert_eq!(out, "note,id\nline1\\nline2\\nline3\\nline4,7\n");
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn test_values_follow_header_order() {
        let mut second = Record::new();
        second.insert("b".into(), json!(2));
        second.insert("a".into(), json!(1));
        let rows = vec![records(json!([{"a": 10, "b": 20}])).remove(0), second];
        assert_eq!(to_string(&rows), "a,b\n10,20\n1,2\n");
    }

    #[test]
    fn test_heterogeneous_rows_rejected() {
        let rows = records(json!([{"a": 1, "b": 2}, {"a": 1, "c": 3}]));
        let err = CsvSerializer::new().serialize(&rows).unwrap_err();
        assert!(matches!(err, ExportError::Serialization { .. }));
        assert!(err.to_string().contains("row 1"));

        let short = records(json!([{"a": 1, "b": 2}, {"a": 1}]));
        assert!(CsvSerializer::new().serialize(&short).is_err());
    }

    #[test]
    fn test_artifact_metadata() {
        let rows = records(json!([{"x": 1}, {"x": 2}, {"x": 3}]));
        let artifact = CsvArtifact::from_records("chemical", &rows).unwrap().unwrap();
        assert_eq!(artifact.name, "chemical.csv");
        assert_eq!(artifact.row_count, 3);
    }

    #[test]
    fn test_round_trip_through_csv_reader() {
        let rows = records(json!([
            {"name": "Caffeine", "smiles": "CN1C=NC2=C1C(=O)N(C(=O)N2C)C", "weight": 194.19, "note": null},
            {"name": "a, b", "smiles": "x\"y", "weight": 1, "note": "multi\nline"},
            {"name": "", "smiles": "plain", "weight": -3.5, "note": "trailing\r\n"},
        ]));
        let bytes = CsvSerializer::new().serialize(&rows).unwrap().unwrap();

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["name", "smiles", "weight", "note"]);

        let parsed: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(parsed.len(), rows.len());
        for (record, row) in rows.iter().zip(parsed.iter()) {
            for (i, value) in record.values().enumerate() {
                let expected = value_to_text(value);
                let actual = row[i].replace("\\n", "\n");
                assert_eq!(actual, expected.replace("\r\n", "\n").replace('\r', "\n"));
            }
        }
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&Value::Null), "");
        assert_eq!(value_to_text(&json!(false)), "false");
        assert_eq!(value_to_text(&json!(42)), "42");
        assert_eq!(value_to_text(&json!("hello")), "hello");
        assert_eq!(value_to_text(&json!(["a", 1])), "[\"a\",1]");
    }

    #[test]
    fn test_escape_newlines_borrows_clean_text() {
        assert!(matches!(escape_newlines("clean"), Cow::Borrowed("clean")));
        assert_eq!(escape_newlines("a\r\nb"), "a\\nb");
    }
}
