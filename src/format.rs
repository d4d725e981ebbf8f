//! Rendering of service results.
//!
//! Results are lists of JSON objects. They are rendered as a table of configured
//! columns, as a plain list of identifiers, or passed through as raw JSON. When the
//! output goes to a file, the file extension selects CSV or JSON for tables.

use crate::configuration::TableColumns;
use csv::Writer;
use serde_json::{Map, Value};
use std::path::Path;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Table cells longer than this are cut.
pub const MAX_CELL_WIDTH: usize = 60;

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// Error when an unsupported render format is requested
    #[error("invalid render format {0}")]
    UnsupportedRenderFormat(String),
    /// Error specific to CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    /// Error when converting bytes to UTF-8 string
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
    #[error("CSV writer into inner error: {0}")]
    CsvIntoInnerError(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),
}

/// How results are presented, chosen with `--render-as`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RenderFormat {
    #[default]
    Table,
    List,
    Raw,
}

impl RenderFormat {
    pub fn names() -> Vec<&'static str> {
        RenderFormat::iter().map(<&'static str>::from).collect()
    }
}

/// Encoding of the rendered output, derived from the output file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => OutputFormat::Csv,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Follows a dotted key path such as `titles.0.value` or `titles[0].value`.
pub fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let (name, indices) = match segment.find('[') {
            Some(position) => (&segment[..position], &segment[position..]),
            None => (segment, ""),
        };

        if !name.is_empty() {
            current = match current {
                Value::Object(map) => map.get(name)?,
                Value::Array(items) => items.get(name.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        for index in indices
            .split(|c| c == '[' || c == ']')
            .filter(|s| !s.is_empty())
        {
            current = current.as_array()?.get(index.parse::<usize>().ok()?)?;
        }
    }
    Some(current)
}

pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_values(values: &[Value], columns: &TableColumns) -> Self {
        let headers = columns.titles().map(str::to_string).collect();
        let rows = values
            .iter()
            .map(|value| {
                columns
                    .iter()
                    .map(|(_, path)| cell_text(value_at_path(value, path)))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn to_text(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| truncate(cell)).collect())
            .collect();

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                rows.iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let separator = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut output = vec![line(self.headers.as_slice()), separator];
        output.extend(rows.iter().map(|row| line(row.as_slice())));
        output.join("\n")
    }

    pub fn to_csv(&self) -> Result<String, FormattingError> {
        let mut writer = Writer::from_writer(vec![]);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(String::from_utf8(writer.into_inner()?)?)
    }

    pub fn to_json(&self) -> Result<String, FormattingError> {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(Value::String))
                    .collect();
                Value::Object(object)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&rows)?)
    }
}

/// A result prepared for output.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Empty,
    Table(Table),
    List(Vec<String>),
    Raw(Vec<Value>),
}

pub trait Formattable {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError>;
}

impl Formattable for Rendered {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match (self, f) {
            (Rendered::Empty, OutputFormat::Json) => Ok("[]".to_string()),
            (Rendered::Empty, _) => Ok(String::new()),
            (Rendered::Table(table), OutputFormat::Text) => Ok(table.to_text()),
            (Rendered::Table(table), OutputFormat::Csv) => table.to_csv(),
            (Rendered::Table(table), OutputFormat::Json) => table.to_json(),
            (Rendered::List(ids), OutputFormat::Json) => Ok(serde_json::to_string_pretty(ids)?),
            (Rendered::List(ids), OutputFormat::Csv) => {
                let mut writer = Writer::from_writer(vec![]);
                writer.write_record(["Id"])?;
                for id in ids {
                    writer.write_record([id])?;
                }
                Ok(String::from_utf8(writer.into_inner()?)?)
            }
            (Rendered::List(ids), OutputFormat::Text) => Ok(ids.join("\n")),
            (Rendered::Raw(values), _) => Ok(serde_json::to_string_pretty(values)?),
        }
    }
}
