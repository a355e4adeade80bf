//! Strategies available by short name without registration

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use super::{RenderError, ResponseGenerator, StrategyFactory};
use crate::config::{ConfigError, ModeSettings};
use crate::database::{Row, Value};
use crate::response::Response;

pub const ROW_TO_TEXT: &str = "rowToText";
pub const ROW_TO_HTML: &str = "rowToHtml";
pub const CONTENT_COLUMN: &str = "contentColumn";
pub const FILEPATH_COLUMN: &str = "filepathColumn";

pub(crate) const BUILTINS: &[(&str, StrategyFactory)] = &[
    (ROW_TO_TEXT, RowToText::from_settings),
    (ROW_TO_HTML, RowToHtml::from_settings),
    (CONTENT_COLUMN, ContentColumn::from_settings),
    (FILEPATH_COLUMN, FilepathColumn::from_settings),
];

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

fn setting<'a>(settings: &'a ModeSettings, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn column<'r>(row: &'r Row, name: &str) -> Result<&'r Value, RenderError> {
    row.get(name)
        .ok_or_else(|| RenderError::MissingColumn(name.to_string()))
}

/// Column names on one CSV line, values on the next
#[derive(Debug, Default)]
pub struct RowToText;

impl RowToText {
    fn from_settings(_settings: &ModeSettings) -> Result<Box<dyn ResponseGenerator>, ConfigError> {
        Ok(Box::new(Self))
    }
}

impl ResponseGenerator for RowToText {
    fn generate_response(&self, row: &Row, response: &mut dyn Response) -> Result<(), RenderError> {
        response.set_content_type(TEXT_PLAIN);

        let header: Vec<&str> = row.column_names().iter().map(String::as_str).collect();
        let values: Vec<String> = row
            .iter()
            .map(|(_, value)| value.to_text().unwrap_or_default())
            .collect();

        let out = response.body();
        write_csv_line(out, header.iter().copied())?;
        write_csv_line(out, values.iter().map(String::as_str))?;
        Ok(())
    }
}

fn write_csv_line<'a>(out: &mut dyn Write, fields: impl Iterator<Item = &'a str>) -> io::Result<()> {
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.write_all(b",")?;
        }
        if field.contains([',', '"', '\n', '\r']) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            out.write_all(field.as_bytes())?;
        }
    }
    out.write_all(b"\n")
}

/// Two-column name/value HTML table
#[derive(Debug, Default)]
pub struct RowToHtml {
    title_column: Option<String>,
}

impl RowToHtml {
    fn from_settings(settings: &ModeSettings) -> Result<Box<dyn ResponseGenerator>, ConfigError> {
        Ok(Box::new(Self {
            title_column: setting(settings, "title").map(str::to_string),
        }))
    }
}

impl ResponseGenerator for RowToHtml {
    fn generate_response(&self, row: &Row, response: &mut dyn Response) -> Result<(), RenderError> {
        let title = match &self.title_column {
            Some(name) => column(row, name)?.to_text().unwrap_or_default(),
            None => String::from("Database Result"),
        };

        response.set_content_type(TEXT_HTML);
        let out = response.body();
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html><head><meta charset=\"utf-8\">")?;
        writeln!(out, "<title>{}</title>", html_escape::encode_text(&title))?;
        writeln!(out, "</head><body><table>")?;
        for (name, value) in row.iter() {
            let text = value.to_text().unwrap_or_default();
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                html_escape::encode_text(name),
                html_escape::encode_text(&text)
            )?;
        }
        writeln!(out, "</table></body></html>")?;
        Ok(())
    }
}

/// Body is the raw value of one column
#[derive(Debug)]
pub struct ContentColumn {
    column_name: String,
    content_type_override: Option<String>,
    content_type_column: Option<String>,
}

impl ContentColumn {
    fn from_settings(settings: &ModeSettings) -> Result<Box<dyn ResponseGenerator>, ConfigError> {
        let content_type_override = setting(settings, "contentTypeOverride").map(str::to_string);
        let content_type_column = setting(settings, "contentTypeCol").map(str::to_string);
        if content_type_override.is_some() && content_type_column.is_some() {
            return Err(ConfigError::Strategy {
                mode: CONTENT_COLUMN.to_string(),
                message: "contentTypeOverride and contentTypeCol are mutually exclusive".to_string(),
            });
        }
        Ok(Box::new(Self {
            column_name: setting(settings, "columnName")
                .unwrap_or("content")
                .to_string(),
            content_type_override,
            content_type_column,
        }))
    }
}

impl ResponseGenerator for ContentColumn {
    fn generate_response(&self, row: &Row, response: &mut dyn Response) -> Result<(), RenderError> {
        let content = column(row, &self.column_name)?;

        if let Some(content_type) = &self.content_type_override {
            response.set_content_type(content_type);
        } else if let Some(name) = &self.content_type_column {
            if let Some(content_type) = column(row, name)?.to_text() {
                response.set_content_type(&content_type);
            }
        }

        // NULL content yields an empty body
        if !content.is_null() {
            response.body().write_all(&content.to_bytes())?;
        }
        Ok(())
    }
}

/// Body is the content of the file named by one column
#[derive(Debug)]
pub struct FilepathColumn {
    column_name: String,
    content_type_override: Option<String>,
}

impl FilepathColumn {
    fn from_settings(settings: &ModeSettings) -> Result<Box<dyn ResponseGenerator>, ConfigError> {
        Ok(Box::new(Self {
            column_name: setting(settings, "columnName")
                .unwrap_or("filepath")
                .to_string(),
            content_type_override: setting(settings, "contentTypeOverride").map(str::to_string),
        }))
    }
}

impl ResponseGenerator for FilepathColumn {
    fn generate_response(&self, row: &Row, response: &mut dyn Response) -> Result<(), RenderError> {
        let path = column(row, &self.column_name)?
            .to_text()
            .ok_or_else(|| RenderError::Unrenderable {
                column: self.column_name.clone(),
                message: "file path is NULL".to_string(),
            })?;

        let mut file = File::open(Path::new(&path))?;
        if let Some(content_type) = &self.content_type_override {
            response.set_content_type(content_type);
        }
        io::copy(&mut file, response.body())?;
        Ok(())
    }
}
