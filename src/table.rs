use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Trimmed cell content, `None` when the column is missing or blank.
    pub fn text(&self, column: Option<usize>) -> Option<&str> {
        column
            .and_then(|index| self.get(index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn is_empty_at(&self, column: usize) -> bool {
        self.get(column).map_or(true, str::is_empty)
    }

    pub fn set(&mut self, column: usize, value: String) {
        if column >= self.cells.len() {
            self.cells.resize(column + 1, String::new());
        }
        self.cells[column] = value;
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.cells.len() < width {
                    row.cells.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

pub fn parse_csv<R: Read>(reader: R) -> AppResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();
    if headers.is_empty() {
        return Err(AppError::Parse("input table has no header row".into()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(Row::new(record.iter().map(str::to_string).collect()));
    }
    Ok(Table::new(headers, rows))
}

pub fn write_csv<W: Write>(table: &Table, writer: W) -> AppResult<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(&row.cells)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_table(path: &Path) -> AppResult<Table> {
    let file = File::open(path)?;
    let table = parse_csv(file)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.headers().len(),
        "loaded input table"
    );
    Ok(table)
}

/// Writes the whole table in one go. Refuses to overwrite the input file.
pub fn write_table(table: &Table, input: &Path, output: &Path) -> AppResult<()> {
    ensure_distinct(input, output)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output)?;
    write_csv(table, file)?;
    info!(path = %output.display(), rows = table.len(), "saved enriched table");
    Ok(())
}

pub fn ensure_distinct(input: &Path, output: &Path) -> AppResult<()> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        debug!(path = %input.display(), "output path matches input");
        return Err(AppError::Config(format!(
            "output path {} must differ from the input",
            output.display()
        )));
    }
    Ok(())
}
