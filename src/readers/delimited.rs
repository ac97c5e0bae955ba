//! Header-driven delimited rows shared by all record readers.

use crate::error::{GapError, Result};
use crate::models::ExtraData;
use crate::utils::constants::{DEFAULT_DATETIME_FORMATS, DEFAULT_DATE_FORMATS};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use rayon::prelude::*;
use std::io::Read;

/// Column names of one file. Names past the fixed leading columns are the
/// extra-data keys for every row in the batch.
#[derive(Debug, Clone)]
pub struct Header {
    names: Vec<String>,
    fixed: usize,
}

impl Header {
    pub fn new(names: Vec<String>, fixed: usize) -> Self {
        Self { names, fixed }
    }

    pub fn extra_keys(&self) -> &[String] {
        self.names.get(self.fixed..).unwrap_or(&[])
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Field `index` of a row, failing with `MissingColumn` on short rows.
    pub fn field<'r>(&self, record: &'r StringRecord, index: usize) -> Result<&'r str> {
        record.get(index).ok_or_else(|| GapError::MissingColumn {
            index,
            name: self.name(index).unwrap_or("?").to_string(),
        })
    }

    pub fn extra_data(&self, record: &StringRecord) -> Result<ExtraData> {
        self.extra_keys()
            .iter()
            .enumerate()
            .map(|(offset, key)| {
                let value = self.field(record, self.fixed + offset)?;
                Ok((key.clone(), value.to_string()))
            })
            .collect()
    }
}

/// Rows of one input, each tagged with its line number. Records the CSV
/// layer could not read are kept as errors so they can be counted.
pub struct DelimitedInput {
    pub header: Header,
    pub rows: Vec<(u64, std::result::Result<StringRecord, String>)>,
}

impl DelimitedInput {
    pub fn read<R: Read>(input: R, fixed: usize) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let names = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let header = Header::new(names, fixed);

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            // header is line 1
            let fallback_line = index as u64 + 2;
            match result {
                Ok(record) => {
                    let line = record.position().map_or(fallback_line, |p| p.line());
                    rows.push((line, Ok(record)));
                }
                Err(e) => {
                    let line = e.position().map_or(fallback_line, |p| p.line());
                    rows.push((line, Err(e.to_string())));
                }
            }
        }

        Ok(Self { header, rows })
    }

    /// Parse every row on the current rayon pool, preserving row order.
    pub fn parse_rows<T, F>(&self, parse: F) -> Vec<(u64, Result<T>)>
    where
        T: Send,
        F: Fn(&Header, &StringRecord) -> Result<T> + Sync,
    {
        self.rows
            .par_iter()
            .map(|(line, record)| {
                let parsed = match record {
                    Ok(record) => parse(&self.header, record),
                    Err(message) => Err(GapError::Parse(message.clone())),
                };
                (*line, parsed)
            })
            .collect()
    }
}

/// Reading timestamps in any of a list of formats; date-times keep only
/// their date.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl DateParser {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn parse(&self, text: &str) -> Result<NaiveDate> {
        let trimmed = text.trim();

        for format in &self.formats {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Ok(date);
            }
        }

        for format in DEFAULT_DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(datetime.date());
            }
        }

        Err(GapError::Parse(format!("Invalid date: '{}'", text)))
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

/// Optional numeric value: empty or non-numeric text is null.
pub fn parse_optional_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Required numeric value.
pub fn parse_value(text: &str) -> Result<f64> {
    parse_optional_value(text)
        .ok_or_else(|| GapError::Parse(format!("Invalid value: '{}'", text)))
}
