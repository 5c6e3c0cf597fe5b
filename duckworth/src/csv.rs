//! Utilities for working with CSV files.
//!
//! The format is the simple one produced by spreadsheet exports: comma-separated, no quoting, one
//! record per line. Blank lines are skipped and fields are trimmed.

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use rustc_hash::FxHashMap;

pub struct CsvReader<R: BufRead> {
    lines: Lines<R>,
}
impl CsvReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}
impl<R: BufRead> CsvReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    pub fn read(&mut self) -> Option<Result<Vec<String>, io::Error>> {
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    return Some(Ok(line
                        .split(',')
                        .map(|field| field.trim().to_string())
                        .collect()))
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Consumes the first record as a header, returning a reader of named records.
    pub fn with_header(mut self) -> Result<HeaderedCsvReader<R>, io::Error> {
        let header = self.read().transpose()?.unwrap_or_default();
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name, index))
            .collect();
        Ok(HeaderedCsvReader {
            reader: self,
            columns,
        })
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Vec<String>, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

pub struct HeaderedCsvReader<R: BufRead> {
    reader: CsvReader<R>,
    columns: FxHashMap<String, usize>,
}
impl<R: BufRead> HeaderedCsvReader<R> {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }
}

impl<R: BufRead> Iterator for HeaderedCsvReader<R> {
    type Item = Result<Record, io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read().map(|fields| {
            fields.map(|fields| Record {
                columns: self.columns.clone(),
                fields,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: FxHashMap<String, usize>,
    fields: Vec<String>,
}
impl Record {
    /// The value of the named column, if the column exists and the field is non-empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        let &index = self.columns.get(column)?;
        self.fields
            .get(index)
            .map(String::as_str)
            .filter(|field| !field.is_empty())
    }

    /// The value of the first of `columns` that parses as a finite number.
    pub fn get_f64(&self, columns: &[&str]) -> Option<f64> {
        columns.iter().find_map(|column| {
            self.get(column)
                .and_then(|field| field.parse::<f64>().ok())
                .filter(|value| value.is_finite())
        })
    }
}
