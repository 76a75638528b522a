use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator};
use serde::de::DeserializeOwned;
use std::{cell::RefCell, fs::File, io::Read, path::Path};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

/// A delimited item reader that implements the `ItemReader` trait.
///
/// Each line of the source is tokenized on the delimiter. Only the included
/// fields are kept, in the order given, and they are mapped onto the item by
/// name through serde. Tokens are taken verbatim: no trimming, only the usual
/// unquoting of double-quoted fields.
///
/// # Examples
///
/// ```
/// use ch_import::company::Company;
/// use ch_import::core::item::ItemReader;
/// use ch_import::item::csv::csv_reader::CsvItemReaderBuilder;
///
/// let data = "Acme Ltd,001,active\nBeta Corp,002\n";
///
/// let reader = CsvItemReaderBuilder::new()
///     .included_fields(&[0, 1])
///     .names(&["companyName", "companyNumber"])
///     .from_reader(data.as_bytes());
///
/// let company: Company = reader.read().unwrap().unwrap();
/// assert_eq!(company, Company::new("Acme Ltd", "001"));
///
/// let company: Company = reader.read().unwrap().unwrap();
/// assert_eq!(company, Company::new("Beta Corp", "002"));
///
/// assert!(ItemReader::<Company>::read(&reader).unwrap().is_none());
/// ```
pub struct CsvItemReader<R> {
    /// Iterator over the raw records
    ///
    /// Uses `RefCell` so we can advance it from the `&self` signature of the
    /// `ItemReader` trait.
    records: RefCell<StringRecordsIntoIter<R>>,
    /// Positional indexes of the fields to keep; empty keeps every field
    included_fields: Vec<usize>,
    /// Names the kept fields are mapped onto; `None` maps them by position
    names: Option<StringRecord>,
}

impl<R: Read> CsvItemReader<R> {
    fn select_fields(&self, record: &StringRecord) -> Result<StringRecord, BatchError> {
        if self.included_fields.is_empty() {
            return Ok(record.clone());
        }

        let mut selected =
            StringRecord::with_capacity(record.as_slice().len(), self.included_fields.len());

        for &index in &self.included_fields {
            match record.get(index) {
                Some(field) => selected.push_field(field),
                None => {
                    return Err(BatchError::ItemReader(format!(
                        "line {}: expected at least {} fields, found {}",
                        line_of(record),
                        self.required_fields(),
                        record.len()
                    )));
                }
            }
        }

        Ok(selected)
    }

    fn required_fields(&self) -> usize {
        self.included_fields
            .iter()
            .max()
            .map_or(0, |index| index + 1)
    }
}

/// Failures of the underlying stream are `Io` errors, never malformed lines.
fn to_batch_error(error: csv::Error) -> BatchError {
    if !error.is_io_error() {
        return BatchError::ItemReader(error.to_string());
    }

    match error.into_kind() {
        csv::ErrorKind::Io(error) => BatchError::Io(error),
        kind => BatchError::ItemReader(format!("{:?}", kind)),
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

impl<R: Read, T: DeserializeOwned> ItemReader<T> for CsvItemReader<R> {
    /// Reads the next item.
    ///
    /// # Returns
    /// - `Ok(Some(item))` if a line was tokenized and mapped
    /// - `Ok(None)` if there are no more lines to read
    /// - `Err(BatchError::ItemReader(error))` naming the line that could not be
    ///   tokenized, lacks fields, or could not be mapped
    /// - `Err(BatchError::Io(error))` if the underlying stream failed
    fn read(&self) -> ItemReaderResult<T> {
        let Some(result) = self.records.borrow_mut().next() else {
            return Ok(None);
        };

        let record = result.map_err(to_batch_error)?;
        let selected = self.select_fields(&record)?;

        selected
            .deserialize(self.names.as_ref())
            .map(Some)
            .map_err(|error| {
                BatchError::ItemReader(format!("line {}: {}", line_of(&record), error))
            })
    }
}

/// A builder for configuring delimited item reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Terminator: CRLF (accepts `\r\n`, `\r` and `\n`)
/// - Headers: disabled
/// - Included fields: all
/// - Names: none, fields are mapped by position
#[derive(Default)]
pub struct CsvItemReaderBuilder {
    delimiter: u8,
    terminator: Terminator,
    has_headers: bool,
    included_fields: Vec<usize>,
    names: Vec<String>,
}

impl CsvItemReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            terminator: Terminator::CRLF,
            has_headers: false,
            included_fields: Vec::new(),
            names: Vec::new(),
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// When enabled, the first line is skipped instead of being read as data.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Positional indexes of the tokens to keep, in the order they are mapped.
    /// Any other token of the line is ignored.
    pub fn included_fields(mut self, indexes: &[usize]) -> Self {
        self.included_fields = indexes.to_vec();
        self
    }

    /// Names of the kept tokens, matched against the item's serde field names.
    pub fn names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Creates a `CsvItemReader` from any source implementing `Read`.
    ///
    /// Parsing is flexible: lines may carry more tokens than the included
    /// fields, those are ignored.
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvItemReader<R> {
        let rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(rdr);

        let names = if self.names.is_empty() {
            None
        } else {
            Some(StringRecord::from(self.names))
        };

        CsvItemReader {
            records: RefCell::new(rdr.into_records()),
            included_fields: self.included_fields,
            names,
        }
    }

    /// Creates a `CsvItemReader` from a file path.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvItemReader<File>, BatchError> {
        let file = File::open(path)?;
        Ok(self.from_reader(file))
    }
}
