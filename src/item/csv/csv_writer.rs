use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::Write,
    path::Path,
    result,
};

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
    item::open_output,
};

/// A CSV item writer.
///
/// Without field names, items are serialized with serde in their declared
/// field order. With field names, each record holds exactly those fields in
/// the given order, looked up by serde name.
pub struct CsvItemWriter<W: Write> {
    wrapper: RefCell<Writer<W>>,
    field_names: Vec<String>,
    has_headers: bool,
    header_written: Cell<bool>,
}

impl<W: Write, T: Serialize> ItemWriter<T> for CsvItemWriter<W> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        for item in items {
            self.write_item(item)?;
        }
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }

    fn close(&self) -> ItemWriterResult {
        ItemWriter::<T>::flush(self)
    }
}

impl<W: Write> CsvItemWriter<W> {
    fn write_item<T: Serialize>(&self, item: &T) -> ItemWriterResult {
        let mut wrapper = self.wrapper.borrow_mut();

        if self.field_names.is_empty() {
            return wrapper.serialize(item).map_err(to_batch_error);
        }

        let record = extract_fields(item, &self.field_names)?;

        if self.has_headers && !self.header_written.replace(true) {
            wrapper
                .write_record(&self.field_names)
                .map_err(to_batch_error)?;
        }

        wrapper.write_record(&record).map_err(to_batch_error)
    }

    pub fn into_inner(self) -> result::Result<W, BatchError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

fn to_batch_error(error: csv::Error) -> BatchError {
    match error.kind() {
        csv::ErrorKind::Serialize(_) => BatchError::Serialization(error.to_string()),
        _ => BatchError::ItemWriter(error.to_string()),
    }
}

/// Renders the named fields of an item, in the order of `names`.
fn extract_fields<T: Serialize>(item: &T, names: &[String]) -> Result<Vec<String>, BatchError> {
    let value =
        serde_json::to_value(item).map_err(|error| BatchError::Serialization(error.to_string()))?;

    let Value::Object(fields) = value else {
        return Err(BatchError::Serialization(
            "item does not serialize to named fields".to_string(),
        ));
    };

    names
        .iter()
        .map(|name| match fields.get(name) {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Null) => Ok(String::new()),
            Some(other) => Ok(other.to_string()),
            None => Err(BatchError::Serialization(format!("no field named {}", name))),
        })
        .collect()
}

#[derive(Default)]
pub struct CsvItemWriterBuilder {
    delimiter: u8,
    has_headers: bool,
    field_names: Vec<String>,
    append: bool,
}

impl CsvItemWriterBuilder {
    pub fn new() -> CsvItemWriterBuilder {
        CsvItemWriterBuilder {
            delimiter: b',',
            has_headers: false,
            field_names: Vec::new(),
            append: false,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvItemWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, yes: bool) -> CsvItemWriterBuilder {
        self.has_headers = yes;
        self
    }

    /// Fields to emit, by serde name, in output order.
    pub fn field_names(mut self, names: &[&str]) -> CsvItemWriterBuilder {
        self.field_names = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Appends to an existing file instead of truncating it.
    pub fn append(mut self, yes: bool) -> CsvItemWriterBuilder {
        self.append = yes;
        self
    }

    /// Opens the output file. When appending to a file that already holds
    /// records, no header row is written.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvItemWriter<File>, BatchError> {
        let file = open_output(path.as_ref(), self.append)?;
        let header_pending = !self.append || file.metadata()?.len() == 0;
        Ok(self.build(file, header_pending))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> CsvItemWriter<W> {
        self.build(wtr, true)
    }

    fn build<W: Write>(self, wtr: W, header_pending: bool) -> CsvItemWriter<W> {
        let wtr = WriterBuilder::new()
            .flexible(false)
            .delimiter(self.delimiter)
            .has_headers(self.has_headers && header_pending)
            .from_writer(wtr);

        CsvItemWriter {
            wrapper: RefCell::new(wtr),
            field_names: self.field_names,
            has_headers: self.has_headers,
            header_written: Cell::new(!header_pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env::temp_dir, error::Error, fs};

    use rand::distr::{Alphanumeric, SampleString};

    use crate::{
        BatchError,
        company::{CSV_OUTPUT_FIELDS, Company},
        core::item::ItemWriter,
        item::csv::csv_writer::CsvItemWriterBuilder,
    };

    fn companies() -> Vec<Company> {
        vec![
            Company::new("Acme Ltd", "001"),
            Company::new("Beta Corp", "002"),
        ]
    }

    #[test]
    fn companies_should_be_written_number_first() -> Result<(), Box<dyn Error>> {
        let wtr = CsvItemWriterBuilder::new()
            .field_names(&CSV_OUTPUT_FIELDS)
            .from_writer(vec![]);

        wtr.write(&companies())?;

        let data = String::from_utf8(wtr.into_inner()?)?;
        assert_eq!(data, "001,Acme Ltd\n002,Beta Corp\n");

        Ok(())
    }

    #[test]
    fn without_field_names_serde_order_should_be_kept() -> Result<(), Box<dyn Error>> {
        let wtr = CsvItemWriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);

        wtr.write(&companies())?;

        let data = String::from_utf8(wtr.into_inner()?)?;
        assert_eq!(
            data,
            "companyName,companyNumber\nAcme Ltd,001\nBeta Corp,002\n"
        );

        Ok(())
    }

    #[test]
    fn header_should_follow_field_names() -> Result<(), Box<dyn Error>> {
        let wtr = CsvItemWriterBuilder::new()
            .has_headers(true)
            .field_names(&CSV_OUTPUT_FIELDS)
            .from_writer(vec![]);

        wtr.write(&companies()[..1])?;
        wtr.write(&companies()[1..])?;

        let data = String::from_utf8(wtr.into_inner()?)?;
        assert_eq!(
            data,
            "companyNumber,companyName\n001,Acme Ltd\n002,Beta Corp\n"
        );

        Ok(())
    }

    #[test]
    fn field_containing_delimiter_should_be_quoted() -> Result<(), Box<dyn Error>> {
        let wtr = CsvItemWriterBuilder::new()
            .field_names(&CSV_OUTPUT_FIELDS)
            .from_writer(vec![]);

        wtr.write(&[Company::new("Acme, Widgets & Co", "003")])?;

        let data = String::from_utf8(wtr.into_inner()?)?;
        assert_eq!(data, "003,\"Acme, Widgets & Co\"\n");

        Ok(())
    }

    #[test]
    fn unknown_field_name_should_be_a_serialization_error() {
        let wtr = CsvItemWriterBuilder::new()
            .field_names(&["companyNumber", "registeredOffice"])
            .from_writer(vec![]);

        let result = wtr.write(&companies());

        assert!(matches!(result, Err(BatchError::Serialization(_))));
    }

    #[test]
    fn appending_to_existing_file_should_not_repeat_header() -> Result<(), Box<dyn Error>> {
        let path = temp_dir().join(Alphanumeric.sample_string(&mut rand::rng(), 16));

        for company in companies() {
            let wtr = CsvItemWriterBuilder::new()
                .has_headers(true)
                .field_names(&CSV_OUTPUT_FIELDS)
                .append(true)
                .from_path(&path)?;

            wtr.write(&[company])?;
            ItemWriter::<Company>::close(&wtr)?;
        }

        let serde_path = path.with_extension("serde");
        for company in companies() {
            let wtr = CsvItemWriterBuilder::new()
                .has_headers(true)
                .append(true)
                .from_path(&serde_path)?;

            wtr.write(&[company])?;
            ItemWriter::<Company>::close(&wtr)?;
        }

        assert_eq!(
            fs::read_to_string(&path)?,
            "companyNumber,companyName\n001,Acme Ltd\n002,Beta Corp\n"
        );
        assert_eq!(
            fs::read_to_string(&serde_path)?,
            "companyName,companyNumber\nAcme Ltd,001\nBeta Corp,002\n"
        );

        Ok(())
    }
}
