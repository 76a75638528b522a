//! Delimited text support: reading positional fields, writing CSV records.
//!
//! # Module Architecture
//!
//! 1. **CsvItemReader**: tokenizes each line of a stream, keeps the included
//!    positional fields and maps them onto a serde-deserializable item by
//!    name.
//!
//! 2. **CsvItemWriter**: serializes items as CSV records, either in their
//!    serde field order or in an explicit field order.
//!
//! Both components follow the builder pattern for configuration.
//!
//! # Example
//!
//! ```
//! use ch_import::company::{COMPANY_FIELDS, CSV_OUTPUT_FIELDS, Company};
//! use ch_import::core::item::{ItemReader, ItemWriter};
//! use ch_import::item::csv::{csv_reader::CsvItemReaderBuilder, csv_writer::CsvItemWriterBuilder};
//!
//! let reader = CsvItemReaderBuilder::new()
//!     .included_fields(&[0, 1])
//!     .names(&COMPANY_FIELDS)
//!     .from_reader("Acme Ltd,001\n".as_bytes());
//!
//! let company: Company = reader.read().unwrap().unwrap();
//!
//! let writer = CsvItemWriterBuilder::new()
//!     .field_names(&CSV_OUTPUT_FIELDS)
//!     .from_writer(Vec::new());
//!
//! writer.write(&[company]).unwrap();
//!
//! let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(output, "001,Acme Ltd\n");
//! ```

/// A module providing facilities for reading delimited records.
pub mod csv_reader;

/// A module providing facilities for writing CSV records.
pub mod csv_writer;
