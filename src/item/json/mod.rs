//! JSON lines output.
//!
//! [`json_writer::JsonItemWriter`] renders every item as one compact JSON
//! object on its own line, so output can be appended chunk after chunk and
//! read back line by line.
//!
//! ```
//! use ch_import::company::Company;
//! use ch_import::core::item::ItemWriter;
//! use ch_import::item::json::json_writer::JsonItemWriterBuilder;
//!
//! let writer = JsonItemWriterBuilder::new().from_writer(Vec::new());
//!
//! writer
//!     .write(&[Company::new("Acme Ltd", "001"), Company::new("Beta Corp", "002")])
//!     .unwrap();
//!
//! let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(
//!     output,
//!     "{\"companyName\":\"Acme Ltd\",\"companyNumber\":\"001\"}\n\
//!      {\"companyName\":\"Beta Corp\",\"companyNumber\":\"002\"}\n"
//! );
//! ```

/// A module providing facilities for writing JSON lines.
pub mod json_writer;
