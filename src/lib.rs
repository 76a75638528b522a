#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # ch-import

 Batch import of a company register extract. A delimited file is fetched from
 S3, every line is mapped to a [`Company`](company::Company) and the records
 are written, chunk by chunk, to a JSON lines file, a CSV file, or standard
 output when no output file is configured.

 ## Core Concepts

- **Job:** the whole import. A `Job` runs its `Step`s in order and reports a
  terminal status to its `after_job` listeners.
- **Step:** reads items one at a time, groups them into chunks and hands every
  chunk to its writer. A `Step` tracks how many items it read, wrote and
  skipped.
- **ItemReader:** produces the items of a `Step`, one at a time.
- **ItemWriter:** consumes the items of a `Step`, one chunk at a time.
- **ObjectFetcher:** opens the remote source as a byte stream.

 ## Features

| **Feature** | **Description**                                             |
|-------------|-------------------------------------------------------------|
| csv         | Enables the delimited `ItemReader` and the CSV `ItemWriter` |
| json        | Enables the JSON lines `ItemWriter`                         |
| console     | Enables the standard output `ItemWriter`                    |
| s3          | Enables the S3 `ObjectFetcher`                              |
| full        | Enables all available features                              |

 ## Getting Started

```rust
# use std::io::{Cursor, Read};
# use ch_import::{
#     BatchError,
#     config::{JobConfig, ObjectLocation, S3Config},
#     core::job::BatchStatus,
#     fetch::ObjectFetcher,
#     import::run_import,
# };
# use std::env::temp_dir;
struct InMemoryFetcher;

impl ObjectFetcher for InMemoryFetcher {
    fn fetch(&self, _location: &ObjectLocation) -> Result<Box<dyn Read>, BatchError> {
        Ok(Box::new(Cursor::new("Acme Ltd,001\nBeta Corp,002\n")))
    }
}

fn main() -> Result<(), BatchError> {
    let config = JobConfig::new(S3Config::new("companies", "companies.csv"))
        .with_json_output(temp_dir().join("companies.json"))
        .with_csv_output(temp_dir().join("companies.csv"));

    let execution = run_import(&config, &InMemoryFetcher, |execution| {
        println!("{} completed in {:?}", execution.name, execution.duration);
    })?;

    assert_eq!(execution.status, BatchStatus::Completed);

    Ok(())
}
```
 */

/// Company record and its field layouts
pub mod company;

/// Job and S3 configuration
pub mod config;

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Access to the remote source object
pub mod fetch;

#[cfg(all(feature = "csv", feature = "json", feature = "console"))]
#[cfg_attr(
    docsrs,
    doc(cfg(all(feature = "csv", feature = "json", feature = "console")))
)]
/// The company import job
pub mod import;

/// Set of items readers / writers (for example: csv reader and writer)
pub mod item;
