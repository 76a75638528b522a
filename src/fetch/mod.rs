//! # Object fetching
//!
//! The import reads its source through the [`ObjectFetcher`] capability:
//! given a bucket and key, hand back a readable byte stream. The S3
//! implementation lives in [`s3`]; tests substitute in-memory fetchers.

use std::io::Read;

use crate::{BatchError, config::ObjectLocation};

#[cfg(feature = "s3")]
#[cfg_attr(docsrs, doc(cfg(feature = "s3")))]
pub mod s3;

/// Retrieves the content of a remote object as a blocking byte stream.
pub trait ObjectFetcher {
    /// Opens the object at `location`.
    ///
    /// # Returns
    /// - `Ok(stream)`: the object exists and its body can be read
    /// - `Err(BatchError::Fetch)`: network, authorization or not-found failure
    fn fetch(&self, location: &ObjectLocation) -> Result<Box<dyn Read>, BatchError>;
}
