#![allow(dead_code)]

mod mocks;

pub use mocks::MockSink;

use std::{
    cell::Cell,
    env::temp_dir,
    io::{self, Cursor, ErrorKind, Read},
    path::PathBuf,
};

use ch_import::{BatchError, config::ObjectLocation, fetch::ObjectFetcher};
use rand::distr::{Alphanumeric, SampleString};

/// Serves the same content for every location.
pub struct StaticFetcher {
    content: Vec<u8>,
    fetch_count: Cell<usize>,
}

impl StaticFetcher {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            fetch_count: Cell::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }
}

impl ObjectFetcher for StaticFetcher {
    fn fetch(&self, _location: &ObjectLocation) -> Result<Box<dyn Read>, BatchError> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        Ok(Box::new(Cursor::new(self.content.clone())))
    }
}

/// Serves the start of an object, then loses the connection.
pub struct DroppingFetcher(pub &'static str);

impl ObjectFetcher for DroppingFetcher {
    fn fetch(&self, _location: &ObjectLocation) -> Result<Box<dyn Read>, BatchError> {
        Ok(Box::new(DroppingStream {
            head: Cursor::new(self.0.as_bytes()),
            dropped: false,
        }))
    }
}

struct DroppingStream {
    head: Cursor<&'static [u8]>,
    dropped: bool,
}

impl Read for DroppingStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.head.read(buf)?;
        if read > 0 {
            return Ok(read);
        }
        if !self.dropped {
            self.dropped = true;
            return Err(io::Error::from(ErrorKind::ConnectionReset));
        }
        Ok(0)
    }
}

/// Fails every fetch as a missing object would.
pub struct MissingObjectFetcher;

impl ObjectFetcher for MissingObjectFetcher {
    fn fetch(&self, location: &ObjectLocation) -> Result<Box<dyn Read>, BatchError> {
        Err(BatchError::Fetch(format!(
            "{}: NoSuchKey: The specified key does not exist.",
            location
        )))
    }
}

/// A path in the temp directory that no other test uses.
pub fn temp_file(extension: &str) -> PathBuf {
    let name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    temp_dir().join(format!("{}.{}", name, extension))
}

/// `count` source lines, `Company 0000,00000000` onwards.
pub fn company_lines(count: usize) -> String {
    (0..count)
        .map(|i| format!("Company {:04},{:08}\n", i, i))
        .collect()
}
