use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
    item::open_output,
};

/// A JSON lines item writer: one compact JSON object per item, each followed
/// by a line feed.
pub struct JsonItemWriter<W: Write> {
    stream: RefCell<BufWriter<W>>,
}

impl<W: Write, T: Serialize> ItemWriter<T> for JsonItemWriter<W> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        let mut stream = self.stream.borrow_mut();

        for item in items {
            let mut line = serde_json::to_vec(item)
                .map_err(|error| BatchError::Serialization(error.to_string()))?;
            line.push(b'\n');

            stream
                .write_all(&line)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }

        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }

    fn close(&self) -> ItemWriterResult {
        ItemWriter::<T>::flush(self)
    }
}

impl<W: Write> JsonItemWriter<W> {
    pub fn into_inner(self) -> Result<W, BatchError> {
        self.stream
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

#[derive(Default)]
pub struct JsonItemWriterBuilder {
    append: bool,
}

impl JsonItemWriterBuilder {
    pub fn new() -> JsonItemWriterBuilder {
        JsonItemWriterBuilder { append: false }
    }

    /// Appends to an existing file instead of truncating it.
    pub fn append(mut self, yes: bool) -> JsonItemWriterBuilder {
        self.append = yes;
        self
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<JsonItemWriter<File>, BatchError> {
        let file = open_output(path.as_ref(), self.append)?;
        Ok(self.from_writer(file))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> JsonItemWriter<W> {
        JsonItemWriter {
            stream: RefCell::new(BufWriter::new(wtr)),
        }
    }
}
