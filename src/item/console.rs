use std::{
    cell::RefCell,
    io::{self, Stdout, Write},
};

use log::debug;
use serde::Serialize;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// Prints every item as a JSON line, on standard output by default.
///
/// Stands in for file outputs when none is configured.
pub struct ConsoleItemWriter<W: Write = Stdout> {
    out: RefCell<W>,
}

impl ConsoleItemWriter<Stdout> {
    pub fn new() -> Self {
        Self::from_writer(io::stdout())
    }
}

impl Default for ConsoleItemWriter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleItemWriter<W> {
    pub fn from_writer(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write, T: Serialize> ItemWriter<T> for ConsoleItemWriter<W> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        let mut out = self.out.borrow_mut();

        for item in items {
            let json = serde_json::to_string(item)
                .map_err(|error| BatchError::Serialization(error.to_string()))?;
            writeln!(out, "{}", json).map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }

        debug!("Printed {} records", items.len());
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.out
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}
