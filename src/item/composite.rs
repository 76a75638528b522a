use log::warn;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// Fans every chunk out to an ordered list of writers.
///
/// Each delegate receives the full chunk, in registration order. The first
/// failure stops the fan-out and is returned: delegates after it do not see
/// the chunk, and delegates before it keep what they already wrote.
pub struct CompositeItemWriter<'a, T> {
    delegates: Vec<&'a dyn ItemWriter<T>>,
}

impl<'a, T> CompositeItemWriter<'a, T> {
    pub fn new(delegates: Vec<&'a dyn ItemWriter<T>>) -> Self {
        Self { delegates }
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl<T> ItemWriter<T> for CompositeItemWriter<'_, T> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        self.delegates
            .iter()
            .try_for_each(|delegate| delegate.write(items))
    }

    fn flush(&self) -> ItemWriterResult {
        self.delegates.iter().try_for_each(|delegate| delegate.flush())
    }

    fn open(&self) -> ItemWriterResult {
        self.delegates.iter().try_for_each(|delegate| delegate.open())
    }

    /// Closes every delegate, even after a failure, and returns the first
    /// error.
    fn close(&self) -> ItemWriterResult {
        let mut first_error: Option<BatchError> = None;

        for delegate in &self.delegates {
            if let Err(error) = delegate.close() {
                warn!("Error closing delegate writer: {}", error);
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }
}

#[derive(Default)]
pub struct CompositeItemWriterBuilder<'a, T> {
    delegates: Vec<&'a dyn ItemWriter<T>>,
}

impl<'a, T> CompositeItemWriterBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            delegates: Vec::new(),
        }
    }

    pub fn delegate(mut self, writer: &'a dyn ItemWriter<T>) -> Self {
        self.delegates.push(writer);
        self
    }

    pub fn build(self) -> CompositeItemWriter<'a, T> {
        CompositeItemWriter::new(self.delegates)
    }
}
