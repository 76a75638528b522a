use crate::error::BatchError;

/// Result of a single read: `Ok(Some(item))`, `Ok(None)` once the source is
/// exhausted, or an error for the current record.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of writing a chunk or of any writer lifecycle call.
pub type ItemWriterResult = Result<(), BatchError>;

/// Retrieval of input for a step, one item at a time.
///
/// Readers are lazy and not restartable: once `read` returned `Ok(None)` every
/// following call returns `Ok(None)` as well.
pub trait ItemReader<I> {
    fn read(&self) -> ItemReaderResult<I>;
}

/// Output of a step, one chunk of items at a time.
///
/// Items must be written in the order they are received. A step calls
/// `open` once before the first chunk, `write` then `flush` for every chunk and
/// `close` once at the end, whatever the outcome.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}
