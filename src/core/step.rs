use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    chunk::{Chunk, ChunkStatus, DEFAULT_CHUNK_SIZE},
    item::{ItemReader, ItemWriter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Success,
    /// Reading failed and the skip limit was exceeded.
    ReadError,
    /// A writer rejected a chunk, or could not be opened, flushed or closed.
    WriteError,
}

/// Execution details of one step run.
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// Unique identifier for this step run
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
    /// Number of errors encountered during reading
    pub read_error_count: usize,
    /// Number of items in chunks a writer rejected
    pub write_error_count: usize,
    /// Number of chunks delivered to the writer
    pub commit_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            read_count: 0,
            write_count: 0,
            read_error_count: 0,
            write_error_count: 0,
            commit_count: 0,
        }
    }
}

/// An independent, sequential phase of a job.
pub trait Step {
    fn get_name(&self) -> &str;

    /// Executes the step, recording counters and the final status into
    /// `step_execution`.
    ///
    /// # Returns
    /// - `Ok(())`: the step ended with `StepStatus::Success`
    /// - `Err(BatchError)`: the error that made the step fail
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;
}

/// A step reading items in chunks of `chunk_size` and writing each chunk as a
/// unit before the next one is read.
pub struct ChunkOrientedStep<'a, T> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a dyn ItemReader<T>,
    /// Component responsible for writing items to the destination
    writer: &'a dyn ItemWriter<T>,
    /// Number of items to process in each chunk
    chunk_size: usize,
    /// Number of read errors tolerated before failing the step
    skip_limit: usize,
}

impl<T> Step for ChunkOrientedStep<'_, T> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let mut failure = match self.writer.open() {
            Ok(()) => self.process_chunks(step_execution).err(),
            Err(error) => {
                step_execution.status = StepStatus::WriteError;
                Some(error)
            }
        };

        // Writers are closed whatever the outcome, so that what was delivered
        // reaches its sink.
        if let Err(error) = self.writer.close() {
            warn!("Error closing writer: {}", error);
            if failure.is_none() {
                step_execution.status = StepStatus::WriteError;
                failure = Some(error);
            }
        }

        if failure.is_none() {
            step_execution.status = StepStatus::Success;
        }

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        info!(
            "End of step: {}, id: {}, status: {:?}, read: {}, written: {}, commits: {}",
            step_execution.name,
            step_execution.id,
            step_execution.status,
            step_execution.read_count,
            step_execution.write_count,
            step_execution.commit_count
        );

        match failure {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }
}

impl<T> ChunkOrientedStep<'_, T> {
    fn process_chunks(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        loop {
            let chunk = match self.read_chunk(step_execution) {
                Ok(chunk) => chunk,
                Err(error) => {
                    step_execution.status = StepStatus::ReadError;
                    return Err(error);
                }
            };

            if !chunk.is_empty() {
                if let Err(error) = self.write_chunk(step_execution, chunk.get_items()) {
                    step_execution.status = StepStatus::WriteError;
                    return Err(error);
                }
            }

            if chunk.get_status() == ChunkStatus::Finished {
                return Ok(());
            }
        }
    }

    /// Reads up to `chunk_size` items.
    ///
    /// Stops when the chunk is full, when the reader is exhausted, when a
    /// malformed record exceeds the skip limit, or on any other read error.
    /// Malformed records within the limit are logged and dropped.
    fn read_chunk(&self, step_execution: &mut StepExecution) -> Result<Chunk<T>, BatchError> {
        debug!("Start reading chunk");

        let mut chunk = Chunk::new(self.chunk_size);

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    step_execution.read_count += 1;

                    if chunk.push(item) {
                        debug!("End reading chunk: FULL");
                        return Ok(chunk);
                    }
                }
                Ok(None) => {
                    chunk.finish();
                    debug!("End reading chunk: FINISHED ({} items)", chunk.len());
                    return Ok(chunk);
                }
                Err(error) => {
                    step_execution.read_error_count += 1;

                    // Only malformed records can be skipped; a failing source is fatal.
                    if !matches!(error, BatchError::ItemReader(_)) {
                        warn!("Error reading source: {}", error);
                        return Err(error);
                    }

                    if self.is_skip_limit_reached(step_execution) {
                        warn!("Error reading item, skip limit reached: {}", error);
                        return Err(error);
                    }

                    warn!("Skipping item: {}", error);
                }
            }
        }
    }

    /// Writes then flushes a chunk. The chunk counts as committed only when
    /// both succeed.
    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        items: &[T],
    ) -> Result<(), BatchError> {
        debug!("Writing chunk of {} items", items.len());

        match self.writer.write(items).and_then(|()| self.writer.flush()) {
            Ok(()) => {
                step_execution.write_count += items.len();
                step_execution.commit_count += 1;
                Ok(())
            }
            Err(error) => {
                warn!("Error writing items: {}", error);
                step_execution.write_error_count += items.len();
                Err(error)
            }
        }
    }

    fn is_skip_limit_reached(&self, step_execution: &StepExecution) -> bool {
        step_execution.read_error_count > self.skip_limit
    }
}

pub struct ChunkOrientedStepBuilder<'a, T> {
    name: String,
    reader: Option<&'a dyn ItemReader<T>>,
    writer: Option<&'a dyn ItemWriter<T>>,
    chunk_size: usize,
    skip_limit: usize,
}

impl<'a, T> ChunkOrientedStepBuilder<'a, T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reader: None,
            writer: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            skip_limit: 0,
        }
    }

    pub fn reader(mut self, reader: &'a dyn ItemReader<T>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn writer(mut self, writer: &'a dyn ItemWriter<T>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of malformed records tolerated before the step fails.
    /// The default of 0 fails on the first one.
    pub fn skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    pub fn build(self) -> Result<ChunkOrientedStep<'a, T>, BatchError> {
        let reader = self.reader.ok_or_else(|| {
            BatchError::Configuration(format!("Step {} requires a reader", self.name))
        })?;
        let writer = self.writer.ok_or_else(|| {
            BatchError::Configuration(format!("Step {} requires a writer", self.name))
        })?;

        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(format!(
                "Step {} requires a chunk size of at least 1",
                self.name
            )));
        }

        Ok(ChunkOrientedStep {
            name: self.name,
            reader,
            writer,
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
        })
    }
}

pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn chunk<'a, T>(self, chunk_size: usize) -> ChunkOrientedStepBuilder<'a, T> {
        ChunkOrientedStepBuilder::new(&self.name).chunk_size(chunk_size)
    }
}
