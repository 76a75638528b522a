/// Number of items a step reads before handing them to its writer.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// The chunk reached its capacity, more items may follow.
    Full,
    /// The reader is exhausted. The chunk may still hold a partial batch.
    Finished,
}

/// An ordered, bounded batch of items read as one unit and written as one unit.
#[derive(Debug)]
pub struct Chunk<T> {
    items: Vec<T>,
    status: ChunkStatus,
    chunk_size: usize,
}

impl<T> Chunk<T> {
    pub fn new(chunk_size: usize) -> Chunk<T> {
        Chunk {
            items: Vec::with_capacity(chunk_size),
            status: ChunkStatus::Full,
            chunk_size,
        }
    }

    /// Appends an item and returns `true` once the chunk is full.
    pub fn push(&mut self, item: T) -> bool {
        self.items.push(item);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.chunk_size
    }

    /// Marks the reader behind this chunk as exhausted.
    pub fn finish(&mut self) {
        self.status = ChunkStatus::Finished;
    }

    pub fn get_items(&self) -> &[T] {
        &self.items
    }

    pub fn get_status(&self) -> ChunkStatus {
        self.status
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
