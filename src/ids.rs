//! Logical Identifier Allocation
//!
//! Logical ids are independent of the storage engine's row ids. Allocators are
//! shared by every session and must hand out strictly increasing ids to
//! concurrent callers. Gaps are allowed.

use crate::error::StorageError;
use crate::types::LogicalId;
use parking_lot::Mutex;
use sled::{Db, Tree};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const TREE_IDS: &str = "content_ids";
const HIGH_WATER_KEY: &[u8] = b"logical_id_high";

pub const DEFAULT_BLOCK_SIZE: u64 = 20;

pub trait IdAllocator: Send + Sync {
    fn next_id(&self) -> Result<LogicalId, StorageError>;
}

/// In-process counter starting at 1
#[derive(Debug)]
pub struct SequentialIdAllocator {
    next: AtomicU64,
}

impl Default for SequentialIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIdAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: LogicalId) -> Self {
        Self {
            next: AtomicU64::new(first.max(1)),
        }
    }
}

impl IdAllocator for SequentialIdAllocator {
    fn next_id(&self) -> Result<LogicalId, StorageError> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Hands out ids from blocks reserved against a persisted high-water mark.
///
/// Each reservation bumps the stored high-water mark by `block_size` and serves
/// the ids `(previous_high, new_high]` from memory. Ids left in a block when
/// the process stops are never reused.
pub struct LinearBlockIdAllocator {
    tree: Tree,
    block_size: u64,
    block: Mutex<IdBlock>,
}

#[derive(Debug, Clone, Copy)]
struct IdBlock {
    next: LogicalId,
    /// Inclusive upper bound of the reserved block
    last: LogicalId,
}

impl LinearBlockIdAllocator {
    pub fn new(db: &Db, block_size: u64) -> Result<Self, StorageError> {
        let tree = db.open_tree(TREE_IDS)?;
        Ok(Self {
            tree,
            block_size: block_size.max(1),
            block: Mutex::new(IdBlock { next: 1, last: 0 }),
        })
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    fn reserve_block(&self) -> Result<IdBlock, StorageError> {
        let block_size = self.block_size;
        let updated = self.tree.update_and_fetch(HIGH_WATER_KEY, |old| {
            let high = old.and_then(decode_high).unwrap_or(0);
            Some(high.saturating_add(block_size).to_be_bytes().to_vec())
        })?;
        let last = updated.as_deref().and_then(decode_high).ok_or_else(|| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Logical id high-water mark is missing or corrupt".to_string(),
            ))
        })?;
        let next = last - block_size + 1;
        debug!(first = next, last, "Reserved logical id block");
        Ok(IdBlock { next, last })
    }
}

impl IdAllocator for LinearBlockIdAllocator {
    fn next_id(&self) -> Result<LogicalId, StorageError> {
        let mut block = self.block.lock();
        if block.next > block.last {
            *block = self.reserve_block()?;
        }
        let id = block.next;
        block.next += 1;
        Ok(id)
    }
}

fn decode_high(raw: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = raw.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}
