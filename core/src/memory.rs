//! Game memory block
//!
//! One zeroed, page-aligned allocation split into permanent and transient
//! storage. The block outlives every hot reload, so the game module keeps
//! its state across code swaps.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use handmade_shared::GameMemory;
use thiserror::Error;

const ALIGNMENT: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("failed to reserve {requested} bytes of game memory")]
    Allocation { requested: usize },
}

/// Permanent and transient storage lent to the game module.
pub struct GameMemoryRegion {
    block: NonNull<u8>,
    layout: Layout,
    permanent_size: usize,
    transient_size: usize,
    is_initialized: bool,
}

impl GameMemoryRegion {
    /// Reserve and zero both ranges. Failure is fatal for the caller.
    pub fn new(permanent_size: usize, transient_size: usize) -> Result<Self, MemoryError> {
        let requested = permanent_size
            .checked_add(transient_size)
            .ok_or(MemoryError::Allocation { requested: usize::MAX })?;
        let layout = Layout::from_size_align(requested.max(1), ALIGNMENT)
            .map_err(|_| MemoryError::Allocation { requested })?;
        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let block = NonNull::new(ptr).ok_or(MemoryError::Allocation { requested })?;
        Ok(Self {
            block,
            layout,
            permanent_size,
            transient_size,
            is_initialized: false,
        })
    }

    pub fn permanent_size(&self) -> usize {
        self.permanent_size
    }

    pub fn transient_size(&self) -> usize {
        self.transient_size
    }

    pub fn total_size(&self) -> usize {
        self.permanent_size + self.transient_size
    }

    /// Set once the game module has set up its state.
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// The whole block, permanent storage first.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: block is valid for total_size bytes for the life of self.
        unsafe { std::slice::from_raw_parts(self.block.as_ptr(), self.total_size()) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: block is valid for total_size bytes and &mut self is exclusive.
        unsafe { std::slice::from_raw_parts_mut(self.block.as_ptr(), self.total_size()) }
    }

    pub fn permanent(&self) -> &[u8] {
        &self.as_bytes()[..self.permanent_size]
    }

    /// Raw view for one entry-point call.
    pub fn as_abi(&mut self) -> GameMemory {
        let base = self.block.as_ptr();
        GameMemory {
            is_initialized: self.is_initialized,
            permanent_storage_size: self.permanent_size as u64,
            permanent_storage: base,
            transient_storage_size: self.transient_size as u64,
            // SAFETY: permanent_size is within the allocation.
            transient_storage: unsafe { base.add(self.permanent_size) },
        }
    }

    /// Pick up flags the game module changed through [`Self::as_abi`].
    pub fn sync_from_abi(&mut self, memory: &GameMemory) {
        self.is_initialized = memory.is_initialized;
    }

    /// Overwrite the block from a snapshot and keep the initialized flag,
    /// since a snapshot is only ever taken of running game state.
    pub fn restore(&mut self, snapshot: &[u8]) {
        let len = snapshot.len().min(self.total_size());
        self.as_bytes_mut()[..len].copy_from_slice(&snapshot[..len]);
        self.is_initialized = true;
    }
}

impl Drop for GameMemoryRegion {
    fn drop(&mut self) {
        // SAFETY: block was allocated in `new` with this layout.
        unsafe { alloc::dealloc(self.block.as_ptr(), self.layout) };
    }
}

impl std::fmt::Debug for GameMemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMemoryRegion")
            .field("permanent_size", &self.permanent_size)
            .field("transient_size", &self.transient_size)
            .field("is_initialized", &self.is_initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_is_zeroed_and_split() {
        let mut region = GameMemoryRegion::new(1024, 512).unwrap();
        assert_eq!(region.total_size(), 1536);
        assert!(region.as_bytes().iter().all(|&b| b == 0));

        let abi = region.as_abi();
        assert_eq!(abi.permanent_storage_size, 1024);
        assert_eq!(abi.transient_storage_size, 512);
        assert_eq!(
            abi.transient_storage as usize - abi.permanent_storage as usize,
            1024
        );
        assert_eq!(abi.permanent_storage as usize % ALIGNMENT, 0);
    }

    #[test]
    fn test_initialized_flag_round_trips() {
        let mut region = GameMemoryRegion::new(64, 0).unwrap();
        let mut abi = region.as_abi();
        assert!(!abi.is_initialized);
        abi.is_initialized = true;
        region.sync_from_abi(&abi);
        assert!(region.is_initialized());
    }

    #[test]
    fn test_restore_copies_snapshot() {
        let mut region = GameMemoryRegion::new(8, 8).unwrap();
        let snapshot: Vec<u8> = (0..16).collect();
        region.restore(&snapshot);
        assert_eq!(region.as_bytes(), snapshot.as_slice());
        assert_eq!(region.permanent(), &snapshot[..8]);
    }

    #[test]
    fn test_impossible_allocation_fails() {
        let result = GameMemoryRegion::new(usize::MAX, 1);
        assert!(matches!(result, Err(MemoryError::Allocation { .. })));
    }
}
