use std::collections::VecDeque;
use log::{debug, trace};
use crate::bus::{Bus, TransferKind};
use crate::error::ConfigError;

/// The shape shared by every cache in a run: total size, ways per set and block size, all in
/// bytes or blocks, plus the derived number of sets
///
/// Only constructible through [`CacheGeometry::new`], so a cache can never be built with zero
/// sets or a size that doesn't divide evenly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    cache_size: u64,
    associativity: u64,
    block_size: u64,
    num_sets: u64,
}

/// An address split into the parts the cache cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressParts {
    pub tag: u64,
    pub index: u64,
    pub offset: u64,
}

impl CacheGeometry {
    pub fn new(cache_size: u64, associativity: u64, block_size: u64) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if cache_size == 0 {
            return Err(ConfigError::ZeroCacheSize);
        }
        let set_bytes = block_size
            .checked_mul(associativity)
            .filter(|bytes| cache_size % bytes == 0)
            .ok_or(ConfigError::IndivisibleCacheSize {
                cache_size,
                block_size,
                associativity,
            })?;
        Ok(Self {
            cache_size,
            associativity,
            block_size,
            num_sets: cache_size / set_bytes,
        })
    }

    /// Splits an address into tag, set index and byte offset
    ///
    /// The block number is `address / block_size`; the index is the block number modulo the number
    /// of sets and the tag is whatever is left above it. Sizes need not be powers of two
    pub fn decompose(&self, address: u64) -> AddressParts {
        let block = address / self.block_size;
        AddressParts {
            tag: block / self.num_sets,
            index: block % self.num_sets,
            offset: address % self.block_size,
        }
    }

    pub fn cache_size(&self) -> u64 {
        self.cache_size
    }

    pub fn associativity(&self) -> u64 {
        self.associativity
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn num_sets(&self) -> u64 {
        self.num_sets
    }
}

/// The result of a single load or store against the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    pub hit: bool,
    /// Whether the access pushed out a block which had been written to, which then has to be
    /// written back to memory
    pub evicted_dirty: bool,
}

impl AccessOutcome {
    const HIT: Self = Self { hit: true, evicted_dirty: false };
}

/// One resident memory block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBlock {
    pub tag: u64,
    pub dirty: bool,
    // Logical time of the most recent access
    last_used: u64,
}

/// A single set: a fixed number of slots and LRU ordering by logical timestamps
///
/// Timestamps come from the owning cache's clock, which ticks on every access, so no two blocks in
/// a set ever share one and the least recently used block is always unique
#[derive(Debug, Clone)]
pub struct CacheSet {
    blocks: Vec<CacheBlock>,
    capacity: usize,
}

impl CacheSet {
    fn new(capacity: usize) -> Self {
        Self {
            blocks: Vec::new(),
            capacity,
        }
    }

    fn position(&self, tag: u64) -> Option<usize> {
        self.blocks.iter().position(|block| block.tag == tag)
    }

    /// Looks up a tag, admitting it on a miss and evicting the least recently used block if the set
    /// is already full
    fn access(&mut self, tag: u64, now: u64) -> AccessOutcome {
        if let Some(slot) = self.position(tag) {
            self.blocks[slot].last_used = now;
            return AccessOutcome::HIT;
        }
        let incoming = CacheBlock { tag, dirty: false, last_used: now };
        if self.blocks.len() < self.capacity {
            self.blocks.push(incoming);
            return AccessOutcome { hit: false, evicted_dirty: false };
        }
        // Iterators are fine here, sets are only ever a handful of blocks wide
        let victim = self.blocks
            .iter()
            .enumerate()
            .min_by_key(|(_, block)| block.last_used)
            .map_or(0, |(slot, _)| slot);
        let evicted = std::mem::replace(&mut self.blocks[victim], incoming);
        debug!("evicted tag {:#x} (dirty: {}) for tag {:#x}", evicted.tag, evicted.dirty, tag);
        AccessOutcome { hit: false, evicted_dirty: evicted.dirty }
    }

    fn mark_dirty(&mut self, tag: u64) {
        if let Some(slot) = self.position(tag) {
            self.blocks[slot].dirty = true;
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Resident blocks, in slot order rather than recency order
    pub fn blocks(&self) -> &[CacheBlock] {
        &self.blocks
    }
}

/// A set-associative, write-back cache with LRU replacement, private to one core
///
/// Besides the sets themselves the cache keeps track of the bus trips a miss still needs. A miss
/// which evicts a dirty block costs two trips, the writeback and then the fetch; these go to the
/// bus one at a time, the next one requested when the previous completes
#[derive(Debug)]
pub struct Cache {
    owner: usize,
    geometry: CacheGeometry,
    sets: Vec<CacheSet>,
    // Tracking logical time means the LRU victim is just the minimum timestamp in the set
    time: u64,
    outstanding: VecDeque<TransferKind>,
}

impl Cache {
    pub fn new(owner: usize, geometry: CacheGeometry) -> Self {
        let ways = geometry.associativity() as usize;
        Self {
            owner,
            geometry,
            sets: vec![CacheSet::new(ways); geometry.num_sets() as usize],
            time: 0,
            outstanding: VecDeque::with_capacity(2),
        }
    }

    fn set_and_tag_mut(&mut self, address: u64) -> (&mut CacheSet, u64) {
        let parts = self.geometry.decompose(address);
        (&mut self.sets[parts.index as usize], parts.tag)
    }

    fn tick(&mut self) -> u64 {
        self.time += 1;
        self.time
    }

    /// Reads the block holding `address`
    ///
    /// A hit makes the block the most recently used one. A miss admits the block clean, evicting
    /// the least recently used block of the set first if the set is full
    pub fn load(&mut self, address: u64) -> AccessOutcome {
        let now = self.tick();
        let (set, tag) = self.set_and_tag_mut(address);
        set.access(tag, now)
    }

    /// Writes to the block holding `address`
    ///
    /// Admission and eviction work exactly like [`Cache::load`], and the block is left dirty
    /// whether the access hit or not
    pub fn store(&mut self, address: u64) -> AccessOutcome {
        let outcome = self.load(address);
        self.mark_dirty(address);
        outcome
    }

    /// Marks the block holding `address` as modified. Does nothing if it isn't resident
    pub fn mark_dirty(&mut self, address: u64) {
        let (set, tag) = self.set_and_tag_mut(address);
        set.mark_dirty(tag);
    }

    /// Starts the memory traffic for a miss: the writeback of the evicted block if it was dirty,
    /// followed by the fetch of the new block
    pub fn request_fill(&mut self, evicted_dirty: bool, bus: &mut Bus, cycle: u64) {
        debug_assert!(self.outstanding.is_empty(), "a cache only serves one miss at a time");
        if evicted_dirty {
            self.outstanding.push_back(TransferKind::Writeback);
        }
        self.outstanding.push_back(TransferKind::Fetch);
        self.request_next(bus, cycle);
    }

    /// Called when the bus finishes this cache's in-flight transfer
    ///
    /// Returns true once the miss is fully settled, otherwise requests the next trip
    pub fn complete_transfer(&mut self, bus: &mut Bus, cycle: u64) -> bool {
        if let Some(kind) = self.outstanding.pop_front() {
            trace!("cache {}: {kind:?} settled at cycle {cycle}", self.owner);
        }
        if self.outstanding.is_empty() {
            true
        } else {
            self.request_next(bus, cycle);
            false
        }
    }

    fn request_next(&mut self, bus: &mut Bus, cycle: u64) {
        if let Some(&kind) = self.outstanding.front() {
            bus.request(self.owner, self.geometry.block_size(), kind, cycle);
        }
    }

    /// Whether a miss is still waiting on the bus
    pub fn is_waiting(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn contains(&self, address: u64) -> bool {
        let parts = self.geometry.decompose(address);
        self.sets[parts.index as usize].position(parts.tag).is_some()
    }

    /// Whether `address` is resident and modified
    pub fn is_dirty(&self, address: u64) -> bool {
        let parts = self.geometry.decompose(address);
        let set = &self.sets[parts.index as usize];
        set.position(parts.tag).map_or(false, |slot| set.blocks[slot].dirty)
    }

    pub fn set(&self, index: u64) -> Option<&CacheSet> {
        self.sets.get(index as usize)
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Total number of resident blocks across all sets. Useful for analysing cache utilisation
    pub fn resident_blocks(&self) -> usize {
        self.sets.iter().map(CacheSet::len).sum()
    }
}
