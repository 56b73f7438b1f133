/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use log::{error, info, trace, warn};
use static_assertions::assert_impl_all;

use crate::{
    address::{AddressTranslator, Segment},
    error::{ConfigError, VmError, VmResult},
    frame_allocator::{FrameAllocator, FrameId, FrameState, LogicalClock},
    modules::{
        eviction::{EvictionPolicy, LruEvictionPolicy},
        storage::{MemoryStorageModule, StorageModule},
    },
    page_table::{PageDescriptor, PageId, PageTable},
    snapshot::{PageTableSnapshot, PagingStats, SegmentSnapshot, SwapSnapshot},
    swap_store::SwapStore,
    vm_config::VmConfig,
};

mod evict;
mod fault;

#[cfg(test)]
mod test;

assert_impl_all!(MemoryManager<MemoryStorageModule, MemoryStorageModule>: Send);

/// Simulated demand paged memory of a single address space.
///
/// Pages are made resident on first access: text, data and bss pages from the
/// backing store `B`, heap/stack pages by writing to them. If all frames are
/// occupied, the eviction policy `E` selects a frame whose page is given up;
/// dirty pages are moved to the swap store `S` first.
pub struct MemoryManager<B: StorageModule, S: StorageModule, E: EvictionPolicy = LruEvictionPolicy> {
    config: VmConfig,
    translator: AddressTranslator,
    page_table: PageTable,
    frames: FrameAllocator,

    /// `frame_count * page_size` bytes, frame `i` starts at `i * page_size`
    physical_memory: Box<[u8]>,

    /// Read only source of the text, data and bss images
    backing_store: B,
    swap: SwapStore<S>,
    eviction: E,

    clock: LogicalClock,
    stats: PagingStats,
}

impl<B: StorageModule, S: StorageModule, E: EvictionPolicy> MemoryManager<B, S, E> {
    /// Creates a new manager.
    ///
    /// **Note**: Will overwrite the first `config.swap_size()` bytes of `swap_storage`.
    pub fn new(backing_store: B, swap_storage: S, config: VmConfig) -> VmResult<Self> {
        config.validate()?;

        if backing_store.get_max_size() < config.backing_store_size() {
            return Err(ConfigError::StoreTooSmall {
                name: "backing",
                required: config.backing_store_size(),
                actual: backing_store.get_max_size(),
            }
            .into());
        }

        if swap_storage.get_max_size() < config.swap_size() {
            return Err(ConfigError::StoreTooSmall {
                name: "swap",
                required: config.swap_size(),
                actual: swap_storage.get_max_size(),
            }
            .into());
        }

        let swap = SwapStore::new(
            swap_storage,
            config.page_size,
            config.swap_slot_count(),
            config.blank_byte,
        )?;

        info!(
            "Created memory manager with {} frames of {} bytes and {} swap slots",
            config.frame_count(),
            config.page_size,
            config.swap_slot_count()
        );

        Ok(Self {
            translator: AddressTranslator::new(&config),
            page_table: PageTable::new(&config),
            frames: FrameAllocator::new(config.frame_count()),
            physical_memory: vec![config.blank_byte; config.frame_count() * config.page_size]
                .into_boxed_slice(),
            backing_store,
            swap,
            eviction: E::new(),
            clock: LogicalClock::new(),
            stats: PagingStats::default(),
            config,
        })
    }

    /// Reads the byte at the logical `address`
    pub fn load(&mut self, address: usize) -> VmResult<u8> {
        self.load_internal(address)
            .inspect_err(|err| report_failure("load", address, err))
    }

    /// Writes `value` to the logical `address`
    pub fn store(&mut self, address: usize, value: u8) -> VmResult<()> {
        self.store_internal(address, value)
            .inspect_err(|err| report_failure("store", address, err))
    }

    fn load_internal(&mut self, address: usize) -> VmResult<u8> {
        let translated = self.translator.translate(address)?;
        let page = PageId::new(translated.segment, translated.page_index);
        trace!("Load address {} ({:?})", address, translated);

        let frame = self.require_resident(page, address, false)?;
        self.touch(frame);

        Ok(self.physical_memory[self.frame_start(frame) + translated.offset])
    }

    fn store_internal(&mut self, address: usize, value: u8) -> VmResult<()> {
        let translated = self.translator.translate(address)?;
        if !translated.segment.is_writable() {
            return Err(VmError::ReadOnlyViolation { address });
        }

        let page = PageId::new(translated.segment, translated.page_index);
        trace!("Store address {} ({:?})", address, translated);

        let frame = self.require_resident(page, address, true)?;
        self.touch(frame);

        let index = self.frame_start(frame) + translated.offset;
        self.physical_memory[index] = value;
        self.page_table.mark_dirty(page);

        Ok(())
    }

    /// Returns the frame of `page`, handling a page fault if it is not resident yet
    fn require_resident(&mut self, page: PageId, address: usize, write: bool) -> VmResult<FrameId> {
        if let Some(frame) = self.page_table.lookup(page).frame {
            self.stats.hits += 1;
            return Ok(frame);
        }

        let source = self.fault_source(page, address, write)?;
        self.handle_fault(page, source)
    }

    /// Records an access to `frame` and advances the clock
    #[inline]
    fn touch(&mut self, frame: FrameId) {
        self.frames.touch(frame, self.clock.tick());
    }

    #[inline]
    fn frame_start(&self, frame: FrameId) -> usize {
        frame * self.config.page_size
    }

    #[inline]
    fn frame_bytes_mut(&mut self, frame: FrameId) -> &mut [u8] {
        let start = self.frame_start(frame);
        &mut self.physical_memory[start..start + self.config.page_size]
    }
}

/// Read-only views, none of them changes the state of the manager
impl<B: StorageModule, S: StorageModule, E: EvictionPolicy> MemoryManager<B, S, E> {
    #[inline]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    #[inline]
    pub fn translator(&self) -> &AddressTranslator {
        &self.translator
    }

    /// Content of the whole physical memory, frame after frame
    #[inline]
    pub fn physical_memory(&self) -> &[u8] {
        &self.physical_memory
    }

    /// Content of a single frame, `None` if there is no such frame
    pub fn frame_content(&self, frame: FrameId) -> Option<&[u8]> {
        let start = self.frame_start(frame);
        self.physical_memory.get(start..start + self.config.page_size)
    }

    /// **Note**: Panics if `page` lies outside of its segment.
    /// Use [`MemoryManager::page_descriptor_at`] for unchecked input.
    #[inline]
    pub fn page_descriptor(&self, page: PageId) -> PageDescriptor {
        *self.page_table.lookup(page)
    }

    /// Descriptor of the page `address` belongs to
    pub fn page_descriptor_at(&self, address: usize) -> VmResult<PageDescriptor> {
        let translated = self.translator.translate(address)?;
        Ok(self.page_descriptor(PageId::new(translated.segment, translated.page_index)))
    }

    pub fn page_table_snapshot(&self) -> PageTableSnapshot {
        PageTableSnapshot {
            segments: Segment::ALL
                .iter()
                .map(|segment| SegmentSnapshot {
                    segment: *segment,
                    pages: self.page_table.segment(*segment).to_vec(),
                })
                .collect(),
        }
    }

    pub fn frame_snapshot(&self) -> Vec<FrameState> {
        self.frames.frames().to_vec()
    }

    /// Reads the current content of the swap store.
    ///
    /// Storage modules need `&mut` to read. Nothing observable changes:
    /// page table, frames, clock, statistics and swap content stay the same.
    pub fn swap_snapshot(&mut self) -> VmResult<SwapSnapshot> {
        Ok(SwapSnapshot {
            page_size: self.config.page_size,
            content: self.swap.read_all()?,
            used_slots: self.swap.slots().to_vec(),
        })
    }

    #[inline]
    pub fn stats(&self) -> PagingStats {
        self.stats
    }

    /// Current value of the logical clock
    #[inline]
    pub fn clock(&self) -> u64 {
        self.clock.now()
    }
}

fn report_failure(operation: &str, address: usize, err: &VmError) {
    match err {
        VmError::OutOfBounds { .. }
        | VmError::ReadOnlyViolation { .. }
        | VmError::UninitializedHeapStackRead { .. } => {
            warn!("Failed to {} address {}: {}", operation, address, err)
        }
        _ => error!("Failed to {} address {}: {}", operation, address, err),
    }
}
