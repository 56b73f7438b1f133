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

use log::{debug, error, trace};

use super::MemoryManager;
use crate::{
    address::Segment,
    error::{VmError, VmResult},
    frame_allocator::FrameId,
    modules::{eviction::EvictionPolicy, storage::StorageModule},
    page_table::PageId,
    swap_store::SwapSlotId,
};

/// Where the content of a faulting page comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PageSource {
    /// Offset of the page inside of the backing store
    BackingStore(usize),
    Swap(SwapSlotId),
    /// Fresh page filled with the blank byte
    Blank,
}

impl<B: StorageModule, S: StorageModule, E: EvictionPolicy> MemoryManager<B, S, E> {
    /// Decides where the content of the non resident `page` has to be fetched from.
    ///
    /// Does not change any state.
    pub(super) fn fault_source(
        &self,
        page: PageId,
        address: usize,
        write: bool,
    ) -> VmResult<PageSource> {
        let descriptor = self.page_table.lookup(page);
        debug_assert!(!descriptor.resident);

        let page_offset = page.page_index * self.config.page_size;

        match (page.segment, descriptor.swap_slot) {
            // text is never written, so it is never swapped either
            (Segment::Text, _) => Ok(PageSource::BackingStore(page_offset)),
            (_, Some(slot)) => Ok(PageSource::Swap(slot)),
            (Segment::Data, None) => Ok(PageSource::BackingStore(
                self.config.text_size + page_offset,
            )),
            (Segment::Bss, None) => Ok(PageSource::BackingStore(
                self.config.text_size + self.config.data_size + page_offset,
            )),
            // heap/stack pages only come into existence by writing to them
            (Segment::HeapStack, None) if write => Ok(PageSource::Blank),
            (Segment::HeapStack, None) => Err(VmError::UninitializedHeapStackRead { address }),
        }
    }

    /// Makes `page` resident with the content from `source`.
    ///
    /// The content is fetched before anything is changed, so a failing read
    /// leaves the manager untouched. Evicts another page if no frame is free.
    pub(super) fn handle_fault(&mut self, page: PageId, source: PageSource) -> VmResult<FrameId> {
        debug!("Page fault on {:?}, fetching from {:?}", page, source);

        let mut buffer = vec![self.config.blank_byte; self.config.page_size];
        match source {
            PageSource::BackingStore(offset) => self
                .backing_store
                .read(offset, &mut buffer)
                .map_err(VmError::BackingStoreIo)?,
            PageSource::Swap(slot) => self.swap.read_page(slot, &mut buffer)?,
            PageSource::Blank => {}
        }

        let frame = self.obtain_frame()?;
        self.frame_bytes_mut(frame).copy_from_slice(&buffer);
        self.stats.faults += 1;

        if let Some(slot) = self.page_table.mark_resident(page, frame) {
            debug_assert_eq!(source, PageSource::Swap(slot));
            self.stats.swap_ins += 1;

            // page is bound already, a failed clear only leaves stale bytes in a free slot
            if let Err(err) = self.swap.free_slot(slot) {
                error!("Failed to clear released swap slot {}: {}", slot, err);
            }
        }

        trace!("{:?} is now resident in frame {}", page, frame);
        Ok(frame)
    }

    /// Returns a free frame, evicting the page of another frame if necessary
    fn obtain_frame(&mut self) -> VmResult<FrameId> {
        if let Some(frame) = self.frames.allocate() {
            return Ok(frame);
        }

        let victim = self.evict_victim()?;

        // the victim frame was freed, so this has to succeed
        self.frames
            .allocate()
            .ok_or(VmError::InternalInconsistency {
                frame: Some(victim),
            })
    }
}
