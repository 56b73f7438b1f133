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

use log::{debug, error};

use super::MemoryManager;
use crate::{
    error::{VmError, VmResult},
    frame_allocator::FrameId,
    modules::{eviction::EvictionPolicy, storage::StorageModule},
    page_table::PageId,
    swap_store::SwapSlotId,
};

impl<B: StorageModule, S: StorageModule, E: EvictionPolicy> MemoryManager<B, S, E> {
    /// Frees the frame selected by the eviction policy and returns it.
    ///
    /// Clean pages are dropped, they can be fetched again from the backing store.
    /// Dirty pages are written to a free swap slot first.
    ///
    /// If no swap slot is left, the page is unbound anyway and its content is
    /// lost: it falls back to its backing store image (data, bss) or becomes
    /// uninitialized again (heap/stack).
    pub(super) fn evict_victim(&mut self) -> VmResult<FrameId> {
        let frame = self
            .eviction
            .select_victim(&self.frames)
            .ok_or(VmError::InternalInconsistency { frame: None })?;

        let page = self.page_table.find_by_frame(frame).ok_or_else(|| {
            error!("Frame {} is occupied but no page is bound to it", frame);
            VmError::InternalInconsistency { frame: Some(frame) }
        })?;

        let dirty = self.page_table.lookup(page).dirty;

        if !dirty {
            debug!("Evict clean {:?} from frame {}", page, frame);
            self.unbind(page, frame, None);
            return Ok(frame);
        }

        let Some(slot) = self.swap.allocate_slot() else {
            error!(
                "No swap slot left for dirty {:?} in frame {}, its content is lost",
                page, frame
            );
            self.unbind(page, frame, None);
            self.page_table.discard_dirty(page);
            return Err(VmError::ResourceExhausted);
        };

        let start = self.frame_start(frame);
        let end = start + self.config.page_size;
        if let Err(err) = self.swap.write_page(slot, &self.physical_memory[start..end]) {
            // page stays resident, only give the slot back
            if let Err(clear_err) = self.swap.free_slot(slot) {
                error!("Failed to clear swap slot {} after failed write: {}", slot, clear_err);
            }
            return Err(err);
        }

        debug!("Evict dirty {:?} from frame {} to swap slot {}", page, frame, slot);
        self.unbind(page, frame, Some(slot));
        self.stats.swap_outs += 1;

        Ok(frame)
    }

    /// Unbinds `page` from `frame`, clears the frame content and marks it as free
    fn unbind(&mut self, page: PageId, frame: FrameId, swap_slot: Option<SwapSlotId>) {
        let prev_frame = self.page_table.evict(page, swap_slot);
        debug_assert_eq!(prev_frame, Some(frame));

        let blank = self.config.blank_byte;
        self.frame_bytes_mut(frame).fill(blank);
        self.frames.free(frame);
        self.stats.evictions += 1;
    }
}
