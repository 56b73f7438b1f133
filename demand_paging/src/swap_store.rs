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

use log::trace;

use crate::{
    error::{VmError, VmResult},
    modules::storage::StorageModule,
};

/// Index of a page sized slot inside of the swap store
pub type SwapSlotId = usize;

/// Page granular slot management on top of a swap storage module.
///
/// Occupancy is only tracked per slot, never per byte.
pub struct SwapStore<S: StorageModule> {
    storage: S,
    page_size: usize,
    used: Vec<bool>,
    blank_byte: u8,
}

impl<S: StorageModule> SwapStore<S> {
    /// Creates a swap store with `slot_count` slots and fills all of them with `blank_byte`.
    ///
    /// **Note**: Will overwrite the first `slot_count * page_size` bytes of `storage`.
    pub fn new(mut storage: S, page_size: usize, slot_count: usize, blank_byte: u8) -> VmResult<Self> {
        storage
            .fill(0, slot_count * page_size, blank_byte)
            .map_err(VmError::SwapStoreIo)?;

        Ok(Self {
            storage,
            page_size,
            used: vec![false; slot_count],
            blank_byte,
        })
    }

    /// First fit: returns the lowest free slot and marks it as used
    pub fn allocate_slot(&mut self) -> Option<SwapSlotId> {
        let slot = self.used.iter().position(|used| !used)?;
        self.used[slot] = true;

        trace!("Allocated swap slot {}", slot);
        Some(slot)
    }

    /// Releases `slot` and clears its content.
    ///
    /// The slot is released even if clearing fails.
    pub fn free_slot(&mut self, slot: SwapSlotId) -> VmResult<()> {
        debug_assert!(self.used[slot], "double free of swap slot {}", slot);
        self.used[slot] = false;

        trace!("Freed swap slot {}", slot);
        self.storage
            .fill(self.slot_offset(slot), self.page_size, self.blank_byte)
            .map_err(VmError::SwapStoreIo)
    }

    pub fn read_page(&mut self, slot: SwapSlotId, dest: &mut [u8]) -> VmResult<()> {
        debug_assert_eq!(dest.len(), self.page_size);

        let offset = self.slot_offset(slot);
        self.storage.read(offset, dest).map_err(VmError::SwapStoreIo)
    }

    pub fn write_page(&mut self, slot: SwapSlotId, src: &[u8]) -> VmResult<()> {
        debug_assert_eq!(src.len(), self.page_size);
        debug_assert!(self.used[slot]);

        let offset = self.slot_offset(slot);
        self.storage.write(offset, src).map_err(VmError::SwapStoreIo)
    }

    /// Content of all slots, in slot order
    pub fn read_all(&mut self) -> VmResult<Vec<u8>> {
        let mut buffer = vec![0u8; self.used.len() * self.page_size];
        self.storage
            .read(0, &mut buffer)
            .map_err(VmError::SwapStoreIo)?;

        Ok(buffer)
    }

    #[inline]
    pub fn is_used(&self, slot: SwapSlotId) -> bool {
        self.used[slot]
    }

    pub fn occupied_count(&self) -> usize {
        self.used.iter().filter(|used| **used).count()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.used.len()
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[bool] {
        &self.used
    }

    #[inline]
    fn slot_offset(&self, slot: SwapSlotId) -> usize {
        slot * self.page_size
    }
}
