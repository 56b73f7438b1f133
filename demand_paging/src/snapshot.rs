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

//! Owned, read-only copies of the manager state, meant for display and testing.

use crate::{
    address::Segment,
    page_table::{PageDescriptor, PageId},
    swap_store::SwapSlotId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SegmentSnapshot {
    pub segment: Segment,
    pub pages: Vec<PageDescriptor>,
}

/// State of every page, grouped by segment in address order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageTableSnapshot {
    pub segments: Vec<SegmentSnapshot>,
}

impl PageTableSnapshot {
    #[inline]
    pub fn segment(&self, segment: Segment) -> &[PageDescriptor] {
        &self.segments[segment.id()].pages
    }

    #[inline]
    pub fn page(&self, page: PageId) -> &PageDescriptor {
        &self.segment(page.segment)[page.page_index]
    }

    pub fn resident_count(&self) -> usize {
        self.descriptors().filter(|d| d.resident).count()
    }

    pub fn swap_bound_count(&self) -> usize {
        self.descriptors().filter(|d| d.swap_slot.is_some()).count()
    }

    fn descriptors(&self) -> impl Iterator<Item = &PageDescriptor> {
        self.segments.iter().flat_map(|segment| segment.pages.iter())
    }
}

/// Content and slot usage of the swap store
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SwapSnapshot {
    pub page_size: usize,
    pub content: Vec<u8>,
    pub used_slots: Vec<bool>,
}

impl SwapSnapshot {
    /// Content of `slot`, `None` if there is no such slot
    #[inline]
    pub fn slot(&self, slot: SwapSlotId) -> Option<&[u8]> {
        self.content
            .get(slot * self.page_size..(slot + 1) * self.page_size)
    }

    pub fn occupied_count(&self) -> usize {
        self.used_slots.iter().filter(|used| **used).count()
    }
}

/// Access counters since construction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PagingStats {
    /// accesses to resident pages
    pub hits: u64,
    /// accesses that had to make a page resident first
    pub faults: u64,
    pub evictions: u64,
    /// dirty pages written to swap
    pub swap_outs: u64,
    /// pages fetched back from swap
    pub swap_ins: u64,
}
