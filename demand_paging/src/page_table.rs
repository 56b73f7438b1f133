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

use crate::{
    address::{Segment, SEGMENT_COUNT},
    frame_allocator::FrameId,
    swap_store::SwapSlotId,
    vm_config::VmConfig,
};

/// State of a single page.
///
/// Following is always true:
/// - `resident == frame.is_some()`
/// - `swap_slot.is_some()` implies `!resident` and `dirty`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageDescriptor {
    pub resident: bool,
    pub frame: Option<FrameId>,

    /// Content diverges from the backing store
    pub dirty: bool,

    pub swap_slot: Option<SwapSlotId>,
}

impl PageDescriptor {
    #[inline]
    fn check_invariants(&self) {
        debug_assert_eq!(self.resident, self.frame.is_some());
        debug_assert!(self.swap_slot.is_none() || (!self.resident && self.dirty));
    }
}

/// Identifies a page by its segment and index inside of that segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageId {
    pub segment: Segment,
    pub page_index: usize,
}

impl PageId {
    pub const fn new(segment: Segment, page_index: usize) -> Self {
        Self {
            segment,
            page_index,
        }
    }
}

/// One descriptor array per segment, sized at construction and never resized.
///
/// Indices are expected to be bounds checked by the address translator.
pub struct PageTable {
    segments: [Vec<PageDescriptor>; SEGMENT_COUNT],
}

impl PageTable {
    pub fn new(config: &VmConfig) -> Self {
        Self {
            segments: Segment::ALL
                .map(|segment| vec![PageDescriptor::default(); config.page_count(segment)]),
        }
    }

    #[inline]
    pub fn lookup(&self, page: PageId) -> &PageDescriptor {
        &self.segments[page.segment.id()][page.page_index]
    }

    #[inline]
    fn lookup_mut(&mut self, page: PageId) -> &mut PageDescriptor {
        &mut self.segments[page.segment.id()][page.page_index]
    }

    /// Binds `page` to `frame`.
    ///
    /// Returns the swap slot the page was bound to before, the caller has to release it.
    pub fn mark_resident(&mut self, page: PageId, frame: FrameId) -> Option<SwapSlotId> {
        let descriptor = self.lookup_mut(page);
        debug_assert!(!descriptor.resident, "{:?} is already resident", page);

        descriptor.resident = true;
        descriptor.frame = Some(frame);
        let prev_slot = descriptor.swap_slot.take();

        descriptor.check_invariants();
        prev_slot
    }

    /// Only valid for resident pages
    #[inline]
    pub fn mark_dirty(&mut self, page: PageId) {
        let descriptor = self.lookup_mut(page);
        debug_assert!(descriptor.resident);

        descriptor.dirty = true;
    }

    /// Unbinds `page` from its frame.
    ///
    /// Dirty pages have to be given the `swap_slot` their content was written to.
    /// Clean pages are discarded, their content can be fetched again.
    /// Returns the frame the page was bound to.
    pub fn evict(&mut self, page: PageId, swap_slot: Option<SwapSlotId>) -> Option<FrameId> {
        let descriptor = self.lookup_mut(page);
        debug_assert!(swap_slot.is_none() || descriptor.dirty);

        descriptor.resident = false;
        let frame = descriptor.frame.take();
        descriptor.swap_slot = swap_slot;

        descriptor.check_invariants();
        frame
    }

    /// Forgets that `page` was modified.
    ///
    /// Only used when the content of an evicted dirty page could not be saved.
    pub(crate) fn discard_dirty(&mut self, page: PageId) {
        let descriptor = self.lookup_mut(page);
        debug_assert!(!descriptor.resident && descriptor.swap_slot.is_none());

        descriptor.dirty = false;
    }

    /// Scans all segments in order for the page bound to `frame`
    pub fn find_by_frame(&self, frame: FrameId) -> Option<PageId> {
        self.iter()
            .find(|(_, descriptor)| descriptor.frame == Some(frame))
            .map(|(page, _)| page)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageId, &PageDescriptor)> + '_ {
        Segment::ALL.into_iter().flat_map(move |segment| {
            self.segments[segment.id()]
                .iter()
                .enumerate()
                .map(move |(page_index, descriptor)| (PageId::new(segment, page_index), descriptor))
        })
    }

    #[inline]
    pub fn segment(&self, segment: Segment) -> &[PageDescriptor] {
        &self.segments[segment.id()]
    }

    /// Number of non resident pages that are bound to a swap slot
    pub fn swap_bound_count(&self) -> usize {
        self.iter()
            .filter(|(_, descriptor)| descriptor.swap_slot.is_some())
            .count()
    }
}

#[cfg(test)]
mod test {
    use super::{PageId, PageTable};
    use crate::{address::Segment, vm_config::VmConfig};

    #[test]
    fn test_page_table_layout() {
        let table = PageTable::new(&VmConfig::default());

        assert_eq!(table.segment(Segment::Text).len(), 2);
        assert_eq!(table.segment(Segment::Data).len(), 4);
        assert_eq!(table.segment(Segment::Bss).len(), 4);
        assert_eq!(table.segment(Segment::HeapStack).len(), 4);
        assert_eq!(table.iter().count(), 14);
        assert!(table.iter().all(|(_, d)| !d.resident && d.frame.is_none()));
    }

    #[test]
    fn test_page_lifecycle() {
        let mut table = PageTable::new(&VmConfig::default());
        let page = PageId::new(Segment::Bss, 2);

        assert_eq!(table.mark_resident(page, 1), None);
        assert_eq!(table.find_by_frame(1), Some(page));
        assert_eq!(table.find_by_frame(0), None);

        table.mark_dirty(page);
        assert_eq!(table.evict(page, Some(5)), Some(1));

        let descriptor = *table.lookup(page);
        assert!(!descriptor.resident);
        assert!(descriptor.dirty);
        assert_eq!(descriptor.frame, None);
        assert_eq!(descriptor.swap_slot, Some(5));
        assert_eq!(table.swap_bound_count(), 1);
        assert_eq!(table.find_by_frame(1), None);

        // loading the page again releases the slot
        assert_eq!(table.mark_resident(page, 0), Some(5));
        assert_eq!(table.swap_bound_count(), 0);
        assert!(table.lookup(page).dirty);
    }
}
