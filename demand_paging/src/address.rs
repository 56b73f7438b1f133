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

use static_assertions::const_assert_eq;

use crate::{error::VmError, vm_config::VmConfig};

/// Number of segments the logical address space is partitioned into
pub const SEGMENT_COUNT: usize = 4;

/// The four fixed logical regions of an address space, in address order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Segment {
    /// Read-only, loaded from the backing store, never swapped
    Text = 0,
    /// Loaded from the backing store, writable
    Data = 1,
    /// Loaded from the backing store, writable
    Bss = 2,
    /// Only ever created by a write
    HeapStack = 3,
}

const_assert_eq!(Segment::ALL.len(), SEGMENT_COUNT);

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Text,
        Segment::Data,
        Segment::Bss,
        Segment::HeapStack,
    ];

    #[inline]
    pub const fn id(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_id(id: usize) -> Option<Segment> {
        Self::ALL.get(id).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Segment::Text => "text",
            Segment::Data => "data",
            Segment::Bss => "bss",
            Segment::HeapStack => "heap/stack",
        }
    }

    #[inline]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Segment::Text)
    }
}

/// A logical address split into its components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatedAddress {
    pub segment: Segment,
    pub page_index: usize,
    pub offset: usize,
}

/// Splits logical addresses into `(segment, page index, offset)`.
///
/// The address space consists of four partitions of `segment_span` bytes each.
/// With the default span of 1024 bytes an address is 12 bits wide and its
/// top two bits select the segment.
#[derive(Debug, Clone)]
pub struct AddressTranslator {
    page_size: usize,
    segment_span: usize,
    page_counts: [usize; SEGMENT_COUNT],
}

impl AddressTranslator {
    /// Expects an already validated configuration
    pub fn new(config: &VmConfig) -> Self {
        debug_assert!(config.validate().is_ok());

        Self {
            page_size: config.page_size,
            segment_span: config.segment_span,
            page_counts: Segment::ALL.map(|segment| config.page_count(segment)),
        }
    }

    pub fn translate(&self, address: usize) -> Result<TranslatedAddress, VmError> {
        let segment = Segment::from_id(address / self.segment_span)
            .ok_or(VmError::OutOfBounds { address })?;

        let relative = address % self.segment_span;
        let page_index = relative / self.page_size;
        if page_index >= self.page_counts[segment.id()] {
            return Err(VmError::OutOfBounds { address });
        }

        Ok(TranslatedAddress {
            segment,
            page_index,
            offset: relative % self.page_size,
        })
    }

    /// First logical address of `segment`
    #[inline]
    pub fn segment_base(&self, segment: Segment) -> usize {
        segment.id() * self.segment_span
    }

    /// Inverse of [`AddressTranslator::translate`]. Does not check bounds.
    #[inline]
    pub fn address_of(&self, segment: Segment, page_index: usize, offset: usize) -> usize {
        self.segment_base(segment) + page_index * self.page_size + offset
    }

    #[inline]
    pub fn page_count(&self, segment: Segment) -> usize {
        self.page_counts[segment.id()]
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
