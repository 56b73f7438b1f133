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

use crate::{address::Segment, error::ConfigError};

/// Construction parameters of a [`crate::MemoryManager`].
///
/// All sizes are given in bytes and are fixed for the lifetime of a manager.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VmConfig {
    pub text_size: usize,
    pub data_size: usize,
    pub bss_size: usize,
    pub heap_stack_size: usize,

    pub page_size: usize,

    /// Size of the simulated physical memory.
    /// The frame count is `physical_memory_size / page_size`.
    pub physical_memory_size: usize,

    /// Width of each of the four segment partitions of the logical
    /// address space. Segment `i` starts at `i * segment_span`.
    pub segment_span: usize,

    /// Byte used for unused memory, freshly created pages and cleared swap slots
    pub blank_byte: u8,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            text_size: 16,
            data_size: 32,
            bss_size: 32,
            heap_stack_size: 32,
            page_size: 8,
            physical_memory_size: 16,
            segment_span: 1024,
            blank_byte: 0,
        }
    }
}

impl VmConfig {
    /// Size of the given segment
    #[inline]
    pub fn segment_size(&self, segment: Segment) -> usize {
        match segment {
            Segment::Text => self.text_size,
            Segment::Data => self.data_size,
            Segment::Bss => self.bss_size,
            Segment::HeapStack => self.heap_stack_size,
        }
    }

    #[inline]
    pub fn page_count(&self, segment: Segment) -> usize {
        self.segment_size(segment) / self.page_size
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.physical_memory_size / self.page_size
    }

    /// Bytes the backing store has to provide (text, data and bss images)
    #[inline]
    pub fn backing_store_size(&self) -> usize {
        self.text_size + self.data_size + self.bss_size
    }

    /// Bytes of the swap store: every writable segment can be swapped out completely
    #[inline]
    pub fn swap_size(&self) -> usize {
        self.data_size + self.bss_size + self.heap_stack_size
    }

    #[inline]
    pub fn swap_slot_count(&self) -> usize {
        self.swap_size() / self.page_size
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.segment_span == 0 {
            return Err(ConfigError::ZeroSegmentSpan);
        }

        let aligned = [
            ("text segment", self.text_size),
            ("data segment", self.data_size),
            ("bss segment", self.bss_size),
            ("heap/stack segment", self.heap_stack_size),
            ("physical memory", self.physical_memory_size),
            ("segment span", self.segment_span),
        ];
        for (name, size) in aligned {
            if size % self.page_size != 0 {
                return Err(ConfigError::NotPageAligned {
                    name,
                    size,
                    page_size: self.page_size,
                });
            }
        }

        if self.frame_count() == 0 {
            return Err(ConfigError::NoFrames);
        }

        for segment in Segment::ALL {
            let size = self.segment_size(segment);
            if size > self.segment_span {
                return Err(ConfigError::SegmentTooLarge {
                    name: segment.name(),
                    size,
                    span: self.segment_span,
                });
            }
        }

        Ok(())
    }
}
