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

use std::io;

use thiserror::Error;

use crate::frame_allocator::FrameId;

pub type VmResult<T> = Result<T, VmError>;

/// Errors reported by [`crate::MemoryManager`] operations.
///
/// None of these are retried internally. A failed access leaves the
/// requested byte unread/unwritten and the manager keeps running.
#[derive(Error, Debug)]
pub enum VmError {
    /// Segment or page index outside of the configured bounds
    #[error("address {address} is out of bounds")]
    OutOfBounds { address: usize },

    /// Write to a page of the text segment
    #[error("address {address} lies in the read-only text segment")]
    ReadOnlyViolation { address: usize },

    /// Read of a heap/stack page that was never written
    #[error("heap/stack page at address {address} was never written")]
    UninitializedHeapStackRead { address: usize },

    /// No swap slot left while a dirty page had to be evicted
    #[error("no free swap slot left to evict a dirty page")]
    ResourceExhausted,

    #[error("backing store i/o failed")]
    BackingStoreIo(#[source] io::Error),

    #[error("swap store i/o failed")]
    SwapStoreIo(#[source] io::Error),

    /// Eviction found no victim frame, or the victim is not owned by any page
    #[error("eviction bookkeeping is inconsistent (victim frame: {frame:?})")]
    InternalInconsistency { frame: Option<FrameId> },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Another caller currently holds the shared manager
    #[error("memory manager is in use by another caller")]
    Busy,
}

/// Violations detected while validating a [`crate::VmConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page size must not be zero")]
    ZeroPageSize,

    #[error("segment span must not be zero")]
    ZeroSegmentSpan,

    #[error("{name} ({size} bytes) is not a multiple of the page size ({page_size} bytes)")]
    NotPageAligned {
        name: &'static str,
        size: usize,
        page_size: usize,
    },

    #[error("physical memory has to hold at least one frame")]
    NoFrames,

    #[error("segment {name} ({size} bytes) does not fit into a segment span of {span} bytes")]
    SegmentTooLarge {
        name: &'static str,
        size: usize,
        span: usize,
    },

    #[error("{name} store holds {actual} bytes, at least {required} bytes are required")]
    StoreTooSmall {
        name: &'static str,
        required: usize,
        actual: usize,
    },
}
