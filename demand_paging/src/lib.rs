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

mod address;
mod error;
mod frame_allocator;
mod memory_manager;
mod page_table;
mod shared_memory_manager;
mod swap_store;
mod vm_config;

pub mod modules;
pub mod snapshot;

#[cfg(test)]
mod test;

pub use address::{AddressTranslator, Segment, TranslatedAddress, SEGMENT_COUNT};
pub use error::{ConfigError, VmError, VmResult};
pub use frame_allocator::{FrameAllocator, FrameId, FrameState, LogicalClock};
pub use memory_manager::MemoryManager;
pub use page_table::{PageDescriptor, PageId, PageTable};
pub use shared_memory_manager::SharedMemoryManager;
pub use swap_store::{SwapSlotId, SwapStore};
pub use vm_config::VmConfig;
