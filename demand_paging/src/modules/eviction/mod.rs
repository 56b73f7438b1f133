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

use crate::frame_allocator::{FrameAllocator, FrameId};

mod lru;
pub use lru::*;

/// Decides which frame has to give up its page once all frames are occupied.
///
/// The module only selects a victim. Unbinding the page, saving dirty content
/// to swap and freeing the frame is done by the memory manager.
pub trait EvictionPolicy {
    fn new() -> Self;

    /// Selects one of the occupied frames of `frames`.
    ///
    /// Only called if every frame is occupied. Returns `None` if no frame is occupied.
    fn select_victim(&mut self, frames: &FrameAllocator) -> Option<FrameId>;
}
