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

use super::EvictionPolicy;
use crate::frame_allocator::{FrameAllocator, FrameId};

/// Least recently used: picks the occupied frame with the smallest access time.
///
/// Completely stateless, recency is tracked by the frame allocator.
pub struct LruEvictionPolicy;

impl EvictionPolicy for LruEvictionPolicy {
    fn new() -> Self {
        Self
    }

    #[inline]
    fn select_victim(&mut self, frames: &FrameAllocator) -> Option<FrameId> {
        frames.oldest_occupied_frame()
    }
}
