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

/// Index of a physical frame
pub type FrameId = usize;

/// Monotonically increasing access counter.
///
/// Ticks exactly once per successful memory access. Its only use is ordering
/// frames by recency.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogicalClock {
    now: u64,
}

impl LogicalClock {
    pub const fn new() -> Self {
        Self { now: 0 }
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Returns the current value and advances the clock
    #[inline]
    pub fn tick(&mut self) -> u64 {
        let curr = self.now;
        self.now += 1;
        curr
    }
}

/// Occupancy and recency of a single physical frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrameState {
    pub occupied: bool,

    /// Clock value of the last access, `None` if never used since the last free
    pub last_access: Option<u64>,
}

/// Fixed pool of physical frames.
///
/// This is the only place where frames are marked as free or occupied.
pub struct FrameAllocator {
    frames: Vec<FrameState>,
}

impl FrameAllocator {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: vec![FrameState::default(); frame_count],
        }
    }

    /// First fit: returns the lowest free frame and marks it as occupied
    pub fn allocate(&mut self) -> Option<FrameId> {
        let frame = self.frames.iter().position(|state| !state.occupied)?;
        self.frames[frame].occupied = true;

        Some(frame)
    }

    #[inline]
    pub fn touch(&mut self, frame: FrameId, clock_value: u64) {
        debug_assert!(self.frames[frame].occupied, "touched free frame {}", frame);
        self.frames[frame].last_access = Some(clock_value);
    }

    pub fn free(&mut self, frame: FrameId) {
        debug_assert!(self.frames[frame].occupied, "double free of frame {}", frame);
        self.frames[frame] = FrameState::default();
    }

    /// The occupied frame that was accessed least recently.
    ///
    /// Ties are resolved towards the lowest frame index. Occupied frames that
    /// were never touched count as older than any touched frame.
    /// Returns `None` only if no frame is occupied.
    pub fn oldest_occupied_frame(&self) -> Option<FrameId> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, state)| state.occupied)
            // `min_by_key` keeps the first of equal minimums
            .min_by_key(|(_, state)| state.last_access)
            .map(|(frame, _)| frame)
    }

    #[inline]
    pub fn is_occupied(&self, frame: FrameId) -> bool {
        self.frames[frame].occupied
    }

    pub fn occupied_count(&self) -> usize {
        self.frames.iter().filter(|state| state.occupied).count()
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn frames(&self) -> &[FrameState] {
        &self.frames
    }
}
