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

use try_lock::TryLock;

use crate::{
    error::{VmError, VmResult},
    memory_manager::MemoryManager,
    modules::{
        eviction::{EvictionPolicy, LruEvictionPolicy},
        storage::StorageModule,
    },
};

/// A [`MemoryManager`] behind a single non blocking lock.
///
/// Accesses never wait: if another caller currently uses the manager,
/// they fail with [`VmError::Busy`].
pub struct SharedMemoryManager<
    B: StorageModule,
    S: StorageModule,
    E: EvictionPolicy = LruEvictionPolicy,
> {
    inner: TryLock<MemoryManager<B, S, E>>,
}

impl<B: StorageModule, S: StorageModule, E: EvictionPolicy> SharedMemoryManager<B, S, E> {
    pub fn new(manager: MemoryManager<B, S, E>) -> Self {
        Self {
            inner: TryLock::new(manager),
        }
    }

    pub fn load(&self, address: usize) -> VmResult<u8> {
        self.with(|manager| manager.load(address))?
    }

    pub fn store(&self, address: usize, value: u8) -> VmResult<()> {
        self.with(|manager| manager.store(address, value))?
    }

    /// Runs `f` with exclusive access to the manager
    pub fn with<R, F: FnOnce(&mut MemoryManager<B, S, E>) -> R>(&self, f: F) -> VmResult<R> {
        let mut guard = self.inner.try_lock().ok_or(VmError::Busy)?;
        Ok(f(&mut *guard))
    }

    pub fn into_inner(self) -> MemoryManager<B, S, E> {
        self.inner.into_inner()
    }
}
