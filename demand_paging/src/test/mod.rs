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

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    modules::storage::{MemoryStorageModule, StorageModule},
    MemoryManager, VmConfig,
};


pub(crate) type TestManager = MemoryManager<MemoryStorageModule, MemoryStorageModule>;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Content of the test backing store at `offset`
pub(crate) fn backing_byte(offset: usize) -> u8 {
    (offset % 251) as u8
}

pub(crate) fn backing_image(config: &VmConfig) -> Vec<u8> {
    (0..config.backing_store_size()).map(backing_byte).collect()
}

pub(crate) fn get_test_manager(config: VmConfig) -> TestManager {
    init_logging();

    let backing = MemoryStorageModule::from_bytes(backing_image(&config));
    let swap = MemoryStorageModule::new(config.swap_size(), 0xFF);

    MemoryManager::new(backing, swap, config).unwrap()
}

/// Page size 8, four frames, blank byte `'0'`
pub(crate) fn four_frame_config() -> VmConfig {
    VmConfig {
        text_size: 16,
        data_size: 32,
        bss_size: 32,
        heap_stack_size: 32,
        page_size: 8,
        physical_memory_size: 32,
        segment_span: 1024,
        blank_byte: b'0',
    }
}

/// Occupied swap slots and swap bound pages have to match one to one
pub(crate) fn assert_swap_conservation<B: StorageModule, S: StorageModule>(
    manager: &mut MemoryManager<B, S>,
) {
    let swap = manager.swap_snapshot().unwrap();
    let table = manager.page_table_snapshot();

    assert_eq!(swap.occupied_count(), table.swap_bound_count());

    let mut claimed = vec![false; swap.used_slots.len()];
    for segment in &table.segments {
        for descriptor in &segment.pages {
            if let Some(slot) = descriptor.swap_slot {
                assert!(swap.used_slots[slot], "slot {} is bound but free", slot);
                assert!(!claimed[slot], "slot {} is claimed twice", slot);
                assert!(!descriptor.resident);
                claimed[slot] = true;
            }
        }
    }
}

/// Memory storage whose reads and writes can be made to fail
#[derive(Clone)]
pub(crate) struct FaultyStorageModule {
    inner: MemoryStorageModule,
    pub(crate) fail_reads: Arc<AtomicBool>,
    pub(crate) fail_writes: Arc<AtomicBool>,
}

impl FaultyStorageModule {
    pub(crate) fn new(inner: MemoryStorageModule) -> Self {
        Self {
            inner,
            fail_reads: Arc::new(AtomicBool::new(false)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    fn check(flag: &AtomicBool) -> io::Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(io::Error::new(io::ErrorKind::Other, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl StorageModule for FaultyStorageModule {
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()> {
        Self::check(&self.fail_reads)?;
        self.inner.read(offset, dest)
    }

    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()> {
        Self::check(&self.fail_writes)?;
        self.inner.write(offset, src)
    }

    fn get_max_size(&self) -> usize {
        self.inner.get_max_size()
    }
}
