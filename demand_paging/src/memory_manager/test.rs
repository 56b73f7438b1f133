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

use std::sync::atomic::Ordering;

use super::MemoryManager;
use crate::{
    error::VmError,
    modules::storage::MemoryStorageModule,
    test::{backing_byte, backing_image, get_test_manager, init_logging, FaultyStorageModule},
    PageId, Segment, VmConfig,
};

const DATA: usize = 1024;

fn get_faulty_manager(
    config: VmConfig,
) -> (
    MemoryManager<FaultyStorageModule, FaultyStorageModule>,
    FaultyStorageModule,
    FaultyStorageModule,
) {
    init_logging();

    let backing = FaultyStorageModule::new(MemoryStorageModule::from_bytes(backing_image(&config)));
    let swap = FaultyStorageModule::new(MemoryStorageModule::new(config.swap_size(), 0xFF));

    let manager = MemoryManager::new(backing.clone(), swap.clone(), config).unwrap();
    (manager, backing, swap)
}

#[test]
fn test_swap_exhaustion_loses_dirty_page() {
    let mut manager = get_test_manager(VmConfig::default());
    while manager.swap.allocate_slot().is_some() {}

    let data_page = PageId::new(Segment::Data, 0);

    manager.store(DATA, b'$').unwrap();
    manager.load(0).unwrap();

    // the dirty data page is the least recently used one
    assert!(matches!(manager.load(8), Err(VmError::ResourceExhausted)));

    let descriptor = manager.page_descriptor(data_page);
    assert!(!descriptor.resident);
    assert!(!descriptor.dirty);
    assert_eq!(descriptor.swap_slot, None);
    assert!(!manager.frames.is_occupied(0));
    assert_eq!(manager.frame_content(0).unwrap(), &[0; 8]);

    let stats = manager.stats();
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.swap_outs, 0);

    // the modification is gone, the backing store image is visible again
    assert_eq!(manager.load(8).unwrap(), backing_byte(8));
    assert_eq!(manager.load(DATA).unwrap(), backing_byte(16));
}

#[test]
fn test_swap_exhaustion_makes_heap_page_uninitialized() {
    let mut manager = get_test_manager(VmConfig::default());
    while manager.swap.allocate_slot().is_some() {}

    let heap = 3072;
    manager.store(heap, 7).unwrap();
    manager.load(0).unwrap();
    assert!(matches!(manager.load(8), Err(VmError::ResourceExhausted)));

    assert!(matches!(
        manager.load(heap),
        Err(VmError::UninitializedHeapStackRead { address: 3072 })
    ));
}

#[test]
fn test_unbound_occupied_frame_is_inconsistent() {
    let mut manager = get_test_manager(VmConfig::default());

    manager.load(0).unwrap();
    manager.load(DATA).unwrap();

    // unbind the page without freeing its frame
    assert_eq!(
        manager.page_table.evict(PageId::new(Segment::Text, 0), None),
        Some(0)
    );

    assert!(matches!(
        manager.load(8),
        Err(VmError::InternalInconsistency { frame: Some(0) })
    ));
}

#[test]
fn test_failing_backing_store_changes_nothing() {
    let (mut manager, backing, _) = get_faulty_manager(VmConfig::default());

    manager.store(DATA, b'$').unwrap();
    manager.load(0).unwrap();

    backing.fail_reads.store(true, Ordering::SeqCst);

    // no frame is free, but a failing fetch must not evict anything
    assert!(matches!(manager.load(8), Err(VmError::BackingStoreIo(_))));

    assert!(!manager.page_descriptor(PageId::new(Segment::Text, 1)).resident);
    assert!(manager.page_descriptor(PageId::new(Segment::Data, 0)).resident);
    assert!(manager.page_descriptor(PageId::new(Segment::Text, 0)).resident);
    assert_eq!(manager.frames.occupied_count(), 2);
    assert_eq!(manager.stats().faults, 2);
    assert_eq!(manager.stats().evictions, 0);
    assert_eq!(manager.clock(), 2);

    backing.fail_reads.store(false, Ordering::SeqCst);
    assert_eq!(manager.load(8).unwrap(), backing_byte(8));
}

#[test]
fn test_failing_swap_store() {
    let (mut manager, _, swap) = get_faulty_manager(VmConfig::default());
    let data_page = PageId::new(Segment::Data, 0);

    manager.store(DATA, b'$').unwrap();
    manager.load(0).unwrap();

    // failing write keeps the dirty page resident
    swap.fail_writes.store(true, Ordering::SeqCst);
    assert!(matches!(manager.load(8), Err(VmError::SwapStoreIo(_))));

    let descriptor = manager.page_descriptor(data_page);
    assert!(descriptor.resident);
    assert!(descriptor.dirty);
    assert_eq!(descriptor.swap_slot, None);
    assert_eq!(manager.swap.occupied_count(), 0);
    assert_eq!(manager.stats().evictions, 0);

    swap.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(manager.load(8).unwrap(), backing_byte(8));
    assert_eq!(manager.page_descriptor(data_page).swap_slot, Some(0));
    assert_eq!(manager.stats().swap_outs, 1);

    // failing read keeps the page in its swap slot
    swap.fail_reads.store(true, Ordering::SeqCst);
    assert!(matches!(manager.load(DATA), Err(VmError::SwapStoreIo(_))));
    assert_eq!(manager.page_descriptor(data_page).swap_slot, Some(0));
    assert!(manager.swap.is_used(0));

    swap.fail_reads.store(false, Ordering::SeqCst);
    assert_eq!(manager.load(DATA).unwrap(), b'$');
    assert_eq!(manager.page_descriptor(data_page).swap_slot, None);
    assert!(!manager.swap.is_used(0));
}

#[test]
fn test_failing_slot_clear_completes_swap_in() {
    let (mut manager, _, swap) = get_faulty_manager(VmConfig::default());
    let data_page = PageId::new(Segment::Data, 0);

    manager.store(DATA, b'$').unwrap();
    manager.load(0).unwrap();
    manager.load(8).unwrap();
    assert_eq!(manager.page_descriptor(data_page).swap_slot, Some(0));
    let clock = manager.clock();

    // the swap in itself only reads, clearing the released slot fails
    swap.fail_writes.store(true, Ordering::SeqCst);
    assert_eq!(manager.load(DATA).unwrap(), b'$');

    let descriptor = manager.page_descriptor(data_page);
    assert!(descriptor.resident);
    assert!(descriptor.dirty);
    assert_eq!(descriptor.swap_slot, None);
    assert!(!manager.swap.is_used(0));
    assert_eq!(manager.clock(), clock + 1);

    let frame = descriptor.frame.unwrap();
    assert_eq!(manager.frames.frames()[frame].last_access, Some(clock));
    assert_eq!(manager.stats().swap_ins, 1);

    // the recently loaded page is not the next victim
    swap.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(manager.load(0).unwrap(), backing_byte(0));
    assert!(manager.page_descriptor(data_page).resident);
}
