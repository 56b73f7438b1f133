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

use std::{env, error::Error, fs, path::PathBuf};

use demand_paging::{
    modules::storage::FileStorageModule, MemoryManager, Segment, VmConfig, VmError,
};
use env_logger::{Builder, Env};

type DemoManager = MemoryManager<FileStorageModule, FileStorageModule>;

enum Access {
    Load(usize),
    Store(usize, u8),
}

const ACCESSES: [Access; 11] = [
    Access::Store(1025, b'$'),
    Access::Store(3079, b'%'),
    Access::Store(1048, b'('),
    Access::Load(3079),
    Access::Load(1035),
    Access::Load(15),
    Access::Load(1025),
    Access::Load(1031),
    Access::Load(7),
    Access::Load(15),
    Access::Load(1031),
];

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Info)
        .format_module_path(false)
        .init();

    let config = VmConfig {
        blank_byte: b'0',
        ..VmConfig::default()
    };

    // use the given executable image or generate a readable one
    let exec_path = match env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let path = PathBuf::from("/tmp/paging_demo_exec.data");
            let image: Vec<u8> = (0..config.backing_store_size())
                .map(|i| b'a' + (i % 26) as u8)
                .collect();
            fs::write(&path, image)?;
            path
        }
    };

    let backing = FileStorageModule::open_read_only(&exec_path)?;
    let swap =
        FileStorageModule::create_temporary("/tmp/paging_demo_swap.data", config.swap_size())?;
    let mut manager: DemoManager = MemoryManager::new(backing, swap, config)?;

    for access in ACCESSES.iter() {
        match access {
            Access::Load(address) => match manager.load(*address) {
                Ok(value) => println!("\nload({}) = '{}'", address, value as char),
                Err(err) => println!("\nload({}) failed: {}", address, err),
            },
            Access::Store(address, value) => match manager.store(*address, *value) {
                Ok(()) => println!("\nstore({}, '{}')", address, *value as char),
                Err(err) => {
                    println!("\nstore({}, '{}') failed: {}", address, *value as char, err)
                }
            },
        }

        print_memory(&manager);
        print_page_table(&manager);
        print_swap(&mut manager)?;
    }

    let stats = manager.stats();
    println!(
        "\nhits: {}, faults: {}, evictions: {}, swap outs: {}, swap ins: {}",
        stats.hits, stats.faults, stats.evictions, stats.swap_outs, stats.swap_ins
    );

    Ok(())
}

fn print_memory(manager: &DemoManager) {
    println!("\n Physical memory");
    for byte in manager.physical_memory() {
        println!("[{}]", *byte as char);
    }
}

fn print_page_table(manager: &DemoManager) {
    let table = manager.page_table_snapshot();

    for segment in Segment::ALL {
        println!("\n Page table of the {} segment", segment.name());
        println!("Valid\t Dirty\t Frame\t Swap index");

        for descriptor in table.segment(segment) {
            println!(
                "[{}]\t[{}]\t[{}]\t[{}]",
                descriptor.resident as u8,
                descriptor.dirty as u8,
                format_index(descriptor.frame),
                format_index(descriptor.swap_slot)
            );
        }
    }
}

fn print_swap(manager: &mut DemoManager) -> Result<(), VmError> {
    let swap = manager.swap_snapshot()?;

    println!("\n Swap memory");
    for slot in (0..swap.used_slots.len()).filter_map(|slot| swap.slot(slot)) {
        for (i, byte) in slot.iter().enumerate() {
            print!("{} - [{}]\t", i, *byte as char);
        }
        println!();
    }

    Ok(())
}

fn format_index(index: Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |index| index.to_string())
}
