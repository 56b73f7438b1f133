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

mod file_storage;
mod memory_storage;

use std::io;

pub use file_storage::FileStorageModule;
pub use memory_storage::MemoryStorageModule;

/// A random-access byte store, used as backing store (executable image)
/// and as swap store.
///
/// How the bytes reach non volatile storage is up to the implementation.
pub trait StorageModule {
    /// Reads the region `[offset, offset + dest.len())` into `dest`.
    ///
    /// If this call fails, it could be that already some data was written to `dest`.
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()>;

    /// Writes `src` back to the region `[offset, offset + src.len())`
    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()>;

    /// Returns the maximum size in bytes of this storage
    ///
    /// **Accessing regions across this border fails!**
    fn get_max_size(&self) -> usize;

    /// Writes `value` to every byte of `[offset, offset + size)`
    fn fill(&mut self, offset: usize, size: usize, value: u8) -> io::Result<()> {
        const CHUNK_SIZE: usize = 256;
        let chunk = [value; CHUNK_SIZE];

        let mut rel_offset = 0;
        while rel_offset < size {
            let len = CHUNK_SIZE.min(size - rel_offset);
            self.write(offset + rel_offset, &chunk[..len])?;

            rel_offset += len;
        }

        Ok(())
    }
}

pub(crate) fn check_region(offset: usize, len: usize, max_size: usize) -> io::Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= max_size => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "illegal access, offset: {}, len: {}, max_size: {}",
                offset, len, max_size
            ),
        )),
    }
}
