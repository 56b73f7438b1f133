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

use super::{check_region, StorageModule};

/// Keeps all bytes inside of a `Vec`
#[derive(Debug, Clone)]
pub struct MemoryStorageModule {
    bytes: Vec<u8>,
}

impl MemoryStorageModule {
    /// Creates a storage of `size` bytes, each set to `fill`
    pub fn new(size: usize, fill: u8) -> Self {
        Self {
            bytes: vec![fill; size],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl StorageModule for MemoryStorageModule {
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()> {
        check_region(offset, dest.len(), self.bytes.len())?;
        dest.copy_from_slice(&self.bytes[offset..offset + dest.len()]);

        Ok(())
    }

    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()> {
        check_region(offset, src.len(), self.bytes.len())?;
        self.bytes[offset..offset + src.len()].copy_from_slice(src);

        Ok(())
    }

    fn get_max_size(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod test {
    use super::MemoryStorageModule;
    use crate::modules::storage::test::{
        test_storage_bounds_and_fill, test_storage_normal, STORAGE_NORMAL_TEST_SIZE,
    };

    #[test]
    fn test_memory_storage_module_normal() {
        test_storage_normal(MemoryStorageModule::new(STORAGE_NORMAL_TEST_SIZE, 0));
    }

    #[test]
    fn test_memory_storage_module_bounds_and_fill() {
        test_storage_bounds_and_fill(MemoryStorageModule::new(1000, 0));
    }

    #[test]
    fn test_memory_storage_module_from_bytes() {
        let storage = MemoryStorageModule::from_bytes(b"abc".to_vec());
        assert_eq!(storage.as_bytes(), b"abc");
    }
}
