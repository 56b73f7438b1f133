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
    fs::{remove_file, File},
    io::{self, Read, Seek, SeekFrom, Write},
    mem::ManuallyDrop,
    path::{Path, PathBuf},
};

use super::{check_region, StorageModule};

pub struct FileStorageModule {
    /// underlying file, closed manually on drop
    file: ManuallyDrop<File>,

    /// path of file, save for deleting file later
    file_path: PathBuf,

    /// cached file size, so no `metadata` call necessary
    file_size: usize,

    read_only: bool,

    /// remove the file again once this module is dropped
    temporary: bool,
}

impl FileStorageModule {
    /// Opens an existing file (e.g. an executable image) for reading only.
    ///
    /// The size of the storage is the size of the file at this point.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let file_size = file.metadata()?.len() as usize;

        Ok(Self {
            file: ManuallyDrop::new(file),
            file_path: path.as_ref().to_path_buf(),
            file_size,
            read_only: true,
            temporary: false,
        })
    }

    /// Creates (or truncates) a file with `size` bytes that is kept after drop
    pub fn create<P: AsRef<Path>>(path: P, size: usize) -> io::Result<Self> {
        Self::create_internal(path.as_ref(), size, false)
    }

    /// Like [`FileStorageModule::create`], but the file is removed on drop
    pub fn create_temporary<P: AsRef<Path>>(path: P, size: usize) -> io::Result<Self> {
        Self::create_internal(path.as_ref(), size, true)
    }

    fn create_internal(path: &Path, size: usize, temporary: bool) -> io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)?;

        file.set_len(size as u64)?;

        Ok(Self {
            file: ManuallyDrop::new(file),
            file_path: path.to_path_buf(),
            file_size: size,
            read_only: false,
            temporary,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl StorageModule for FileStorageModule {
    fn read(&mut self, offset: usize, dest: &mut [u8]) -> io::Result<()> {
        check_region(offset, dest.len(), self.file_size)?;

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(dest)
    }

    fn write(&mut self, offset: usize, src: &[u8]) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} was opened read only", self.file_path.display()),
            ));
        }
        check_region(offset, src.len(), self.file_size)?;

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(src)
    }

    fn get_max_size(&self) -> usize {
        self.file_size
    }
}

impl Drop for FileStorageModule {
    fn drop(&mut self) {
        // drop and close file before removing
        // note that after this call, file should never be accessed again...
        unsafe {
            ManuallyDrop::drop(&mut self.file);
        }

        if self.temporary && self.file_path.exists() {
            let _ = remove_file(&self.file_path);
        }
    }
}
