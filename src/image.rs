//! Binds the raw bytes of a filesystem image to the regions of the VSFS layout.
//!
//! The whole image is held in a single owned buffer for the lifetime of the process. Accessors
//! hand out short-lived views keyed by block or inode index so that passes can mutate the image
//! without keeping references across calls.

use crate::vsfs::BLOCK_SIZE;
use crate::vsfs::DATA_BITMAP_BLOCK;
use crate::vsfs::IMAGE_SIZE;
use crate::vsfs::INODE_BITMAP_BLOCK;
use crate::vsfs::INODE_SIZE;
use crate::vsfs::INODE_TABLE_START;
use crate::vsfs::Inode;
use crate::vsfs::Superblock;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use utils::disk::get_disk_size;

/// An in-memory filesystem image.
pub struct Image {
    buf: Vec<u8>,
}

impl Image {
    /// Wraps the given raw image bytes.
    ///
    /// Fails if the buffer is not exactly the size of a VSFS image.
    pub fn new(buf: Vec<u8>) -> io::Result<Self> {
        if buf.len() as u64 != IMAGE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "image size ({}) doesn't match expected size ({IMAGE_SIZE})",
                    buf.len()
                ),
            ));
        }
        Ok(Self { buf })
    }

    /// Reads a whole image from the given file.
    ///
    /// The file's size is checked before anything is read.
    pub fn load(file: &mut File) -> io::Result<Self> {
        let size = get_disk_size(file)?;
        if size != IMAGE_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("image size ({size}) doesn't match expected size ({IMAGE_SIZE})"),
            ));
        }
        let mut buf = vec![0; IMAGE_SIZE as usize];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut buf)?;
        Self::new(buf)
    }

    /// Writes the whole image back to the given file.
    pub fn save(&self, file: &mut File) -> io::Result<()> {
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&self.buf)
    }

    /// Returns the raw bytes of the image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the bytes of block `n`.
    pub fn block(&self, n: u32) -> &[u8] {
        let off = n as usize * BLOCK_SIZE;
        &self.buf[off..off + BLOCK_SIZE]
    }

    /// Returns the bytes of block `n` for writing.
    pub fn block_mut(&mut self, n: u32) -> &mut [u8] {
        let off = n as usize * BLOCK_SIZE;
        &mut self.buf[off..off + BLOCK_SIZE]
    }

    /// Returns the superblock overlay.
    pub fn superblock(&self) -> &Superblock {
        unsafe { &*(self.buf.as_ptr() as *const Superblock) }
    }

    /// Returns the superblock overlay for writing.
    pub fn superblock_mut(&mut self) -> &mut Superblock {
        unsafe { &mut *(self.buf.as_mut_ptr() as *mut Superblock) }
    }

    /// Returns the inode bitmap.
    pub fn inode_bitmap(&self) -> &[u8] {
        self.block(INODE_BITMAP_BLOCK)
    }

    /// Returns the inode bitmap for writing.
    pub fn inode_bitmap_mut(&mut self) -> &mut [u8] {
        self.block_mut(INODE_BITMAP_BLOCK)
    }

    /// Returns the data bitmap.
    pub fn data_bitmap(&self) -> &[u8] {
        self.block(DATA_BITMAP_BLOCK)
    }

    /// Returns the data bitmap for writing.
    pub fn data_bitmap_mut(&mut self) -> &mut [u8] {
        self.block_mut(DATA_BITMAP_BLOCK)
    }

    /// Returns the overlay of inode `i`.
    pub fn inode(&self, i: usize) -> &Inode {
        let off = INODE_TABLE_START as usize * BLOCK_SIZE + i * INODE_SIZE;
        unsafe { &*(self.buf[off..].as_ptr() as *const Inode) }
    }

    /// Returns the overlay of inode `i` for writing.
    pub fn inode_mut(&mut self, i: usize) -> &mut Inode {
        let off = INODE_TABLE_START as usize * BLOCK_SIZE + i * INODE_SIZE;
        unsafe { &mut *(self.buf[off..].as_mut_ptr() as *mut Inode) }
    }

    /// Reads slot `i` of the indirect container `blk`.
    pub fn indirect_entry(&self, blk: u32, i: usize) -> u32 {
        let block = self.block(blk);
        let off = i * size_of::<u32>();
        u32::from_le_bytes([block[off], block[off + 1], block[off + 2], block[off + 3]])
    }

    /// Writes slot `i` of the indirect container `blk`.
    pub fn set_indirect_entry(&mut self, blk: u32, i: usize, val: u32) {
        let block = self.block_mut(blk);
        let off = i * size_of::<u32>();
        block[off..off + size_of::<u32>()].copy_from_slice(&val.to_le_bytes());
    }
}
