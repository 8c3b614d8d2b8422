//! In-memory image fixtures for the pass tests.

use crate::image::Image;
use crate::vsfs::BLOCK_SIZE;
use crate::vsfs::DATA_BITMAP_BLOCK;
use crate::vsfs::FIRST_DATA_BLOCK;
use crate::vsfs::IMAGE_SIZE;
use crate::vsfs::INODE_BITMAP_BLOCK;
use crate::vsfs::INODE_COUNT;
use crate::vsfs::INODE_SIZE;
use crate::vsfs::INODE_TABLE_START;
use crate::vsfs::MAGIC;
use crate::vsfs::Superblock;
use crate::vsfs::TOTAL_BLOCKS;
use utils::util::reinterpret;
use utils::util::set_bit;

/// Returns a consistent empty image: valid superblock, no live inodes, cleared bitmaps.
pub fn blank_image() -> Image {
    let mut buf = vec![0u8; IMAGE_SIZE as usize];
    let sb = Superblock {
        magic: MAGIC,
        block_size: BLOCK_SIZE as u32,
        total_blocks: TOTAL_BLOCKS,
        inode_bitmap_block: INODE_BITMAP_BLOCK,
        data_bitmap_block: DATA_BITMAP_BLOCK,
        inode_table_start: INODE_TABLE_START,
        first_data_block: FIRST_DATA_BLOCK,
        inode_size: INODE_SIZE as u32,
        inode_count: INODE_COUNT as u32,
        reserved: [0; 4062],
    };
    buf[..size_of::<Superblock>()].copy_from_slice(reinterpret(&sb));
    Image::new(buf).unwrap()
}

/// Makes inode `i` live with the given block pointers (direct, single, double, triple
/// indirect) and marks it in the inode bitmap.
pub fn set_live_inode(img: &mut Image, i: usize, ptrs: [u32; 4]) {
    let inode = img.inode_mut(i);
    inode.links_count = 1;
    inode.dtime = 0;
    inode.direct_block = ptrs[0];
    inode.single_indirect = ptrs[1];
    inode.double_indirect = ptrs[2];
    inode.triple_indirect = ptrs[3];
    set_bit(img.inode_bitmap_mut(), i);
}

/// Marks data block `blk` as used in the data bitmap.
pub fn mark_data_block(img: &mut Image, blk: u32) {
    set_bit(img.data_bitmap_mut(), (blk - FIRST_DATA_BLOCK) as usize);
}

/// Returns a consistent image holding one live inode whose direct pointer names the first
/// data block.
pub fn clean_image() -> Image {
    let mut img = blank_image();
    set_live_inode(&mut img, 0, [FIRST_DATA_BLOCK, 0, 0, 0]);
    mark_data_block(&mut img, FIRST_DATA_BLOCK);
    img
}
