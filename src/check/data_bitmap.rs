//! Reconciliation of the data bitmap against the blocks referenced by live inodes.
//!
//! Only the four top-level pointers of each live inode count as references here. An indirect
//! container is itself marked as referenced, but its contents are not followed; the duplicate
//! and bad-block passes are the ones that walk container contents.

use crate::image::Image;
use crate::vsfs::DATA_BLOCKS_COUNT;
use crate::vsfs::FIRST_DATA_BLOCK;
use crate::vsfs::INODE_COUNT;
use crate::vsfs::TOTAL_BLOCKS;
use utils::util::clear_bit;
use utils::util::is_bit_set;
use utils::util::set_bit;

/// Checks that every data bitmap bit agrees with the set of referenced data blocks.
pub fn check(img: &mut Image, fix: bool) -> bool {
    println!("\n=== Data Bitmap Validation ===");
    let mut valid = true;
    let mut used = [false; DATA_BLOCKS_COUNT];

    println!("Checking blocks referenced by inodes...");
    for i in 0..INODE_COUNT {
        let inode = img.inode(i);
        if !inode.is_live() {
            continue;
        }
        for blk in [
            inode.direct_block,
            inode.single_indirect,
            inode.double_indirect,
            inode.triple_indirect,
        ] {
            if blk >= FIRST_DATA_BLOCK && blk < TOTAL_BLOCKS {
                used[(blk - FIRST_DATA_BLOCK) as usize] = true;
            }
        }
    }

    println!("Validating data bitmap against block references...");
    for i in 0..DATA_BLOCKS_COUNT {
        let marked = is_bit_set(img.data_bitmap(), i);
        let blk = i as u32 + FIRST_DATA_BLOCK;
        if used[i] && !marked {
            println!(
                "Error: Block {blk} is referenced by inode(s) but not marked used in data bitmap"
            );
            if fix {
                println!("Fixing: Marking block {blk} as used in data bitmap");
                set_bit(img.data_bitmap_mut(), i);
            }
            valid = false;
        }
        if !used[i] && marked {
            println!(
                "Error: Block {blk} is marked used in data bitmap but not referenced by any inode"
            );
            if fix {
                println!("Fixing: Clearing block {blk} in data bitmap");
                clear_bit(img.data_bitmap_mut(), i);
            }
            valid = false;
        }
    }
    valid
}
