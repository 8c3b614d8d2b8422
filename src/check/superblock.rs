//! Validation of the superblock against the fixed VSFS layout.
//!
//! The layout constants cannot be negotiated, so repair simply overwrites each mismatching
//! field with its required value. Reserved bytes are never touched.

use crate::image::Image;
use crate::vsfs;

/// Compares one superblock field against its required value, printing a diagnostic and
/// repairing the field in place when requested.
macro_rules! check_field {
    ($img:expr, $fix:expr, $valid:ident, $field:ident, $expected:expr, $name:literal, $label:literal, $fmt:literal) => {{
        let val = $img.superblock().$field;
        if val != $expected {
            println!(
                concat!("Error: Invalid ", $name, " (", $fmt, "). Expected ", $fmt),
                val, $expected
            );
            if $fix {
                println!(concat!("Fixing: Setting correct ", $name));
                $img.superblock_mut().$field = $expected;
            }
            $valid = false;
        } else {
            println!(concat!($label, " is valid (", $fmt, ")"), val);
        }
    }};
}

/// Checks the nine declared layout constants of the superblock.
///
/// Returns true iff every field matched on entry.
pub fn check(img: &mut Image, fix: bool) -> bool {
    println!("\n=== Superblock Validation ===");
    let mut valid = true;
    check_field!(
        img,
        fix,
        valid,
        magic,
        vsfs::MAGIC,
        "magic number",
        "Magic number",
        "0x{:04X}"
    );
    check_field!(
        img,
        fix,
        valid,
        block_size,
        vsfs::BLOCK_SIZE as u32,
        "block size",
        "Block size",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        total_blocks,
        vsfs::TOTAL_BLOCKS,
        "total blocks",
        "Total blocks",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        inode_bitmap_block,
        vsfs::INODE_BITMAP_BLOCK,
        "inode bitmap block",
        "Inode bitmap block",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        data_bitmap_block,
        vsfs::DATA_BITMAP_BLOCK,
        "data bitmap block",
        "Data bitmap block",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        inode_table_start,
        vsfs::INODE_TABLE_START,
        "inode table start block",
        "Inode table start block",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        first_data_block,
        vsfs::FIRST_DATA_BLOCK,
        "first data block",
        "First data block",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        inode_size,
        vsfs::INODE_SIZE as u32,
        "inode size",
        "Inode size",
        "{}"
    );
    check_field!(
        img,
        fix,
        valid,
        inode_count,
        vsfs::INODE_COUNT as u32,
        "inode count",
        "Inode count",
        "{}"
    );
    valid
}
