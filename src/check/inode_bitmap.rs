//! Reconciliation of the inode bitmap against per-inode liveness.
//!
//! The inode's `links_count`/`dtime` pair is the authoritative liveness signal; the bitmap is
//! a derived cache. Only the bitmap is ever repaired here, never the inode itself.

use crate::image::Image;
use crate::vsfs::INODE_COUNT;
use utils::util::clear_bit;
use utils::util::is_bit_set;
use utils::util::set_bit;

/// Checks that every inode bitmap bit agrees with the liveness of its inode.
pub fn check(img: &mut Image, fix: bool) -> bool {
    println!("\n=== Inode Bitmap Validation ===");
    let mut valid = true;
    for i in 0..INODE_COUNT {
        let live = img.inode(i).is_live();
        let marked = is_bit_set(img.inode_bitmap(), i);
        if live && !marked {
            println!("Error: Inode {i} is valid but not marked used in inode bitmap");
            if fix {
                println!("Fixing: Marking inode {i} as used in inode bitmap");
                set_bit(img.inode_bitmap_mut(), i);
            }
            valid = false;
        }
        if !live && marked {
            println!("Error: Inode {i} is invalid but marked used in inode bitmap");
            if fix {
                println!("Fixing: Clearing inode {i} in inode bitmap");
                clear_bit(img.inode_bitmap_mut(), i);
            }
            valid = false;
        }
    }
    valid
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testfs;
    use crate::vsfs::FIRST_DATA_BLOCK;

    #[test]
    fn live_inode_missing_its_bit() {
        let mut img = testfs::clean_image();
        clear_bit(img.inode_bitmap_mut(), 0);
        assert!(!check(&mut img, false));
        // check-only leaves the bit cleared
        assert!(!is_bit_set(img.inode_bitmap(), 0));
        assert!(!check(&mut img, true));
        assert!(is_bit_set(img.inode_bitmap(), 0));
        assert!(check(&mut img, false));
    }

    #[test]
    fn stale_bit_for_free_inode() {
        let mut img = testfs::blank_image();
        set_bit(img.inode_bitmap_mut(), 5);
        assert!(!check(&mut img, true));
        assert!(!is_bit_set(img.inode_bitmap(), 5));
    }

    #[test]
    fn deleted_inode_is_not_live() {
        let mut img = testfs::blank_image();
        testfs::set_live_inode(&mut img, 3, [FIRST_DATA_BLOCK, 0, 0, 0]);
        img.inode_mut(3).dtime = 1715000000;
        assert!(!check(&mut img, true));
        assert!(!is_bit_set(img.inode_bitmap(), 3));
        // repair must never touch the inode's own fields
        let links = img.inode(3).links_count;
        assert_eq!(links, 1);
        let dtime = img.inode(3).dtime;
        assert_eq!(dtime, 1715000000);
    }

    #[test]
    fn zero_links_means_free() {
        let mut img = testfs::blank_image();
        testfs::set_live_inode(&mut img, 10, [0, 0, 0, 0]);
        img.inode_mut(10).links_count = 0;
        assert!(!check(&mut img, true));
        assert!(!is_bit_set(img.inode_bitmap(), 10));
    }
}
