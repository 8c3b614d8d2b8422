//! Detection of block pointers outside the legal range.
//!
//! A pointer is bad when it is at or past the end of the image; zero means "absent" and is
//! allowed everywhere. Pointers into the metadata region (blocks 0 to 7) pass this check; the
//! duplicate and bitmap passes are the ones that apply the tighter data-region range.

use crate::image::Image;
use crate::vsfs::ENTRIES_PER_BLOCK;
use crate::vsfs::INODE_COUNT;
use crate::vsfs::TOTAL_BLOCKS;

/// Diagnostic wording for one nesting level of an indirect tree.
struct LevelText {
    /// What an entry at this level points to.
    kind: &'static str,
    /// The container named when repairing a slot at this level.
    parent: &'static str,
}

/// Wording for the levels below a single indirect pointer.
const SINGLE_LEVELS: &[LevelText] = &[LevelText {
    kind: "data block",
    parent: "single indirect",
}];
/// Wording for the levels below a double indirect pointer.
const DOUBLE_LEVELS: &[LevelText] = &[
    LevelText {
        kind: "indirect block",
        parent: "double indirect",
    },
    LevelText {
        kind: "data block",
        parent: "indirect",
    },
];
/// Wording for the levels below a triple indirect pointer.
const TRIPLE_LEVELS: &[LevelText] = &[
    LevelText {
        kind: "double indirect block",
        parent: "triple indirect",
    },
    LevelText {
        kind: "single indirect block",
        parent: "double indirect",
    },
    LevelText {
        kind: "data block",
        parent: "single indirect",
    },
];

/// Checks every entry of the container `blk`, descending one more container level per
/// remaining element of `levels`.
///
/// Bad entries are reported and, when repairing, zeroed in their slot.
fn walk_container(
    img: &mut Image,
    blk: u32,
    ino: usize,
    tree: &str,
    levels: &[LevelText],
    fix: bool,
) -> bool {
    let mut valid = true;
    for slot in 0..ENTRIES_PER_BLOCK {
        let entry = img.indirect_entry(blk, slot);
        if entry >= TOTAL_BLOCKS {
            let kind = levels[0].kind;
            println!("Error: Inode {ino} has bad {kind} {entry} in {tree} indirect block");
            if fix {
                let parent = levels[0].parent;
                println!(
                    "Fixing: Setting invalid {kind} entry {slot} in {parent} block of inode {ino} to 0"
                );
                img.set_indirect_entry(blk, slot, 0);
            }
            valid = false;
        } else if entry != 0 && levels.len() > 1 {
            if !walk_container(img, entry, ino, tree, &levels[1..], fix) {
                valid = false;
            }
        }
    }
    valid
}

/// Checks that every pointer in the reachable pointer graph of every live inode lies inside
/// the image.
pub fn check(img: &mut Image, fix: bool) -> bool {
    println!("\n=== Bad Block Check ===");
    let mut valid = true;
    for i in 0..INODE_COUNT {
        if !img.inode(i).is_live() {
            continue;
        }

        let direct = img.inode(i).direct_block;
        if direct >= TOTAL_BLOCKS {
            println!("Error: Inode {i} has bad direct block: {direct}");
            if fix {
                println!("Fixing: Setting direct block of inode {i} to 0");
                img.inode_mut(i).direct_block = 0;
            }
            valid = false;
        }

        let single = img.inode(i).single_indirect;
        if single >= TOTAL_BLOCKS {
            println!("Error: Inode {i} has bad single indirect block: {single}");
            if fix {
                println!("Fixing: Setting single indirect block of inode {i} to 0");
                img.inode_mut(i).single_indirect = 0;
            }
            valid = false;
        } else if single != 0 && !walk_container(img, single, i, "single", SINGLE_LEVELS, fix) {
            valid = false;
        }

        let double = img.inode(i).double_indirect;
        if double >= TOTAL_BLOCKS {
            println!("Error: Inode {i} has bad double indirect block: {double}");
            if fix {
                println!("Fixing: Setting double indirect block of inode {i} to 0");
                img.inode_mut(i).double_indirect = 0;
            }
            valid = false;
        } else if double != 0 && !walk_container(img, double, i, "double", DOUBLE_LEVELS, fix) {
            valid = false;
        }

        let triple = img.inode(i).triple_indirect;
        if triple >= TOTAL_BLOCKS {
            println!("Error: Inode {i} has bad triple indirect block: {triple}");
            if fix {
                println!("Fixing: Setting triple indirect block of inode {i} to 0");
                img.inode_mut(i).triple_indirect = 0;
            }
            valid = false;
        } else if triple != 0 && !walk_container(img, triple, i, "triple", TRIPLE_LEVELS, fix) {
            valid = false;
        }
    }
    valid
}
