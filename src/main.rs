//! The `vsfsck` tool checks a VSFS filesystem image for metadata inconsistencies and, when
//! asked, repairs them in place.

mod check;
mod image;
#[cfg(test)]
mod testfs;
mod vsfs;

use crate::image::Image;
use std::env::ArgsOs;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::exit;
use utils::error;

/// Prints command usage.
///
/// `bin` is the name of the binary.
fn print_usage(bin: &str) {
    println!("Usage:");
    println!(" {bin} <file_system_image> [--fix]");
    println!();
    println!("Checks the consistency of a VSFS filesystem image.");
    println!();
    println!("Options:");
    println!(" --fix\trepair the inconsistencies that are found, then write the image back");
}

/// Structure storing command line arguments.
#[derive(Default)]
struct Args {
    /// If true, print command line help.
    help: bool,
    /// If true, repair inconsistencies instead of only reporting them.
    fix: bool,
    /// The path to the filesystem image to check.
    image_path: Option<PathBuf>,
}

fn parse_args(bin: &str, args: ArgsOs) -> Args {
    let mut res: Args = Default::default();
    for arg in args {
        match arg.to_str() {
            Some("-h" | "--help") => res.help = true,
            Some("--fix") => res.fix = true,
            _ => {
                if res.image_path.is_some() {
                    error(bin, "only one image may be given");
                }
                res.image_path = Some(PathBuf::from(arg));
            }
        }
    }
    res
}

fn main() {
    let (bin, args) = utils::args();
    let args = parse_args(&bin, args);
    if args.help {
        print_usage(&bin);
        return;
    }
    let image_path = args.image_path.unwrap_or_else(|| {
        print_usage(&bin);
        exit(1);
    });

    // The image is only opened for writing when it may have to be written back
    let mut file = OpenOptions::new()
        .read(true)
        .write(args.fix)
        .open(&image_path)
        .unwrap_or_else(|e| {
            error(&bin, format_args!("{}: {e}", image_path.display()));
        });
    let mut img = Image::load(&mut file).unwrap_or_else(|e| {
        error(&bin, format_args!("{}: {e}", image_path.display()));
    });

    println!("VSFS Consistency Checker");
    println!("========================");
    println!("File system image: {}", image_path.display());
    println!(
        "Mode: {}",
        if args.fix { "Check and fix" } else { "Check only" }
    );

    let results = check::run(&mut img, args.fix);
    check::print_summary(&results, false);
    let consistent = results.is_consistent();
    println!(
        "\nOverall file system status: {}",
        if consistent {
            "CONSISTENT"
        } else {
            "ERRORS DETECTED"
        }
    );

    if args.fix {
        if !consistent {
            println!("\n=== Re-running Checks After Fixes ===");
            let recheck = check::run(&mut img, false);
            check::print_summary(&recheck, true);
            let clean = recheck.is_consistent();
            println!(
                "\nPost-fix file system status: {}",
                if clean { "CONSISTENT" } else { "ERRORS REMAIN" }
            );
            if !clean {
                println!("Warning: Some errors could not be fixed automatically!");
                println!("Consider running additional maintenance or backup your data.");
            }
        }
        img.save(&mut file).unwrap_or_else(|e| {
            error(&bin, format_args!("failed to write corrected image: {e}"));
        });
    }
}
