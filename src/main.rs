#![no_main]
#![no_std]

extern crate alloc;

use alloc::string::String;

use anyhow::{Result, bail};
use log::error;
use uefi::fs::FileSystem;
use uefi::{CStr16, allocator, cstr16, prelude::*, println};

use enterprise::config::BootOptions;
use enterprise::{chain, console, fs, menu};

#[global_allocator]
static GLOBAL_ALLOCATOR: allocator::Allocator = allocator::Allocator;

/// Marker file doubling as the configuration file; its absence means the
/// volume was never prepared by the installer.
const CONFIG_PATH: &CStr16 = cstr16!("\\efi\\boot\\.MLUL-Live-USB");
const BOOT_ISO_PATH: &CStr16 = cstr16!("\\efi\\boot\\boot.iso");
const PERSISTENCE_PATH: &CStr16 = cstr16!("\\casper-rw");

const HALT_STALL_USEC: usize = 3_000_000;

#[entry]
fn main() -> Status {
    uefi::helpers::init().unwrap();

    console::force_text_mode();
    console::best_text_mode();
    console::clear();
    console::hide_cursor();
    println!(
        "Welcome to Enterprise {}, a live Linux USB loader.\n",
        env!("CARGO_PKG_VERSION")
    );

    match run() {
        Ok(()) => Status::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            println!("Cannot continue. Restarting...");
            boot::stall(HALT_STALL_USEC);
            Status::LOAD_ERROR
        }
    }
}

fn run() -> Result<()> {
    let image_handle = boot::image_handle();
    let mut volume = fs::open_boot_volume(image_handle)?;

    let mut can_continue = true;

    let options = if fs::file_exists(&mut volume, CONFIG_PATH) {
        match read_boot_options(&mut volume) {
            Ok(options) => Some(options),
            Err(err) => {
                println!("Error: configuration file parsing error: {err}.");
                can_continue = false;
                None
            }
        }
    } else {
        println!("Error: can't find configuration file.");
        can_continue = false;
        None
    };

    if !fs::file_exists(&mut volume, chain::SECOND_STAGE) {
        println!("Error: can't find the second-stage boot loader!");
        can_continue = false;
    }

    if !fs::file_exists(&mut volume, BOOT_ISO_PATH) {
        println!("Error: can't find an ISO file to boot!");
        can_continue = false;
    }

    let persistence_available = can_continue && fs::file_exists(&mut volume, PERSISTENCE_PATH);
    if persistence_available {
        println!("Found a persistence file! You can enable persistence from the menu.");
    }

    let (Some(options), true) = (options, can_continue) else {
        bail!("core files are missing or damaged");
    };

    // The launcher re-opens this volume to load the second stage.
    drop(volume);

    menu::run(&options, persistence_available)
}

fn read_boot_options(volume: &mut FileSystem) -> Result<BootOptions> {
    let raw = fs::read_file(volume, CONFIG_PATH)?;
    let text = String::from_utf8_lossy(&raw);
    Ok(BootOptions::parse(&text)?)
}
