//! Interactive selection of a boot option.

use anyhow::{Context, Result};
use log::error;
use uefi::proto::console::text::{Input, Key, ScanCode};
use uefi::{boot, println};

use crate::chain;
use crate::config::BootOptions;

const BOOT_ERROR_STALL_USEC: usize = 3_000_000;

/// Shows the boot options and reads keys until an option boots, a boot
/// attempt fails hard, or the operator backs out with Esc.
///
/// `persistence_available` is set when a persistence file was found on the
/// volume; it enables the `p` toggle, which passes `persistent` to the
/// kernel command line.
pub fn run(options: &BootOptions, persistence_available: bool) -> Result<()> {
    let mut persistence = false;

    println!("Available distributions:");
    for (index, option) in options.iter().enumerate() {
        println!("  [{index}] {}", option.name);
    }
    println!();
    if persistence_available {
        println!("Press a number to boot, 'p' to toggle persistence, Esc to exit.");
    } else {
        println!("Press a number to boot, Esc to exit.");
    }

    let handle = boot::get_handle_for_protocol::<Input>()?;
    let mut input = boot::open_protocol_exclusive::<Input>(handle)?;
    input.reset(false)?;

    let mut events = [input
        .wait_for_key_event()
        .context("keyboard has no key event")?];

    loop {
        boot::wait_for_event(&mut events)?;

        match input.read_key()? {
            Some(Key::Printable(key)) => {
                let key = char::from(key);
                if key == 'p' && persistence_available {
                    persistence = !persistence;
                    println!(
                        "Persistence {}.",
                        if persistence { "enabled" } else { "disabled" }
                    );
                } else if let Some(index) = key.to_digit(10) {
                    let index = index as usize;
                    if index < options.len() {
                        let extra_params = if persistence { "persistent" } else { "" };
                        let err = match chain::boot(options, index, extra_params) {
                            // The second stage came back; nothing left to do.
                            Ok(()) => return Ok(()),
                            Err(err) => err,
                        };
                        error!("{err}");
                        boot::stall(BOOT_ERROR_STALL_USEC);
                        return Err(err.into());
                    }
                }
            }
            Some(Key::Special(ScanCode::ESCAPE)) => return Ok(()),
            _ => {}
        }
    }
}
