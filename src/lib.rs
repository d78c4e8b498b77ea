//! Chain-loading boot orchestrator for live Linux USB media.
//!
//! Runs as a UEFI application before any operating system. It reads a
//! key/value configuration file from the boot volume, resolves each listed
//! distribution's kernel, initrd, and boot folder, lets the operator pick
//! one, and hands off to a second-stage boot loader through firmware
//! variables plus LoadImage/StartImage.
//!
//! The parsing and launch core lives in this library so it can also be
//! exercised by host-side tests; the UEFI binary in `main.rs` is a thin
//! frontend over it.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod chain;
pub mod config;
pub mod console;
pub mod distros;
pub mod fs;
pub mod menu;
