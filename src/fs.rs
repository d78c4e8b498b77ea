//! Access to the volume this image was booted from.

use alloc::vec::Vec;

use anyhow::Result;
use uefi::fs::FileSystem;
use uefi::{CStr16, Handle, boot};

/// Opens the file system on the volume the image was loaded from. Failing
/// here is fatal; without the boot volume there is nothing to boot.
pub fn open_boot_volume(image_handle: Handle) -> Result<FileSystem> {
    Ok(FileSystem::new(boot::get_image_file_system(image_handle)?))
}

pub fn file_exists(volume: &mut FileSystem, path: &CStr16) -> bool {
    matches!(volume.try_exists(path), Ok(true))
}

pub fn read_file(volume: &mut FileSystem, path: &CStr16) -> Result<Vec<u8>> {
    Ok(volume.read(path)?)
}
