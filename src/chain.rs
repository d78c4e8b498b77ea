//! Hand-off to the second-stage boot loader.
//!
//! The chosen option's parameters travel through firmware variables that the
//! second stage reads back by name; the second stage itself is loaded from
//! the same volume this image started from and control is transferred with
//! StartImage. On success nothing here ever returns.

use alloc::vec::Vec;
use core::fmt;

use log::info;
use uefi::boot::{self, LoadImageSource, OpenProtocolAttributes, OpenProtocolParams};
use uefi::proto::BootPolicy;
use uefi::proto::device_path::DevicePath;
use uefi::proto::device_path::build::{self, DevicePathBuilder};
use uefi::proto::loaded_image::LoadedImage;
use uefi::runtime::{self, VariableAttributes, VariableVendor};
use uefi::{CStr16, Handle, Status, cstr16, guid};

use crate::config::BootOptions;
use crate::console;

/// Vendor namespace of the hand-off variables. The second stage looks the
/// values up under this exact GUID.
pub const VENDOR: VariableVendor = VariableVendor(guid!("8be4df61-93ca-11d2-aa0d-00e098032b8c"));

const BOOT_OPTIONS_VAR: &CStr16 = cstr16!("Enterprise_LinuxBootOptions");
const KERNEL_PATH_VAR: &CStr16 = cstr16!("Enterprise_LinuxKernelPath");
const INITRD_PATH_VAR: &CStr16 = cstr16!("Enterprise_InitRDPath");
const BOOT_FOLDER_VAR: &CStr16 = cstr16!("Enterprise_BootFolder");

/// The second-stage loader, expected on the volume we booted from.
pub const SECOND_STAGE: &CStr16 = cstr16!("\\efi\\boot\\boot.efi");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    OptionNotFound(usize),
    PersistVariable(Status),
    BootVolume(Status),
    NoBootVolume,
    DevicePath,
    LoadImage(Status),
    StartImage(Status),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OptionNotFound(index) => write!(f, "no boot option at index {index}"),
            Self::PersistVariable(status) => {
                write!(f, "couldn't store boot settings for the second stage: {status}")
            }
            Self::BootVolume(status) => write!(f, "couldn't reach the boot volume: {status}"),
            Self::NoBootVolume => f.write_str("this image was not loaded from a volume"),
            Self::DevicePath => f.write_str("couldn't describe the second-stage loader path"),
            Self::LoadImage(status) => write!(f, "error loading the second-stage loader: {status}"),
            Self::StartImage(status) => {
                write!(f, "error starting the second-stage loader: {status}")
            }
        }
    }
}

impl core::error::Error for BootError {}

/// Boots the option at `index`, passing `extra_params` on as additional
/// kernel command-line parameters. Does not return on success; every error
/// return leaves the firmware in a state the caller can recover from.
pub fn boot(options: &BootOptions, index: usize, extra_params: &str) -> Result<(), BootError> {
    // Resolve the index before touching any firmware state.
    let option = options
        .get(index)
        .ok_or(BootError::OptionNotFound(index))?;

    persist(BOOT_OPTIONS_VAR, extra_params)?;
    persist(KERNEL_PATH_VAR, &option.kernel_path)?;
    persist(INITRD_PATH_VAR, &option.initrd_path)?;
    persist(BOOT_FOLDER_VAR, &option.boot_folder)?;

    let image = load_second_stage()?;
    info!("booting {} via {}", option.name, SECOND_STAGE);

    console::clear();
    boot::start_image(image).map_err(|err| BootError::StartImage(err.status()))?;
    Ok(())
}

/// Writes one hand-off variable. The second stage reads these back as C
/// strings, so the payload is the raw bytes plus a single terminating NUL,
/// never UCS-2.
fn persist(name: &CStr16, value: &str) -> Result<(), BootError> {
    let attributes = VariableAttributes::NON_VOLATILE
        | VariableAttributes::BOOTSERVICE_ACCESS
        | VariableAttributes::RUNTIME_ACCESS;
    runtime::set_variable(name, &VENDOR, attributes, &variable_payload(value))
        .map_err(|err| BootError::PersistVariable(err.status()))
}

fn variable_payload(value: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(value.len() + 1);
    bytes.extend_from_slice(value.as_bytes());
    bytes.push(0);
    bytes
}

/// Loads the second-stage binary from the volume this image was loaded
/// from, as a child of the running image.
fn load_second_stage() -> Result<Handle, BootError> {
    let image_handle = boot::image_handle();

    let loaded_image = unsafe {
        boot::open_protocol::<LoadedImage>(
            OpenProtocolParams {
                handle: image_handle,
                agent: image_handle,
                controller: None,
            },
            OpenProtocolAttributes::GetProtocol,
        )
    }
    .map_err(|err| BootError::BootVolume(err.status()))?;

    let device_handle = loaded_image.device().ok_or(BootError::NoBootVolume)?;
    let volume_path = unsafe {
        boot::open_protocol::<DevicePath>(
            OpenProtocolParams {
                handle: device_handle,
                agent: image_handle,
                controller: None,
            },
            OpenProtocolAttributes::GetProtocol,
        )
    }
    .map_err(|err| BootError::BootVolume(err.status()))?;

    // The full path is the volume's own path with a file node appended.
    let mut storage = Vec::new();
    let mut builder = DevicePathBuilder::with_vec(&mut storage);
    for node in volume_path.node_iter() {
        builder = builder.push(node).map_err(|_| BootError::DevicePath)?;
    }
    let full_path = builder
        .push(&build::media::FilePath {
            path_name: SECOND_STAGE,
        })
        .and_then(DevicePathBuilder::finalize)
        .map_err(|_| BootError::DevicePath)?;

    boot::load_image(
        image_handle,
        LoadImageSource::FromDevicePath {
            device_path: full_path,
            boot_policy: BootPolicy::ExactMatch,
        },
    )
    .map_err(|err| BootError::LoadImage(err.status()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootOptions;

    #[test]
    fn variable_payload_is_the_value_plus_one_nul() {
        assert_eq!(variable_payload("/casper/vmlinuz"), b"/casper/vmlinuz\0");
        assert_eq!(variable_payload(""), b"\0");
    }

    #[test]
    fn out_of_range_index_fails_before_any_firmware_work() {
        let options = BootOptions::parse("entry=A\nfamily=ubuntu\n").unwrap();
        assert_eq!(boot(&options, 1, ""), Err(BootError::OptionNotFound(1)));
        assert_eq!(boot(&options, 99, ""), Err(BootError::OptionNotFound(99)));
    }
}
