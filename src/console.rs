//! Console setup before the menu is drawn.

use log::info;
use uefi::proto::unsafe_protocol;
use uefi::system::with_stdout;
use uefi::{Status, boot};

/// Apple's console-control protocol. Firmware that carries it boots with
/// the graphical boot picker still on screen, and text output stays
/// invisible until the console is switched back to text mode.
#[repr(C)]
#[unsafe_protocol("f42f7782-012e-4c12-9956-49f94304f721")]
struct ConsoleControl {
    _get_mode: usize,
    set_mode: extern "efiapi" fn(this: *mut ConsoleControl, mode: u32) -> Status,
    _lock_std_in: usize,
}

const SCREEN_TEXT: u32 = 0;

/// Switches the console to text mode where the protocol exists. Absence
/// just means the firmware never left text mode, so nothing to do.
pub fn force_text_mode() {
    let Ok(handle) = boot::get_handle_for_protocol::<ConsoleControl>() else {
        return;
    };
    let Ok(mut console) = boot::open_protocol_exclusive::<ConsoleControl>(handle) else {
        return;
    };
    let this: *mut ConsoleControl = &mut *console;
    let status = (console.set_mode)(this, SCREEN_TEXT);
    if status.is_error() {
        info!("console-control set_mode failed: {status}");
    }
}

/// Puts the display into its highest-resolution text mode.
pub fn best_text_mode() {
    let _ = with_stdout(|stdout| -> uefi::Result {
        let Some(mode) = stdout
            .modes()
            .max_by_key(|mode| (mode.rows(), mode.columns()))
        else {
            return Ok(());
        };
        info!("setting display to {} x {}", mode.columns(), mode.rows());
        stdout.set_mode(mode)
    });
}

pub fn clear() {
    let _ = with_stdout(|stdout| stdout.clear());
}

pub fn hide_cursor() {
    let _ = with_stdout(|stdout| stdout.enable_cursor(false));
}
