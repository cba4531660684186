//! Win32 frame style bits.
//!
//! Kept free of any platform import so the bit logic is testable on every
//! host.  The values match `WS_CAPTION` and `WS_THICKFRAME` from
//! `winuser.h`.

use crate::command::WindowStyle;

/// Title bar (`WS_BORDER | WS_DLGFRAME`).
pub const WS_CAPTION: u32 = 0x00C0_0000;
/// Sizing border.
pub const WS_THICKFRAME: u32 = 0x0004_0000;

/// Decode caption/border presence from a raw `GWL_STYLE` value.
///
/// A caption counts as present when any of its bits is set.
pub fn style_from_bits(bits: u32) -> WindowStyle {
    WindowStyle {
        caption: bits & WS_CAPTION != 0,
        border: bits & WS_THICKFRAME != 0,
    }
}

/// Return `bits` with the caption and border bits set or cleared to match
/// `style`.  All other bits are preserved.
pub fn apply_style_bits(bits: u32, style: WindowStyle) -> u32 {
    let bits = if style.caption {
        bits | WS_CAPTION
    } else {
        bits & !WS_CAPTION
    };
    if style.border {
        bits | WS_THICKFRAME
    } else {
        bits & !WS_THICKFRAME
    }
}
