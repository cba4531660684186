//! Platform implementations of [`WindowPrimitives`](crate::traits::WindowPrimitives).
//!
//! Nothing outside this module should reference a windowing system
//! directly.  `win32` is built on Windows, `hyprland` on other Unix hosts.

pub mod stylebits;

#[cfg(unix)]
pub mod hyprland;

#[cfg(windows)]
pub mod win32;
