//! **gridlaunch**: launch copies of a program and tile their windows.
//!
//! The primary display (and, when present, a secondary display to its
//! right) is cut into fixed-size cells.  Windows whose title matches are
//! tracked across layout passes: a tracked window keeps its cell, new
//! windows fill the free cells in row-major order, and windows that have
//! closed are dropped from the tracked set.
//!
//! # Architecture
//!
//! The crate is organised around three core traits:
//!
//! * [`traits::WindowPrimitives`]: the window and display calls the layout
//!   engine needs, so the grid logic is not coupled to any windowing system.
//! * [`traits::ProcessLauncher`]: starts the target program.
//! * [`traits::CommandSource`]: abstracts the transport that delivers
//!   shell requests, so the main loop is not coupled to any IPC mechanism.
//!
//! [`engine::LayoutEngine`] holds the tracked set, and
//! [`session::Session`] maps each [`command::Command`] onto it.
//! Concrete implementations live in [`backend`] (Win32, Hyprland) and
//! [`ipc`] (loopback TCP command listener).

pub mod backend;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod ipc;
pub mod launcher;
pub mod session;
pub mod topology;
pub mod traits;

#[cfg(test)]
mod testing;
