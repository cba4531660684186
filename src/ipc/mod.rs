//! IPC listener that accepts commands over a loopback TCP socket.
//!
//! The shell (or any script) connects to the socket, sends
//! newline-delimited JSON commands, and reads one JSON reply per command.

pub mod listener;
