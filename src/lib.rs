//! Sync a terminal emulator's configuration files to a WebDAV server.
//!
//! The binary in `main.rs` is a thin wrapper: `cli` defines the flag
//! surface, `commands` turns parsed flags into adapter calls and renders
//! the JSON envelope, and `webdav` holds the remote-store adapter.

pub mod cli;
pub mod commands;
pub mod webdav;
