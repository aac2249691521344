pub mod client;

pub use client::{ConfigFile, Credentials, SyncClient, DEFAULT_DIRECTORY};
