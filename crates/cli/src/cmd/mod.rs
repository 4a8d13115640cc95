//! CLI command implementations

pub mod config;
pub mod diff;
pub mod game;
pub mod history;
pub mod init;
pub mod load;
pub mod log;
pub mod restore;
pub mod save;
pub mod show;
pub mod stats;
pub mod user;
