//! Text transformation commands

pub mod handler;

pub use handler::{handle_profile_command, handle_transform_command};
