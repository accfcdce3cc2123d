//! Discord side of the bridge: send adapter, event handler, commands.

pub mod adapter;
pub mod commands;
pub mod handler;

pub use adapter::DiscordAdapter;
pub use handler::DiscordHandler;
