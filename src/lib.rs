pub mod commands;
pub mod data;
pub mod handlers;
pub mod logging;
pub mod moderation;
pub mod settings;
pub mod store;

#[cfg(test)]
mod test_utils;

pub const BOT_NAME: &str = "rolewarden";
pub const COMMAND_TARGET: &str = "rolewarden::command";
pub const ERROR_TARGET: &str = "rolewarden::error";
pub const EVENT_TARGET: &str = "rolewarden::handlers";
pub const CONSOLE_TARGET: &str = "rolewarden";

pub use data::{Data, DataInner};
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
