//! DDD: commands and handler-as-type.

pub mod command_handler;
pub mod commands;

pub use command_handler::CommandHandler;
pub use commands::Command;
/// `#[derive(Command)]`; lives in the macro namespace next to the trait.
pub use courier_rs_macros::Command;
