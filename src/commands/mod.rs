mod blpop;
mod command_dispatcher;
mod command_error;
mod command_handler;
mod command_utils;
mod echo;
mod get;
mod llen;
mod lpop;
mod lrange;
mod ping;
mod rpush_and_lpush;
mod set;
mod type_command;
mod xadd;

pub use command_dispatcher::CommandDispatcher;
pub use command_error::CommandError;
pub use command_handler::{COMMAND_TABLE, CommandHandler, CommandKind, CommandSpec, lookup_command};
