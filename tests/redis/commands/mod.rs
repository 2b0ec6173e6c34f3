mod echo;
mod lpop;
mod lpush;
mod set;
mod type_command;
