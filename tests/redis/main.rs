mod commands;
mod concurrent_blpop;
