use thiserror::Error;

use crate::{key_value_store::StoreError, resp::RespValue, stream::StreamIdError};

/// Errors a command can fail with. The `Display` text is exactly what the
/// client receives as the RESP error message.
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("ERR unknown command")]
    UnknownCommand,
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongNumberOfArguments(String),
    #[error("ERR syntax error")]
    SyntaxError,
    #[error("ERR value is not an integer or out of range")]
    InvalidInteger,
    #[error("ERR timeout is not a float or out of range")]
    InvalidTimeout,
    #[error("ERR timeout is negative")]
    NegativeTimeout,
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR {0}")]
    InvalidStreamId(#[from] StreamIdError),
    #[error("ERR system time is before unix epoch")]
    SystemTimeBeforeEpoch,
}

impl CommandError {
    pub fn wrong_number_of_arguments(command_name: &str) -> Self {
        CommandError::WrongNumberOfArguments(command_name.to_lowercase())
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::Error(self.to_string())
    }
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::WrongType => CommandError::WrongType,
            StoreError::StreamId(error) => CommandError::InvalidStreamId(error),
        }
    }
}
