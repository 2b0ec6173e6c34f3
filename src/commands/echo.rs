use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue};

/// Handles the Redis ECHO command.
///
/// Returns its single argument unchanged as a bulk string. Useful for checking
/// that the server is alive and decoding payloads byte for byte.
///
/// # Examples
///
/// ```text
/// ECHO "hello world"  ->  $11\r\nhello world\r\n
/// ```
pub fn echo(arguments: &[Bytes]) -> Result<RespValue, CommandError> {
    let [message] = arguments else {
        return Err(CommandError::wrong_number_of_arguments("echo"));
    };

    Ok(RespValue::BulkString(message.clone()))
}
