use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio::{sync::Mutex, time::Instant};

use crate::{
    commands::{
        command_error::CommandError,
        command_utils::{argument_as_str, is_keyword},
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
};

/// Represents the parsed arguments for the SET command
#[derive(Debug, PartialEq)]
pub struct SetArguments {
    /// The key under which the value is stored
    key: Bytes,
    /// The value to be stored under the given key
    value: Bytes,
    /// How long the value lives, if it expires at all
    time_to_live: Option<Duration>,
}

impl SetArguments {
    /// Parses command arguments into a `SetArguments` structure.
    ///
    /// Accepts either `[key, value]` or `[key, value, "PX", milliseconds]`. The
    /// option name is matched case-insensitively and any option other than PX
    /// is a syntax error.
    ///
    /// A PX value that is not a non-negative integer is tolerated: the value is
    /// still stored, just without an expiry.
    ///
    /// # Examples
    ///
    /// ```text
    /// SET mykey hello              -> key "mykey", value "hello", no expiry
    /// SET mykey hello PX 1000      -> expires one second after the call
    /// SET mykey hello PX soon      -> no expiry
    /// SET mykey hello EX 10        -> ERR syntax error
    /// ```
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        match arguments {
            [key, value] => Ok(Self {
                key: key.clone(),
                value: value.clone(),
                time_to_live: None,
            }),
            [key, value, option, milliseconds] => {
                if !is_keyword(option, "PX") {
                    return Err(CommandError::SyntaxError);
                }

                let time_to_live = argument_as_str(milliseconds)
                    .and_then(|text| text.parse::<u64>().ok())
                    .map(Duration::from_millis);

                Ok(Self {
                    key: key.clone(),
                    value: value.clone(),
                    time_to_live,
                })
            }
            [_, _, _] => Err(CommandError::SyntaxError),
            _ => Err(CommandError::wrong_number_of_arguments("set")),
        }
    }
}

/// Handles the Redis SET command.
///
/// Stores a string under the key, replacing any previous value regardless of
/// its type. With `PX`, the expiry instant is computed when the command runs.
///
/// # Returns
///
/// * `Ok(RespValue)` - The simple string `OK`
/// * `Err(CommandError::SyntaxError)` - If an option other than PX is given
pub async fn set(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;
    let expiration = set_arguments
        .time_to_live
        .map(|time_to_live| Instant::now() + time_to_live);

    let mut store_guard = store.lock().await;
    store_guard.set(set_arguments.key, set_arguments.value, expiration);

    Ok(RespValue::simple_string("OK"))
}
