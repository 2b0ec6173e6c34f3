use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, command_utils::parse_integer},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

pub struct LpopArguments {
    key: Bytes,
    /// `None` pops a single element and replies with a bulk string.
    count: Option<i64>,
}

impl LpopArguments {
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        match arguments {
            [key] => Ok(Self {
                key: key.clone(),
                count: None,
            }),
            [key, count] => Ok(Self {
                key: key.clone(),
                count: Some(parse_integer(count)?),
            }),
            _ => Err(CommandError::wrong_number_of_arguments("lpop")),
        }
    }
}

/// Handles the Redis LPOP command.
///
/// Without a count, removes and returns the head of the list, or null when
/// the list is empty or missing. With a count, removes up to that many
/// elements from the head and returns them as an array; a count of zero or
/// less removes nothing.
///
/// # Returns
///
/// * `Ok(RespValue)` - A bulk string or null without a count, an array with one
/// * `Err(CommandError::InvalidInteger)` - If the count is not an integer
/// * `Err(CommandError::WrongType)` - If the key does not hold a list
pub async fn lpop(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    let amount_of_elements_to_delete = match lpop_arguments.count {
        None => 1,
        Some(count) => usize::try_from(count).unwrap_or(0),
    };

    let mut store_guard = store.lock().await;
    let popped = store_guard.pop_front(&lpop_arguments.key, amount_of_elements_to_delete)?;

    match lpop_arguments.count {
        None => Ok(popped
            .and_then(|mut values| values.pop())
            .map_or(RespValue::Null, RespValue::BulkString)),
        Some(_) => Ok(RespValue::array_of_bulk_strings(
            popped.unwrap_or_default(),
        )),
    }
}
