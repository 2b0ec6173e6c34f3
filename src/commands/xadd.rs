use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, command_utils::argument_as_str},
    key_value_store::KeyValueStore,
    resp::RespValue,
    stream::{RequestedStreamId, StreamIdError, get_timestamp_in_milliseconds},
};

/// Represents the parsed arguments for the XADD command
#[derive(Debug, PartialEq)]
pub struct XaddArguments {
    /// The stream key
    key: Bytes,
    /// Explicit, partially automatic (`<ms>-*`) or automatic (`*`) entry ID
    requested_id: RequestedStreamId,
    /// Field/value pairs, in argument order
    fields: Vec<(Bytes, Bytes)>,
}

impl XaddArguments {
    /// Parses `[key, id, field, value, ...]`.
    ///
    /// At least one field/value pair is required and every field needs a value.
    /// The ID must be `*`, `<ms>-*` or `<ms>-<seq>` with decimal components.
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        let [key, id, pairs @ ..] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("xadd"));
        };

        if pairs.is_empty() || pairs.len() % 2 != 0 {
            return Err(CommandError::wrong_number_of_arguments("xadd"));
        }

        let requested_id = argument_as_str(id)
            .ok_or(StreamIdError::InvalidFormat)?
            .parse::<RequestedStreamId>()?;

        let fields = pairs
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(Self {
            key: key.clone(),
            requested_id,
            fields,
        })
    }
}

/// Handles the Redis XADD command.
///
/// Appends an entry to the stream, creating the stream on first use, and
/// replies with the ID the entry was stored under.
///
/// # Returns
///
/// * `Ok(RespValue)` - The final entry ID as a bulk string, e.g. `1526919030474-0`
/// * `Err(CommandError::InvalidStreamId)` - If the ID is malformed, `0-0`, or not
///   greater than the stream's top entry
/// * `Err(CommandError::WrongType)` - If the key holds a string or a list
pub async fn xadd(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let xadd_arguments = XaddArguments::parse(arguments)?;

    let now_milliseconds = match xadd_arguments.requested_id {
        RequestedStreamId::Auto => {
            get_timestamp_in_milliseconds().map_err(|_| CommandError::SystemTimeBeforeEpoch)?
        }
        _ => 0,
    };

    let mut store_guard = store.lock().await;
    let id = store_guard.add_stream_entry(
        xadd_arguments.key,
        xadd_arguments.requested_id,
        xadd_arguments.fields,
        now_milliseconds,
    )?;

    Ok(RespValue::bulk_string(id.to_string()))
}
