use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct TypeArguments {
    key: Bytes,
}

impl TypeArguments {
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("type"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Handles the Redis TYPE command: `string`, `list`, `stream` or `none`.
pub async fn type_command(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;

    Ok(RespValue::simple_string(
        store_guard.type_of(&type_arguments.key),
    ))
}
