use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

pub struct LlenArguments {
    key: Bytes,
}

impl LlenArguments {
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("llen"));
        };

        Ok(Self { key: key.clone() })
    }
}

pub async fn llen(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    let length = store_guard.list_len(&llen_arguments.key)?;

    Ok(RespValue::Integer(length as i64))
}
