use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    commands::CommandHandler, key_value_store::KeyValueStore, resp::RespValue,
    state::DisconnectSignal,
};

/// Routes decoded requests to their command handlers.
///
/// Cloning a dispatcher is cheap; every clone works on the same keyspace.
#[derive(Debug, Clone, Default)]
pub struct CommandDispatcher {
    store: Arc<Mutex<KeyValueStore>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &Arc<Mutex<KeyValueStore>> {
        &self.store
    }

    /// Executes one request and produces its reply.
    ///
    /// An empty request is not a command and yields no reply at all. Every
    /// failure, from an unknown command to a type conflict, is turned into an
    /// error reply so the connection can carry on.
    pub async fn dispatch(&self, request: Vec<Bytes>) -> Option<RespValue> {
        self.dispatch_for_client(request, DisconnectSignal::never()).await
    }

    /// Like [`dispatch`](Self::dispatch), for a request from a live client.
    /// A blocking command stops waiting once `disconnect` fires.
    pub async fn dispatch_for_client(
        &self,
        request: Vec<Bytes>,
        disconnect: DisconnectSignal,
    ) -> Option<RespValue> {
        if request.is_empty() {
            return None;
        }

        let handler = match CommandHandler::new(request) {
            Ok(handler) => handler,
            Err(error) => {
                debug!(%error, "rejected request");
                return Some(error.as_resp());
            }
        };

        debug!(command = handler.name(), arguments = handler.arguments.len(), "dispatching");

        let response = match handler.handle_command(&self.store, disconnect).await {
            Ok(response) => response,
            Err(error) => {
                debug!(command = handler.name(), %error, "command failed");
                error.as_resp()
            }
        };

        Some(response)
    }
}
