use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{
        blpop::blpop,
        command_error::CommandError,
        echo::echo,
        get::get,
        llen::llen,
        lpop::lpop,
        lrange::lrange,
        ping::ping,
        rpush_and_lpush::{lpush, rpush},
        set::set,
        type_command::type_command,
        xadd::xadd,
    },
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::DisconnectSignal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    Echo,
    Set,
    Get,
    RPush,
    LPush,
    LRange,
    LLen,
    LPop,
    BLPop,
    XAdd,
    Type,
}

/// A supported command together with its accepted argument count, not
/// counting the command name itself.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub min_arguments: usize,
    /// `None` for variadic commands.
    pub max_arguments: Option<usize>,
    pub kind: CommandKind,
}

impl CommandSpec {
    const fn new(
        name: &'static str,
        min_arguments: usize,
        max_arguments: Option<usize>,
        kind: CommandKind,
    ) -> Self {
        Self {
            name,
            min_arguments,
            max_arguments,
            kind,
        }
    }

    pub fn accepts(&self, argument_count: usize) -> bool {
        argument_count >= self.min_arguments
            && self
                .max_arguments
                .map_or(true, |max_arguments| argument_count <= max_arguments)
    }
}

pub const COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec::new("PING", 0, Some(0), CommandKind::Ping),
    CommandSpec::new("ECHO", 1, Some(1), CommandKind::Echo),
    CommandSpec::new("SET", 2, Some(4), CommandKind::Set),
    CommandSpec::new("GET", 1, Some(1), CommandKind::Get),
    CommandSpec::new("RPUSH", 2, None, CommandKind::RPush),
    CommandSpec::new("LPUSH", 2, None, CommandKind::LPush),
    CommandSpec::new("LRANGE", 3, Some(3), CommandKind::LRange),
    CommandSpec::new("LLEN", 1, Some(1), CommandKind::LLen),
    CommandSpec::new("LPOP", 1, Some(2), CommandKind::LPop),
    CommandSpec::new("BLPOP", 2, Some(2), CommandKind::BLPop),
    CommandSpec::new("XADD", 4, None, CommandKind::XAdd),
    CommandSpec::new("TYPE", 1, Some(1), CommandKind::Type),
];

/// Finds a command by name, ignoring ASCII case.
pub fn lookup_command(name: &[u8]) -> Option<&'static CommandSpec> {
    COMMAND_TABLE
        .iter()
        .find(|spec| spec.name.as_bytes().eq_ignore_ascii_case(name))
}

/// A decoded request whose command exists and whose argument count is valid.
#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub spec: &'static CommandSpec,
    pub arguments: Vec<Bytes>,
}

impl CommandHandler {
    /// Resolves the command named by the first element of `request` and checks
    /// the remaining arguments against its arity.
    pub fn new(mut request: Vec<Bytes>) -> Result<Self, CommandError> {
        if request.is_empty() {
            return Err(CommandError::UnknownCommand);
        }

        let name = request.remove(0);
        let spec = lookup_command(&name).ok_or(CommandError::UnknownCommand)?;

        if !spec.accepts(request.len()) {
            return Err(CommandError::wrong_number_of_arguments(spec.name));
        }

        Ok(Self {
            spec,
            arguments: request,
        })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Runs the command. Only BLPOP watches `disconnect`, to give up waiting
    /// when its client leaves.
    pub async fn handle_command(
        &self,
        store: &Arc<Mutex<KeyValueStore>>,
        disconnect: DisconnectSignal,
    ) -> Result<RespValue, CommandError> {
        let arguments = self.arguments.as_slice();

        match self.spec.kind {
            CommandKind::Ping => ping(arguments),
            CommandKind::Echo => echo(arguments),
            CommandKind::Set => set(store, arguments).await,
            CommandKind::Get => get(store, arguments).await,
            CommandKind::RPush => rpush(store, arguments).await,
            CommandKind::LPush => lpush(store, arguments).await,
            CommandKind::LRange => lrange(store, arguments).await,
            CommandKind::LLen => llen(store, arguments).await,
            CommandKind::LPop => lpop(store, arguments).await,
            CommandKind::BLPop => blpop(store, arguments, disconnect).await,
            CommandKind::XAdd => xadd(store, arguments).await,
            CommandKind::Type => type_command(store, arguments).await,
        }
    }
}
