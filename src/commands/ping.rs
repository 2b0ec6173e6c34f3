use bytes::Bytes;

use crate::{commands::command_error::CommandError, resp::RespValue};

pub struct PingArguments;

impl PingArguments {
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        if !arguments.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("ping"));
        }

        Ok(Self)
    }
}

pub fn ping(arguments: &[Bytes]) -> Result<RespValue, CommandError> {
    PingArguments::parse(arguments)?;

    Ok(RespValue::simple_string("PONG"))
}
