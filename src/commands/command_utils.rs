use bytes::Bytes;

use crate::commands::CommandError;

/// Reads an argument as UTF-8 text. Invalid UTF-8 yields `None`.
pub fn argument_as_str(argument: &Bytes) -> Option<&str> {
    std::str::from_utf8(argument).ok()
}

/// Parses a signed integer argument.
pub fn parse_integer(argument: &Bytes) -> Result<i64, CommandError> {
    argument_as_str(argument)
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or(CommandError::InvalidInteger)
}

/// Case-insensitive comparison of an argument against an ASCII keyword.
pub fn is_keyword(argument: &Bytes, keyword: &str) -> bool {
    argument.eq_ignore_ascii_case(keyword.as_bytes())
}
