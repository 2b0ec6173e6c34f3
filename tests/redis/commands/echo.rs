use bytes::Bytes;
use rudis::{commands::CommandError, resp::RespValue};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_echo_command() {
    let env = TestEnv::new();

    let test_cases = vec!["grape", "hello world", ""];

    for message in test_cases {
        env.exec_command_ok(
            TestUtils::echo_command(message),
            &TestUtils::expected_bulk_string(message),
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_echo_command_binary_payload() {
    let env = TestEnv::new();
    let payload = Bytes::from_static(b"\x00\xff\r\nbinary");

    env.exec_command_ok(
        RespValue::Array(vec![
            RespValue::bulk_string("ECHO"),
            RespValue::BulkString(payload.clone()),
        ]),
        &RespValue::BulkString(payload),
    )
    .await;
}

#[tokio::test]
async fn test_handle_echo_command_invalid() {
    let env = TestEnv::new();

    let test_cases = vec![
        TestUtils::invalid_command(&["ECHO"]),
        TestUtils::invalid_command(&["ECHO", "grape", "mango"]),
    ];

    for command in test_cases {
        env.exec_command_err(
            command,
            CommandError::WrongNumberOfArguments("echo".to_string()),
        )
        .await;
    }
}
