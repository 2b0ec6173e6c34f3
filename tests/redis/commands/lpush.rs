use rudis::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lpush_command() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::lpush_command("grape", &["a", "b"]),
        &TestUtils::expected_integer(2),
    )
    .await;

    env.exec_command_ok(
        TestUtils::lrange_command("grape", 0, -1),
        &TestUtils::expected_array(&["b", "a"]),
    )
    .await;

    env.exec_command_ok(
        TestUtils::lpush_command("grape", &["c", "d", "e"]),
        &TestUtils::expected_integer(5),
    )
    .await;

    env.exec_command_ok(
        TestUtils::lrange_command("grape", 0, -1),
        &TestUtils::expected_array(&["e", "d", "c", "b", "a"]),
    )
    .await;
}

#[tokio::test]
async fn test_handle_lpush_command_wrong_data_type() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::xadd_command("grape", "1-1", &["mango", "1"]),
        &TestUtils::expected_bulk_string("1-1"),
    )
    .await;

    env.exec_command_err(
        TestUtils::lpush_command("grape", &["apple"]),
        CommandError::WrongType,
    )
    .await;
}

#[tokio::test]
async fn test_handle_lpush_command_invalid() {
    let env = TestEnv::new();

    env.exec_command_err(
        TestUtils::invalid_command(&["LPUSH", "grape"]),
        CommandError::WrongNumberOfArguments("lpush".to_string()),
    )
    .await;
}
