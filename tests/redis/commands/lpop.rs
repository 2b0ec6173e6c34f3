use rudis::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lpop_command() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::rpush_command("grape", &["mango", "raspberry"]),
        &TestUtils::expected_integer(2),
    )
    .await;

    let test_cases = vec![
        TestUtils::expected_bulk_string("mango"),
        TestUtils::expected_bulk_string("raspberry"),
        TestUtils::expected_null(),
    ];

    for expected in test_cases {
        env.exec_command_ok(TestUtils::lpop_command("grape"), &expected)
            .await;
    }

    env.exec_command_ok(
        TestUtils::type_command("grape"),
        &TestUtils::expected_simple_string("list"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_lpop_command_multiple_items() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::rpush_command("grape", &["a", "b", "c", "d"]),
        &TestUtils::expected_integer(4),
    )
    .await;

    let test_cases = vec![
        (0, TestUtils::expected_array(&[])),
        (-2, TestUtils::expected_array(&[])),
        (1, TestUtils::expected_array(&["a"])),
        (2, TestUtils::expected_array(&["b", "c"])),
        (10, TestUtils::expected_array(&["d"])),
        (1, TestUtils::expected_array(&[])),
    ];

    for (count, expected) in test_cases {
        env.exec_command_ok(
            TestUtils::lpop_command_multiple_items("grape", count),
            &expected,
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_lpop_command_not_found() {
    let env = TestEnv::new();

    env.exec_command_ok(TestUtils::lpop_command("grape"), &TestUtils::expected_null())
        .await;

    env.exec_command_ok(
        TestUtils::lpop_command_multiple_items("grape", 2),
        &TestUtils::expected_array(&[]),
    )
    .await;
}

#[tokio::test]
async fn test_handle_lpop_command_invalid() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command("fruit", "mango"),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    let test_cases = vec![
        (
            TestUtils::invalid_command(&["LPOP"]),
            CommandError::WrongNumberOfArguments("lpop".to_string()),
        ),
        (
            TestUtils::invalid_command(&["LPOP", "grape", "1", "2"]),
            CommandError::WrongNumberOfArguments("lpop".to_string()),
        ),
        (
            TestUtils::invalid_command(&["LPOP", "grape", "two"]),
            CommandError::InvalidInteger,
        ),
        (TestUtils::lpop_command("fruit"), CommandError::WrongType),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, expected_error).await;
    }
}
