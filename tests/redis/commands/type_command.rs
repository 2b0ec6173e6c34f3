use rudis::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_type_command() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::type_command("fruit"),
        &TestUtils::expected_simple_string("none"),
    )
    .await;

    let test_cases = vec![
        (
            TestUtils::set_command("fruit", "mango"),
            TestUtils::expected_simple_string("OK"),
            "fruit",
            "string",
        ),
        (
            TestUtils::rpush_command("fruits", &["mango"]),
            TestUtils::expected_integer(1),
            "fruits",
            "list",
        ),
        (
            TestUtils::xadd_command("sensor", "1-1", &["temperature", "36"]),
            TestUtils::expected_bulk_string("1-1"),
            "sensor",
            "stream",
        ),
    ];

    for (command, expected_response, key, expected_type) in test_cases {
        env.exec_command_ok(command, &expected_response).await;

        env.exec_command_ok(
            TestUtils::type_command(key),
            &TestUtils::expected_simple_string(expected_type),
        )
        .await;
    }
}

#[tokio::test]
async fn test_handle_type_command_expired_key() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_expiration("fruit", "mango", 20),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    TestUtils::sleep_ms(50).await;

    env.exec_command_ok(
        TestUtils::type_command("fruit"),
        &TestUtils::expected_simple_string("none"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_type_command_invalid() {
    let env = TestEnv::new();

    env.exec_command_err(
        TestUtils::invalid_command(&["TYPE"]),
        CommandError::WrongNumberOfArguments("type".to_string()),
    )
    .await;
}
