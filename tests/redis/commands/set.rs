use rudis::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_set_command() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command("grape", "mango"),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_ok(
        TestUtils::get_command("grape"),
        &TestUtils::expected_bulk_string("mango"),
    )
    .await;

    env.exec_command_ok(
        TestUtils::set_command("grape", "raspberry"),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_ok(
        TestUtils::get_command("grape"),
        &TestUtils::expected_bulk_string("raspberry"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_set_command_overwrites_other_types() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::rpush_command("fruits", &["mango"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    env.exec_command_ok(
        TestUtils::set_command("fruits", "grape"),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_ok(
        TestUtils::type_command("fruits"),
        &TestUtils::expected_simple_string("string"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_set_command_with_expiration() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_expiration("grape", "mango", 100),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_ok(
        TestUtils::get_command("grape"),
        &TestUtils::expected_bulk_string("mango"),
    )
    .await;

    TestUtils::sleep_ms(150).await;

    assert!(env.get_store().await.raw_entry(b"grape").is_some());

    env.exec_command_ok(TestUtils::get_command("grape"), &TestUtils::expected_null())
        .await;

    assert!(env.get_store().await.raw_entry(b"grape").is_none());
}

#[tokio::test]
async fn test_handle_set_command_ignores_malformed_expiration() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::invalid_command(&["SET", "grape", "mango", "PX", "soon"]),
        &TestUtils::expected_simple_string("OK"),
    )
    .await;

    let store = env.get_store().await;
    let value = store.raw_entry(b"grape").expect("value should be stored");
    assert_eq!(value.expiration, None);
}

#[tokio::test]
async fn test_handle_set_command_invalid() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::invalid_command(&["SET", "grape"]),
            CommandError::WrongNumberOfArguments("set".to_string()),
        ),
        (
            TestUtils::invalid_command(&["SET", "grape", "mango", "EX", "10"]),
            CommandError::SyntaxError,
        ),
        (
            TestUtils::invalid_command(&["SET", "grape", "mango", "PX"]),
            CommandError::SyntaxError,
        ),
        (
            TestUtils::invalid_command(&["SET", "grape", "mango", "PX", "10", "NX"]),
            CommandError::WrongNumberOfArguments("set".to_string()),
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, expected_error).await;
    }

    env.exec_command_ok(TestUtils::get_command("grape"), &TestUtils::expected_null())
        .await;
}
