use std::time::{Duration, Instant};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_blpop_concurrent_clients_simple_blocking() {
    let env = TestEnv::new();

    let client_task = TestUtils::spawn_blpop_task(&env, "test_list", "2");

    // Give client time to register as a blocked client
    TestUtils::sleep_ms(100).await;

    env.exec_command_ok(
        TestUtils::rpush_command("test_list", &["item1"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    let client_result = TestUtils::wait_for_completion(client_task, Duration::from_secs(3)).await;

    assert_eq!(
        client_result,
        Ok(TestUtils::expected_array(&["test_list", "item1"]))
    );

    env.exec_command_ok(
        TestUtils::llen_command("test_list"),
        &TestUtils::expected_integer(0),
    )
    .await;
}

#[tokio::test]
async fn test_blpop_waiters_are_served_in_arrival_order() {
    let env = TestEnv::new();

    let first = TestUtils::spawn_blpop_task(&env, "mylist", "0");
    TestUtils::sleep_ms(50).await;
    let second = TestUtils::spawn_blpop_task(&env, "mylist", "0");
    TestUtils::sleep_ms(50).await;

    assert_eq!(env.get_store().await.blocked_client_count(b"mylist"), 2);

    env.exec_command_ok(
        TestUtils::rpush_command("mylist", &["x", "y"]),
        &TestUtils::expected_integer(2),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(first, Duration::from_secs(1)).await,
        Ok(TestUtils::expected_array(&["mylist", "x"]))
    );
    assert_eq!(
        TestUtils::wait_for_completion(second, Duration::from_secs(1)).await,
        Ok(TestUtils::expected_array(&["mylist", "y"]))
    );

    env.exec_command_ok(
        TestUtils::lrange_command("mylist", 0, -1),
        &TestUtils::expected_array(&[]),
    )
    .await;
}

#[tokio::test]
async fn test_blpop_push_serves_only_as_many_waiters_as_elements() {
    let env = TestEnv::new();

    let mut tasks = vec![];

    for _ in 0..3 {
        tasks.push(TestUtils::spawn_blpop_task(&env, "test_queue", "1"));
        TestUtils::sleep_ms(20).await;
    }

    env.exec_command_ok(
        TestUtils::rpush_command("test_queue", &["single_item"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    let mut results = vec![];
    for task in tasks {
        results.push(TestUtils::wait_for_completion(task, Duration::from_secs(3)).await);
    }

    let successful_results =
        TestUtils::filter_successful_results_containing(&results, "single_item");
    assert_eq!(
        successful_results.len(),
        1,
        "Only one client should get the item"
    );
    assert_eq!(
        results[0],
        Ok(TestUtils::expected_array(&["test_queue", "single_item"])),
        "the longest waiting client should get the item"
    );
    assert_eq!(results[1], Ok(TestUtils::expected_null_array()));
    assert_eq!(results[2], Ok(TestUtils::expected_null_array()));

    assert_eq!(env.get_store().await.blocked_client_count(b"test_queue"), 0);
}

#[tokio::test]
async fn test_blpop_timeout_behavior() {
    let env = TestEnv::new();

    let start_time = Instant::now();

    env.exec_command_ok(
        TestUtils::blpop_command("empty_list", "0.1"),
        &TestUtils::expected_null_array(),
    )
    .await;

    let elapsed = start_time.elapsed();

    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed <= Duration::from_millis(600));
    assert_eq!(env.get_store().await.blocked_client_count(b"empty_list"), 0);

    // A push after the timeout must stay in the list
    env.exec_command_ok(
        TestUtils::rpush_command("empty_list", &["late"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    env.exec_command_ok(
        TestUtils::lrange_command("empty_list", 0, -1),
        &TestUtils::expected_array(&["late"]),
    )
    .await;
}

#[tokio::test]
async fn test_blpop_zero_timeout_infinite_wait() {
    let env = TestEnv::new();

    let blpop_task = TestUtils::spawn_blpop_task(&env, "infinite_list", "0");

    TestUtils::sleep_ms(300).await;
    assert!(!blpop_task.is_finished());

    env.exec_command_ok(
        TestUtils::rpush_command("infinite_list", &["unblock_item"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    let blpop_result = TestUtils::wait_for_completion(blpop_task, Duration::from_secs(1)).await;

    assert_eq!(
        blpop_result,
        Ok(TestUtils::expected_array(&[
            "infinite_list",
            "unblock_item"
        ]))
    );
}

#[tokio::test]
async fn test_blpop_waiters_on_different_keys_are_independent() {
    let env = TestEnv::new();

    let fruits = TestUtils::spawn_blpop_task(&env, "fruits", "2");
    let vegetables = TestUtils::spawn_blpop_task(&env, "vegetables", "2");
    TestUtils::sleep_ms(50).await;

    env.exec_command_ok(
        TestUtils::rpush_command("vegetables", &["carrot"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(vegetables, Duration::from_secs(1)).await,
        Ok(TestUtils::expected_array(&["vegetables", "carrot"]))
    );
    assert!(!fruits.is_finished());

    env.exec_command_ok(
        TestUtils::lpush_command("fruits", &["mango"]),
        &TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(fruits, Duration::from_secs(1)).await,
        Ok(TestUtils::expected_array(&["fruits", "mango"]))
    );
}

#[tokio::test]
async fn test_blpop_many_clients_each_get_one_element() {
    let env = TestEnv::new();
    let client_count = 20;

    let tasks: Vec<_> = (0..client_count)
        .map(|_| TestUtils::spawn_blpop_task(&env, "jobs", "5"))
        .collect();

    TestUtils::sleep_ms(100).await;

    let pushers: Vec<_> = (0..client_count)
        .map(|i| {
            let env = env.clone();
            tokio::spawn(async move {
                let job = format!("job{}", i);
                env.exec_command(TestUtils::rpush_command("jobs", &[job.as_str()]))
                    .await
            })
        })
        .collect();

    for pusher in pushers {
        pusher.await.unwrap();
    }

    let mut delivered = vec![];
    for task in tasks {
        let result = TestUtils::wait_for_completion(task, Duration::from_secs(3))
            .await
            .unwrap();
        delivered.push(result);
    }

    let mut jobs: Vec<String> = delivered
        .iter()
        .map(|response| match response {
            rudis::resp::RespValue::Array(items) => match &items[1] {
                rudis::resp::RespValue::BulkString(job) => {
                    String::from_utf8_lossy(job).to_string()
                }
                other => panic!("unexpected element {:?}", other),
            },
            other => panic!("unexpected reply {:?}", other),
        })
        .collect();
    jobs.sort();
    jobs.dedup();

    assert_eq!(jobs.len(), client_count);
    env.exec_command_ok(
        TestUtils::llen_command("jobs"),
        &TestUtils::expected_integer(0),
    )
    .await;
}
