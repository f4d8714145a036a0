//! Integration tests for the execution governor
//!
//! Exercises the call ceiling and the file-backed pause gate through the
//! public API, the way the crew runner drives them.

use overseer_core::domain::governor::{ExecutionGovernor, GovernorError, GovernorState};
use overseer_core::infrastructure::pause_signal::FilePauseSignal;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const POLL: Duration = Duration::from_millis(50);

fn governor(max_calls: u64, dir: &TempDir) -> (Arc<ExecutionGovernor>, Arc<FilePauseSignal>) {
    let signal = Arc::new(FilePauseSignal::new(dir.path().join("pause-agents.txt")));
    let governor = Arc::new(ExecutionGovernor::with_poll_interval(
        max_calls,
        signal.clone(),
        POLL,
    ));
    (governor, signal)
}

fn prompts(n: usize) -> Vec<String> {
    vec![format!("System: call {}", n), format!("Human: prompt {}", n)]
}

#[tokio::test]
async fn test_first_m_calls_succeed_and_next_fails() {
    let dir = TempDir::new().unwrap();

    for max_calls in [1_u64, 3, 5] {
        let (governor, _) = governor(max_calls, &dir);
        let attempts = max_calls + 3;

        for n in 1..=attempts {
            let result = governor.on_call_start(&prompts(n as usize)).await;
            if n <= max_calls {
                assert!(result.is_ok(), "call {} of limit {} should pass", n, max_calls);
            } else {
                assert_eq!(
                    result,
                    Err(GovernorError::CallLimitExceeded {
                        call_count: n,
                        max_calls
                    })
                );
            }
            // Monotonic, one step per call, no skipped values.
            assert_eq!(governor.call_count(), n);
        }
    }
}

#[tokio::test]
async fn test_zero_limit_boundary() {
    let dir = TempDir::new().unwrap();
    let (governor, _) = governor(0, &dir);

    let err = governor.on_call_start(&prompts(1)).await.unwrap_err();

    assert_eq!(
        err,
        GovernorError::CallLimitExceeded {
            call_count: 1,
            max_calls: 0
        }
    );
    assert_eq!(governor.call_count(), 1);
}

#[tokio::test]
async fn test_normal_run_scenario() {
    let dir = TempDir::new().unwrap();
    let (governor, _) = governor(3, &dir);

    let prompt_sets = [
        vec!["Plan the report".to_string()],
        vec!["Research architectures".to_string(), "Cite sources".to_string()],
        vec!["Write the final draft".to_string()],
    ];
    for prompts in &prompt_sets {
        governor.on_call_start(prompts).await.unwrap();
        governor.on_call_end(&"ok");
    }

    assert_eq!(governor.call_count(), 3);
}

#[tokio::test]
async fn test_breach_scenario() {
    let dir = TempDir::new().unwrap();
    let (governor, _) = governor(2, &dir);

    governor.on_call_start(&prompts(1)).await.unwrap();
    governor.on_call_start(&prompts(2)).await.unwrap();
    let err = governor.on_call_start(&prompts(3)).await.unwrap_err();

    assert!(matches!(
        err,
        GovernorError::CallLimitExceeded { call_count: 3, max_calls: 2 }
    ));
    assert_eq!(governor.call_count(), 3);
}

#[tokio::test]
async fn test_pause_then_resume_scenario() {
    let dir = TempDir::new().unwrap();
    let (governor, signal) = governor(5, &dir);
    signal.pause().await.unwrap();
    assert_eq!(governor.state().await, GovernorState::Paused);

    let blocked = {
        let governor = governor.clone();
        tokio::spawn(async move { governor.on_call_start(&prompts(1)).await })
    };

    // Several polls happen while paused; none of them counts or fails.
    tokio::time::sleep(POLL * 4).await;
    assert!(!blocked.is_finished());
    assert_eq!(governor.call_count(), 0);

    // Another actor removes the file.
    let remover = FilePauseSignal::new(signal.path());
    assert!(remover.resume().await.unwrap());

    let result = tokio::time::timeout(POLL * 4, blocked)
        .await
        .expect("call should be released after the pause file is removed")
        .unwrap();

    assert!(result.is_ok());
    assert_eq!(governor.call_count(), 1);
    assert_eq!(governor.state().await, GovernorState::Running);
}

#[tokio::test]
async fn test_ceiling_read_after_pause_wait() {
    let dir = TempDir::new().unwrap();
    let (governor, signal) = governor(0, &dir);
    signal.pause().await.unwrap();

    let blocked = {
        let governor = governor.clone();
        tokio::spawn(async move { governor.on_call_start(&prompts(1)).await })
    };
    tokio::time::sleep(POLL * 2).await;

    // Raised while the call waits; the released call sees the new ceiling.
    governor.set_max_calls(1);
    signal.resume().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), blocked)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_counted_exactly() {
    let dir = TempDir::new().unwrap();
    let (governor, _) = governor(50, &dir);

    let handles: Vec<_> = (0..100)
        .map(|n| {
            let governor = governor.clone();
            tokio::spawn(async move { governor.on_call_start(&prompts(n)).await })
        })
        .collect();

    let mut passed = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => passed += 1,
            Err(GovernorError::CallLimitExceeded { .. }) => refused += 1,
        }
    }

    assert_eq!(passed, 50);
    assert_eq!(refused, 50);
    assert_eq!(governor.call_count(), 100);
}
