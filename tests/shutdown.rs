use std::thread;
use std::time::{Duration, Instant};
use text_overlay::shutdown::{Shutdown, ShutdownReason};

#[test]
fn first_trigger_wins() {
    let shutdown = Shutdown::new();
    assert!(!shutdown.is_triggered());
    assert_eq!(shutdown.reason(), None);

    assert!(shutdown.trigger(ShutdownReason::Signal));
    assert!(!shutdown.clone().trigger(ShutdownReason::WindowClosed));

    assert!(shutdown.is_triggered());
    assert_eq!(shutdown.reason(), Some(ShutdownReason::Signal));
}

#[test]
fn reason_is_visible_as_soon_as_the_flag_is() {
    for _ in 0..200 {
        let shutdown = Shutdown::new();
        let reader = {
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                while !shutdown.is_triggered() {
                    std::hint::spin_loop();
                }
                shutdown.reason()
            })
        };
        let triggers: Vec<_> = [ShutdownReason::Hotkey, ShutdownReason::Signal]
            .into_iter()
            .map(|reason| {
                let shutdown = shutdown.clone();
                thread::spawn(move || shutdown.trigger(reason))
            })
            .collect();

        let won = triggers
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(won, 1);
        assert!(reader.join().unwrap().is_some());
    }
}

#[test]
fn wait_blocking_returns_after_trigger_from_another_thread() {
    let shutdown = Shutdown::new();
    let remote = shutdown.clone();
    let start = Instant::now();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.trigger(ShutdownReason::Hotkey);
    });

    shutdown.wait_blocking();
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(shutdown.reason(), Some(ShutdownReason::Hotkey));
}

#[tokio::test]
async fn wait_resolves_for_late_and_early_waiters() {
    let shutdown = Shutdown::new();
    let waiter = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.wait().await })
    };
    shutdown.trigger(ShutdownReason::ServerFailed);

    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should finish")
        .unwrap();
    // already triggered: resolves immediately
    tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
        .await
        .expect("late waiter should finish");
}
