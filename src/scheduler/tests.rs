use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{RecurringTaskScheduler, Task};
use crate::errors::{new_err, ErrorKind};

fn sleep_ms(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

fn counting_task(interval_ms: u64, counter: &Arc<AtomicUsize>) -> Task {
    let counter = counter.clone();
    Task::new(Duration::from_millis(interval_ms), move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn test_add_task_validation() {
    let scheduler = RecurringTaskScheduler::new();

    let empty_id = scheduler.add_task("", Task::new(Duration::from_millis(10), || Ok(())));
    assert_eq!(ErrorKind::InvalidTask, empty_id.unwrap_err().kind());

    let zero_interval = scheduler.add_task("zero", Task::new(Duration::from_millis(0), || Ok(())));
    assert_eq!(ErrorKind::InvalidTask, zero_interval.unwrap_err().kind());

    let no_action = scheduler.add_task(
        "no_action",
        Task {
            interval: Duration::from_millis(10),
            execute: None,
            on_failure: None,
        },
    );
    assert_eq!(ErrorKind::InvalidTask, no_action.unwrap_err().kind());

    assert!(scheduler.task_ids().is_empty());
}

#[test]
fn test_duplicate_task_is_rejected() {
    let scheduler = RecurringTaskScheduler::new();

    scheduler
        .add_task("tick", Task::new(Duration::from_secs(10), || Ok(())))
        .expect("first registration succeeds");
    let duplicate = scheduler.add_task("tick", Task::new(Duration::from_secs(10), || Ok(())));

    assert_eq!(ErrorKind::DuplicateTask, duplicate.unwrap_err().kind());
    assert_eq!(vec!["tick".to_string()], scheduler.task_ids());
}

#[test]
fn test_successful_task_repeats() {
    let scheduler = RecurringTaskScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));

    scheduler
        .add_task("tick", counting_task(50, &counter))
        .expect("task added");
    sleep_ms(280);
    scheduler.remove_task("tick");

    let runs = counter.load(Ordering::SeqCst);
    assert!(runs >= 3 && runs <= 5, "unexpected run count {}", runs);
}

#[test]
fn test_failed_task_stays_dormant_until_reset() {
    let scheduler = RecurringTaskScheduler::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));

    let task_runs = runs.clone();
    let task_failures = failures.clone();
    let task = Task::new(Duration::from_millis(40), move || {
        task_runs.fetch_add(1, Ordering::SeqCst);
        new_err(ErrorKind::QuorumFailure, "always fails".to_string(), String::new())
    })
    .with_failure_handler(move |err| {
        assert_eq!(ErrorKind::QuorumFailure, err.kind());
        task_failures.fetch_add(1, Ordering::SeqCst);
    });

    scheduler.add_task("failing", task).expect("task added");
    sleep_ms(250);
    assert_eq!(1, runs.load(Ordering::SeqCst));
    assert_eq!(1, failures.load(Ordering::SeqCst));
    assert!(scheduler.has_task("failing"));

    scheduler
        .reset_task_schedule("failing", Duration::from_millis(40))
        .expect("reset succeeds");
    sleep_ms(250);
    assert_eq!(2, runs.load(Ordering::SeqCst));
    assert_eq!(2, failures.load(Ordering::SeqCst));
}

#[test]
fn test_failure_handler_can_rearm_its_task() {
    let scheduler = Arc::new(RecurringTaskScheduler::new());
    let runs = Arc::new(AtomicUsize::new(0));

    let task_runs = runs.clone();
    let weak_scheduler = Arc::downgrade(&scheduler);
    let task = Task::new(Duration::from_millis(30), move || {
        task_runs.fetch_add(1, Ordering::SeqCst);
        new_err(ErrorKind::QuorumFailure, "fails".to_string(), String::new())
    })
    .with_failure_handler(move |_| {
        if let Some(scheduler) = weak_scheduler.upgrade() {
            // fails once the task is removed
            let _ = scheduler.reset_task_schedule("retry", Duration::from_millis(30));
        }
    });

    scheduler.add_task("retry", task).expect("task added");
    sleep_ms(200);
    scheduler.remove_task("retry");

    assert!(runs.load(Ordering::SeqCst) >= 3);
}

#[test]
fn test_reset_unknown_task_fails() {
    let scheduler = RecurringTaskScheduler::new();

    let result = scheduler.reset_task_schedule("missing", Duration::from_millis(10));

    assert_eq!(ErrorKind::UnknownTask, result.unwrap_err().kind());
}

#[test]
fn test_repeated_reset_does_not_duplicate_runs() {
    let scheduler = RecurringTaskScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));

    scheduler
        .add_task("watchdog", counting_task(200, &counter))
        .expect("task added");

    for _ in 0..10 {
        sleep_ms(40);
        scheduler
            .reset_task_schedule("watchdog", Duration::from_millis(200))
            .expect("reset succeeds");
    }
    assert_eq!(0, counter.load(Ordering::SeqCst));

    // One run at 200 ms after the last reset, the next one is due at 400 ms.
    sleep_ms(300);
    assert_eq!(1, counter.load(Ordering::SeqCst));

    scheduler.remove_task("watchdog");
}

#[test]
fn test_remove_before_deadline_never_runs() {
    let scheduler = RecurringTaskScheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));

    scheduler
        .add_task("short", counting_task(30, &counter))
        .expect("task added");
    scheduler.remove_task("short");
    sleep_ms(150);

    assert_eq!(0, counter.load(Ordering::SeqCst));
    assert!(!scheduler.has_task("short"));
}

#[test]
fn test_no_runs_start_after_remove() {
    let scheduler = RecurringTaskScheduler::new();

    for attempt in 0..20 {
        let counter = Arc::new(AtomicUsize::new(0));
        let id = format!("busy-{}", attempt);
        scheduler
            .add_task(&id, counting_task(1, &counter))
            .expect("task added");
        sleep_ms(5);
        scheduler.remove_task(&id);

        sleep_ms(10);
        let after_remove = counter.load(Ordering::SeqCst);
        sleep_ms(50);
        assert_eq!(after_remove, counter.load(Ordering::SeqCst));
    }
}

#[test]
fn test_remove_unknown_task_is_noop() {
    let scheduler = RecurringTaskScheduler::new();

    scheduler.remove_task("missing");

    assert!(scheduler.task_ids().is_empty());
}

#[test]
fn test_task_can_remove_itself() {
    let scheduler = Arc::new(RecurringTaskScheduler::new());
    let counter = Arc::new(AtomicUsize::new(0));

    let weak_scheduler = Arc::downgrade(&scheduler);
    let task_counter = counter.clone();
    let task = Task::new(Duration::from_millis(20), move || {
        task_counter.fetch_add(1, Ordering::SeqCst);
        if let Some(scheduler) = weak_scheduler.upgrade() {
            scheduler.remove_task("once");
        }
        Ok(())
    });

    scheduler.add_task("once", task).expect("task added");
    sleep_ms(150);

    assert_eq!(1, counter.load(Ordering::SeqCst));
    assert!(!scheduler.has_task("once"));
}

#[test]
fn test_shutdown_stops_all_tasks() {
    let scheduler = RecurringTaskScheduler::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    scheduler
        .add_task("first", counting_task(40, &first))
        .expect("task added");
    scheduler
        .add_task("second", counting_task(40, &second))
        .expect("task added");
    scheduler.shutdown();
    sleep_ms(120);

    assert!(scheduler.task_ids().is_empty());
    assert_eq!(0, first.load(Ordering::SeqCst));
    assert_eq!(0, second.load(Ordering::SeqCst));
}

#[test]
fn test_removed_task_skips_failure_handler_of_running_execution() {
    let scheduler = RecurringTaskScheduler::new();
    let runs = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));

    let task_runs = runs.clone();
    let task_failures = failures.clone();
    let task = Task::new(Duration::from_millis(20), move || {
        task_runs.fetch_add(1, Ordering::SeqCst);
        sleep_ms(100);
        new_err(ErrorKind::QuorumFailure, "slow failure".to_string(), String::new())
    })
    .with_failure_handler(move |_| {
        task_failures.fetch_add(1, Ordering::SeqCst);
    });

    scheduler.add_task("slow", task).expect("task added");
    sleep_ms(60);
    assert_eq!(1, runs.load(Ordering::SeqCst));
    scheduler.remove_task("slow");

    sleep_ms(200);
    assert_eq!(1, runs.load(Ordering::SeqCst));
    assert_eq!(0, failures.load(Ordering::SeqCst));
}

#[test]
fn test_removed_task_is_not_rearmed_after_running_execution() {
    let scheduler = RecurringTaskScheduler::new();
    let runs = Arc::new(AtomicUsize::new(0));

    let task_runs = runs.clone();
    let task = Task::new(Duration::from_millis(20), move || {
        task_runs.fetch_add(1, Ordering::SeqCst);
        sleep_ms(100);
        Ok(())
    });

    scheduler.add_task("slow", task).expect("task added");
    sleep_ms(60);
    scheduler.remove_task("slow");

    sleep_ms(250);
    assert_eq!(1, runs.load(Ordering::SeqCst));
}
