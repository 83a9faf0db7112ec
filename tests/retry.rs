//! Retry and backoff behavior of element activation against a flaky host.

use std::time::Duration;

use serde_json::{json, Value};
use tourex::{
    dispatch, ActivationMethod, ActivationOutcome, ElementType, HostError, IndexRecord,
    RetryPolicy, Scheduler, TourPlayer, VirtualScheduler,
};

/// Host whose element only materializes after a number of failed attempts.
struct SettlingPlayer {
    current: Option<usize>,
    fails_before_found: usize,
    attempts: std::cell::Cell<usize>,
}

impl SettlingPlayer {
    fn new(fails_before_found: usize) -> Self {
        SettlingPlayer {
            current: None,
            fails_before_found,
            attempts: std::cell::Cell::new(0),
        }
    }
}

impl TourPlayer for SettlingPlayer {
    fn set_current_panorama(&mut self, index: usize) -> Result<(), HostError> {
        self.current = Some(index);
        Ok(())
    }

    fn element_by_id(&self, id: &str) -> Option<Value> {
        let attempt = self.attempts.get();
        self.attempts.set(attempt + 1);
        (attempt >= self.fails_before_found).then(|| json!({"id": id}))
    }

    fn get_by_id(&self, _id: &str) -> Option<Value> {
        None
    }

    fn all_ids(&self) -> Vec<String> {
        Vec::new()
    }

    fn activate_element(
        &mut self,
        _id: &str,
        method: ActivationMethod,
    ) -> Result<bool, HostError> {
        Ok(method == ActivationMethod::Trigger)
    }
}

fn door_record() -> IndexRecord {
    IndexRecord::element(
        ElementType::Hotspot,
        "Door",
        "Door",
        vec![],
        1,
        "Lobby",
        Some("ht-door".into()),
    )
}

fn policy(max_retries: usize) -> RetryPolicy {
    RetryPolicy {
        initial_delay_ms: 500,
        base_interval_ms: 300,
        multiplier: 2.0,
        max_interval_ms: 2000,
        max_retries,
    }
}

#[test]
fn succeeds_while_failures_stay_under_budget() {
    for k in 0..5 {
        let mut player = SettlingPlayer::new(k);
        let mut scheduler = VirtualScheduler::new();
        let outcome = dispatch(&door_record(), &mut player, &mut scheduler, &policy(5));
        assert_eq!(
            outcome,
            ActivationOutcome::Activated {
                method: ActivationMethod::Trigger,
                attempts: k + 1
            },
            "k = {k}"
        );
    }
}

#[test]
fn exhausts_once_budget_is_spent() {
    let mut player = SettlingPlayer::new(5);
    let mut scheduler = VirtualScheduler::new();
    let outcome = dispatch(&door_record(), &mut player, &mut scheduler, &policy(5));
    assert_eq!(outcome, ActivationOutcome::Exhausted { attempts: 5 });
}

#[test]
fn elapsed_is_initial_delay_plus_backoff_sum() {
    let p = policy(10);
    for k in 0..6usize {
        let mut player = SettlingPlayer::new(k);
        let mut scheduler = VirtualScheduler::new();
        dispatch(&door_record(), &mut player, &mut scheduler, &p);

        let mut expected = p.initial_delay();
        for n in 0..k {
            expected += p.backoff_interval(n);
        }
        assert_eq!(scheduler.elapsed(), expected, "k = {k}");
    }
}

#[test]
fn backoff_caps_at_max_interval() {
    let p = policy(10);
    // 300 * 2^3 = 2400, capped at 2000
    assert_eq!(p.backoff_interval(0), Duration::from_millis(300));
    assert_eq!(p.backoff_interval(1), Duration::from_millis(600));
    assert_eq!(p.backoff_interval(2), Duration::from_millis(1200));
    assert_eq!(p.backoff_interval(3), Duration::from_millis(2000));
    assert_eq!(p.backoff_interval(9), Duration::from_millis(2000));
}

#[test]
fn panorama_selection_never_retries() {
    let record = IndexRecord::panorama(4, "Roof", "Roof", "", vec![], None);
    let mut player = SettlingPlayer::new(usize::MAX);
    let mut scheduler = VirtualScheduler::new();
    let outcome = dispatch(&record, &mut player, &mut scheduler, &policy(5));
    assert_eq!(outcome, ActivationOutcome::NavigatedOnly);
    assert_eq!(player.current, Some(4));
    assert_eq!(scheduler.elapsed(), Duration::ZERO);
    assert_eq!(player.attempts.get(), 0);
}

#[test]
fn host_errors_count_as_failed_attempts() {
    struct ThrowingPlayer;
    impl TourPlayer for ThrowingPlayer {
        fn set_current_panorama(&mut self, _: usize) -> Result<(), HostError> {
            Ok(())
        }
        fn element_by_id(&self, id: &str) -> Option<Value> {
            Some(json!({"id": id}))
        }
        fn get_by_id(&self, _: &str) -> Option<Value> {
            None
        }
        fn all_ids(&self) -> Vec<String> {
            Vec::new()
        }
        fn activate_element(
            &mut self,
            _: &str,
            _: ActivationMethod,
        ) -> Result<bool, HostError> {
            Err(HostError("player busy".into()))
        }
    }

    let mut scheduler = VirtualScheduler::new();
    let outcome = dispatch(&door_record(), &mut ThrowingPlayer, &mut scheduler, &policy(3));
    assert_eq!(outcome, ActivationOutcome::Exhausted { attempts: 3 });
}
