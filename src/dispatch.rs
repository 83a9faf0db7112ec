//! Navigation and activation against the host tour player.
//!
//! Selecting a result means talking to a host runtime that may not be ready:
//! the target panorama loads asynchronously, and the element to trigger often
//! does not exist until that load settles. Dispatch therefore splits into a
//! non-retried panorama jump and a retried element activation driven by a
//! small state machine with exponential backoff.
//!
//! Nothing here errors out to the caller. Host failures are tolerated at
//! every tier, and a fully failed activation reports
//! [`ActivationOutcome::Exhausted`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, HostError};
use crate::scheduler::Scheduler;
use crate::types::IndexRecord;

/// How to fire an element once it has been found.
///
/// Tried in declaration order; the first method the host accepts wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationMethod {
    /// Host-native trigger call.
    Trigger,
    /// Synthetic click on the element.
    Click,
    /// Invoke the element's click handler directly.
    OnClick,
}

const ACTIVATION_CHAIN: [ActivationMethod; 3] = [
    ActivationMethod::Trigger,
    ActivationMethod::Click,
    ActivationMethod::OnClick,
];

/// The host tour player, as far as dispatch is concerned.
///
/// Every method is allowed to fail or come up empty; callers fall through to
/// the next tier of their chain.
pub trait TourPlayer {
    /// Jump to a playlist position.
    fn set_current_panorama(&mut self, index: usize) -> Result<(), HostError>;

    /// Direct per-type element accessor. Fastest tier, narrowest coverage.
    fn element_by_id(&self, id: &str) -> Option<Value>;

    /// Generic object lookup.
    fn get_by_id(&self, id: &str) -> Option<Value>;

    /// Every element id the host knows about, for the exhaustive tier.
    fn all_ids(&self) -> Vec<String>;

    /// Fire an element. `Ok(true)` means the host accepted the method.
    fn activate_element(&mut self, id: &str, method: ActivationMethod)
        -> Result<bool, HostError>;
}

/// Retry pacing for element activation.
///
/// The nth retry waits `base_interval * multiplier^n`, capped at
/// `max_interval`. `initial_delay` precedes the very first attempt, giving
/// the host's panorama transition time to settle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub initial_delay_ms: u64,
    pub base_interval_ms: u64,
    pub multiplier: f64,
    pub max_interval_ms: u64,
    pub max_retries: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            initial_delay_ms: 500,
            base_interval_ms: 300,
            multiplier: 2.0,
            max_interval_ms: 5000,
            max_retries: 10,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                field: "retry.multiplier",
                reason: format!("{} must be at least 1", self.multiplier),
            });
        }
        if self.max_interval_ms < self.base_interval_ms {
            return Err(ConfigError::Invalid {
                field: "retry.maxIntervalMs",
                reason: "must be at least baseIntervalMs".to_string(),
            });
        }
        Ok(())
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Backoff before retry `n` (zero-based), exponential and capped.
    pub fn backoff_interval(&self, n: usize) -> Duration {
        let scaled = self.base_interval_ms as f64 * self.multiplier.powi(n as i32);
        let capped = scaled.min(self.max_interval_ms as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Terminal result of one activation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The host accepted one of the activation methods.
    Activated { method: ActivationMethod, attempts: usize },
    /// Panorama-only dispatch; nothing to activate.
    NavigatedOnly,
    /// Every attempt failed within the retry budget.
    Exhausted { attempts: usize },
    /// The record carries no element id, so activation cannot be attempted.
    NoElementId,
}

/// Activation state machine.
///
/// `Idle → Attempting → Success | Retrying → Attempting | Exhausted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivationState {
    Idle,
    Attempting { attempt: usize },
    Retrying { attempt: usize },
    Done,
}

/// One step of the machine: either wait before the next attempt or finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Wait(Duration),
    Done(ActivationOutcome),
}

/// Drives repeated activation attempts against the host under a
/// [`RetryPolicy`]. The caller (or [`dispatch`]) pumps [`Activation::step`]
/// until it yields [`Step::Done`], honoring each [`Step::Wait`] in between.
pub struct Activation {
    element_id: String,
    policy: RetryPolicy,
    state: ActivationState,
}

impl Activation {
    pub fn new(element_id: impl Into<String>, policy: RetryPolicy) -> Self {
        Activation {
            element_id: element_id.into(),
            policy,
            state: ActivationState::Idle,
        }
    }

    /// Advance the machine by one transition.
    pub fn step(&mut self, player: &mut dyn TourPlayer) -> Step {
        match self.state {
            ActivationState::Idle => {
                self.state = ActivationState::Attempting { attempt: 0 };
                Step::Wait(self.policy.initial_delay())
            }
            ActivationState::Attempting { attempt } => {
                if let Some(method) = self.try_activate(player) {
                    self.state = ActivationState::Done;
                    return Step::Done(ActivationOutcome::Activated {
                        method,
                        attempts: attempt + 1,
                    });
                }
                if attempt + 1 >= self.policy.max_retries {
                    self.state = ActivationState::Done;
                    log::warn!(
                        "element {:?} never activated after {} attempts",
                        self.element_id,
                        attempt + 1
                    );
                    return Step::Done(ActivationOutcome::Exhausted {
                        attempts: attempt + 1,
                    });
                }
                self.state = ActivationState::Retrying { attempt };
                Step::Wait(self.policy.backoff_interval(attempt))
            }
            ActivationState::Retrying { attempt } => {
                self.state = ActivationState::Attempting {
                    attempt: attempt + 1,
                };
                self.step(player)
            }
            ActivationState::Done => Step::Done(ActivationOutcome::Exhausted { attempts: 0 }),
        }
    }

    /// One lookup-then-fire pass. `None` means this attempt failed.
    fn try_activate(&self, player: &mut dyn TourPlayer) -> Option<ActivationMethod> {
        if !lookup_element(player, &self.element_id) {
            return None;
        }
        for method in ACTIVATION_CHAIN {
            match player.activate_element(&self.element_id, method) {
                Ok(true) => return Some(method),
                Ok(false) => {}
                Err(e) => {
                    log::debug!("activation method {method:?} failed: {e}");
                }
            }
        }
        None
    }
}

/// Three-tier element lookup: direct accessor, generic lookup, then an
/// exhaustive id scan. True when any tier finds the element.
fn lookup_element(player: &dyn TourPlayer, id: &str) -> bool {
    if player.element_by_id(id).is_some() {
        return true;
    }
    if player.get_by_id(id).is_some() {
        return true;
    }
    player.all_ids().iter().any(|known| known == id)
}

/// Dispatch a selected search result against the host player.
///
/// Panorama records are a single navigation call with no retry. Element
/// records first navigate to the owning panorama, then pump the activation
/// machine through `scheduler` until it settles.
pub fn dispatch(
    record: &IndexRecord,
    player: &mut dyn TourPlayer,
    scheduler: &mut dyn Scheduler,
    policy: &RetryPolicy,
) -> ActivationOutcome {
    let target = record.source.target_index();
    if let Err(e) = player.set_current_panorama(target) {
        log::warn!("navigation to panorama {target} failed: {e}");
    }

    if record.source.is_panorama() {
        return ActivationOutcome::NavigatedOnly;
    }

    let Some(id) = record.id.as_deref() else {
        log::debug!("element record {:?} has no id to activate", record.label);
        return ActivationOutcome::NoElementId;
    };

    let mut activation = Activation::new(id, policy.clone());
    loop {
        match activation.step(player) {
            Step::Wait(delay) => scheduler.schedule_after(delay),
            Step::Done(outcome) => return outcome,
        }
    }
}
