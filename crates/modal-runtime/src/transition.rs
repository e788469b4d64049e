#![forbid(unsafe_code)]

//! One-shot "transition finished" notifications.
//!
//! The modal stack only ever asks a single question of the animation layer:
//! *tell me when the enter/leave transition of this element has finished*.
//! [`TransitionSignal`] is that question. Implementations:
//!
//! - [`ImmediateTransitions`]: transitions disabled; fires synchronously.
//! - [`ManualTransitions`]: queues callbacks until the host (or a test)
//!   completes them explicitly.
//! - [`TimedTransitions`]: completes each transition after a fixed duration,
//!   driven by [`TimedTransitions::tick`] from the host's frame loop.
//!
//! # Invariants
//!
//! 1. Each callback fires exactly once.
//! 2. Callbacks are invoked with no internal borrow held, so they may
//!    register further transitions.

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use web_time::Instant;

/// Which transition is being awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    /// The element is animating in.
    Enter,
    /// The element is animating out.
    Leave,
}

/// Callback fired when a transition ends.
pub type TransitionEnd = Box<dyn FnOnce()>;

/// Source of transition-end notifications.
pub trait TransitionSignal {
    /// Invoke `on_end` once the `phase` transition of `target` has finished.
    ///
    /// When transitions are disabled, `on_end` must run before this returns.
    fn once_finished(&self, target: u64, phase: TransitionPhase, on_end: TransitionEnd);
}

/// Transitions disabled: every notification fires immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateTransitions;

impl TransitionSignal for ImmediateTransitions {
    fn once_finished(&self, target: u64, phase: TransitionPhase, on_end: TransitionEnd) {
        tracing::trace!(element = target, ?phase, "transition finished immediately");
        on_end();
    }
}

struct PendingTransition {
    target: u64,
    phase: TransitionPhase,
    on_end: TransitionEnd,
}

/// Transitions completed explicitly by the caller.
#[derive(Default)]
pub struct ManualTransitions {
    pending: RefCell<Vec<PendingTransition>>,
}

impl ManualTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transitions still waiting for completion.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether `target` has an outstanding `phase` transition.
    pub fn is_pending(&self, target: u64, phase: TransitionPhase) -> bool {
        self.pending
            .borrow()
            .iter()
            .any(|p| p.target == target && p.phase == phase)
    }

    /// Complete the oldest outstanding `phase` transition of `target`.
    ///
    /// Returns `false` if none was pending.
    pub fn finish(&self, target: u64, phase: TransitionPhase) -> bool {
        let entry = {
            let mut pending = self.pending.borrow_mut();
            let Some(idx) = pending
                .iter()
                .position(|p| p.target == target && p.phase == phase)
            else {
                return false;
            };
            pending.remove(idx)
        };
        (entry.on_end)();
        true
    }

    /// Complete every outstanding transition in registration order.
    ///
    /// Transitions registered by the callbacks themselves are completed too.
    /// Returns the number of callbacks fired.
    pub fn finish_all(&self) -> usize {
        let mut fired = 0;
        loop {
            let batch = std::mem::take(&mut *self.pending.borrow_mut());
            if batch.is_empty() {
                return fired;
            }
            for entry in batch {
                (entry.on_end)();
                fired += 1;
            }
        }
    }
}

impl TransitionSignal for ManualTransitions {
    fn once_finished(&self, target: u64, phase: TransitionPhase, on_end: TransitionEnd) {
        self.pending.borrow_mut().push(PendingTransition {
            target,
            phase,
            on_end,
        });
    }
}

impl fmt::Debug for ManualTransitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTransitions")
            .field("pending", &self.pending())
            .finish()
    }
}

struct TimedTransition {
    deadline: Instant,
    target: u64,
    phase: TransitionPhase,
    on_end: TransitionEnd,
}

/// Transitions with fixed durations, completed by [`tick`](Self::tick).
///
/// A zero duration behaves like [`ImmediateTransitions`] for that phase.
pub struct TimedTransitions {
    enter: Duration,
    leave: Duration,
    pending: RefCell<Vec<TimedTransition>>,
}

impl TimedTransitions {
    pub fn new(enter: Duration, leave: Duration) -> Self {
        Self {
            enter,
            leave,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Duration configured for `phase`.
    pub fn duration(&self, phase: TransitionPhase) -> Duration {
        match phase {
            TransitionPhase::Enter => self.enter,
            TransitionPhase::Leave => self.leave,
        }
    }

    /// Earliest outstanding deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.borrow().iter().map(|t| t.deadline).min()
    }

    /// Number of transitions still running.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Fire every transition whose deadline is at or before `now`.
    ///
    /// Returns the number of callbacks fired.
    pub fn tick(&self, now: Instant) -> usize {
        let due: Vec<TimedTransition> = {
            let mut pending = self.pending.borrow_mut();
            let (due, waiting): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|t| t.deadline <= now);
            *pending = waiting;
            due
        };
        let fired = due.len();
        for t in due {
            tracing::trace!(element = t.target, phase = ?t.phase, "timed transition finished");
            (t.on_end)();
        }
        fired
    }
}

impl TransitionSignal for TimedTransitions {
    fn once_finished(&self, target: u64, phase: TransitionPhase, on_end: TransitionEnd) {
        let duration = self.duration(phase);
        if duration.is_zero() {
            on_end();
            return;
        }
        self.pending.borrow_mut().push(TimedTransition {
            deadline: Instant::now() + duration,
            target,
            phase,
            on_end,
        });
    }
}

impl fmt::Debug for TimedTransitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedTransitions")
            .field("enter", &self.enter)
            .field("leave", &self.leave)
            .field("pending", &self.pending())
            .finish()
    }
}
