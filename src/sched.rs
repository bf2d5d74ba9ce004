//! Deferred effects for the report flow.
//!
//! The flow has two timed behaviors: the short pause between confirming and
//! composing, and the scripted acknowledgement that follows a send. Both are
//! recorded here as effects due at an [`Instant`], tagged with the flow
//! generation that scheduled them. The flow bumps its generation on every
//! phase change, so an effect that outlives its phase is drained and dropped
//! instead of applied.
//!
//! The scheduler never reads the clock itself. Callers pass `now` in, which
//! keeps every timing path deterministic under test.

use std::time::Instant;

/// A deferred mutation of the report flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Finish the confirm handoff: open the composing surface.
    EnterComposing,

    /// Append the scripted acknowledgement and lock the input surface.
    AutoReply,
}

struct Scheduled {
    due: Instant,
    generation: u64,
    effect: Effect,
}

/// Pending deferred effects, kept ordered by due time.
#[derive(Default)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Schedules `effect` to fire at `due`, tagged with `generation`.
    pub fn schedule(&mut self, due: Instant, generation: u64, effect: Effect) {
        self.queue.push(Scheduled {
            due,
            generation,
            effect,
        });
        self.queue.sort_by_key(|s| s.due);
    }

    /// The earliest due time among pending effects, if any.
    ///
    /// Event loops use this to bound how long they block on input.
    pub fn next_due(&self) -> Option<Instant> {
        self.queue.first().map(|s| s.due)
    }

    /// Removes and returns every effect due by `now`, earliest first,
    /// each paired with the generation it was scheduled under.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(u64, Effect)> {
        let split = self.queue.partition_point(|s| s.due <= now);
        self.queue
            .drain(..split)
            .map(|s| (s.generation, s.effect))
            .collect()
    }
}
