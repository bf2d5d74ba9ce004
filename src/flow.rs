//! The report flow: which surface is presented and how it changes.
//!
//! Three phases, exactly one active at a time. The host shell opens and
//! closes the flow; the user's confirm and close intents drive everything in
//! between. The confirm step hands off to composing through a short deferred
//! transition, and every phase change bumps a generation counter so deferred
//! work from an earlier phase cannot touch a later one.

use std::time::{Duration, Instant};

use jiff::Timestamp;

use crate::composer::{Composer, SendOutcome};
use crate::model::{Message, MessageOrigin};
use crate::sched::{Effect, Scheduler};

/// Pause between a confirm and the composing surface opening.
///
/// Cosmetic: it lets the confirmation surface finish closing before the
/// composer appears. Correctness never depends on it.
pub const CONFIRM_HANDOFF_DELAY: Duration = Duration::from_millis(300);

/// Which surface the flow is presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Confirming,
    Composing,
}

/// Callbacks into the shell that hosts the flow.
pub trait Host {
    /// The user accepted the confirmation step.
    fn confirmed(&mut self);

    /// The flow closed; the surface should be hidden.
    fn closed(&mut self);

    /// Any focus or keyboard state held by the composer must be released.
    fn dismiss_focus(&mut self);
}

/// What remains of a session after the flow closes.
pub struct ClosedSession {
    pub opened_at: Timestamp,
    pub messages: Vec<Message>,
}

impl ClosedSession {
    /// Whether the reporter actually said anything.
    pub fn has_user_messages(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.origin == MessageOrigin::User)
    }
}

/// State machine over the three flow phases.
///
/// Owns the pending deferred effects and the composing session, when one
/// exists. The session exists exactly while the phase is [`Phase::Composing`].
pub struct FlowController {
    phase: Phase,
    generation: u64,
    handoff_pending: bool,
    session: Option<Composer>,
    sched: Scheduler,
}

impl FlowController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Closed,
            generation: 0,
            handoff_pending: false,
            session: None,
            sched: Scheduler::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn composer(&self) -> Option<&Composer> {
        self.session.as_ref()
    }

    pub fn composer_mut(&mut self) -> Option<&mut Composer> {
        self.session.as_mut()
    }

    /// Shows or hides the flow.
    ///
    /// Idempotent: asking for the phase that is already active is a no-op,
    /// so repeated host updates never reset a live session.
    pub fn set_visible(&mut self, visible: bool, skip_confirmation: bool, host: &mut dyn Host) {
        if visible {
            match self.phase {
                Phase::Closed => {
                    if skip_confirmation {
                        self.enter_composing();
                    } else {
                        self.transition(Phase::Confirming);
                    }
                }
                Phase::Confirming => {
                    if skip_confirmation {
                        self.enter_composing();
                    }
                }
                Phase::Composing => {}
            }
        } else if self.phase != Phase::Closed {
            self.close(host);
        }
    }

    /// The user accepted the confirmation step.
    ///
    /// The composing surface opens [`CONFIRM_HANDOFF_DELAY`] after `now`.
    /// The handoff is dropped unapplied if the flow moves on before then.
    pub fn on_confirm(&mut self, now: Instant, host: &mut dyn Host) {
        if self.phase != Phase::Confirming || self.handoff_pending {
            return;
        }
        self.handoff_pending = true;
        host.confirmed();
        self.sched.schedule(
            now + CONFIRM_HANDOFF_DELAY,
            self.generation,
            Effect::EnterComposing,
        );
    }

    /// The user dismissed the flow.
    ///
    /// Drops the session, releases focus, notifies the host, and re-arms
    /// confirmation so the next open starts there; a closed composition is
    /// never resumed. Returns the session's messages when one was active, so
    /// the shell can archive them.
    pub fn on_close(&mut self, host: &mut dyn Host) -> Option<ClosedSession> {
        if self.phase == Phase::Closed {
            return None;
        }
        self.close(host)
    }

    /// Sends the current draft. A no-op outside composing.
    pub fn send(&mut self, now: Instant, host: &mut dyn Host) -> SendOutcome {
        match self.session.as_mut() {
            Some(composer) => composer.send(now, &mut self.sched, host),
            None => SendOutcome::Empty,
        }
    }

    /// Applies every deferred effect that is due at `now`.
    ///
    /// Effects scheduled under an older generation are drained and dropped:
    /// a stale handoff cannot reopen the composer, and a stale
    /// acknowledgement cannot touch a log it has outlived.
    pub fn tick(&mut self, now: Instant) {
        for (generation, effect) in self.sched.drain_due(now) {
            if generation != self.generation {
                continue;
            }
            match effect {
                Effect::EnterComposing => self.enter_composing(),
                Effect::AutoReply => {
                    if let Some(composer) = self.session.as_mut() {
                        composer.apply_auto_reply();
                    }
                }
            }
        }
    }

    /// When the next deferred effect is due, for event-loop timeouts.
    pub fn next_due(&self) -> Option<Instant> {
        self.sched.next_due()
    }

    fn enter_composing(&mut self) {
        self.transition(Phase::Composing);
        self.session = Some(Composer::new(self.generation));
    }

    fn close(&mut self, host: &mut dyn Host) -> Option<ClosedSession> {
        let session = self.session.take();
        self.transition(Phase::Closed);
        host.dismiss_focus();
        host.closed();
        session.map(|composer| ClosedSession {
            opened_at: composer.opened_at(),
            messages: composer.into_messages(),
        })
    }

    fn transition(&mut self, phase: Phase) {
        self.phase = phase;
        self.generation += 1;
        self.handoff_pending = false;
    }
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}
