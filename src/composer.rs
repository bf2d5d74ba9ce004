//! The report composer: draft state, message validity, and the conversation
//! log.
//!
//! One `Composer` is one composing session. It is created when the flow
//! enters composing (seeding the log with the desk greeting) and dropped
//! when the flow closes. Nothing in it survives a session.

use std::time::{Duration, Instant};

use jiff::Timestamp;
use uuid::Uuid;

use crate::flow::Host;
use crate::media::MediaUri;
use crate::model::{Message, MessageOrigin, now_label};
use crate::sched::{Effect, Scheduler};

/// Upper bound on draft text, in characters.
pub const DRAFT_CHAR_CAP: usize = 500;

/// Minimum trimmed length for a text report.
pub const MIN_REPORT_CHARS: usize = 100;

/// Delay before the scripted acknowledgement lands.
pub const AUTO_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Seeded as the first message of every session.
const GREETING: &str = "You have reached the incident desk. Describe what \
    happened in as much detail as you can, or attach a photo.";

/// The scripted acknowledgement appended after a send.
const ACKNOWLEDGEMENT: &str = "Your report has been received. A safety \
    officer will review it and follow up shortly.";

/// Ordered, append-only record of the session's messages.
///
/// Insertion order is chronological and is also the rendering order.
/// Messages are immutable once appended; nothing here reorders or rewrites.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The not-yet-sent message under composition.
#[derive(Debug, Default)]
pub struct Draft {
    text: String,
    attached_image: Option<MediaUri>,
    input_locked: bool,
}

impl Draft {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attached_image(&self) -> Option<&MediaUri> {
        self.attached_image.as_ref()
    }

    /// Once true, the input surface stays hidden for the rest of the
    /// session. Only a fresh session resets it.
    pub fn input_locked(&self) -> bool {
        self.input_locked
    }
}

/// Whether `send` would currently accept the draft.
///
/// Always derived from the draft on the spot, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The draft would be accepted.
    Ready,

    /// Nothing to send: no text, no image.
    Empty,

    /// Non-empty text under the minimum length. An attached image does not
    /// lift the minimum-length requirement.
    TooShort,
}

/// What a call to [`Composer::send`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message was appended and the acknowledgement scheduled.
    Sent,

    /// Silent no-op: the draft was empty.
    Empty,

    /// Refused with a user-facing warning: the text is too short.
    TooShort,
}

/// One composing session: the draft, the log, and the send logic.
pub struct Composer {
    log: ConversationLog,
    draft: Draft,
    opened_at: Timestamp,
    generation: u64,
}

impl Composer {
    /// Starts a session: fresh draft, log seeded with the desk greeting.
    ///
    /// `generation` tags the acknowledgement this session may schedule, so
    /// the flow can drop it if the session ends first.
    pub fn new(generation: u64) -> Self {
        let mut log = ConversationLog::default();
        log.append(Message {
            id: Uuid::new_v4(),
            origin: MessageOrigin::System,
            text: GREETING.to_string(),
            image: None,
            timestamp: now_label(),
        });
        Self {
            log,
            draft: Draft::default(),
            opened_at: Timestamp::now(),
            generation,
        }
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// When this session opened.
    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.log.messages
    }

    // ── Draft edits ──

    /// Appends one character to the draft text, up to the character cap.
    pub fn push_char(&mut self, c: char) {
        if self.draft.text.chars().count() < DRAFT_CHAR_CAP {
            self.draft.text.push(c);
        }
    }

    /// Removes the last character of the draft text.
    pub fn backspace(&mut self) {
        self.draft.text.pop();
    }

    /// Replaces the draft text wholesale, truncated to the cap.
    pub fn set_text(&mut self, text: &str) {
        self.draft.text = text.chars().take(DRAFT_CHAR_CAP).collect();
    }

    /// Attaches an image. The draft text is untouched.
    pub fn attach_image(&mut self, uri: MediaUri) {
        self.draft.attached_image = Some(uri);
    }

    /// Clears the attachment. The draft text is untouched.
    pub fn clear_image(&mut self) {
        self.draft.attached_image = None;
    }

    // ── Send ──

    /// Whether `send` would accept the current draft.
    ///
    /// Text of 100+ trimmed characters is always enough. An image alone is
    /// enough. An image with 1–99 characters of text is not.
    pub fn eligibility(&self) -> Eligibility {
        let trimmed = self.draft.text.trim().chars().count();
        if trimmed >= MIN_REPORT_CHARS {
            Eligibility::Ready
        } else if trimmed > 0 {
            Eligibility::TooShort
        } else if self.draft.attached_image.is_some() {
            Eligibility::Ready
        } else {
            Eligibility::Empty
        }
    }

    /// Whether the send control should be active right now.
    pub fn can_send(&self) -> bool {
        self.eligibility() == Eligibility::Ready
    }

    /// Finalizes the draft into the log.
    ///
    /// On acceptance the draft text and attachment are cleared (the input
    /// lock is not), focus is released through the host, and the
    /// acknowledgement is scheduled [`AUTO_REPLY_DELAY`] after `now`.
    /// Refusals leave the draft and the log untouched.
    pub fn send(&mut self, now: Instant, sched: &mut Scheduler, host: &mut dyn Host) -> SendOutcome {
        match self.eligibility() {
            Eligibility::Empty => SendOutcome::Empty,
            Eligibility::TooShort => SendOutcome::TooShort,
            Eligibility::Ready => {
                self.log.append(Message {
                    id: Uuid::new_v4(),
                    origin: MessageOrigin::User,
                    text: std::mem::take(&mut self.draft.text),
                    image: self.draft.attached_image.take(),
                    timestamp: now_label(),
                });
                host.dismiss_focus();
                sched.schedule(now + AUTO_REPLY_DELAY, self.generation, Effect::AutoReply);
                SendOutcome::Sent
            }
        }
    }

    /// Lands the scripted acknowledgement and locks the input surface.
    ///
    /// Called by the flow when the acknowledgement effect fires with this
    /// session still active.
    pub(crate) fn apply_auto_reply(&mut self) {
        self.log.append(Message {
            id: Uuid::new_v4(),
            origin: MessageOrigin::System,
            text: ACKNOWLEDGEMENT.to_string(),
            image: None,
            timestamp: now_label(),
        });
        self.draft.input_locked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Host stub that counts focus releases.
    #[derive(Default)]
    struct TestHost {
        focus_dismissed: usize,
    }

    impl Host for TestHost {
        fn confirmed(&mut self) {}
        fn closed(&mut self) {}
        fn dismiss_focus(&mut self) {
            self.focus_dismissed += 1;
        }
    }

    fn composer() -> Composer {
        Composer::new(1)
    }

    fn long_text() -> String {
        "The incident happened near the east entrance of the station; \
         a man in a grey jacket followed me from the platform to the exit."
            .to_string()
    }

    fn send_now(
        composer: &mut Composer,
        sched: &mut Scheduler,
        host: &mut TestHost,
    ) -> SendOutcome {
        composer.send(Instant::now(), sched, host)
    }

    #[test]
    fn session_seeds_one_system_message() {
        let composer = composer();

        assert_eq!(composer.log().len(), 1);
        assert_eq!(composer.log().messages()[0].origin, MessageOrigin::System);
        assert!(!composer.log().is_empty());
    }

    #[test]
    fn empty_draft_is_not_sendable() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        assert_eq!(composer.eligibility(), Eligibility::Empty);
        assert!(!composer.can_send());
        assert_eq!(send_now(&mut composer, &mut sched, &mut host), SendOutcome::Empty);
        assert_eq!(composer.log().len(), 1);
        assert_eq!(host.focus_dismissed, 0);
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut composer = composer();
        composer.set_text("   \n\t  ");

        assert_eq!(composer.eligibility(), Eligibility::Empty);
    }

    #[test]
    fn short_text_is_rejected_and_log_unchanged() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        composer.set_text("He followed me home.");
        assert_eq!(send_now(&mut composer, &mut sched, &mut host), SendOutcome::TooShort);

        // Draft and log are untouched so the user can keep editing.
        assert_eq!(composer.log().len(), 1);
        assert_eq!(composer.draft().text(), "He followed me home.");
        assert!(sched.next_due().is_none());
    }

    #[test]
    fn minimum_length_boundary() {
        let mut composer = composer();

        composer.set_text(&"x".repeat(99));
        assert_eq!(composer.eligibility(), Eligibility::TooShort);

        composer.set_text(&"x".repeat(100));
        assert_eq!(composer.eligibility(), Eligibility::Ready);
    }

    #[test]
    fn trimming_applies_to_eligibility_not_to_the_sent_text() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        let padded = format!("  {}  ", long_text());
        composer.set_text(&padded);
        assert_eq!(send_now(&mut composer, &mut sched, &mut host), SendOutcome::Sent);

        // The appended message carries the draft text verbatim.
        let sent = composer.log().messages().last().unwrap();
        assert_eq!(sent.text, padded);
    }

    #[test]
    fn long_text_sends_and_schedules_acknowledgement() {
        let t0 = Instant::now();
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        composer.set_text(&long_text());
        assert_eq!(composer.send(t0, &mut sched, &mut host), SendOutcome::Sent);

        assert_eq!(composer.log().len(), 2);
        let sent = composer.log().messages().last().unwrap();
        assert_eq!(sent.origin, MessageOrigin::User);
        assert_eq!(sent.text, long_text());

        // Draft cleared, focus released, acknowledgement pending.
        assert_eq!(composer.draft().text(), "");
        assert!(composer.draft().attached_image().is_none());
        assert_eq!(host.focus_dismissed, 1);
        assert_eq!(sched.next_due(), Some(t0 + AUTO_REPLY_DELAY));
    }

    #[test]
    fn input_locks_only_after_the_acknowledgement_lands() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        composer.set_text(&long_text());
        send_now(&mut composer, &mut sched, &mut host);
        assert!(!composer.draft().input_locked());

        composer.apply_auto_reply();

        assert!(composer.draft().input_locked());
        assert_eq!(composer.log().len(), 3);
        let ack = composer.log().messages().last().unwrap();
        assert_eq!(ack.origin, MessageOrigin::System);
    }

    #[test]
    fn image_only_draft_sends() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        composer.attach_image(MediaUri::new("file:///gallery/42.jpg"));
        assert_eq!(composer.eligibility(), Eligibility::Ready);
        assert_eq!(send_now(&mut composer, &mut sched, &mut host), SendOutcome::Sent);

        let sent = composer.log().messages().last().unwrap();
        assert_eq!(sent.text, "");
        assert_eq!(
            sent.image.as_ref().map(MediaUri::as_str),
            Some("file:///gallery/42.jpg")
        );
    }

    #[test]
    fn image_with_short_text_is_rejected() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        composer.attach_image(MediaUri::new("file:///gallery/42.jpg"));
        composer.set_text("see photo");

        assert_eq!(composer.eligibility(), Eligibility::TooShort);
        assert_eq!(send_now(&mut composer, &mut sched, &mut host), SendOutcome::TooShort);
        assert_eq!(composer.log().len(), 1);
        assert!(composer.draft().attached_image().is_some());
    }

    #[test]
    fn image_with_long_text_sends() {
        let mut composer = composer();
        let mut sched = Scheduler::new();
        let mut host = TestHost::default();

        composer.attach_image(MediaUri::new("file:///gallery/42.jpg"));
        composer.set_text(&long_text());

        assert_eq!(send_now(&mut composer, &mut sched, &mut host), SendOutcome::Sent);
        let sent = composer.log().messages().last().unwrap();
        assert!(sent.image.is_some());
    }

    #[test]
    fn attach_and_clear_leave_text_alone() {
        let mut composer = composer();
        composer.set_text("draft in progress");

        composer.attach_image(MediaUri::new("file:///gallery/42.jpg"));
        assert_eq!(composer.draft().text(), "draft in progress");

        composer.clear_image();
        assert_eq!(composer.draft().text(), "draft in progress");
        assert!(composer.draft().attached_image().is_none());
    }

    #[test]
    fn draft_text_is_capped() {
        let mut composer = composer();

        for _ in 0..DRAFT_CHAR_CAP + 50 {
            composer.push_char('a');
        }
        assert_eq!(composer.draft().text().chars().count(), DRAFT_CHAR_CAP);

        composer.set_text(&"b".repeat(DRAFT_CHAR_CAP + 50));
        assert_eq!(composer.draft().text().chars().count(), DRAFT_CHAR_CAP);
    }

    #[test]
    fn can_send_tracks_every_edit() {
        let mut composer = composer();
        assert!(!composer.can_send());

        composer.set_text(&"x".repeat(100));
        assert!(composer.can_send());

        composer.backspace();
        assert!(!composer.can_send());

        composer.push_char('x');
        assert!(composer.can_send());
    }
}
