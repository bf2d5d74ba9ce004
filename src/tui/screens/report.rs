//! The incident report flow: confirmation surface and chat composer.
//!
//! This screen is the host shell around [`FlowController`]: it translates
//! key presses into flow intents and renders whichever surface the flow is
//! presenting. Focus and visibility are the terminal's concern here, so the
//! host callbacks have nothing to do; closing is reported to the app loop
//! through the [`ReportExit`] return value instead.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use jiff::Timestamp;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph},
};
use uuid::Uuid;

use crate::composer::{DRAFT_CHAR_CAP, MIN_REPORT_CHARS, SendOutcome};
use crate::flow::{FlowController, Host, Phase};
use crate::media::{DirectoryGallery, MediaError, MediaKind, MediaSource};
use crate::model::{Message, MessageOrigin, Report};

/// Host adapter for the terminal shell.
struct HostSignals;

impl Host for HostSignals {
    fn confirmed(&mut self) {}
    fn closed(&mut self) {}
    fn dismiss_focus(&mut self) {}
}

/// Returned when the flow closes. Carries the archive payload when the
/// session said anything worth keeping.
pub struct ReportExit {
    pub archive: Option<(Report, Vec<Message>)>,
}

pub struct ReportScreen {
    controller: FlowController,
    media: DirectoryGallery,
    decline_selected: bool,
    scroll_back: usize,
    seen_messages: usize,
    notice: Option<String>,
}

impl ReportScreen {
    pub fn new(skip_confirmation: bool, media: DirectoryGallery) -> Self {
        let mut controller = FlowController::new();
        controller.set_visible(true, skip_confirmation, &mut HostSignals);
        Self {
            controller,
            media,
            decline_selected: false,
            scroll_back: 0,
            seen_messages: 0,
            notice: None,
        }
    }

    /// When the next deferred effect is due, for the event-loop timeout.
    pub fn next_due(&self) -> Option<Instant> {
        self.controller.next_due()
    }

    /// Applies due deferred effects and follows the log tail when it grows.
    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
        if let Some(composer) = self.controller.composer() {
            let len = composer.log().len();
            if len != self.seen_messages {
                self.seen_messages = len;
                self.scroll_back = 0;
            }
        }
    }

    /// Handle a key press. Returns Some when the flow has closed.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<ReportExit> {
        match self.controller.phase() {
            Phase::Confirming => self.handle_confirm_key(key, now),
            Phase::Composing => self.handle_compose_key(key, now),
            Phase::Closed => Some(self.close()),
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, now: Instant) -> Option<ReportExit> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.decline_selected = !self.decline_selected;
                None
            }
            KeyCode::Char('y') => {
                self.controller.on_confirm(now, &mut HostSignals);
                None
            }
            KeyCode::Char('n') | KeyCode::Esc => Some(self.close()),
            KeyCode::Enter => {
                if self.decline_selected {
                    Some(self.close())
                } else {
                    self.controller.on_confirm(now, &mut HostSignals);
                    None
                }
            }
            _ => None,
        }
    }

    fn handle_compose_key(&mut self, key: KeyEvent, now: Instant) -> Option<ReportExit> {
        if key.code == KeyCode::Esc {
            return Some(self.close());
        }

        let locked = self
            .controller
            .composer()
            .is_some_and(|c| c.draft().input_locked());
        if locked {
            // The input surface is gone; only leaving remains.
            return (key.code == KeyCode::Enter).then(|| self.close());
        }

        match key.code {
            KeyCode::Enter => {
                match self.controller.send(now, &mut HostSignals) {
                    SendOutcome::Sent => {
                        self.notice = None;
                        self.scroll_back = 0;
                    }
                    SendOutcome::TooShort => {
                        self.notice = Some(format!(
                            "Add more detail: reports need at least {MIN_REPORT_CHARS} characters."
                        ));
                    }
                    SendOutcome::Empty => {}
                }
                None
            }
            KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.attach_from_gallery();
                None
            }
            KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(composer) = self.controller.composer_mut() {
                    composer.clear_image();
                }
                None
            }
            KeyCode::Up => {
                self.scroll_back += 1;
                None
            }
            KeyCode::Down => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                None
            }
            KeyCode::Char(c) => {
                if let Some(composer) = self.controller.composer_mut() {
                    composer.push_char(c);
                }
                self.notice = None;
                None
            }
            KeyCode::Backspace => {
                if let Some(composer) = self.controller.composer_mut() {
                    composer.backspace();
                }
                self.notice = None;
                None
            }
            _ => None,
        }
    }

    fn attach_from_gallery(&mut self) {
        match self.media.pick_image(MediaKind::Gallery) {
            Ok(uri) => {
                if let Some(composer) = self.controller.composer_mut() {
                    composer.attach_image(uri);
                }
                self.notice = None;
            }
            // A cancelled pick changes nothing and needs no notice.
            Err(MediaError::Cancelled) => {}
            Err(e) => self.notice = Some(format!("Could not attach an image: {e}")),
        }
    }

    fn close(&mut self) -> ReportExit {
        let closed = self.controller.on_close(&mut HostSignals);
        let archive = closed
            .filter(|session| session.has_user_messages())
            .map(|session| {
                let report = Report {
                    id: Uuid::new_v4(),
                    opened_at: session.opened_at,
                    closed_at: Timestamp::now(),
                    message_count: session.messages.len(),
                };
                (report, session.messages)
            });
        ReportExit { archive }
    }

    pub fn render(&self, frame: &mut Frame) {
        match self.controller.phase() {
            Phase::Confirming | Phase::Closed => self.render_confirm(frame),
            Phase::Composing => self.render_chat(frame),
        }
    }

    fn render_confirm(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // header
            Constraint::Min(0),    // prompt and options
            Constraint::Length(1), // help
        ])
        .split(area);

        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let header = Paragraph::new(Line::from(Span::styled("Report an incident", highlight)))
            .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(header, chunks[0]);

        let (accept, decline) = if self.decline_selected {
            (normal, highlight)
        } else {
            (highlight, normal)
        };

        let lines = vec![
            Line::from(Span::styled(
                "This opens a direct line to the incident desk.",
                normal,
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("[ Yes, report ]", accept),
                Span::raw("   "),
                Span::styled("[ Not now ]", decline),
            ]),
        ];
        let content =
            Paragraph::new(lines).block(Block::default().padding(Padding::new(2, 2, 1, 0)));
        frame.render_widget(content, chunks[1]);

        let help = Paragraph::new(Line::from(Span::styled(
            " ←→ choose  ⏎ select  y yes  n no  esc cancel",
            muted,
        )));
        frame.render_widget(help, chunks[2]);
    }

    fn render_chat(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // header
            Constraint::Min(0),    // conversation
            Constraint::Length(1), // notice / attachment
            Constraint::Length(1), // input
            Constraint::Length(1), // help
        ])
        .split(area);

        let muted = Style::default().fg(Color::DarkGray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let header = Paragraph::new(Line::from(Span::styled("Incident desk", highlight)))
            .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(header, chunks[0]);

        let Some(composer) = self.controller.composer() else {
            return;
        };

        // Conversation, pinned to the tail unless scrolled back.
        let content_block = Block::default().padding(Padding::new(2, 2, 0, 0));
        let inner = content_block.inner(chunks[1]);
        let mut lines: Vec<Line> = Vec::new();
        for message in composer.log().messages() {
            lines.extend(message_lines(message, inner.width as usize));
        }
        let visible = inner.height as usize;
        let total = lines.len();
        let back = self.scroll_back.min(total.saturating_sub(visible));
        let start = total.saturating_sub(visible + back);
        let shown: Vec<Line> = lines.into_iter().skip(start).take(visible).collect();
        frame.render_widget(Paragraph::new(shown).block(content_block), chunks[1]);

        // Notice or attachment state.
        let status = if let Some(notice) = &self.notice {
            Line::from(Span::styled(
                format!(" {notice}"),
                Style::default().fg(Color::Yellow),
            ))
        } else if composer.draft().attached_image().is_some() {
            Line::from(Span::styled(" image attached (ctrl+x removes)", muted))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(status), chunks[2]);

        // Input line, hidden for good once the desk has replied.
        if composer.draft().input_locked() {
            let done = Paragraph::new(Line::from(Span::styled(
                " The desk has received your report.",
                muted,
            )));
            frame.render_widget(done, chunks[3]);
            let help = Paragraph::new(Line::from(Span::styled(" ⏎/esc close", muted)));
            frame.render_widget(help, chunks[4]);
        } else {
            let text = composer.draft().text();
            let counter = format!("  {}/{DRAFT_CHAR_CAP}", text.chars().count());
            let input = Paragraph::new(Line::from(vec![
                Span::styled(" › ", highlight),
                Span::styled(text.to_string(), Style::default().fg(Color::White)),
                Span::styled("█", muted),
                Span::styled(counter, muted),
            ]));
            frame.render_widget(input, chunks[3]);

            let send_style = if composer.can_send() { highlight } else { muted };
            let help = Paragraph::new(Line::from(vec![
                Span::styled(" ⏎ send", send_style),
                Span::styled("  ctrl+g attach  ↑↓ scroll  esc close", muted),
            ]));
            frame.render_widget(help, chunks[4]);
        }
    }
}

/// Formats one message into display lines: a speaker label, the wrapped
/// body, and an attachment marker when present.
pub(super) fn message_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let muted = Style::default().fg(Color::DarkGray);
    let (speaker, body) = match message.origin {
        MessageOrigin::User => ("you", Style::default().fg(Color::White)),
        MessageOrigin::System => ("desk", Style::default().fg(Color::Gray)),
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{speaker} · {}", message.timestamp),
        muted,
    ))];
    if !message.text.is_empty() {
        for wrapped in wrap_text(&message.text, width) {
            lines.push(Line::from(Span::styled(wrapped, body)));
        }
    }
    if let Some(image) = &message.image {
        lines.push(Line::from(Span::styled(
            format!("[image] {}", image.as_str()),
            muted,
        )));
    }
    lines.push(Line::from(""));
    lines
}

/// Greedy word wrap by character count. Words wider than `width` are split
/// mid-word.
pub(super) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in raw.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }

            let mut rest = word;
            loop {
                let space = width - line_len;
                let chars = rest.chars().count();
                if chars <= space {
                    line.push_str(rest);
                    line_len += chars;
                    break;
                }
                let split: usize = rest.chars().take(space).map(char::len_utf8).sum();
                line.push_str(&rest[..split]);
                lines.push(std::mem::take(&mut line));
                line_len = 0;
                rest = &rest[split..];
            }
        }

        lines.push(line);
    }

    lines
}
