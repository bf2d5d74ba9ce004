//! Transcript screen: read-only view of one archived report.

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph},
};

use crate::model::{Message, Report};

use super::report::message_lines;

pub struct TranscriptScreen {
    report: Report,
    messages: Vec<Message>,
    scroll_offset: usize,
}

impl TranscriptScreen {
    pub fn new(report: Report, messages: Vec<Message>) -> Self {
        Self {
            report,
            messages,
            scroll_offset: 0,
        }
    }

    pub fn on_scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
        }
    }

    pub fn on_scroll_down(&mut self) {
        self.scroll_offset += 1;
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // header
            Constraint::Min(0),    // transcript
            Constraint::Length(1), // help
        ])
        .split(area);

        let muted = Style::default().fg(Color::DarkGray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Report ", highlight),
            Span::styled(
                self.report.opened_at.strftime("%Y-%m-%d %H:%M").to_string(),
                highlight,
            ),
        ]))
        .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(header, chunks[0]);

        let content_block = Block::default().padding(Padding::new(2, 2, 0, 0));
        let inner = content_block.inner(chunks[1]);
        let mut lines: Vec<Line> = Vec::new();
        for message in &self.messages {
            lines.extend(message_lines(message, inner.width as usize));
        }

        let visible = inner.height as usize;
        let max_offset = lines.len().saturating_sub(visible);
        let offset = self.scroll_offset.min(max_offset);
        let shown: Vec<Line> = lines.into_iter().skip(offset).take(visible).collect();
        frame.render_widget(Paragraph::new(shown).block(content_block), chunks[1]);

        let help = Paragraph::new(Line::from(Span::styled(" ↑↓ scroll  esc back", muted)));
        frame.render_widget(help, chunks[2]);
    }
}
