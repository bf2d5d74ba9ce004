//! Home screen: the new report entry and past reports.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, Padding, Paragraph};

use crate::model::Report;
use crate::tui::app::HomeAction;

/// An item in the home screen list — the "new report" entry or an archived
/// report.
enum HomeItem {
    NewReport,
    Report(Report),
}

pub struct HomeScreen {
    items: Vec<HomeItem>,
    selected: usize,
}

impl HomeScreen {
    pub fn new(reports: Vec<Report>) -> Self {
        let mut items = vec![HomeItem::NewReport];
        items.extend(reports.into_iter().map(HomeItem::Report));
        Self { items, selected: 0 }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select(&self) -> Option<HomeAction> {
        self.items.get(self.selected).map(|item| match item {
            HomeItem::NewReport => HomeAction::NewReport,
            HomeItem::Report(r) => HomeAction::OpenReport(r.id),
        })
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // title
            Constraint::Min(0),    // list
            Constraint::Length(1), // help
        ])
        .split(area);

        // Title.
        let title = Paragraph::new(Line::from(vec![Span::styled(
            "Aegis",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(title, chunks[0]);

        // Build list items.
        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let list_items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.selected {
                    highlight
                } else {
                    normal
                };
                let pointer = if i == self.selected { "› " } else { "  " };

                match item {
                    HomeItem::NewReport => ListItem::new(Line::from(vec![
                        Span::styled(pointer, style),
                        Span::styled("Report an incident", style),
                    ])),
                    HomeItem::Report(r) => {
                        let label = r.opened_at.strftime("%Y-%m-%d %H:%M").to_string();
                        ListItem::new(Line::from(vec![
                            Span::styled(pointer, style),
                            Span::styled(label, style),
                            Span::styled(
                                format!("  [{} message(s)]", r.message_count),
                                muted,
                            ),
                        ]))
                    }
                }
            })
            .collect();

        let list = List::new(list_items).block(Block::default().padding(Padding::new(2, 2, 0, 0)));
        frame.render_widget(list, chunks[1]);

        // Help line.
        let help = Paragraph::new(Line::from(vec![Span::styled(
            " ↑↓ navigate  ⏎ select  r report  q quit",
            muted,
        )]));
        frame.render_widget(help, chunks[2]);
    }
}
