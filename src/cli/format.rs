//! Output formatting for CLI display.

use crate::model::{Message, MessageOrigin, Report};

/// One list line per archived report: short id, opened time, size.
pub(super) fn format_report_line(report: &Report) -> String {
    let id = report.id.to_string();
    format!(
        "{}  {}  {} message(s)",
        &id[..8],
        report.opened_at.strftime("%Y-%m-%d %H:%M"),
        report.message_count
    )
}

/// A report's full transcript for human-readable display.
pub(super) fn format_transcript(report: &Report, messages: &[Message]) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Report {}", report.id));
    lines.push(format!(
        "Opened {}, closed {}",
        report.opened_at.strftime("%Y-%m-%d %H:%M"),
        report.closed_at.strftime("%Y-%m-%d %H:%M")
    ));
    lines.push(String::new());

    for message in messages {
        let speaker = match message.origin {
            MessageOrigin::User => "you",
            MessageOrigin::System => "desk",
        };
        lines.push(format!("[{}] {speaker}: {}", message.timestamp, message.text));
        if let Some(image) = &message.image {
            lines.push(format!("        attachment: {}", image.as_str()));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use uuid::Uuid;

    use crate::media::MediaUri;

    fn sample_report() -> Report {
        Report {
            id: Uuid::new_v4(),
            opened_at: Timestamp::new(1_754_000_000, 0).unwrap(),
            closed_at: Timestamp::new(1_754_000_600, 0).unwrap(),
            message_count: 2,
        }
    }

    #[test]
    fn report_line_has_short_id_and_count() {
        let report = sample_report();
        let line = format_report_line(&report);

        assert!(line.starts_with(&report.id.to_string()[..8]));
        assert!(line.ends_with("2 message(s)"));
    }

    #[test]
    fn transcript_labels_speakers_and_attachments() {
        let report = sample_report();
        let messages = vec![
            Message {
                id: Uuid::new_v4(),
                origin: MessageOrigin::System,
                text: "Describe what happened.".into(),
                image: None,
                timestamp: "14:31".into(),
            },
            Message {
                id: Uuid::new_v4(),
                origin: MessageOrigin::User,
                text: String::new(),
                image: Some(MediaUri::new("file:///gallery/42.jpg")),
                timestamp: "14:32".into(),
            },
        ];

        let out = format_transcript(&report, &messages);

        assert!(out.contains("[14:31] desk: Describe what happened."));
        assert!(out.contains("[14:32] you:"));
        assert!(out.contains("attachment: file:///gallery/42.jpg"));
    }
}
