use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
    /// Waiting on the provider
    Busy,
}

/// One-line status shown between the transcript and the composer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, text)
    }

    pub fn busy(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Busy, text)
    }
}

impl Widget for &StatusLine {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.text.is_empty() || area.height == 0 {
            return;
        }

        let color = match self.kind {
            StatusKind::Info => Color::Gray,
            StatusKind::Warning => Color::Yellow,
            StatusKind::Error => Color::Red,
            StatusKind::Busy => Color::Green,
        };

        let mut spans = vec![Span::styled(self.text.as_str(), Style::default().fg(color))];
        if self.kind == StatusKind::Busy {
            // Animated dots while the request is in flight
            let dots = match (std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
                / 300)
                % 4
            {
                0 => ".",
                1 => "..",
                2 => "...",
                _ => "   ",
            };
            spans.push(Span::styled(dots, Style::default().fg(Color::Yellow)));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
