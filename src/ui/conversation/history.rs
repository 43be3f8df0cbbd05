//! Transcript pane for the chat screen

use crate::transcript::{Turn, Turns};
use crate::typing::{CURSOR, Reveal};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the completed turns, newest at the bottom.
///
/// When `reveal` is set, the reply of the last turn is drawn from it instead,
/// with a cursor while it is still running. `scroll_back` counts lines above
/// the bottom and is clamped to the top of the conversation.
pub struct TranscriptPane<'a> {
    turns: Turns<'a>,
    reveal: Option<&'a Reveal>,
    system_message: Option<&'a str>,
    scroll_back: usize,
}

impl<'a> TranscriptPane<'a> {
    pub fn new(turns: Turns<'a>) -> Self {
        Self {
            turns,
            reveal: None,
            system_message: None,
            scroll_back: 0,
        }
    }

    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    pub fn reveal(mut self, reveal: Option<&'a Reveal>) -> Self {
        self.reveal = reveal;
        self
    }

    pub fn system_message(mut self, message: Option<&'a str>) -> Self {
        self.system_message = message;
        self
    }

    /// How far the pane can scroll back when drawn into `area`
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner_area = pane_block().inner(area);
        self.lines(inner_area.width)
            .len()
            .saturating_sub(inner_area.height as usize)
    }

    /// All lines for the given content width, before scrolling
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let width = width.saturating_sub(2) as usize;
        let mut lines = Vec::new();
        let total = self.turns.len();

        for (index, turn) in self.turns.clone().enumerate() {
            let is_last = index + 1 == total;
            let reveal = if is_last { self.reveal } else { None };
            render_turn(turn, reveal, width, &mut lines);
            lines.push(Line::from(""));
        }

        if let Some(message) = self.system_message {
            for text in wrap_text(message, width) {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(text, Style::default().fg(Color::Yellow)),
                ]));
            }
        }

        lines
    }
}

impl Widget for TranscriptPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = pane_block();
        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.turns.len() == 0 && self.system_message.is_none() {
            let welcome_lines = vec![
                Line::from(vec![Span::styled(
                    "Have a continuous conversation with the AI!",
                    Style::default().fg(Color::Green),
                )]),
                Line::from(""),
                Line::from(vec![Span::styled(
                    "Enter to send · Ctrl+L to clear the chat · Esc to quit · /help for commands",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let all_lines = self.lines(inner_area.width);

        // Bottom of the conversation unless scrolled back
        let height = inner_area.height as usize;
        let bottom = all_lines.len().saturating_sub(height);
        let start = bottom.saturating_sub(self.scroll_back);
        for (i, line) in all_lines[start..].iter().take(height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

fn pane_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title("💬 Chat History")
}

fn render_turn(turn: &Turn, reveal: Option<&Reveal>, width: usize, lines: &mut Vec<Line<'static>>) {
    let timestamp = turn.timestamp.format("%H:%M:%S").to_string();

    lines.push(Line::from(vec![
        Span::styled("You:", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", timestamp), Style::default().fg(Color::DarkGray)),
    ]));
    for text in wrap_text(&turn.user, width) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(text, Style::default().fg(Color::Blue)),
        ]));
    }

    lines.push(Line::from(vec![Span::styled(
        "Bot:",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )]));

    let (reply, typing) = match reveal {
        Some(reveal) if !reveal.is_done() => (reveal.visible(), true),
        _ => (turn.bot.as_str(), false),
    };
    let reply_lines = wrap_text(reply, width);
    let last = reply_lines.len().saturating_sub(1);
    for (i, text) in reply_lines.into_iter().enumerate() {
        let mut spans = vec![
            Span::raw("  "),
            Span::styled(text, Style::default().fg(Color::Green)),
        ];
        if typing && i == last {
            spans.push(Span::styled(
                CURSOR.to_string(),
                Style::default().fg(Color::Yellow),
            ));
        }
        lines.push(Line::from(spans));
    }
}

/// Wrap text to fit within the given width, keeping the text's own line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.chars().count();
            if current_width > 0 && current_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            if current_width > 0 {
                current_line.push(' ');
                current_width += 1;
            }
            current_line.push_str(word);
            current_width += word_width;
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
