use crate::ui::conversation::commands::{
    SlashCommand, built_in_slash_commands, parse_slash_command,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use std::cell::{Cell, RefCell};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Enter on ordinary text. The text stays in the composer until the caller
    /// replaces it.
    Submitted(String),
    Command(SlashCommand),
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Byte offset, always on a char boundary
    pub cursor_position: usize,
}

/// Single-line message input with a slash-command palette
pub struct ConversationComposer {
    state: RefCell<TextAreaState>,
    placeholder: String,
    filtered_commands: RefCell<Vec<SlashCommand>>,
    show_command_palette: Cell<bool>,
    selected_command: Cell<Option<usize>>,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: RefCell::new(TextAreaState::default()),
            placeholder: placeholder.into(),
            filtered_commands: RefCell::new(Vec::new()),
            show_command_palette: Cell::new(false),
            selected_command: Cell::new(None),
        }
    }

    /// Handle key input
    pub fn handle_key(&self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        let mut state = self.state.borrow_mut();

        match key.code {
            KeyCode::Enter => {
                let content = state.content.clone();
                // Typed commands and aliases win; the palette only fills in
                // partial words such as "/hi"
                let command = parse_slash_command(&content).or_else(|| {
                    if self.show_command_palette.get() {
                        self.selected()
                    } else {
                        None
                    }
                });
                self.close_command_palette();

                if let Some(command) = command {
                    state.content.clear();
                    state.cursor_position = 0;
                    return ComposerResult::Command(command);
                }
                return ComposerResult::Submitted(content);
            }
            KeyCode::Up if self.show_command_palette.get() => self.move_command_selection(-1),
            KeyCode::Down if self.show_command_palette.get() => self.move_command_selection(1),
            KeyCode::Esc => self.close_command_palette(),
            KeyCode::Tab if self.show_command_palette.get() => {
                if let Some(command) = self.selected() {
                    state.content = format!("/{}", command.command());
                    state.cursor_position = state.content.len();
                    self.refresh_command_palette(&state);
                }
            }
            KeyCode::Char(c) => {
                insert_char(&mut state, c);
                self.sync_command_palette(&state);
            }
            KeyCode::Backspace => {
                if backspace(&mut state) {
                    self.sync_command_palette(&state);
                }
            }
            KeyCode::Delete => {
                if delete(&mut state) {
                    self.sync_command_palette(&state);
                }
            }
            KeyCode::Left => {
                if let Some(c) = state.content[..state.cursor_position].chars().next_back() {
                    state.cursor_position -= c.len_utf8();
                }
            }
            KeyCode::Right => {
                if let Some(c) = state.content[state.cursor_position..].chars().next() {
                    state.cursor_position += c.len_utf8();
                }
            }
            KeyCode::Home => {
                state.cursor_position = 0;
            }
            KeyCode::End => {
                state.cursor_position = state.content.len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    fn selected(&self) -> Option<SlashCommand> {
        let index = self.selected_command.get()?;
        self.filtered_commands.borrow().get(index).copied()
    }

    /// Palette is open while the input is a bare `/word`
    fn sync_command_palette(&self, state: &TextAreaState) {
        let is_command_word =
            state.content.starts_with('/') && !state.content.contains(char::is_whitespace);
        if is_command_word {
            if !self.show_command_palette.get() {
                self.show_command_palette.set(true);
                self.selected_command.set(Some(0));
            }
            self.refresh_command_palette(state);
        } else {
            self.close_command_palette();
        }
    }

    fn close_command_palette(&self) {
        self.show_command_palette.set(false);
        self.filtered_commands.borrow_mut().clear();
        self.selected_command.set(None);
    }

    fn refresh_command_palette(&self, state: &TextAreaState) {
        let query = state.content.trim_start_matches('/').to_lowercase();
        let mut filtered = self.filtered_commands.borrow_mut();
        filtered.clear();
        filtered.extend(
            built_in_slash_commands()
                .into_iter()
                .filter(|(keyword, _)| keyword.starts_with(&query))
                .map(|(_, command)| command),
        );

        if filtered.is_empty() {
            self.selected_command.set(None);
        } else {
            let index = self.selected_command.get().unwrap_or(0);
            self.selected_command.set(Some(index.min(filtered.len() - 1)));
        }
    }

    fn move_command_selection(&self, delta: isize) {
        let len = self.filtered_commands.borrow().len() as isize;
        if len == 0 {
            self.selected_command.set(None);
            return;
        }

        let current = self.selected_command.get().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command.set(Some(next as usize));
    }

    pub fn is_palette_open(&self) -> bool {
        self.show_command_palette.get()
    }

    pub fn content(&self) -> String {
        self.state.borrow().content.clone()
    }

    /// Replace the text and put the cursor at the end
    pub fn set_content(&self, content: &str) {
        let mut state = self.state.borrow_mut();
        state.content = content.to_string();
        state.cursor_position = state.content.len();
        drop(state);
        self.close_command_palette();
    }

    pub fn clear(&self) {
        self.set_content("");
    }
}

fn insert_char(state: &mut TextAreaState, c: char) {
    state.content.insert(state.cursor_position, c);
    state.cursor_position += c.len_utf8();
}

/// Delete character before cursor
fn backspace(state: &mut TextAreaState) -> bool {
    match state.content[..state.cursor_position].chars().next_back() {
        Some(c) => {
            state.cursor_position -= c.len_utf8();
            state.content.remove(state.cursor_position);
            true
        }
        None => false,
    }
}

/// Delete character at cursor
fn delete(state: &mut TextAreaState) -> bool {
    if state.cursor_position < state.content.len() {
        state.content.remove(state.cursor_position);
        true
    } else {
        false
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state.borrow();

        let block = Block::default()
            .borders(Borders::ALL)
            .title("✏️ Message")
            .style(Style::default().fg(Color::Green));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = state.content.clone();
            content.insert(state.cursor_position, '▌');
            let line = Line::from(vec![Span::raw(content)]);
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
        }

        // Palette floats above the input box
        if self.show_command_palette.get() {
            let filtered = self.filtered_commands.borrow();
            if filtered.is_empty() {
                return;
            }
            let palette_height = (filtered.len() + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };
            if palette_area.height < 3 {
                return;
            }

            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .style(Style::default().fg(Color::Blue));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            let selected = self.selected_command.get();
            for (index, command) in filtered.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if selected == Some(index) {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", command.command()), style),
                    Span::styled(" - ", Style::default().fg(Color::DarkGray)),
                    Span::styled(command.description(), Style::default().fg(Color::Gray)),
                ]);
                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}
