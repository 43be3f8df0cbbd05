use crate::conversation::ConversationController;
use crate::error::ChatError;
use crate::llm::ChatProvider;
use crate::typing::{Reveal, TypingEffect};
use crate::ui::conversation::{
    ComposerResult, ConversationComposer, SlashCommand, StatusLine,
    TranscriptPane, get_help_text,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};
use std::cell::Cell;
use tracing::debug;

/// What the event loop should do after a key press.
///
/// `Send` and `Restart` need the provider, so the loop draws a busy status
/// first and then awaits the matching [`ChatScreen`] method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    None,
    Send,
    Restart,
    Exit,
}

/// Lines moved per PageUp / PageDown
const SCROLL_STEP: usize = 10;

/// Full-screen chat: transcript on top, status line, composer at the bottom
pub struct ChatScreen<P: ChatProvider> {
    controller: ConversationController<P>,
    composer: ConversationComposer,
    typing: TypingEffect,
    reveal: Option<Reveal>,
    status: StatusLine,
    system_message: Option<String>,
    /// Lines scrolled up from the bottom of the transcript
    scroll_back: usize,
    /// Furthest scroll-back for the last drawn frame
    max_scroll: Cell<usize>,
}

impl<P: ChatProvider> ChatScreen<P> {
    pub fn new(controller: ConversationController<P>, typing: TypingEffect) -> Self {
        Self {
            controller,
            composer: ConversationComposer::new("Type your message and press Enter..."),
            typing,
            reveal: None,
            status: StatusLine::info(""),
            system_message: None,
            scroll_back: 0,
            max_scroll: Cell::new(0),
        }
    }

    pub fn controller(&self) -> &ConversationController<P> {
        &self.controller
    }

    /// Text currently in the composer
    pub fn draft(&self) -> String {
        self.composer.content()
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn set_status(&mut self, status: StatusLine) {
        self.status = status;
    }

    /// True while a reply is still being revealed
    pub fn is_revealing(&self) -> bool {
        self.reveal.as_ref().is_some_and(|reveal| !reveal.is_done())
    }

    /// Open the first session
    pub async fn open(&mut self) {
        self.status = match self.controller.start_session().await {
            Ok(()) => StatusLine::info("✅ New chat session started!"),
            Err(e) => StatusLine::error(format!("❌ {}. Press Ctrl+L to retry.", e)),
        };
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ChatAction {
        if key.kind != KeyEventKind::Press {
            return ChatAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return ChatAction::Exit,
            KeyCode::Char('l') if ctrl => return ChatAction::Restart,
            KeyCode::Esc if !self.composer.is_palette_open() => return ChatAction::Exit,
            KeyCode::PageUp => {
                self.scroll_back = (self.scroll_back.min(self.max_scroll.get()) + SCROLL_STEP)
                    .min(self.max_scroll.get());
                return ChatAction::None;
            }
            KeyCode::PageDown => {
                self.scroll_back =
                    self.scroll_back.min(self.max_scroll.get()).saturating_sub(SCROLL_STEP);
                return ChatAction::None;
            }
            _ => {}
        }

        // Any other key skips the rest of the reply
        if let Some(reveal) = self.reveal.as_mut() {
            if !reveal.is_done() {
                reveal.finish();
                return ChatAction::None;
            }
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(_) => ChatAction::Send,
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => ChatAction::None,
        }
    }

    fn handle_slash_command(&mut self, command: SlashCommand) -> ChatAction {
        debug!(command = command.command(), "slash command");
        match command {
            SlashCommand::Clear => ChatAction::Restart,
            SlashCommand::Bye => ChatAction::Exit,
            SlashCommand::Help => {
                self.system_message =
                    Some(format!("{}\nPageUp and PageDown scroll the chat.", get_help_text()));
                ChatAction::None
            }
            SlashCommand::History => {
                self.system_message = None;
                self.scroll_back = usize::MAX;
                self.status = StatusLine::info(format!(
                    "💬 {} messages so far. PageDown to get back to the latest.",
                    self.controller.transcript().len()
                ));
                ChatAction::None
            }
        }
    }

    /// Send what is in the composer
    pub async fn send(&mut self) {
        self.controller.set_pending_input(self.composer.content());
        let result = self.controller.send_pending().await;
        self.composer.set_content(self.controller.pending_input());

        match result {
            Ok(reply) => {
                self.system_message = None;
                self.scroll_back = 0;
                self.reveal = Some(self.typing.reveal(reply));
                self.status = StatusLine::info("");
            }
            Err(ChatError::EmptyInput) => {
                self.status = StatusLine::warning("⚠️ Please enter a message first!");
            }
            Err(ChatError::NoSession) => {
                self.status =
                    StatusLine::error("❌ No active chat session. Press Ctrl+L to start a new one.");
            }
            Err(e) => {
                self.status = StatusLine::error(format!("❌ Error: {}", e));
            }
        }
    }

    /// Clear the chat and open a fresh session
    pub async fn restart(&mut self) {
        self.reveal = None;
        self.system_message = None;
        self.scroll_back = 0;
        self.composer.clear();
        self.controller.set_pending_input("");

        self.status = match self.controller.restart_session().await {
            Ok(()) => StatusLine::info("🗑️ Chat cleared. New session started."),
            Err(e) => StatusLine::error(format!("❌ {}", e)),
        };
    }

    /// Advance the typing effect by one character
    pub fn tick(&mut self) {
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.advance(1);
        }
    }
}

impl<P: ChatProvider> Widget for &ChatScreen<P> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // History
                Constraint::Length(1), // Status
                Constraint::Length(3), // Composer
            ])
            .split(area);

        let pane = TranscriptPane::new(self.controller.render_transcript())
            .reveal(self.reveal.as_ref())
            .system_message(self.system_message.as_deref())
            .scroll_back(self.scroll_back);
        self.max_scroll.set(pane.max_scroll(chunks[0]));
        pane.render(chunks[0], buf);
        self.status.render(chunks[1], buf);
        self.composer.render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::llm::MockProvider;
    use crate::ui::conversation::StatusKind;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str<P: ChatProvider>(screen: &mut ChatScreen<P>, text: &str) {
        for c in text.chars() {
            screen.handle_key(key(KeyCode::Char(c)));
        }
    }

    async fn open_screen(provider: MockProvider, typing: TypingEffect) -> ChatScreen<MockProvider> {
        let mut screen = ChatScreen::new(ConversationController::new(provider, "m"), typing);
        screen.open().await;
        screen
    }

    fn screen_text<P: ChatProvider>(screen: &ChatScreen<P>) -> String {
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        screen.render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn enter_sends_and_clears_composer() {
        let provider = MockProvider::new().with_reply("Hi there");
        let mut screen = open_screen(provider.clone(), TypingEffect::disabled()).await;

        type_str(&mut screen, "Hello");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ChatAction::Send);
        screen.send().await;

        assert_eq!(screen.controller().transcript().len(), 1);
        assert_eq!(screen.controller().pending_input(), "");
        let text = screen_text(&screen);
        assert!(text.contains("Hello"));
        assert!(text.contains("Hi there"));
    }

    #[tokio::test]
    async fn blank_message_warns_and_keeps_session() {
        let provider = MockProvider::new();
        let mut screen = open_screen(provider.clone(), TypingEffect::disabled()).await;

        type_str(&mut screen, "   ");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ChatAction::Send);
        screen.send().await;

        assert_eq!(screen.draft(), "   ");
        assert_eq!(screen.status().kind, StatusKind::Warning);
        assert!(screen.status().text.contains("Please enter a message first!"));
        assert!(screen.controller().is_active());
        assert_eq!(provider.stats().messages_sent(), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_shown_and_chat_continues() {
        let provider = MockProvider::new().with_failure(ProviderError::Network("timed out".into()));
        let mut screen = open_screen(provider.clone(), TypingEffect::disabled()).await;

        type_str(&mut screen, "Hello");
        screen.handle_key(key(KeyCode::Enter));
        screen.send().await;

        assert_eq!(screen.status().kind, StatusKind::Error);
        assert!(screen.controller().transcript().is_empty());
        assert!(screen.controller().is_active());

        type_str(&mut screen, "Again");
        screen.handle_key(key(KeyCode::Enter));
        screen.send().await;
        assert_eq!(screen.controller().transcript().len(), 1);
    }

    #[tokio::test]
    async fn ctrl_l_and_clear_restart() {
        let provider = MockProvider::new().with_reply("Hi there");
        let mut screen = open_screen(provider.clone(), TypingEffect::disabled()).await;
        type_str(&mut screen, "Hello");
        screen.handle_key(key(KeyCode::Enter));
        screen.send().await;

        assert_eq!(screen.handle_key(ctrl('l')), ChatAction::Restart);
        screen.restart().await;
        assert!(screen.controller().transcript().is_empty());
        assert_eq!(provider.stats().sessions_created(), 2);

        type_str(&mut screen, "/clear");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ChatAction::Restart);
    }

    #[tokio::test]
    async fn exit_keys() {
        let mut screen = open_screen(MockProvider::new(), TypingEffect::disabled()).await;
        assert_eq!(screen.handle_key(key(KeyCode::Esc)), ChatAction::Exit);
        assert_eq!(screen.handle_key(ctrl('c')), ChatAction::Exit);
        type_str(&mut screen, "/bye");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ChatAction::Exit);
    }

    #[tokio::test]
    async fn key_press_finishes_reveal() {
        let provider = MockProvider::new().with_reply("a fairly long reply");
        let mut screen = open_screen(provider, TypingEffect::new(Duration::from_millis(20))).await;
        type_str(&mut screen, "Hello");
        screen.handle_key(key(KeyCode::Enter));
        screen.send().await;

        assert!(screen.is_revealing());
        screen.tick();
        assert!(screen.is_revealing());

        assert_eq!(screen.handle_key(key(KeyCode::Char('x'))), ChatAction::None);
        assert!(!screen.is_revealing());
        // The key only finished the reveal; it was not typed
        assert_eq!(screen.draft(), "");
        assert!(screen_text(&screen).contains("a fairly long reply"));
    }

    #[tokio::test]
    async fn session_failure_is_reported() {
        let provider = MockProvider::new().with_session_failure(ProviderError::MissingApiKey);
        let screen = open_screen(provider, TypingEffect::disabled()).await;
        assert_eq!(screen.status().kind, StatusKind::Error);
        assert!(screen.status().text.contains("Failed to create chat session"));
    }

    #[tokio::test]
    async fn short_help_alias_shows_help() {
        let mut screen = open_screen(MockProvider::new(), TypingEffect::disabled()).await;
        type_str(&mut screen, "/h");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ChatAction::None);
        assert_eq!(screen.draft(), "");
        assert!(screen_text(&screen).contains("Available commands"));
    }

    #[tokio::test]
    async fn history_scrolls_to_the_first_turn() {
        let mut provider = MockProvider::new();
        for i in 0..6 {
            provider = provider.with_reply(format!("answer {}", i));
        }
        let mut screen = open_screen(provider, TypingEffect::disabled()).await;
        for i in 0..6 {
            type_str(&mut screen, &format!("question {}", i));
            screen.handle_key(key(KeyCode::Enter));
            screen.send().await;
        }
        assert!(!screen_text(&screen).contains("question 0"));

        type_str(&mut screen, "/history");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), ChatAction::None);
        assert!(screen.status().text.contains("6 messages so far"));
        let text = screen_text(&screen);
        assert!(text.contains("question 0"));
        assert!(!text.contains("answer 5"));

        for _ in 0..10 {
            screen.handle_key(key(KeyCode::PageDown));
        }
        let text = screen_text(&screen);
        assert!(text.contains("answer 5"));
        assert!(!text.contains("question 0"));
    }

    #[tokio::test]
    async fn page_up_scrolls_back() {
        let mut provider = MockProvider::new();
        for i in 0..6 {
            provider = provider.with_reply(format!("answer {}", i));
        }
        let mut screen = open_screen(provider, TypingEffect::disabled()).await;
        for i in 0..6 {
            type_str(&mut screen, &format!("question {}", i));
            screen.handle_key(key(KeyCode::Enter));
            screen.send().await;
        }
        assert!(screen_text(&screen).contains("answer 5"));

        assert_eq!(screen.handle_key(key(KeyCode::PageUp)), ChatAction::None);
        assert!(!screen_text(&screen).contains("answer 5"));
    }
}
