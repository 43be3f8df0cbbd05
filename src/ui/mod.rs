//! Full-screen chat front end

pub mod conversation;

use crate::conversation::ConversationController;
use crate::llm::ChatProvider;
use crate::typing::TypingEffect;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::info;

use conversation::{ChatAction, ChatScreen, StatusLine};

/// Poll interval when nothing is animating
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Run the chat screen until the user quits
pub async fn run_chat<P: ChatProvider>(
    controller: ConversationController<P>,
    typing: TypingEffect,
) -> anyhow::Result<()> {
    // Enter alternate screen + raw mode; also restores the terminal on panic
    let mut terminal = ratatui::init();
    let screen = ChatScreen::new(controller, typing);
    let result = run_chat_inner(&mut terminal, screen, typing.delay()).await;
    ratatui::restore();

    result
}

async fn run_chat_inner<P: ChatProvider>(
    terminal: &mut DefaultTerminal,
    mut screen: ChatScreen<P>,
    tick: Duration,
) -> anyhow::Result<()> {
    screen.set_status(StatusLine::busy("🔄 Starting chat session"));
    terminal.draw(|frame| frame.render_widget(&screen, frame.area()))?;
    screen.open().await;

    loop {
        terminal.draw(|frame| frame.render_widget(&screen, frame.area()))?;

        let timeout = if screen.is_revealing() { tick } else { IDLE_POLL };
        if !event::poll(timeout)? {
            screen.tick();
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };

        match screen.handle_key(key) {
            ChatAction::None => {}
            ChatAction::Send => {
                screen.set_status(StatusLine::busy("🤖 Thinking"));
                terminal.draw(|frame| frame.render_widget(&screen, frame.area()))?;
                screen.send().await;
            }
            ChatAction::Restart => {
                screen.set_status(StatusLine::busy("🔄 Starting a new chat session"));
                terminal.draw(|frame| frame.render_widget(&screen, frame.area()))?;
                screen.restart().await;
            }
            ChatAction::Exit => break,
        }
    }

    info!(
        turns = screen.controller().transcript().len(),
        "chat screen closed"
    );
    Ok(())
}
