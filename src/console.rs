//! Line-based front end: main menu, single prompts, chat loop, image questions

use crate::conversation::ConversationController;
use crate::error::{ChatError, ProviderError};
use crate::llm::{ChatProvider, ImageInput, TextGenerator};
use crate::mode::AppMode;
use crate::typing::TypingEffect;
use crate::ui::conversation::{SlashCommand, get_help_text, is_exit_word, parse_slash_command};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Console bound to an input and an output stream
pub struct Console<R, W> {
    input: R,
    output: W,
    typing: TypingEffect,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console on the process's stdin/stdout
    pub fn stdio(typing: TypingEffect) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), typing)
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, typing: TypingEffect) -> Self {
        Self {
            input,
            output,
            typing,
        }
    }

    /// Give back the output, mostly for tests
    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write output")
    }

    /// Print `label`, then read one line. `None` at end of input.
    ///
    /// A line that is not valid UTF-8 is reported and the prompt is shown again.
    fn read_line(&mut self, label: &str) -> Result<Option<String>> {
        loop {
            write!(self.output, "{}", label).context("Failed to write output")?;
            self.output.flush().context("Failed to flush output")?;

            let mut bytes = Vec::new();
            let read = self
                .input
                .read_until(b'\n', &mut bytes)
                .context("Failed to read user input")?;
            if read == 0 {
                return Ok(None);
            }

            let mut line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(_) => {
                    self.say("\n⚠️ That input was not valid UTF-8, please try again.")?;
                    continue;
                }
            };
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }
            return Ok(Some(line));
        }
    }

    /// Print `prefix` followed by `text`, revealed with the typing effect
    async fn type_out(&mut self, prefix: &str, text: &str) -> Result<()> {
        write!(self.output, "{}", prefix).context("Failed to write output")?;

        let mut frames = std::pin::pin!(self.typing.frames(text.to_string()));
        let mut printed = 0;
        while let Some(frame) = frames.next().await {
            write!(self.output, "{}", &frame[printed..]).context("Failed to write output")?;
            self.output.flush().context("Failed to flush output")?;
            printed = frame.len();
        }

        writeln!(self.output).context("Failed to write output")?;
        Ok(())
    }

    /// Single-turn completion. Reads the prompt when none is given.
    pub async fn ask<G: TextGenerator>(&mut self, generator: &G, prompt: Option<String>) -> Result<()> {
        let prompt = match prompt {
            Some(prompt) => prompt,
            None => match self.read_line("Enter your prompt: ")? {
                Some(prompt) => prompt,
                None => return Ok(()),
            },
        };

        if prompt.trim().is_empty() {
            return self.say("⚠️ Please enter a prompt first!");
        }

        match generator.complete_text(&prompt).await {
            Ok(response) => self.type_out("Response: ", &response).await,
            Err(e) => self.say(&format!("Error: {}", e)),
        }
    }

    /// Ask a question about an image file
    pub async fn image<G: TextGenerator>(
        &mut self,
        generator: &G,
        path: Option<PathBuf>,
        prompt: Option<String>,
    ) -> Result<()> {
        let path = match path {
            Some(path) => path,
            None => match self.read_line("Enter the path to the image file: ")? {
                Some(path) => PathBuf::from(path.trim()),
                None => return Ok(()),
            },
        };

        let image = match ImageInput::from_path(&path) {
            Ok(image) => image,
            Err(ProviderError::InvalidImage(msg)) => return self.say(&format!("Error: {}", msg)),
            Err(e) => return self.say(&format!("Error: {}", e)),
        };

        let prompt = match prompt {
            Some(prompt) => prompt,
            None => match self.read_line("Enter your prompt for the image: ")? {
                Some(prompt) => prompt,
                None => return Ok(()),
            },
        };

        if prompt.trim().is_empty() {
            return self.say("⚠️ Please enter a prompt for image analysis!");
        }

        self.say("🔍 Analyzing image...")?;
        match generator.analyze_image(&prompt, &image).await {
            Ok(analysis) => self.type_out("", &analysis).await,
            Err(e) => self.say(&format!("Error: {}", e)),
        }
    }

    /// Interactive chat until the user leaves or input ends.
    ///
    /// Opens a session if the controller has none. A failed turn is reported
    /// and the loop carries on with the same session.
    pub async fn chat<P: ChatProvider>(
        &mut self,
        controller: &mut ConversationController<P>,
    ) -> Result<()> {
        self.say("🔄 Interactive Chat")?;

        if !controller.is_active() {
            if let Err(e) = controller.start_session().await {
                return self.say(&format!("❌ {}", e));
            }
            self.say("✅ New chat session started!")?;
        }
        self.say("   (Type 'exit' or 'quit' to return, /help for commands.)")?;

        loop {
            let Some(line) = self.read_line("You: ")? else {
                break;
            };

            if is_exit_word(&line) {
                self.say("Ending chat session.")?;
                break;
            }

            if let Some(command) = parse_slash_command(&line) {
                match command {
                    SlashCommand::Clear => match controller.restart_session().await {
                        Ok(()) => self.say("🗑️ Chat cleared. New session started.")?,
                        Err(e) => self.say(&format!("❌ {}", e))?,
                    },
                    SlashCommand::History => {
                        if controller.transcript().is_empty() {
                            self.say("(no messages yet)")?;
                        } else {
                            let history = controller.transcript().to_text();
                            self.say("💬 Chat History:")?;
                            write!(self.output, "{}", history).context("Failed to write output")?;
                        }
                    }
                    SlashCommand::Help => self.say(&get_help_text())?,
                    SlashCommand::Bye => {
                        self.say("Ending chat session.")?;
                        break;
                    }
                }
                continue;
            }

            controller.set_pending_input(line);
            match controller.send_pending().await {
                Ok(reply) => self.type_out("Bot: ", &reply).await?,
                Err(ChatError::EmptyInput) => self.say("⚠️ Please enter a message first!")?,
                Err(ChatError::NoSession) => {
                    self.say("❌ No active chat session. Type /clear to start a new one.")?
                }
                Err(e) => self.say(&format!("❌ Error: {}", e))?,
            }
        }

        Ok(())
    }

    /// Main menu loop
    pub async fn menu<C>(&mut self, client: &C, chat_model: &str) -> Result<()>
    where
        C: ChatProvider + TextGenerator,
    {
        loop {
            let menu = AppMode::menu_text();
            write!(self.output, "\n{}", menu).context("Failed to write output")?;

            let Some(choice) = self.read_line("Enter your choice (1-4): ")? else {
                break;
            };

            match AppMode::from_choice(&choice) {
                Some(AppMode::TextResponse) => {
                    self.say(&format!("\n>>> {}", AppMode::TextResponse.description()))?;
                    self.ask(client, None).await?;
                }
                Some(AppMode::Conversation) => {
                    self.say(&format!("\n>>> {}", AppMode::Conversation.description()))?;
                    let mut controller = ConversationController::new(client, chat_model);
                    self.chat(&mut controller).await?;
                }
                Some(AppMode::ImageAnalysis) => {
                    self.say(&format!("\n>>> {}", AppMode::ImageAnalysis.description()))?;
                    self.image(client, None, None).await?;
                }
                Some(AppMode::Exit) => {
                    self.say("Exiting the application. Goodbye!")?;
                    break;
                }
                None => {
                    self.say("\n[Error] Invalid choice. Please enter a number between 1 and 4.")?;
                }
            }

            if self.read_line("\nPress Enter to return to the menu...")?.is_none() {
                break;
            }
        }

        Ok(())
    }
}
