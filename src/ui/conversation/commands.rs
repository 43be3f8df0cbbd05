use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Clear the chat and start a new session
    Clear,
    /// Print the conversation so far
    History,
    /// Show help
    Help,
    /// Leave the chat
    Bye,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Clear => "clear the chat and start a new session",
            SlashCommand::History => "show the conversation so far",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "leave the chat",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Return all built-in commands in a Vec paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter().map(|c| (c.command(), c)).collect()
}

/// Parse a slash command from user input.
///
/// Only the first word counts; anything after it is ignored.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;
    let head = rest.split_whitespace().next()?.to_lowercase();

    SlashCommand::from_str(&head)
        .ok()
        .or_else(|| match head.as_str() {
            "q" | "quit" | "exit" => Some(SlashCommand::Bye),
            "c" | "reset" | "new" => Some(SlashCommand::Clear),
            "h" | "?" => Some(SlashCommand::Help),
            _ => None,
        })
}

/// Bare words that end a console chat
pub fn is_exit_word(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "exit" | "quit")
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("/{} - {}\n", command_str, command.description()));
    }

    help.push_str("\nAliases: /q, /quit or /exit for /bye, /reset or /new for /clear, /h or /? for /help.");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_slash_command("/clear"), Some(SlashCommand::Clear));
        assert_eq!(
            parse_slash_command("  /HISTORY  "),
            Some(SlashCommand::History)
        );
    }

    #[test]
    fn aliases() {
        for alias in ["/q", "/quit", "/exit", "/bye"] {
            assert_eq!(parse_slash_command(alias), Some(SlashCommand::Bye), "{alias}");
        }
        assert_eq!(parse_slash_command("/new"), Some(SlashCommand::Clear));
        assert_eq!(parse_slash_command("/h"), Some(SlashCommand::Help));
    }

    #[test]
    fn trailing_words_are_ignored() {
        assert_eq!(parse_slash_command("/help clear  now"), Some(SlashCommand::Help));
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert_eq!(parse_slash_command("hello /clear"), None);
        assert_eq!(parse_slash_command("/"), None);
        assert_eq!(parse_slash_command("/unknown"), None);
    }

    #[test]
    fn exit_words() {
        assert!(is_exit_word("exit"));
        assert!(is_exit_word(" QUIT "));
        assert!(!is_exit_word("exit now"));
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for (name, _) in built_in_slash_commands() {
            assert!(help.contains(&format!("/{} - ", name)));
        }
    }
}
