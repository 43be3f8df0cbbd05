//! Conversation UI components for chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;
pub mod status;

pub use commands::{
    SlashCommand, built_in_slash_commands, get_help_text, is_exit_word,
    parse_slash_command,
};
pub use composer::{ComposerResult, ConversationComposer};
pub use history::TranscriptPane;
pub use manager::{ChatAction, ChatScreen};
pub use status::{StatusKind, StatusLine};
