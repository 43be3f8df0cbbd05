use strum::{EnumIter, IntoEnumIterator};

/// What the user can do from the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum AppMode {
    /// One prompt, one answer
    TextResponse,
    /// Multi-turn chat with a provider-side session
    Conversation,
    /// Ask a question about an image file
    ImageAnalysis,
    /// Leave the application
    Exit,
}

impl AppMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            AppMode::TextResponse => "Get a simple Text Response",
            AppMode::Conversation => "Start an interactive Chat Conversation",
            AppMode::ImageAnalysis => "Analyze an Image",
            AppMode::Exit => "Exit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AppMode::TextResponse => "Ask me anything and get an instant response!",
            AppMode::Conversation => "Have a continuous conversation with the AI!",
            AppMode::ImageAnalysis => "Pick an image and ask questions about it!",
            AppMode::Exit => "Goodbye!",
        }
    }

    /// Number shown next to the mode in the menu
    pub fn menu_key(&self) -> u8 {
        match self {
            AppMode::TextResponse => 1,
            AppMode::Conversation => 2,
            AppMode::ImageAnalysis => 3,
            AppMode::Exit => 4,
        }
    }

    /// Parse a menu choice such as `"2"`
    pub fn from_choice(choice: &str) -> Option<AppMode> {
        let key: u8 = choice.trim().parse().ok()?;
        AppMode::iter().find(|mode| mode.menu_key() == key)
    }

    /// The menu as printed by the console
    pub fn menu_text() -> String {
        let mut menu = String::new();
        menu.push_str(&"=".repeat(40));
        menu.push('\n');
        menu.push_str("🤖 MultiBot - AI Assistant\n");
        menu.push_str(&"=".repeat(40));
        menu.push('\n');
        menu.push_str("Please select an option:\n");
        for mode in AppMode::iter() {
            menu.push_str(&format!("  {}. {}\n", mode.menu_key(), mode.display_name()));
        }
        menu.push_str(&"-".repeat(40));
        menu.push('\n');
        menu
    }
}
