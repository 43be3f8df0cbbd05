//! Shared helpers for integration tests

// Each test file includes this module separately, so not every helper is
// used in every compilation unit.
#![allow(dead_code)]

use multibot::console::Console;
use multibot::{Config, GeminiClient, TypingEffect};
use std::env;
use std::io::Cursor;
use std::time::Duration;

pub type TestConsole = Console<Cursor<Vec<u8>>, Vec<u8>>;

/// API key for live tests, or None to skip them
pub fn get_api_key() -> Option<String> {
    env::var("GOOGLE_API_KEY").ok().filter(|key| !key.trim().is_empty())
}

/// Gemini client with a short timeout for live tests
pub fn create_test_client(api_key: &str) -> GeminiClient {
    let mut config = Config::default();
    config.set_api_key(api_key.to_string());
    config.request_timeout_secs = 30;
    GeminiClient::new(&config).expect("client should build")
}

/// Console fed from `input`, writing to memory, without the typing effect
pub fn scripted_console(input: &str) -> TestConsole {
    Console::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
        TypingEffect::disabled(),
    )
}

/// Console with a short typing delay, for checking the output is unchanged
pub fn typing_console(input: &str) -> TestConsole {
    Console::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
        TypingEffect::new(Duration::from_millis(1)),
    )
}

pub fn output(console: TestConsole) -> String {
    String::from_utf8(console.into_output()).expect("console output is UTF-8")
}
