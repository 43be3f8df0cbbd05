//! Cosmetic typing effect for replies that have already arrived in full

use futures::Stream;
use futures::stream;
use std::time::Duration;

/// Cursor shown at the end of a reply that is still being revealed
pub const CURSOR: char = '▋';

/// Progressive reveal settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingEffect {
    delay: Duration,
    enabled: bool,
}

impl TypingEffect {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            enabled: !delay.is_zero(),
        }
    }

    /// Show replies all at once
    pub fn disabled() -> Self {
        Self {
            delay: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Stream of growing prefixes of `text`, one more character each time,
    /// paced by the configured delay. Ends with the full text.
    pub fn frames(&self, text: String) -> impl Stream<Item = String> + Send + use<> {
        let effect = *self;
        stream::unfold(Reveal::new(text, effect.enabled), move |mut reveal| async move {
            if reveal.is_done() && reveal.emitted {
                return None;
            }
            if reveal.emitted {
                tokio::time::sleep(effect.delay).await;
                reveal.advance(1);
            }
            reveal.emitted = true;
            let frame = reveal.visible().to_string();
            Some((frame, reveal))
        })
    }

    /// Tick-driven reveal for UIs that run their own loop
    pub fn reveal(&self, text: impl Into<String>) -> Reveal {
        Reveal::new(text.into(), self.enabled)
    }
}

/// Reply being revealed one character at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    text: String,
    /// Byte offset of the end of the visible prefix
    shown: usize,
    emitted: bool,
}

impl Reveal {
    fn new(text: String, animate: bool) -> Self {
        let shown = if animate {
            first_boundary(&text)
        } else {
            text.len()
        };
        Self {
            text,
            shown,
            emitted: false,
        }
    }

    /// Show `chars` more characters
    pub fn advance(&mut self, chars: usize) {
        for _ in 0..chars {
            match self.text[self.shown..].chars().next() {
                Some(c) => self.shown += c.len_utf8(),
                None => break,
            }
        }
    }

    /// Jump to the end
    pub fn finish(&mut self) {
        self.shown = self.text.len();
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.text.len()
    }

    pub fn visible(&self) -> &str {
        &self.text[..self.shown]
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn first_boundary(text: &str) -> usize {
    text.chars().next().map(char::len_utf8).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn frames_grow_one_char_at_a_time() {
        let effect = TypingEffect::new(Duration::from_millis(1));
        let frames: Vec<String> = effect.frames("héllo".to_string()).collect().await;
        assert_eq!(frames, vec!["h", "hé", "hél", "héll", "héllo"]);
    }

    #[tokio::test]
    async fn disabled_effect_yields_whole_text_once() {
        let frames: Vec<String> = TypingEffect::disabled()
            .frames("Hi there".to_string())
            .collect()
            .await;
        assert_eq!(frames, vec!["Hi there"]);
    }

    #[tokio::test]
    async fn empty_text_yields_one_empty_frame() {
        let frames: Vec<String> = TypingEffect::new(Duration::from_millis(1))
            .frames(String::new())
            .collect()
            .await;
        assert_eq!(frames, vec![""]);
    }

    #[test]
    fn reveal_advances_on_char_boundaries() {
        let mut reveal = TypingEffect::new(Duration::from_millis(20)).reveal("🤖 ok");
        assert_eq!(reveal.visible(), "🤖");
        reveal.advance(2);
        assert_eq!(reveal.visible(), "🤖 o");
        assert!(!reveal.is_done());
        reveal.advance(10);
        assert_eq!(reveal.visible(), "🤖 ok");
        assert!(reveal.is_done());
    }

    #[test]
    fn finish_shows_everything() {
        let mut reveal = TypingEffect::new(Duration::from_millis(20)).reveal("long reply");
        reveal.finish();
        assert!(reveal.is_done());
        assert_eq!(reveal.visible(), reveal.text());
    }

    #[test]
    fn zero_delay_means_disabled() {
        assert!(!TypingEffect::new(Duration::ZERO).is_enabled());
        assert!(TypingEffect::disabled().reveal("x").is_done());
    }
}
