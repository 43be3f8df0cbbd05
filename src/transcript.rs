//! Local record of completed chat exchanges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::slice;

/// One user message paired with the reply it got
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub bot: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp: Utc::now(),
        }
    }

    /// `(user, bot)` view of the turn
    pub fn pair(&self) -> (&str, &str) {
        (&self.user, &self.bot)
    }
}

/// Ordered list of completed turns.
///
/// Only complete turns go in; there is no way to add a user message without
/// its reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Iterate over turns in the order they happened.
    ///
    /// The iterator is `Clone`, so it can be restarted without touching the
    /// transcript again.
    pub fn iter(&self) -> Turns<'_> {
        Turns {
            inner: self.turns.iter(),
        }
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Plain-text rendering used by the console
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for turn in self.iter() {
            out.push_str(&format!("You: {}\n", turn.user));
            out.push_str(&format!("Bot: {}\n", turn.bot));
            out.push_str(&"-".repeat(40));
            out.push('\n');
        }
        out
    }
}

/// Borrowing iterator over a [`Transcript`]
#[derive(Debug, Clone)]
pub struct Turns<'a> {
    inner: slice::Iter<'a, Turn>,
}

impl<'a> Iterator for Turns<'a> {
    type Item = &'a Turn;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Turns<'_> {}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = Turns<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
