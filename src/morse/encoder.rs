use std::fmt;
use std::sync::Arc;

use super::table::symbol_for;

/// A translated message: one symbol per input character, separated by single spaces.
///
/// Cheap to clone; the reveal and playback timelines each hold their own copy.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EncodedMessage(Arc<str>);

impl EncodedMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters (the reveal moves one character per tick)
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first `count` characters of the message
    pub fn prefix(&self, count: usize) -> &str {
        match self.0.char_indices().nth(count) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl Default for EncodedMessage {
    fn default() -> Self {
        Self(Arc::from(""))
    }
}

impl fmt::Display for EncodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EncodedMessage {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

/// Convert text to Morse code.
///
/// Input is uppercased first. Characters missing from the table contribute an
/// empty symbol but still take a slot in the join, so they show up as doubled
/// spacing.
pub fn encode(text: &str) -> EncodedMessage {
    let symbols: Vec<&str> = text
        .to_uppercase()
        .chars()
        .map(|ch| symbol_for(ch).unwrap_or(""))
        .collect();

    EncodedMessage(Arc::from(symbols.join(" ")))
}
