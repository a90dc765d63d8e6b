use std::time::Duration;

use crate::morse::EncodedMessage;

pub const DOT_DURATION: Duration = Duration::from_millis(120);
pub const DASH_DURATION: Duration = Duration::from_millis(360);
/// Silence after every dot or dash
pub const ELEMENT_GAP: Duration = Duration::from_millis(100);
/// Silence for each literal space in the encoded message
pub const LETTER_GAP: Duration = Duration::from_millis(300);
/// Silence for each `/`
pub const WORD_GAP: Duration = Duration::from_millis(700);

pub const DOT_FREQUENCY_HZ: u32 = 1200;
pub const DASH_FREQUENCY_HZ: u32 = 600;

/// One timed step of playback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Tone {
        frequency_hz: u32,
        duration: Duration,
    },
    Silence(Duration),
}

impl Element {
    pub fn duration(&self) -> Duration {
        match self {
            Element::Tone { duration, .. } => *duration,
            Element::Silence(duration) => *duration,
        }
    }
}

/// Steps for one character of the encoded message. Unknown characters have none.
pub fn elements_for(symbol: char) -> &'static [Element] {
    static DOT: [Element; 2] = [
        Element::Tone {
            frequency_hz: DOT_FREQUENCY_HZ,
            duration: DOT_DURATION,
        },
        Element::Silence(ELEMENT_GAP),
    ];
    static DASH: [Element; 2] = [
        Element::Tone {
            frequency_hz: DASH_FREQUENCY_HZ,
            duration: DASH_DURATION,
        },
        Element::Silence(ELEMENT_GAP),
    ];
    static LETTER: [Element; 1] = [Element::Silence(LETTER_GAP)];
    static WORD: [Element; 1] = [Element::Silence(WORD_GAP)];

    match symbol {
        '.' => &DOT[..],
        '-' => &DASH[..],
        ' ' => &LETTER[..],
        '/' => &WORD[..],
        _ => &[],
    }
}

/// The full step plan for a message
pub fn schedule(encoded: &EncodedMessage) -> Vec<Element> {
    encoded
        .as_str()
        .chars()
        .flat_map(|symbol| elements_for(symbol).iter().copied())
        .collect()
}
