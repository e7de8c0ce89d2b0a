//! Time notation and conversion to absolute seconds.
//!
//! Durations can be written in seconds, tempo-relative units (ticks, note
//! values, bars.beats.ticks) or sample counts. [`to_seconds`] is a pure
//! function of the value, tempo, sample rate and current time.
//!
//! # Example
//!
//! ```
//! use motet_core::time::{to_seconds, TimeValue};
//!
//! // A quarter note at 120 BPM lasts half a second
//! let quarter = TimeValue::parse("4n");
//! assert_eq!(to_seconds(&quarter, 120.0, 44100.0, 0.0), 0.5);
//!
//! // Relative to the current time
//! let later = TimeValue::parse("+0.25");
//! assert_eq!(to_seconds(&later, 120.0, 44100.0, 1.0), 1.25);
//! ```

use crate::util::finite;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Resolution of the tick unit.
pub const TICKS_PER_BEAT: f64 = 480.0;

/// Beats in one bar of bars.beats.ticks notation.
pub const BEATS_PER_BAR: f64 = 4.0;

static MILLIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)ms$").unwrap());
static HERTZ: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)hz$").unwrap());
static TICKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)ticks$").unwrap());
static NOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)n([td]?)$").unwrap());
static BBT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").unwrap());
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d\d):(\d\d(?:\.\d+)?)$").unwrap());
static SAMPLES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)samples$").unwrap());

/// Modifier applied to a note value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoteModifier {
    #[default]
    Straight,
    /// Two thirds of the straight length.
    Triplet,
    /// One and a half times the straight length.
    Dotted,
}

/// A duration or instant in one of the supported notations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeValue {
    Seconds(f64),
    Millis(f64),
    /// Period of a frequency: `1 / hz` seconds.
    Hertz(f64),
    Ticks(f64),
    /// `4n` is one beat, `8n` half a beat, `1n` a whole bar.
    Note {
        division: u32,
        modifier: NoteModifier,
    },
    Bbt {
        bars: u32,
        beats: u32,
        ticks: u32,
    },
    Clock {
        hours: u32,
        minutes: u32,
        seconds: f64,
    },
    Samples(f64),
    /// Offset from the current time.
    Relative(Box<TimeValue>),
}

impl TimeValue {
    /// Parse a textual notation. Unrecognized text is read as seconds and
    /// falls back to `0.0` when it is not a number.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix('+') {
            return TimeValue::Relative(Box::new(TimeValue::parse(rest)));
        }

        if let Some(c) = MILLIS.captures(text) {
            return TimeValue::Millis(parse_f64(&c[1]));
        }
        if let Some(c) = HERTZ.captures(text) {
            return TimeValue::Hertz(parse_f64(&c[1]));
        }
        if let Some(c) = TICKS.captures(text) {
            return TimeValue::Ticks(parse_f64(&c[1]));
        }
        if let Some(c) = NOTE.captures(text) {
            let modifier = match &c[2] {
                "t" => NoteModifier::Triplet,
                "d" => NoteModifier::Dotted,
                _ => NoteModifier::Straight,
            };
            return TimeValue::Note {
                division: parse_u32(&c[1]),
                modifier,
            };
        }
        if let Some(c) = BBT.captures(text) {
            return TimeValue::Bbt {
                bars: parse_u32(&c[1]),
                beats: parse_u32(&c[2]),
                ticks: parse_u32(&c[3]),
            };
        }
        if let Some(c) = CLOCK.captures(text) {
            return TimeValue::Clock {
                hours: parse_u32(&c[1]),
                minutes: parse_u32(&c[2]),
                seconds: parse_f64(&c[3]),
            };
        }
        if let Some(c) = SAMPLES.captures(text) {
            return TimeValue::Samples(parse_f64(&c[1]));
        }

        TimeValue::Seconds(parse_f64(text))
    }

    /// True for units whose length depends on the tempo.
    pub fn is_tempo_relative(&self) -> bool {
        match self {
            TimeValue::Ticks(_) | TimeValue::Note { .. } | TimeValue::Bbt { .. } => true,
            TimeValue::Relative(inner) => inner.is_tempo_relative(),
            _ => false,
        }
    }
}

impl Default for TimeValue {
    fn default() -> Self {
        TimeValue::Seconds(0.0)
    }
}

impl From<f64> for TimeValue {
    fn from(seconds: f64) -> Self {
        TimeValue::Seconds(seconds)
    }
}

impl From<f32> for TimeValue {
    fn from(seconds: f32) -> Self {
        TimeValue::Seconds(seconds as f64)
    }
}

impl From<&str> for TimeValue {
    fn from(text: &str) -> Self {
        TimeValue::parse(text)
    }
}

impl From<String> for TimeValue {
    fn from(text: String) -> Self {
        TimeValue::parse(&text)
    }
}

fn parse_f64(text: &str) -> f64 {
    finite(text.parse::<f64>().unwrap_or(0.0))
}

fn parse_u32(text: &str) -> u32 {
    text.parse::<u32>().unwrap_or(0)
}

#[inline]
fn beats_to_seconds(beats: f64, bpm: f64) -> f64 {
    if bpm > 0.0 {
        beats * 60.0 / bpm
    } else {
        0.0
    }
}

#[inline]
fn ticks_to_seconds(ticks: f64, bpm: f64) -> f64 {
    beats_to_seconds(ticks / TICKS_PER_BEAT, bpm)
}

/// Convert a time value to absolute seconds.
///
/// Deterministic and side-effect free. The result is always finite.
pub fn to_seconds(value: &TimeValue, bpm: f64, sample_rate: f64, current_time: f64) -> f64 {
    let seconds = match value {
        TimeValue::Seconds(s) => *s,
        TimeValue::Millis(ms) => ms * 0.001,
        TimeValue::Hertz(hz) => {
            if *hz > 0.0 {
                1.0 / hz
            } else {
                0.0
            }
        }
        TimeValue::Ticks(ticks) => ticks_to_seconds(*ticks, bpm),
        TimeValue::Note { division, modifier } => {
            if *division == 0 {
                0.0
            } else {
                let beats = BEATS_PER_BAR / *division as f64;
                let beats = match modifier {
                    NoteModifier::Straight => beats,
                    NoteModifier::Triplet => beats * 2.0 / 3.0,
                    NoteModifier::Dotted => beats * 1.5,
                };
                beats_to_seconds(beats, bpm)
            }
        }
        TimeValue::Bbt { bars, beats, ticks } => {
            let total_beats = *bars as f64 * BEATS_PER_BAR + *beats as f64;
            ticks_to_seconds(total_beats * TICKS_PER_BEAT + *ticks as f64, bpm)
        }
        TimeValue::Clock {
            hours,
            minutes,
            seconds,
        } => *hours as f64 * 3600.0 + *minutes as f64 * 60.0 + seconds,
        TimeValue::Samples(n) => {
            if sample_rate > 0.0 {
                n / sample_rate
            } else {
                0.0
            }
        }
        TimeValue::Relative(inner) => {
            finite(current_time) + to_seconds(inner, bpm, sample_rate, current_time)
        }
    };

    finite(seconds)
}
