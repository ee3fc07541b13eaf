//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable runtime behavior, deserializable from any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture bare digit keys into the repeat accumulator instead of
    /// routing them to widgets.
    pub enable_repeat: bool,
    /// Event-poll timeout and scheduler wake resolution.
    pub timer_resolution: Duration,
    /// Separator used when rendering chord names.
    pub chord_separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_repeat: true,
            timer_resolution: Duration::from_millis(50),
            chord_separator: " ".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert!(c.enable_repeat);
        assert_eq!(c.timer_resolution, Duration::from_millis(50));
        assert_eq!(c.chord_separator, " ");
    }
}
