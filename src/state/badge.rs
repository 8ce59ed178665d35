//! Badge shown next to the extension icon

use serde::{Deserialize, Serialize};

/// Accent colour used while the timer runs
pub const BADGE_COLOR: &str = "#4361ee";

/// Compact status indicator. Empty text means the badge is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub text: String,
    pub color: Option<String>,
}

impl Badge {
    /// Badge for a running timer showing `seconds` elapsed
    pub fn running(seconds: u64) -> Self {
        Self {
            text: badge_text(seconds),
            color: Some(BADGE_COLOR.to_string()),
        }
    }

    /// Badge with no text, shown while the timer is stopped
    pub fn cleared() -> Self {
        Self {
            text: String::new(),
            color: None,
        }
    }

    /// Check if the badge shows nothing
    pub fn is_cleared(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for Badge {
    fn default() -> Self {
        Self::cleared()
    }
}

/// Largest non-zero unit of `seconds`: `"2h"`, `"5m"` or `"42s"`
pub fn badge_text(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h", hours)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_largest_unit() {
        assert_eq!(badge_text(0), "0s");
        assert_eq!(badge_text(59), "59s");
        assert_eq!(badge_text(60), "1m");
        assert_eq!(badge_text(3599), "59m");
        assert_eq!(badge_text(3600), "1h");
        assert_eq!(badge_text(3 * 3600 + 59 * 60 + 59), "3h");
    }

    #[test]
    fn running_badge_has_accent_color() {
        let badge = Badge::running(125);
        assert_eq!(badge.text, "2m");
        assert_eq!(badge.color.as_deref(), Some(BADGE_COLOR));
        assert!(Badge::cleared().is_cleared());
    }
}
