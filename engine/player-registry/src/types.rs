use savant_fetcher::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Largest batch the people lookup accepts
pub const MAX_NAME_BATCH: usize = 200;

/// A player's name as reported by the people lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerName {
    /// Preferred first name (e.g. "Mookie")
    pub first: String,

    /// Last name (e.g. "Betts")
    pub last: String,
}

impl PlayerName {
    /// Create a new player name, trimming both parts
    pub fn new(first: &str, last: &str) -> Self {
        Self { first: first.trim().to_string(), last: last.trim().to_string() }
    }

    /// "First Last", or `None` when either part is missing
    pub fn display(&self) -> Option<String> {
        if self.first.is_empty() || self.last.is_empty() {
            return None;
        }
        Some(format!("{} {}", self.first, self.last))
    }
}

/// Name for a player, falling back to a placeholder when the lookup missed
pub fn display_name(names: &BTreeMap<PlayerId, String>, player_id: PlayerId) -> String {
    names.get(&player_id).cloned().unwrap_or_else(|| format!("Unknown ({player_id})"))
}

/// Errors that can occur while setting up identity resolution
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Name batch size outside 1..=200
    InvalidBatchSize(usize),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidBatchSize(size) => {
                write!(f, "Invalid name batch size {size}, expected 1..={MAX_NAME_BATCH}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_requires_both_parts() {
        assert_eq!(PlayerName::new(" Aaron ", "Judge").display().as_deref(), Some("Aaron Judge"));
        assert_eq!(PlayerName::new("", "Judge").display(), None);
        assert_eq!(PlayerName::new("Aaron", "  ").display(), None);
    }

    #[test]
    fn test_placeholder_for_missing_name() {
        let names = BTreeMap::from([(592450, "Aaron Judge".to_string())]);
        assert_eq!(display_name(&names, 592450), "Aaron Judge");
        assert_eq!(display_name(&names, 12345), "Unknown (12345)");
    }
}
