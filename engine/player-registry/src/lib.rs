//! Player Registry - Resolves player identities across ID namespaces
//!
//! Builds the FanGraphs -> MLBAM crosswalk from the Chadwick register and
//! resolves MLBAM IDs to display names in provider-friendly batches.

pub mod crosswalk;
pub mod names;
pub mod types;

pub use crosswalk::IdentityCrosswalk;
pub use names::NameResolver;
pub use types::{display_name, PlayerName, RegistryError};
