use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

/// Represents a player on the roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Player {
    /// Stable player id, derived from the display name (lowercased, spaces
    /// replaced with underscores). Never changes once assigned.
    pub id: String,

    /// Player's display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Display colour, stored verbatim (generation happens outside the core)
    pub color: String,
}

impl Player {
    /// Creates a new player, deriving the id from the display name
    pub fn new(name: &str, color: &str) -> Result<Self> {
        let player = Self {
            id: Self::id_for_name(name),
            name: name.to_string(),
            color: color.to_string(),
        };
        player.validate()?;
        Ok(player)
    }

    /// The stable id a given display name maps to
    pub fn id_for_name(name: &str) -> String {
        name.to_lowercase().replace(' ', "_")
    }
}
