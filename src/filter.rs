//! Visibility filters
//!
//! Pure projections of a list onto the subset currently displayed.
//! Every projection preserves the original order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownVisibility;
use crate::model::TodoItem;

/// Named subset of items shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    All,
    Active,
    Completed,
}

impl Visibility {
    /// Every recognized visibility, in footer order
    pub const VARIANTS: [Visibility; 3] = [Visibility::All, Visibility::Active, Visibility::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::All => "all",
            Visibility::Active => "active",
            Visibility::Completed => "completed",
        }
    }

    /// Whether `item` belongs to this subset
    pub fn admits(&self, item: &TodoItem) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Active => !item.done,
            Visibility::Completed => item.done,
        }
    }
}

impl FromStr for Visibility {
    type Err = UnknownVisibility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Visibility::All),
            "active" => Ok(Visibility::Active),
            "completed" => Ok(Visibility::Completed),
            other => Err(UnknownVisibility(other.to_string())),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project `items` onto `visibility`, preserving order
pub fn apply(visibility: Visibility, items: &[TodoItem]) -> Vec<&TodoItem> {
    items.iter().filter(|item| visibility.admits(item)).collect()
}

/// Like [`apply`], for a visibility given by name
///
/// Callers are expected to normalize names first (see [`crate::route`]).
pub fn apply_named<'a>(
    name: &str,
    items: &'a [TodoItem],
) -> Result<Vec<&'a TodoItem>, UnknownVisibility> {
    let visibility: Visibility = name.parse()?;
    Ok(apply(visibility, items))
}
