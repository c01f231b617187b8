//! Theme catalog and the current-appearance store.
//!
//! # Responsibility
//! - Ship a fixed, build-time palette catalog.
//! - Track the active palette and dark-mode flag as an injectable value.
//!
//! # Invariants
//! - The active palette is always a catalog entry.
//! - `dark_mode` is independent of the palette.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog;
pub mod store;

pub use catalog::{find_palette, PaletteTokens, ThemePalette, DEFAULT_THEME, THEME_CATALOG};
pub use store::{Appearance, ThemeStore};

/// Active palette merged with the dark-mode flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub primary_color: String,
    pub dark_mode: bool,
}

/// Requested theme change. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    NotFound(String),
}

impl Display for ThemeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "theme not found: {name}"),
        }
    }
}

impl Error for ThemeError {}
