//! Session-scoped current theme.

use super::catalog::{find_palette, PaletteTokens, ThemePalette, DEFAULT_THEME, THEME_CATALOG};
use super::{Theme, ThemeError, ThemeSelection};
use log::info;

/// Light/dark choice as offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
    /// Follow the platform preference.
    System,
}

impl Appearance {
    pub fn resolve(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => system_prefers_dark,
        }
    }
}

/// Current palette plus dark-mode flag.
///
/// Created at application start and passed to whoever needs it; there is no
/// process-global instance.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    active: &'static ThemePalette,
    dark_mode: bool,
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeStore {
    /// Starts on the default palette in light mode.
    pub fn new() -> Self {
        Self {
            active: find_palette(DEFAULT_THEME).unwrap_or(&THEME_CATALOG[0]),
            dark_mode: false,
        }
    }

    /// Starts on `name` in light mode.
    pub fn with_theme(name: &str) -> Result<Self, ThemeError> {
        let mut store = Self::new();
        store.set_theme(name)?;
        Ok(store)
    }

    pub fn current(&self) -> Theme {
        Theme {
            name: self.active.name.to_string(),
            primary_color: self.active.primary_color.to_string(),
            dark_mode: self.dark_mode,
        }
    }

    pub fn palette(&self) -> &'static ThemePalette {
        self.active
    }

    /// Tokens of the active palette in the active variant.
    pub fn tokens(&self) -> PaletteTokens {
        self.active.tokens(self.dark_mode)
    }

    pub fn catalog(&self) -> &'static [ThemePalette] {
        THEME_CATALOG
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Switches palette, keeping the dark-mode flag.
    ///
    /// Unknown names leave the store unchanged.
    pub fn set_theme(&mut self, name: &str) -> Result<(), ThemeError> {
        let normalized = name.trim();
        let palette =
            find_palette(normalized).ok_or_else(|| ThemeError::NotFound(normalized.to_string()))?;
        self.active = palette;
        info!("event=theme_select module=theme status=ok name={}", palette.name);
        Ok(())
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    pub fn set_appearance(&mut self, appearance: Appearance, system_prefers_dark: bool) {
        self.set_dark_mode(appearance.resolve(system_prefers_dark));
    }

    /// Applies a palette and/or dark-mode change as one step.
    ///
    /// An unknown palette name fails before the dark-mode flag is touched.
    pub fn apply(&mut self, selection: &ThemeSelection) -> Result<Theme, ThemeError> {
        if let Some(name) = selection.name.as_deref() {
            self.set_theme(name)?;
        }
        if let Some(dark_mode) = selection.dark_mode {
            self.set_dark_mode(dark_mode);
        }
        Ok(self.current())
    }
}
