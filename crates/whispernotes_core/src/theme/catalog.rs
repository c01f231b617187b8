//! Built-in palettes.

use serde::Serialize;

/// Palette used when nothing else was selected.
pub const DEFAULT_THEME: &str = "totoro";

/// Color tokens for one light/dark variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteTokens {
    pub background: &'static str,
    pub foreground: &'static str,
    pub accent: &'static str,
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePalette {
    pub name: &'static str,
    pub label: &'static str,
    pub primary_color: &'static str,
    pub light: PaletteTokens,
    pub dark: PaletteTokens,
}

impl ThemePalette {
    pub fn tokens(&self, dark_mode: bool) -> PaletteTokens {
        if dark_mode {
            self.dark
        } else {
            self.light
        }
    }
}

pub static THEME_CATALOG: &[ThemePalette] = &[
    ThemePalette {
        name: "totoro",
        label: "Forest Spirit",
        primary_color: "#4A7C59",
        light: PaletteTokens {
            background: "#F4EFE1",
            foreground: "#1F3A5F",
            accent: "#E8B04B",
        },
        dark: PaletteTokens {
            background: "#1B2A1F",
            foreground: "#F4EFE1",
            accent: "#8FBF7F",
        },
    },
    ThemePalette {
        name: "spirited-away",
        label: "Bathhouse Lanterns",
        primary_color: "#C2452D",
        light: PaletteTokens {
            background: "#FBF1E4",
            foreground: "#3A1F1A",
            accent: "#E8B04B",
        },
        dark: PaletteTokens {
            background: "#23151A",
            foreground: "#F7E6D2",
            accent: "#E2725B",
        },
    },
    ThemePalette {
        name: "howls-castle",
        label: "Moving Castle Sky",
        primary_color: "#5B7DB1",
        light: PaletteTokens {
            background: "#EEF3FA",
            foreground: "#1F2A44",
            accent: "#F2C14E",
        },
        dark: PaletteTokens {
            background: "#141B2D",
            foreground: "#E3EAF6",
            accent: "#8EA8D8",
        },
    },
    ThemePalette {
        name: "kikis-delivery",
        label: "Seaside Bakery",
        primary_color: "#D9822B",
        light: PaletteTokens {
            background: "#FFF6EA",
            foreground: "#2E2A3A",
            accent: "#7A4EAB",
        },
        dark: PaletteTokens {
            background: "#211B29",
            foreground: "#FFF1DE",
            accent: "#F0A45D",
        },
    },
    ThemePalette {
        name: "mononoke",
        label: "Ancient Forest",
        primary_color: "#6B8E23",
        light: PaletteTokens {
            background: "#F1F4E6",
            foreground: "#26301A",
            accent: "#B5533C",
        },
        dark: PaletteTokens {
            background: "#161C12",
            foreground: "#E5EBD3",
            accent: "#9DBA5A",
        },
    },
    ThemePalette {
        name: "ponyo",
        label: "Tidal Wave",
        primary_color: "#2A9D8F",
        light: PaletteTokens {
            background: "#EAF7F5",
            foreground: "#173A40",
            accent: "#E76F51",
        },
        dark: PaletteTokens {
            background: "#0F2326",
            foreground: "#DDF3EF",
            accent: "#5CC7B8",
        },
    },
];

/// Looks up a palette by exact name.
pub fn find_palette(name: &str) -> Option<&'static ThemePalette> {
    THEME_CATALOG.iter().find(|palette| palette.name == name)
}
