use std::collections::HashSet;

use ratatui::style::Color;
use strum::IntoEnumIterator;

use super::ThemeName;

/// Colours used to paint note windows and the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub title_bar: Color,
    pub body: Color,
    pub text: Color,
    pub border: Color,
    pub accent: Color,
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    names: HashSet<ThemeName>,
}

impl ThemeRegistry {
    /// Case-insensitive lookup by config name.
    pub fn lookup(&self, name: &str) -> Option<ThemeName> {
        let name = name.trim();
        self.names
            .iter()
            .copied()
            .find(|theme| theme.to_string().eq_ignore_ascii_case(name))
    }

    pub fn all(&self) -> impl Iterator<Item = &ThemeName> {
        self.names.iter()
    }

    pub fn palette(&self, theme: &ThemeName) -> Palette {
        match theme {
            ThemeName::Canary => Palette {
                title_bar: Color::Rgb(0xCC, 0xCC, 0xFF),
                body: Color::Rgb(0xFF, 0xFF, 0x99),
                text: Color::Black,
                border: Color::Rgb(0xAA, 0xAA, 0xAA),
                accent: Color::Rgb(0xCC, 0x33, 0x33),
            },
            ThemeName::Rose => Palette {
                title_bar: Color::Rgb(0xF4, 0xB6, 0xC2),
                body: Color::Rgb(0xFF, 0xE4, 0xE9),
                text: Color::Black,
                border: Color::Rgb(0xC0, 0x8A, 0x96),
                accent: Color::Rgb(0x99, 0x00, 0x33),
            },
            ThemeName::Sky => Palette {
                title_bar: Color::Rgb(0x9E, 0xC9, 0xF0),
                body: Color::Rgb(0xDD, 0xEE, 0xFF),
                text: Color::Black,
                border: Color::Rgb(0x7A, 0x9C, 0xBF),
                accent: Color::Rgb(0xCC, 0x33, 0x33),
            },
            ThemeName::Mint => Palette {
                title_bar: Color::Rgb(0xA8, 0xDD, 0xB5),
                body: Color::Rgb(0xE3, 0xF8, 0xE8),
                text: Color::Black,
                border: Color::Rgb(0x86, 0xB0, 0x90),
                accent: Color::Rgb(0xCC, 0x33, 0x33),
            },
        }
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let names = ThemeName::iter().collect();
        Self { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_every_theme() {
        let registry = ThemeRegistry::default();
        assert_eq!(registry.all().count(), 4);
        for theme in ThemeName::iter() {
            assert_eq!(registry.lookup(&theme.to_string()), Some(theme), "missing {theme}");
        }
        assert_eq!(registry.lookup(" Rose "), Some(ThemeName::Rose));
        assert_eq!(registry.lookup("plaid"), None);
    }

    #[test]
    fn canary_matches_classic_sticky_colours() {
        let palette = ThemeRegistry::default().palette(&ThemeName::Canary);
        assert_eq!(palette.body, Color::Rgb(0xFF, 0xFF, 0x99));
        assert_eq!(palette.title_bar, Color::Rgb(0xCC, 0xCC, 0xFF));
    }
}
