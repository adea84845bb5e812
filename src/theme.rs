//! Named color palettes and the currently applied theme.
//!
//! Widgets never hold colors of their own; they read the active palette
//! every frame, so applying a theme is a single pointer swap.

use ratatui::style::Color;

/// Color roles consumed by the widget layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub panel_bg: Color,
    pub panel_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub border: Color,
    pub border_light: Color,
    pub modal_bg: Color,
    pub modal_border: Color,
    pub modal_fg: Color,
    pub modal_secondary: Color,
    pub input_bg: Color,
    pub input_focus: Color,
    pub button_primary: Color,
    pub tab_bg: Color,
    pub tab_active: Color,
    pub tab_fg: Color,
    pub tab_unsaved: Color,
    pub search_bg: Color,
    pub search_selected: Color,
    pub search_fg: Color,
}

pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub palette: Palette,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(r, g, b)
}

const DEFAULT: Theme = Theme {
    id: "default",
    name: "Default",
    palette: Palette {
        bg: rgb(0, 0, 0),
        fg: rgb(255, 255, 255),
        panel_bg: rgb(26, 26, 26),
        panel_fg: rgb(255, 255, 255),
        accent: rgb(76, 175, 80),
        muted: rgb(102, 102, 102),
        border: rgb(51, 51, 51),
        border_light: rgb(42, 42, 42),
        modal_bg: rgb(26, 26, 26),
        modal_border: rgb(51, 51, 51),
        modal_fg: rgb(255, 255, 255),
        modal_secondary: rgb(204, 204, 204),
        input_bg: rgb(42, 42, 42),
        input_focus: rgb(74, 144, 226),
        button_primary: rgb(74, 144, 226),
        tab_bg: rgb(26, 26, 26),
        tab_active: rgb(51, 51, 51),
        tab_fg: rgb(255, 255, 255),
        tab_unsaved: rgb(255, 68, 68),
        search_bg: rgb(26, 26, 26),
        search_selected: rgb(42, 42, 42),
        search_fg: rgb(255, 255, 255),
    },
};

const BASE2TONE_LAVENDER: Theme = Theme {
    id: "base2tone-lavender",
    name: "Base2Tone Lavender",
    palette: Palette {
        bg: rgb(26, 22, 37),
        fg: rgb(229, 220, 254),
        panel_bg: rgb(45, 40, 56),
        panel_fg: rgb(229, 220, 254),
        accent: rgb(147, 117, 245),
        muted: rgb(98, 90, 124),
        border: rgb(45, 40, 56),
        border_light: rgb(58, 52, 72),
        modal_bg: rgb(45, 40, 56),
        modal_border: rgb(58, 52, 72),
        modal_fg: rgb(229, 220, 254),
        modal_secondary: rgb(197, 173, 255),
        input_bg: rgb(58, 52, 72),
        input_focus: rgb(147, 117, 245),
        button_primary: rgb(147, 117, 245),
        tab_bg: rgb(45, 40, 56),
        tab_active: rgb(58, 52, 72),
        tab_fg: rgb(229, 220, 254),
        tab_unsaved: rgb(210, 148, 255),
        search_bg: rgb(45, 40, 56),
        search_selected: rgb(58, 52, 72),
        search_fg: rgb(229, 220, 254),
    },
};

const BASE2TONE_MALL: Theme = Theme {
    id: "base2tone-mall",
    name: "Base2Tone Mall",
    palette: Palette {
        bg: rgb(26, 26, 27),
        fg: rgb(240, 229, 255),
        panel_bg: rgb(45, 45, 47),
        panel_fg: rgb(240, 229, 255),
        accent: rgb(161, 126, 252),
        muted: rgb(94, 92, 96),
        border: rgb(45, 45, 47),
        border_light: rgb(58, 58, 61),
        modal_bg: rgb(45, 45, 47),
        modal_border: rgb(58, 58, 61),
        modal_fg: rgb(240, 229, 255),
        modal_secondary: rgb(213, 197, 255),
        input_bg: rgb(58, 58, 61),
        input_focus: rgb(161, 126, 252),
        button_primary: rgb(117, 191, 255),
        tab_bg: rgb(45, 45, 47),
        tab_active: rgb(58, 58, 61),
        tab_fg: rgb(240, 229, 255),
        tab_unsaved: rgb(178, 148, 255),
        search_bg: rgb(45, 45, 47),
        search_selected: rgb(58, 58, 61),
        search_fg: rgb(240, 229, 255),
    },
};

const AYU_DARK: Theme = Theme {
    id: "ayu-dark",
    name: "Ayu Dark",
    palette: Palette {
        bg: rgb(13, 17, 23),
        fg: rgb(179, 177, 173),
        panel_bg: rgb(28, 33, 40),
        panel_fg: rgb(179, 177, 173),
        accent: rgb(255, 51, 51),
        muted: rgb(77, 85, 102),
        border: rgb(28, 33, 40),
        border_light: rgb(45, 51, 59),
        modal_bg: rgb(28, 33, 40),
        modal_border: rgb(45, 51, 59),
        modal_fg: rgb(179, 177, 173),
        modal_secondary: rgb(149, 230, 203),
        input_bg: rgb(45, 51, 59),
        input_focus: rgb(89, 194, 255),
        button_primary: rgb(89, 194, 255),
        tab_bg: rgb(28, 33, 40),
        tab_active: rgb(45, 51, 59),
        tab_fg: rgb(179, 177, 173),
        tab_unsaved: rgb(255, 51, 51),
        search_bg: rgb(28, 33, 40),
        search_selected: rgb(45, 51, 59),
        search_fg: rgb(179, 177, 173),
    },
};

const GRUVBOX_DARK: Theme = Theme {
    id: "gruvbox-dark",
    name: "Gruvbox Dark",
    palette: Palette {
        bg: rgb(29, 32, 33),
        fg: rgb(242, 229, 188),
        panel_bg: rgb(40, 40, 40),
        panel_fg: rgb(242, 229, 188),
        accent: rgb(251, 73, 52),
        muted: rgb(146, 131, 116),
        border: rgb(40, 40, 40),
        border_light: rgb(60, 56, 54),
        modal_bg: rgb(40, 40, 40),
        modal_border: rgb(60, 56, 54),
        modal_fg: rgb(242, 229, 188),
        modal_secondary: rgb(213, 196, 161),
        input_bg: rgb(60, 56, 54),
        input_focus: rgb(250, 189, 47),
        button_primary: rgb(250, 189, 47),
        tab_bg: rgb(40, 40, 40),
        tab_active: rgb(60, 56, 54),
        tab_fg: rgb(242, 229, 188),
        tab_unsaved: rgb(251, 73, 52),
        search_bg: rgb(40, 40, 40),
        search_selected: rgb(60, 56, 54),
        search_fg: rgb(242, 229, 188),
    },
};

const THEMES: [&Theme; 5] = [
    &DEFAULT,
    &BASE2TONE_LAVENDER,
    &BASE2TONE_MALL,
    &AYU_DARK,
    &GRUVBOX_DARK,
];

/// Lookup table of palettes plus the currently applied one.
pub struct ThemeManager {
    current: &'static Theme,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self { current: &DEFAULT }
    }

    /// Unknown ids fall back to the default theme.
    pub fn get(id: &str) -> &'static Theme {
        THEMES.iter().find(|t| t.id == id).copied().unwrap_or(&DEFAULT)
    }

    pub fn all() -> impl Iterator<Item = &'static Theme> {
        THEMES.into_iter()
    }

    pub fn apply(&mut self, id: &str) {
        self.current = Self::get(id);
    }

    pub fn current(&self) -> &'static Theme {
        self.current
    }

    pub fn palette(&self) -> &'static Palette {
        &self.current.palette
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}
