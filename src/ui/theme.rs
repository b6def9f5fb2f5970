use crossterm::style::{Color, Stylize};

/// Design tokens for the iacdeploy CLI.
///
/// Only 5 semantic colors; all icons come from this module.
pub mod colors {
    use super::Color;

    /// #22C55E
    pub const SUCCESS: Color = Color::Green;
    /// #EF4444
    pub const ERROR: Color = Color::Red;
    /// #F59E0B
    pub const WARNING: Color = Color::Yellow;
    /// #06B6D4
    pub const INFO: Color = Color::Cyan;
    /// #6B7280
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const PROGRESS: &str = "●";
    pub const PENDING: &str = "○";
    pub const ARROW: &str = "↳";

    pub const DEPLOY: &str = "📦";
    pub const TRASH: &str = "🗑";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const PROGRESS: &str = "[..]";
    pub const PENDING: &str = "[ ]";
    pub const ARROW: &str = "[>]";

    pub const DEPLOY: &str = "[DEPLOY]";
    pub const TRASH: &str = "[DEL]";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Pending,
    Arrow,
    Deploy,
    Trash,
}

impl Icon {
    pub fn glyph(self, unicode: bool) -> &'static str {
        match (self, unicode) {
            (Icon::Success, true) => icons::SUCCESS,
            (Icon::Success, false) => icons_ascii::SUCCESS,
            (Icon::Error, true) => icons::ERROR,
            (Icon::Error, false) => icons_ascii::ERROR,
            (Icon::Warning, true) => icons::WARNING,
            (Icon::Warning, false) => icons_ascii::WARNING,
            (Icon::Progress, true) => icons::PROGRESS,
            (Icon::Progress, false) => icons_ascii::PROGRESS,
            (Icon::Pending, true) => icons::PENDING,
            (Icon::Pending, false) => icons_ascii::PENDING,
            (Icon::Arrow, true) => icons::ARROW,
            (Icon::Arrow, false) => icons_ascii::ARROW,
            (Icon::Deploy, true) => icons::DEPLOY,
            (Icon::Deploy, false) => icons_ascii::DEPLOY,
            (Icon::Trash, true) => icons::TRASH,
            (Icon::Trash, false) => icons_ascii::TRASH,
        }
    }

    fn color(self) -> Option<Color> {
        match self {
            Icon::Success => Some(colors::SUCCESS),
            Icon::Error => Some(colors::ERROR),
            Icon::Warning => Some(colors::WARNING),
            Icon::Progress | Icon::Arrow => Some(colors::INFO),
            Icon::Pending => Some(colors::DIM),
            Icon::Deploy | Icon::Trash => None,
        }
    }

    pub fn render(self, color: bool, unicode: bool) -> String {
        let glyph = self.glyph(unicode);
        match self.color() {
            Some(c) if color => format!("{}", glyph.with(c)),
            _ => glyph.to_string(),
        }
    }
}

/// Paint `text` when color is enabled
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_fallback_has_no_unicode() {
        for icon in [
            Icon::Success,
            Icon::Error,
            Icon::Warning,
            Icon::Progress,
            Icon::Pending,
            Icon::Arrow,
            Icon::Deploy,
            Icon::Trash,
        ] {
            assert!(icon.glyph(false).is_ascii(), "{icon:?}");
        }
    }

    #[test]
    fn plain_rendering_has_no_escape_codes() {
        assert_eq!(Icon::Success.render(false, true), "✓");
        assert_eq!(paint("kv", colors::INFO, false), "kv");
    }
}
