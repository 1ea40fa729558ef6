//! Style table for the session screens.
//!
//! Pure data, passed to the renderer as configuration. Roles:
//! - title: menu heading
//! - banner: start-up notice above the frame
//! - body: labels and prose
//! - warning: BROKEN / NOT IMPLEMENTED annotations
//! - command: key descriptions and probe output
//! - quit: quit line and options footer
//! - border: frame around the content

use ratatui::style::{Color, Modifier, Style};

/// Named styles for every role the renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub title: Style,
    pub banner: Style,
    pub body: Style,
    pub warning: Style,
    pub command: Style,
    pub quit: Style,
    pub border: Style,
}

const SLATE: Color = Color::Rgb(0x50, 0x50, 0x59);
const WHITE: Color = Color::Rgb(0xff, 0xff, 0xff);

impl Theme {
    /// Full-color theme.
    pub const DEFAULT: Theme = Theme {
        title: Style::new().fg(WHITE).bg(SLATE),
        banner: Style::new().fg(WHITE).bg(SLATE),
        body: Style::new().fg(Color::Rgb(0x40, 0x40, 0x40)),
        warning: Style::new()
            .fg(Color::Rgb(0xa0, 0x30, 0x00))
            .bg(WHITE)
            .add_modifier(Modifier::BOLD),
        command: Style::new().fg(Color::Rgb(0x00, 0x50, 0xc0)),
        quit: Style::new().fg(Color::Rgb(0xa0, 0xa0, 0xa0)),
        border: Style::new().fg(Color::Rgb(0x00, 0x00, 0x00)),
    };

    /// No colors, for terminals that cannot show them (`--no-color`).
    /// Warnings stay bold so annotations remain visible.
    pub const PLAIN: Theme = Theme {
        title: Style::new().add_modifier(Modifier::BOLD),
        banner: Style::new(),
        body: Style::new(),
        warning: Style::new().add_modifier(Modifier::BOLD),
        command: Style::new(),
        quit: Style::new(),
        border: Style::new(),
    };
}

impl Default for Theme {
    fn default() -> Self {
        Theme::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_distinguishes_roles() {
        let theme = Theme::default();
        assert_ne!(theme.body, theme.command);
        assert_ne!(theme.warning, theme.body);
        assert_eq!(theme.command.fg, Some(Color::Rgb(0x00, 0x50, 0xc0)));
    }

    #[test]
    fn warning_is_bold_in_both_themes() {
        assert!(Theme::DEFAULT.warning.add_modifier.contains(Modifier::BOLD));
        assert!(Theme::PLAIN.warning.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn plain_theme_has_no_colors() {
        let t = Theme::PLAIN;
        for style in [t.title, t.banner, t.body, t.warning, t.command, t.quit, t.border] {
            assert_eq!(style.fg, None);
            assert_eq!(style.bg, None);
        }
    }
}
