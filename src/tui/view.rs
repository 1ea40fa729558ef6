//! Pure rendering: map a Session to styled lines.
//!
//! [`compose`] decides what the frame says and never touches the session
//! or the terminal. [`render`] lays the composition out in a ratatui frame.
//! The auto-return after a result frame lives in the update layer.

use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Wrap};
use ratatui::Frame;

use super::state::{ResultKind, Session};
use super::theme::Theme;

// ============================================================================
// STATIC CONTENT
// ============================================================================

pub const BANNER: &str = "Hardware detection tool. No support given, use at your own risk.";

pub const MENU_TITLE: &str = "Please enter a command";

pub const QUIT_LINE: &str = "'q' to quit";

pub const FOOTER: &str = "[c]pu | [g]pu | [r]am | [h]dd | [b]ack to menu | [q]uit";

/// Whether a menu feature works on current hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Working,
    Broken,
    NotImplemented,
}

impl Status {
    fn annotation(self) -> Option<&'static str> {
        match self {
            Status::Working => None,
            Status::Broken => Some("BROKEN"),
            Status::NotImplemented => Some("NOT IMPLEMENTED"),
        }
    }
}

/// One line of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub key: char,
    pub label: &'static str,
    pub status: Status,
}

const fn entry(key: char, label: &'static str, status: Status) -> MenuEntry {
    MenuEntry { key, label, status }
}

/// Main menu, in display order. The quit line follows it.
pub const MENU: &[MenuEntry] = &[
    entry('c', "cpu", Status::Working),
    entry('r', "ram", Status::Working),
    entry('g', "gpu", Status::Working),
    entry('h', "hdd", Status::Working),
    entry('w', "wifi", Status::Broken),
    entry('o', "os install", Status::NotImplemented),
    entry('p', "ping test", Status::Working),
    entry('1', "APFS Format", Status::Working),
    entry('2', "JHFS+ Format", Status::Working),
    entry('3', "Fusion Drive Format", Status::NotImplemented),
    entry('t', "Test Menu", Status::Working),
];

/// Tests promised by the submenu. None has a key yet.
const TEST_PLACEHOLDERS: [&str; 4] = [
    "Harddrive read test",
    "Harddrive write test",
    "CPU Stress test",
    "RAM test",
];

// ============================================================================
// COMPOSITION
// ============================================================================

/// Everything one frame shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    /// Terminal error screen: this line and nothing else.
    Fatal(Line<'static>),
    /// Regular frame: optional banner above a bordered body.
    Screen {
        banner: Option<Line<'static>>,
        body: Vec<Line<'static>>,
    },
}

/// Decide the content of the next frame.
pub fn compose(session: &Session, theme: &Theme) -> Composition {
    if let Some(message) = &session.fatal_error {
        return Composition::Fatal(Line::from(format!("Error: {}", message)));
    }

    let banner = session
        .show_banner
        .then(|| Line::from(Span::styled(format!("  {}", BANNER), theme.banner)));

    let body = if session.result_visible {
        let (mut lines, display_options) = result_lines(session, theme);
        if display_options {
            lines.push(Line::from(Span::styled(FOOTER, theme.quit)));
        }
        lines
    } else {
        menu_lines(theme)
    };

    Composition::Screen { banner, body }
}

fn menu_lines(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(MENU_TITLE, theme.title))];

    for item in MENU {
        let mut spans = vec![
            Span::styled(format!("'{}' for ", item.key), theme.body),
            Span::styled(item.label, theme.command),
        ];
        if let Some(note) = item.status.annotation() {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(note, theme.warning));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled(format!("   {}   ", QUIT_LINE), theme.quit)));
    lines
}

/// Lines for the visible result, and whether the options footer follows.
fn result_lines(session: &Session, theme: &Theme) -> (Vec<Line<'static>>, bool) {
    let text = session.last_result.as_str();
    let mut lines = vec![Line::from("")];

    let display_options = match session.kind {
        ResultKind::Cpu => {
            lines.extend(labeled("CPU is: ", text, theme));
            true
        }
        ResultKind::Ram => {
            lines.extend(labeled("RAM is: ", text, theme));
            true
        }
        ResultKind::Gpu => {
            lines.extend(labeled("GPU is: ", text, theme));
            true
        }
        ResultKind::Hdd => {
            lines.extend(labeled("Disk Size: ", text, theme));
            true
        }
        ResultKind::Ping => {
            lines.push(Line::from(Span::styled("Ping results:", theme.body)));
            lines.extend(output_lines(text, theme));
            true
        }
        ResultKind::Format => {
            lines.extend(labeled("Formatted drive: ", text, theme));
            true
        }
        ResultKind::TestWrite => {
            lines.extend(labeled("Write Test: ", text, theme));
            true
        }
        ResultKind::OsInstall => {
            lines.push(Line::from(Span::styled(
                "OS install started. Leave the machine alone until it restarts.",
                theme.body,
            )));
            lines.extend(output_lines(text, theme));
            false
        }
        ResultKind::Wifi => {
            lines.push(Line::from(Span::styled(
                "If a wifi card was detected, you should now be connected!",
                theme.body,
            )));
            false
        }
        ResultKind::TestMenu => {
            lines.push(Line::from(Span::styled(
                "These tests are not implemented yet. Look out for them in the future.",
                theme.body,
            )));
            for name in TEST_PLACEHOLDERS {
                lines.push(Line::from(vec![
                    Span::styled("'???' for ", theme.body),
                    Span::styled(name, theme.command),
                ]));
            }
            false
        }
        ResultKind::OldOs => {
            lines.push(Line::from(Span::styled(
                "The OS you're booting off of is too old for this command to work.",
                theme.body,
            )));
            lines.push(Line::from(vec![
                Span::styled("Please use ", theme.body),
                Span::styled("Big Sur", theme.command),
                Span::styled(" or later to use this feature", theme.body),
            ]));
            false
        }
        ResultKind::None | ResultKind::Unknown => {
            lines.push(Line::from(vec![
                Span::styled("Nothing to show for this result.", theme.body),
                Span::styled(" Press b to go back.", theme.command),
            ]));
            true
        }
    };

    (lines, display_options)
}

/// `label` followed by the first output line; further output lines below it.
fn labeled(label: &'static str, text: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut rest = output_lines(text, theme).into_iter();
    let first = rest.next().map(|l| l.spans).unwrap_or_default();

    let mut spans = vec![Span::styled(label, theme.body)];
    spans.extend(first);

    let mut lines = vec![Line::from(spans)];
    lines.extend(rest);
    lines
}

fn output_lines(text: &str, theme: &Theme) -> Vec<Line<'static>> {
    text.trim_end()
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), theme.command)))
        .collect()
}

// ============================================================================
// FRAME
// ============================================================================

/// Draw the session into the terminal frame.
pub fn render(session: &Session, theme: &Theme, frame: &mut Frame) {
    let area = frame.area();

    match compose(session, theme) {
        Composition::Fatal(line) => {
            frame.render_widget(Paragraph::new(line), area);
        }
        Composition::Screen { banner, body } => {
            let banner_height = if banner.is_some() { 1 } else { 0 };
            let chunks = Layout::vertical([
                Constraint::Length(banner_height), // banner
                Constraint::Min(0),                // framed content
            ])
            .split(area);

            if let Some(banner) = banner {
                frame.render_widget(Paragraph::new(banner), chunks[0]);
            }

            let block = Block::bordered()
                .border_style(theme.border)
                .padding(Padding::horizontal(3));
            let content = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
            frame.render_widget(content, chunks[1]);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
