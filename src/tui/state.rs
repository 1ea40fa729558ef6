//! Session state algebra: pure types, zero effects.
//!
//! These types define the whole interactive state space. The transition
//! function (`update`) and the renderer (`view`) both program against them.
//!
//! Design principle: the key map is data. [`BINDINGS`] lists every key the
//! session understands, the input mode it applies in, and the command it
//! triggers. The update layer only interprets commands.

use crate::types::{FsType, Probe};

// ============================================================================
// INPUT
// ============================================================================

/// What the event loop feeds the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A printable key press.
    Key(char),
    /// Quit requested from outside the key map (Ctrl+C).
    QuitRequested,
}

// ============================================================================
// SESSION STATE
// ============================================================================

/// Which input context is active.
///
/// The test submenu reassigns `h`, `r` and `w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Main,
    TestSubmenu,
}

/// Selects the render branch for a visible result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultKind {
    #[default]
    None,
    Cpu,
    Ram,
    Gpu,
    Hdd,
    OsInstall,
    Ping,
    Format,
    Wifi,
    TestMenu,
    TestWrite,
    OldOs,
    Unknown,
}

impl ResultKind {
    /// Result kind a successful probe lands on.
    pub fn for_probe(probe: Probe) -> Self {
        match probe {
            Probe::Cpu => ResultKind::Cpu,
            Probe::Ram => ResultKind::Ram,
            Probe::Gpu => ResultKind::Gpu,
            Probe::Hdd => ResultKind::Hdd,
            Probe::Ping => ResultKind::Ping,
            Probe::Wifi => ResultKind::Wifi,
            Probe::OsInstall => ResultKind::OsInstall,
            Probe::Format(_) => ResultKind::Format,
            Probe::WriteTest => ResultKind::TestWrite,
        }
    }
}

/// The single mutable record describing what the UI shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// A result (rather than the main menu) is on screen.
    pub result_visible: bool,
    /// Latest provider output. Empty until the first successful probe.
    pub last_result: String,
    pub kind: ResultKind,
    pub mode: Mode,
    /// Once set, the session is over: the next frame shows only this.
    pub fatal_error: Option<String>,
    /// Alternate screen in use.
    pub fullscreen: bool,
    /// Start-up banner. Only ever goes from true to false.
    pub show_banner: bool,
}

impl Session {
    /// Fresh session: main menu with the banner.
    pub fn new() -> Self {
        Session {
            result_visible: false,
            last_result: String::new(),
            kind: ResultKind::None,
            mode: Mode::Main,
            fatal_error: None,
            fullscreen: false,
            show_banner: true,
        }
    }

    pub fn submenu_active(&self) -> bool {
        self.mode == Mode::TestSubmenu
    }

    pub fn is_terminated(&self) -> bool {
        self.fatal_error.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Event loop model: the session plus the loop's own exit flag.
#[derive(Debug, Default)]
pub struct App {
    pub session: Session,
    /// Set when the loop should exit after the current frame.
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        App::default()
    }
}

// ============================================================================
// COMMANDS & BINDINGS
// ============================================================================

/// Input contexts a binding applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Any,
    Main,
    Submenu,
}

impl Scope {
    pub fn matches(self, mode: Mode) -> bool {
        match self {
            Scope::Any => true,
            Scope::Main => mode == Mode::Main,
            Scope::Submenu => mode == Mode::TestSubmenu,
        }
    }
}

/// What a bound key asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Run a probe and show its result.
    Probe(Probe),
    /// Leave the test submenu, then run a probe.
    LeaveSubmenuAndProbe(Probe),
    /// Leave the test submenu without running anything.
    LeaveSubmenu,
    EnterSubmenu,
    /// Back to the main menu.
    Back,
    ToggleFullscreen,
    DismissBanner,
}

/// A single row of the key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: char,
    pub scope: Scope,
    pub command: Command,
}

const fn bind(key: char, scope: Scope, command: Command) -> Binding {
    Binding { key, scope, command }
}

/// The complete key map. The first row whose key and scope match wins.
pub const BINDINGS: &[Binding] = &[
    bind('q', Scope::Any, Command::Quit),
    bind('c', Scope::Any, Command::Probe(Probe::Cpu)),
    bind('r', Scope::Main, Command::Probe(Probe::Ram)),
    bind('r', Scope::Submenu, Command::LeaveSubmenu),
    bind('g', Scope::Any, Command::Probe(Probe::Gpu)),
    bind('h', Scope::Main, Command::Probe(Probe::Hdd)),
    bind('h', Scope::Submenu, Command::LeaveSubmenuAndProbe(Probe::WriteTest)),
    bind('w', Scope::Main, Command::Probe(Probe::Wifi)),
    bind('w', Scope::Submenu, Command::LeaveSubmenu),
    bind('o', Scope::Any, Command::Probe(Probe::OsInstall)),
    bind('p', Scope::Any, Command::Probe(Probe::Ping)),
    bind('1', Scope::Any, Command::Probe(Probe::Format(FsType::Apfs))),
    bind('2', Scope::Any, Command::Probe(Probe::Format(FsType::JhfsPlus))),
    bind('3', Scope::Any, Command::Probe(Probe::Format(FsType::Fusion))),
    bind('t', Scope::Any, Command::EnterSubmenu),
    bind('b', Scope::Any, Command::Back),
    bind('a', Scope::Any, Command::ToggleFullscreen),
    bind('x', Scope::Any, Command::DismissBanner),
];

/// Look up the command for a key in the given mode.
pub fn lookup(mode: Mode, key: char) -> Option<Command> {
    BINDINGS
        .iter()
        .find(|b| b.key == key && b.scope.matches(mode))
        .map(|b| b.command)
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// What the event loop must do after a pure update.
///
/// Follows the Elm/TEA pattern: the update describes the provider call,
/// the effects layer performs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Render the new session.
    Continue,
    /// End the session cleanly.
    Quit,
    /// Run this probe, then feed its result back through `apply_probe_result`.
    Probe(Probe),
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_shows_menu_and_banner() {
        let session = Session::new();
        assert!(!session.result_visible);
        assert!(session.show_banner);
        assert!(!session.submenu_active());
        assert!(!session.fullscreen);
        assert!(session.fatal_error.is_none());
        assert_eq!(session.kind, ResultKind::None);
        assert!(session.last_result.is_empty());
    }

    #[test]
    fn default_session_is_new_session() {
        assert_eq!(Session::default(), Session::new());
    }

    #[test]
    fn every_key_in_alphabet_is_bound_in_both_modes() {
        for key in "qohcrgwp123tbax".chars() {
            assert!(lookup(Mode::Main, key).is_some(), "{} unbound in main", key);
            assert!(lookup(Mode::TestSubmenu, key).is_some(), "{} unbound in submenu", key);
        }
    }

    #[test]
    fn unknown_keys_are_unbound() {
        for key in ['z', 'Q', 'C', '4', ' ', '0'] {
            assert_eq!(lookup(Mode::Main, key), None);
            assert_eq!(lookup(Mode::TestSubmenu, key), None);
        }
    }

    #[test]
    fn submenu_reassigns_h_r_w() {
        assert_eq!(lookup(Mode::Main, 'h'), Some(Command::Probe(Probe::Hdd)));
        assert_eq!(
            lookup(Mode::TestSubmenu, 'h'),
            Some(Command::LeaveSubmenuAndProbe(Probe::WriteTest))
        );
        assert_eq!(lookup(Mode::Main, 'r'), Some(Command::Probe(Probe::Ram)));
        assert_eq!(lookup(Mode::TestSubmenu, 'r'), Some(Command::LeaveSubmenu));
        assert_eq!(lookup(Mode::Main, 'w'), Some(Command::Probe(Probe::Wifi)));
        assert_eq!(lookup(Mode::TestSubmenu, 'w'), Some(Command::LeaveSubmenu));
    }

    #[test]
    fn other_keys_mean_the_same_in_both_modes() {
        for key in "qocgp123tbax".chars() {
            assert_eq!(lookup(Mode::Main, key), lookup(Mode::TestSubmenu, key));
        }
    }

    #[test]
    fn no_key_has_two_rows_for_the_same_mode() {
        for (i, a) in BINDINGS.iter().enumerate() {
            for b in &BINDINGS[i + 1..] {
                if a.key == b.key {
                    assert!(
                        a.scope != Scope::Any && b.scope != Scope::Any && a.scope != b.scope,
                        "overlapping rows for {}",
                        a.key
                    );
                }
            }
        }
    }

    #[test]
    fn result_kind_for_probes() {
        assert_eq!(ResultKind::for_probe(Probe::WriteTest), ResultKind::TestWrite);
        assert_eq!(ResultKind::for_probe(Probe::Format(FsType::JhfsPlus)), ResultKind::Format);
        assert_eq!(ResultKind::for_probe(Probe::OsInstall), ResultKind::OsInstall);
    }
}
