//! Session effects boundary: event loop, terminal lifecycle, key mapping.
//!
//! This is the only TUI module with side effects. It wires the pure layers
//! (state, update, view) to the real terminal via crossterm and ratatui,
//! and runs provider calls on the loop thread.
//!
//! The loop is strictly sequential: read one key, dispatch it to completion
//! (including any blocking provider call), draw, then read again. Keys
//! pressed while a probe runs wait in the terminal's input buffer.

use std::io::{self, IsTerminal, Stdout};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::error::AppError;
use crate::provider::ActionProvider;

use super::state::{App, Input, Transition};
use super::theme::Theme;
use super::update::{after_render, apply_probe_result, update};
use super::view::render;

type Term = Terminal<CrosstermBackend<Stdout>>;

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to a session input.
///
/// Returns None for releases, repeats, non-character keys, and chords
/// other than Ctrl+C.
pub fn map_key(key: KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::QuitRequested);
    }

    // Chords are not menu keys; Shift only changes the character
    if !KeyModifiers::SHIFT.contains(key.modifiers) {
        return None;
    }

    match key.code {
        KeyCode::Char(c) => Some(Input::Key(c)),
        _ => None,
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Dispatch one input to completion.
///
/// Runs the pure update, performs the requested provider call (at most
/// one), and folds its result back into the session. Provider failures
/// are logged here and never escape.
pub fn process_input<P: ActionProvider + ?Sized>(app: &mut App, input: &Input, provider: &P) {
    let session = std::mem::take(&mut app.session);
    let (session, transition) = update(session, input);

    app.session = match transition {
        Transition::Continue => session,
        Transition::Quit => {
            tracing::info!("quit requested");
            app.should_quit = true;
            session
        }
        Transition::Probe(probe) => {
            tracing::info!(%probe, "running probe");
            let result = provider.run(probe);
            match &result {
                Ok(_) => tracing::info!(%probe, "probe finished"),
                Err(e) if e.is_fatal() => tracing::error!(%probe, error = %e, "session cannot continue"),
                Err(e) => tracing::warn!(%probe, error = %e, "probe failed"),
            }
            apply_probe_result(session, probe, result)
        }
    };
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode. Starts on the main screen.
fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal(fullscreen: bool) -> io::Result<()> {
    disable_raw_mode()?;
    if fullscreen {
        io::stdout().execute(LeaveAlternateScreen)?;
    }
    io::stdout().execute(crossterm::cursor::Show)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort: leaving an alternate screen we never entered is harmless
        let _ = restore_terminal(true);
        original_hook(panic_info);
    }));
}

/// Enter or leave the alternate screen and force a full redraw.
fn apply_fullscreen(terminal: &mut Term, fullscreen: bool) -> io::Result<()> {
    if fullscreen {
        io::stdout().execute(EnterAlternateScreen)?;
    } else {
        io::stdout().execute(LeaveAlternateScreen)?;
    }
    terminal.clear()
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the interactive session until the operator quits.
///
/// Returns `AppError::Fatal` when the session recorded a fatal error; the
/// error frame has been drawn by then.
pub fn run<P: ActionProvider + ?Sized>(provider: &P, theme: Theme) -> Result<(), AppError> {
    if !io::stdin().is_terminal() {
        return Err(AppError::NotInteractive);
    }

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let mut app = App::new();

    tracing::info!("session started");
    let result = event_loop(&mut terminal, &mut app, provider, &theme);

    let restored = restore_terminal(app.session.fullscreen);
    tracing::info!("session ended");
    session_outcome(result, restored, app.session.fatal_error)
}

/// Exit status of a finished session. A loop error outranks a restore
/// error, and both outrank a recorded fatal error.
fn session_outcome(
    looped: io::Result<()>,
    restored: io::Result<()>,
    fatal_error: Option<String>,
) -> Result<(), AppError> {
    looped?;
    restored?;
    match fatal_error {
        Some(message) => Err(AppError::Fatal(message)),
        None => Ok(()),
    }
}

fn event_loop<P: ActionProvider + ?Sized>(
    terminal: &mut Term,
    app: &mut App,
    provider: &P,
    theme: &Theme,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(&app.session, theme, frame))?;

        if app.should_quit || app.session.is_terminated() {
            return Ok(());
        }
        app.session = after_render(std::mem::take(&mut app.session));

        let input = match event::read()? {
            Event::Key(key) => match map_key(key) {
                Some(input) => input,
                None => continue,
            },
            _ => continue, // resize and mouse events just redraw
        };

        let was_fullscreen = app.session.fullscreen;
        process_input(app, &input, provider);

        if app.session.fullscreen != was_fullscreen {
            apply_fullscreen(terminal, app.session.fullscreen)?;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::error::ProviderError;
    use crate::provider::ProbeOutput;
    use crate::tui::state::{ResultKind, Session};
    use crate::tui::view::{compose, Composition};
    use crate::types::{FsType, Probe};

    /// Records every call and answers from a fixed script.
    struct FakeProvider {
        calls: RefCell<Vec<Probe>>,
        answer: fn(Probe) -> Result<ProbeOutput, ProviderError>,
    }

    impl FakeProvider {
        fn new(answer: fn(Probe) -> Result<ProbeOutput, ProviderError>) -> Self {
            FakeProvider {
                calls: RefCell::new(Vec::new()),
                answer,
            }
        }

        fn echo() -> Self {
            FakeProvider::new(|probe| Ok(ProbeOutput::Report(format!("{} output", probe))))
        }

        fn calls(&self) -> Vec<Probe> {
            self.calls.borrow().clone()
        }
    }

    impl ActionProvider for FakeProvider {
        fn run(&self, probe: Probe) -> Result<ProbeOutput, ProviderError> {
            self.calls.borrow_mut().push(probe);
            (self.answer)(probe)
        }
    }

    fn press(app: &mut App, provider: &FakeProvider, keys: &str) {
        for c in keys.chars() {
            process_input(app, &Input::Key(c), provider);
        }
    }

    fn body_text(session: &Session) -> String {
        match compose(session, &Theme::PLAIN) {
            Composition::Screen { body, .. } => body
                .iter()
                .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
                .collect::<Vec<_>>()
                .join("\n"),
            Composition::Fatal(_) => panic!("unexpected fatal frame"),
        }
    }

    // -- Key mapping --

    #[test]
    fn ctrl_c_maps_to_quit_signal() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key), Some(Input::QuitRequested));
    }

    #[test]
    fn plain_c_maps_to_key() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(map_key(key), Some(Input::Key('c')));
    }

    #[test]
    fn non_character_keys_are_ignored() {
        for code in [KeyCode::Enter, KeyCode::Esc, KeyCode::Up, KeyCode::F(1)] {
            assert_eq!(map_key(KeyEvent::new(code, KeyModifiers::NONE)), None);
        }
    }

    #[test]
    fn alt_and_ctrl_chords_are_ignored() {
        for (c, modifiers) in [
            ('1', KeyModifiers::ALT),
            ('2', KeyModifiers::ALT),
            ('r', KeyModifiers::CONTROL),
            ('q', KeyModifiers::CONTROL | KeyModifiers::SHIFT),
        ] {
            assert_eq!(map_key(KeyEvent::new(KeyCode::Char(c), modifiers)), None);
        }
    }

    #[test]
    fn shifted_character_is_a_key() {
        let key = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(map_key(key), Some(Input::Key('Q')));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }

    // -- Scenarios --

    #[test]
    fn cpu_scenario() {
        let provider = FakeProvider::new(|_| Ok(ProbeOutput::Report("Apple M1 Pro\n".into())));
        let mut app = App::new();

        press(&mut app, &provider, "c");

        assert_eq!(provider.calls(), vec![Probe::Cpu]);
        assert_eq!(app.session.kind, ResultKind::Cpu);
        assert!(!app.session.show_banner);
        assert!(app.session.result_visible);
        assert!(body_text(&app.session).contains("CPU is: Apple M1 Pro"));
    }

    #[test]
    fn submenu_r_and_w_make_no_calls() {
        for exit_key in ['r', 'w'] {
            let provider = FakeProvider::echo();
            let mut app = App::new();

            press(&mut app, &provider, "t");
            assert_eq!(app.session.kind, ResultKind::TestMenu);
            assert!(app.session.submenu_active());

            press(&mut app, &provider, &exit_key.to_string());
            assert!(provider.calls().is_empty());
            assert!(!app.session.submenu_active());
            assert!(!app.session.result_visible);
            assert!(body_text(&app.session).contains("Please enter a command"));
        }
    }

    #[test]
    fn submenu_h_runs_write_test_once() {
        let provider = FakeProvider::new(|_| Ok(ProbeOutput::Report("512 MiB/s".into())));
        let mut app = App::new();

        press(&mut app, &provider, "th");

        assert_eq!(provider.calls(), vec![Probe::WriteTest]);
        assert!(!app.session.submenu_active());
        assert_eq!(app.session.kind, ResultKind::TestWrite);
        assert!(body_text(&app.session).contains("Write Test: 512 MiB/s"));
    }

    #[test]
    fn h_outside_submenu_probes_disk() {
        let provider = FakeProvider::echo();
        let mut app = App::new();
        press(&mut app, &provider, "h");
        assert_eq!(provider.calls(), vec![Probe::Hdd]);
        assert_eq!(app.session.kind, ResultKind::Hdd);
    }

    #[test]
    fn os_install_precondition_scenario() {
        let provider = FakeProvider::new(|_| Ok(ProbeOutput::PreconditionNotMet));
        let mut app = App::new();

        press(&mut app, &provider, "o");

        assert_eq!(app.session.kind, ResultKind::OldOs);
        let text = body_text(&app.session);
        assert!(text.contains("too old"));
        assert!(!text.contains("[b]ack to menu"));
    }

    #[test]
    fn fusion_failure_keeps_previous_kind() {
        let provider = FakeProvider::new(|probe| match probe {
            Probe::Format(FsType::Fusion) => Err(ProviderError::Unimplemented("Fusion Drive format")),
            other => Ok(ProbeOutput::Report(format!("{} output", other))),
        });
        let mut app = App::new();

        press(&mut app, &provider, "g3");

        assert_eq!(
            provider.calls(),
            vec![Probe::Gpu, Probe::Format(FsType::Fusion)]
        );
        assert_eq!(app.session.kind, ResultKind::Gpu);
        assert_eq!(app.session.last_result, "gpu output");
        assert!(!app.should_quit);
        assert!(app.session.fatal_error.is_none());
    }

    #[test]
    fn fatal_provider_error_terminates_session() {
        let provider = FakeProvider::new(|_| {
            Err(ProviderError::SessionFatal("cannot read /: permission denied".into()))
        });
        let mut app = App::new();

        press(&mut app, &provider, "oc");

        // Only the first call happens: the session is terminated after it.
        assert_eq!(provider.calls(), vec![Probe::OsInstall]);
        assert_eq!(
            app.session.fatal_error.as_deref(),
            Some("cannot read /: permission denied")
        );
        assert!(matches!(
            compose(&app.session, &Theme::PLAIN),
            Composition::Fatal(_)
        ));
    }

    #[test]
    fn quit_sets_flag_without_calls() {
        let provider = FakeProvider::echo();
        let mut app = App::new();
        process_input(&mut app, &Input::Key('q'), &provider);
        assert!(app.should_quit);
        assert!(provider.calls().is_empty());

        let mut app = App::new();
        process_input(&mut app, &Input::QuitRequested, &provider);
        assert!(app.should_quit);
    }

    #[test]
    fn one_call_per_probe_key() {
        let provider = FakeProvider::echo();
        let mut app = App::new();
        press(&mut app, &provider, "crgp12zxab");
        assert_eq!(
            provider.calls(),
            vec![
                Probe::Cpu,
                Probe::Ram,
                Probe::Gpu,
                Probe::Ping,
                Probe::Format(FsType::Apfs),
                Probe::Format(FsType::JhfsPlus),
            ]
        );
    }

    #[test]
    fn result_then_menu_on_consecutive_frames() {
        let provider = FakeProvider::echo();
        let mut app = App::new();
        press(&mut app, &provider, "c");

        assert!(body_text(&app.session).contains("CPU is: cpu output"));
        app.session = after_render(std::mem::take(&mut app.session));
        assert!(body_text(&app.session).contains("Please enter a command"));
        app.session = after_render(std::mem::take(&mut app.session));
        assert!(body_text(&app.session).contains("Please enter a command"));
    }

    #[test]
    fn loop_error_is_reported_before_restore_error() {
        let looped = Err(io::Error::other("read failed"));
        let restored = Err(io::Error::other("restore failed"));
        let err = session_outcome(looped, restored, None).unwrap_err();
        assert!(err.to_string().contains("read failed"));
    }

    #[test]
    fn restore_error_is_reported_after_clean_loop() {
        let restored = Err(io::Error::other("restore failed"));
        let err = session_outcome(Ok(()), restored, Some("fatal".into())).unwrap_err();
        assert!(err.to_string().contains("restore failed"));
    }

    #[test]
    fn fatal_error_is_reported_after_clean_shutdown() {
        let err = session_outcome(Ok(()), Ok(()), Some("cannot read /".into())).unwrap_err();
        assert!(matches!(err, AppError::Fatal(ref m) if m == "cannot read /"));
        assert!(session_outcome(Ok(()), Ok(()), None).is_ok());
    }
}
