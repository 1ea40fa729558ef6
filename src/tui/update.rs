//! Pure state transitions: (Session, Input) → (Session, Transition).
//!
//! This is the core logic of the session. Fully testable without a terminal
//! or a machine to probe. Provider calls are only described here; the
//! effects layer runs them and hands the result to [`apply_probe_result`].

use crate::error::ProviderError;
use crate::provider::ProbeOutput;
use crate::types::Probe;

use super::state::{lookup, Command, Input, Mode, ResultKind, Session, Transition};

/// Pure state transition function.
///
/// Unbound keys leave the session untouched. A terminated session ignores
/// every input.
pub fn update(mut session: Session, input: &Input) -> (Session, Transition) {
    if session.is_terminated() {
        return (session, Transition::Continue);
    }

    let command = match input {
        Input::QuitRequested => Command::Quit,
        Input::Key(key) => match lookup(session.mode, *key) {
            Some(command) => command,
            None => return (session, Transition::Continue),
        },
    };

    if command == Command::Quit {
        return (session, Transition::Quit);
    }

    // Every other bound key counts as the operator's first interaction.
    session.show_banner = false;

    let transition = match command {
        Command::Probe(probe) => Transition::Probe(probe),
        Command::LeaveSubmenuAndProbe(probe) => {
            session.mode = Mode::Main;
            Transition::Probe(probe)
        }
        Command::LeaveSubmenu => {
            session.mode = Mode::Main;
            session.result_visible = false;
            Transition::Continue
        }
        Command::EnterSubmenu => {
            session.mode = Mode::TestSubmenu;
            session.kind = ResultKind::TestMenu;
            session.result_visible = true;
            Transition::Continue
        }
        Command::Back => {
            session.result_visible = false;
            Transition::Continue
        }
        Command::ToggleFullscreen => {
            session.fullscreen = !session.fullscreen;
            Transition::Continue
        }
        Command::DismissBanner => Transition::Continue,
        Command::Quit => Transition::Quit,
    };

    (session, transition)
}

/// Fold a provider result into the session.
///
/// Success shows the result under the probe's kind. A refused precondition
/// shows the old-OS screen. A recoverable failure changes nothing: the
/// previous screen stays up. A fatal failure terminates the session.
pub fn apply_probe_result(
    mut session: Session,
    probe: Probe,
    result: Result<ProbeOutput, ProviderError>,
) -> Session {
    match result {
        Ok(ProbeOutput::Report(text)) => {
            session.last_result = text;
            session.kind = ResultKind::for_probe(probe);
            session.result_visible = true;
        }
        Ok(ProbeOutput::PreconditionNotMet) => {
            session.kind = ResultKind::OldOs;
            session.result_visible = true;
        }
        Err(e) if e.is_fatal() => {
            session.fatal_error = Some(e.to_string());
        }
        Err(_) => {}
    }
    session
}

/// Auto-return: a result is shown for exactly one frame, after which the
/// next frame falls back to the main menu.
///
/// Called by the event loop after each drawn frame, so the renderer itself
/// never mutates the session.
pub fn after_render(mut session: Session) -> Session {
    if session.result_visible && !session.is_terminated() {
        session.result_visible = false;
    }
    session
}

// ============================================================================
// TESTS
// ============================================================================
