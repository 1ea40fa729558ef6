//! Action provider boundary.
//!
//! The session never touches the machine directly. Every hardware query or
//! mutation goes through an [`ActionProvider`], a synchronous call that
//! yields text or a failure. [`crate::platform::SystemProvider`] is the real
//! implementation; tests substitute fakes.

use crate::error::ProviderError;
use crate::types::Probe;

/// Successful outcome of a provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutput {
    /// Raw text produced by the action.
    Report(String),
    /// The action refused to run because the machine does not qualify
    /// (e.g. booted OS too old for the install flow).
    PreconditionNotMet,
}

/// Performs probes on behalf of the session.
///
/// Calls block until the underlying action completes. There is no timeout.
pub trait ActionProvider {
    fn run(&self, probe: Probe) -> Result<ProbeOutput, ProviderError>;
}

impl<P: ActionProvider + ?Sized> ActionProvider for &P {
    fn run(&self, probe: Probe) -> Result<ProbeOutput, ProviderError> {
        (**self).run(probe)
    }
}
