//! Interactive session.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: Pure data types (Session, Input, key bindings, Transition)
//! - `update`: Pure transitions
//! - `view`: Pure rendering
//! - `theme`: Style table handed to the renderer
//! - `run`: Effects (terminal, event loop, provider calls)

pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::run;
pub use theme::Theme;
