//! Password reset wizard.
//!
//! - [`flow`]: pure state machine (`Event` in, `Effect` out).
//! - [`wizard`]: async driver that runs effects against a [`ResetApi`](crate::api::ResetApi)
//!   and a [`Navigator`].
//! - [`redirect`]: the cancellable post-reset redirect.
//! - [`validate`]: local field rules.

pub mod flow;
pub mod navigator;
pub mod redirect;
pub mod state;
pub mod validate;
pub mod wizard;

pub use flow::{Effect, Event, ResetFlow};
pub use navigator::{Navigation, NavigationContext, Navigator, Route};
pub use redirect::{ScheduledRedirect, DEFAULT_REDIRECT_DELAY};
pub use state::{Status, StatusKind, Step, Submission, WizardState};
pub use validate::ValidationError;
pub use wizard::Wizard;
