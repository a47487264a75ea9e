//! Application layer for usergate.
//!
//! Use cases that combine the session store with the account directory:
//! registration, sign-in, route gating, and moderation.

pub mod gate;
pub mod moderation;
pub mod registration;
pub mod sign_in;

pub use gate::{GateDecision, MountedGate, SessionGate};
pub use moderation::{BatchAction, BatchReport, ModerationError, ModerationState, ModerationWorkflow, SelectionSet};
pub use registration::{Registered, RegistrationError, RegistrationUseCase};
pub use sign_in::{SignInError, SignInUseCase, SignedIn};
