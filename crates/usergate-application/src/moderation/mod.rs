//! Account moderation.
//!
//! # Module Structure
//!
//! - `selection`: `SelectionSet`, the checked ids
//! - `report`: `BatchAction`, `BatchReport`
//! - `workflow`: `ModerationWorkflow`, the list state machine

mod report;
mod selection;
mod workflow;

pub use report::{BatchAction, BatchReport};
pub use selection::SelectionSet;
pub use workflow::{DEFAULT_BATCH_CONCURRENCY, ModerationError, ModerationState, ModerationWorkflow};
