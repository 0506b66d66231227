//! Page-stage inference and per-stage actions.
//!
//! After an uncontrolled navigation the loaded page's position in the portal
//! workflow is unknown, so each invocation classifies one observed
//! [`model::PageSnapshot`] against an ordered predicate table
//! (most-terminal stage first) and drives exactly one stage's worth of
//! actions through the [`driver::PortalDriver`] seam. Nothing here touches
//! the session record; the controller interprets the returned
//! [`handler::StageOutcome`].

pub mod detect;
pub mod driver;
pub mod errors;
pub mod handler;
pub mod model;
pub mod nav;

pub use detect::detect_stage;
pub use driver::{DriverError, PortalDriver};
pub use errors::StageFlowError;
pub use handler::{run_stage, StageOutcome};
pub use model::{PageSnapshot, Stage};
