pub mod check;
pub mod queue;
pub mod results;
pub mod session;

pub use check::{cmd_check, CheckArgs};
pub use queue::{cmd_queue, QueueArgs};
pub use results::{cmd_results, ResultsArgs};
pub use session::{cmd_session, SessionArgs};
