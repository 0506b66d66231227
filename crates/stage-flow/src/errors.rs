use thiserror::Error;

use crate::driver::DriverError;
use crate::model::Stage;

/// Failure while driving one stage. Carries the stage so the session status
/// can say where an item died.
#[derive(Debug, Error)]
pub enum StageFlowError {
    #[error("{stage}: {source}")]
    Driver {
        stage: Stage,
        #[source]
        source: DriverError,
    },

    #[error("{stage}: configuration selection was not applied")]
    SelectionRejected { stage: Stage },
}

impl StageFlowError {
    pub fn stage(&self) -> Stage {
        match self {
            StageFlowError::Driver { stage, .. } => *stage,
            StageFlowError::SelectionRejected { stage } => *stage,
        }
    }
}

pub(crate) fn at(stage: Stage) -> impl FnOnce(DriverError) -> StageFlowError {
    move |source| StageFlowError::Driver { stage, source }
}
