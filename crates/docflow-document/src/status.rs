//! Remote status to outcome mapping

use docflow_cloud::{DocumentStatus, OperationStatus};

/// Total mapping from the normalized document status to an invocation outcome.
///
/// Only `Creating` keeps the workflow going. Anything other than `Active`
/// fails; an unrecognized status never reaches this point because parsing
/// rejects it.
pub fn operation_status(status: DocumentStatus) -> OperationStatus {
    match status {
        DocumentStatus::Active => OperationStatus::Success,
        DocumentStatus::Creating => OperationStatus::InProgress,
        DocumentStatus::Updating | DocumentStatus::Deleting | DocumentStatus::Failed => {
            OperationStatus::Failed
        }
    }
}
