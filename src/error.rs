// Error taxonomy: gateway call failures and the banner-level dashboard errors built from them

use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::models::ContainerAction;
use crate::store::EntityRef;

/// Failure of a single gateway call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend rejected the command; the text is shown as-is.
    #[error("{0}")]
    Rejected(String),
    /// The backend answered, but not in the shape the command promises.
    #[error("{command}: unexpected response shape: {source}")]
    Decode {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<bollard::errors::Error> for GatewayError {
    fn from(e: bollard::errors::Error) -> Self {
        GatewayError::Rejected(e.to_string())
    }
}

impl GatewayError {
    pub fn is_decode(&self) -> bool {
        matches!(self, GatewayError::Decode { .. })
    }
}

/// Which query a fetch failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchTarget {
    Containers,
    Images,
    Volumes,
    Logs,
    Inspect,
    Stats,
}

/// User-triggered mutation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Container(ContainerAction),
    PullImage,
    RemoveImage,
    CreateVolume,
    RemoveVolume,
}

/// What the global error banner holds. Display is the cause text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DashboardError {
    #[error("{cause}")]
    FetchFailed {
        target: FetchTarget,
        cause: Arc<GatewayError>,
    },
    #[error("{cause}")]
    ActionFailed {
        entity: EntityRef,
        action: ActionKind,
        cause: Arc<GatewayError>,
    },
}

impl DashboardError {
    pub fn fetch(target: FetchTarget, cause: GatewayError) -> Self {
        DashboardError::FetchFailed {
            target,
            cause: Arc::new(cause),
        }
    }

    pub fn action(entity: EntityRef, action: ActionKind, cause: GatewayError) -> Self {
        DashboardError::ActionFailed {
            entity,
            action,
            cause: Arc::new(cause),
        }
    }

    pub fn cause(&self) -> &GatewayError {
        match self {
            DashboardError::FetchFailed { cause, .. } | DashboardError::ActionFailed { cause, .. } => {
                cause
            }
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum DashboardErrorRepr<'a> {
    #[serde(rename_all = "camelCase")]
    FetchFailed {
        target: FetchTarget,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    ActionFailed {
        entity: &'a EntityRef,
        action: ActionKind,
        message: String,
    },
}

impl Serialize for DashboardError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            DashboardError::FetchFailed { target, cause } => DashboardErrorRepr::FetchFailed {
                target: *target,
                message: cause.to_string(),
            },
            DashboardError::ActionFailed {
                entity,
                action,
                cause,
            } => DashboardErrorRepr::ActionFailed {
                entity,
                action: *action,
                message: cause.to_string(),
            },
        };
        repr.serialize(serializer)
    }
}
