// Identity of an entity an action can be pending on

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Container,
    Image,
    Volume,
}

/// Pending flags are keyed by kind + id (image reference for pulls, name for volumes).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Container,
            id: id.into(),
        }
    }

    pub fn image(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Image,
            id: id.into(),
        }
    }

    pub fn volume(name: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Volume,
            id: name.into(),
        }
    }
}
