// Navigation state: sidebar tabs and container detail sub-tabs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Containers,
    Images,
    Volumes,
    Builds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTab {
    #[default]
    Logs,
    Inspect,
    Stats,
    /// Interactive shell is not wired up; the tab renders a notice only.
    Terminal,
}
