// Domain models shared by the gateway, the store and the views

mod builds;
mod container;
mod image;
mod inspect;
mod stats;
mod tab;
mod volume;

pub use builds::{BuildRecord, BuildStatus};
pub use container::{Container, ContainerAction, ContainerState, Port};
pub use image::Image;
pub use inspect::{
    ContainerConfig, ContainerInspect, Mount, NetworkSettings, PortBinding, ProcessState,
};
pub use stats::ContainerStats;
pub use tab::{DetailTab, Tab};
pub use volume::{UsageData, Volume};
