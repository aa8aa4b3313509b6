// Remote command gateway: named commands in, JSON out.
// GatewayClient decodes every result against the model it promises before anything reaches the store.

mod docker;
mod stats;

pub use docker::DockerGateway;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::GatewayError;
use crate::models::{Container, ContainerAction, ContainerInspect, ContainerStats, Image, Volume};

/// Every command the dashboard issues, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListContainers,
    ContainerAction {
        container_id: String,
        action: ContainerAction,
    },
    GetContainerLogs {
        container_id: String,
        tail: u32,
    },
    InspectContainer {
        container_id: String,
    },
    GetContainerStats {
        container_id: String,
    },
    ListImages,
    PullImage {
        image_name: String,
    },
    RemoveImage {
        image_id: String,
    },
    ListVolumes,
    CreateVolume {
        volume_name: String,
    },
    RemoveVolume {
        volume_name: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::ListContainers => "list_containers",
            Command::ContainerAction { .. } => "container_action",
            Command::GetContainerLogs { .. } => "get_container_logs",
            Command::InspectContainer { .. } => "inspect_container",
            Command::GetContainerStats { .. } => "get_container_stats",
            Command::ListImages => "list_images",
            Command::PullImage { .. } => "pull_image",
            Command::RemoveImage { .. } => "remove_image",
            Command::ListVolumes => "list_volumes",
            Command::CreateVolume { .. } => "create_volume",
            Command::RemoveVolume { .. } => "remove_volume",
        }
    }

    /// Argument object as sent over the wire (camelCase keys).
    pub fn args(&self) -> Value {
        match self {
            Command::ListContainers | Command::ListImages | Command::ListVolumes => json!({}),
            Command::ContainerAction {
                container_id,
                action,
            } => json!({ "containerId": container_id, "action": action.as_str() }),
            Command::GetContainerLogs { container_id, tail } => {
                json!({ "containerId": container_id, "tail": tail })
            }
            Command::InspectContainer { container_id }
            | Command::GetContainerStats { container_id } => json!({ "containerId": container_id }),
            Command::PullImage { image_name } => json!({ "imageName": image_name }),
            Command::RemoveImage { image_id } => json!({ "imageId": image_id }),
            Command::CreateVolume { volume_name } | Command::RemoveVolume { volume_name } => {
                json!({ "volumeName": volume_name })
            }
        }
    }
}

/// Request/response channel to whatever actually talks to the container engine.
/// A rejected call is the only error signal; there is no streaming or progress.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn invoke(&self, command: &Command) -> Result<Value, GatewayError>;
}

/// Typed front for a [`Gateway`].
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<dyn Gateway>,
}

impl GatewayClient {
    pub fn new(inner: Arc<dyn Gateway>) -> Self {
        Self { inner }
    }

    async fn call(&self, command: Command) -> Result<Value, GatewayError> {
        self.inner.invoke(&command).await
    }

    pub async fn list_containers(&self) -> Result<Vec<Container>, GatewayError> {
        let value = self.call(Command::ListContainers).await?;
        decode("list_containers", value)
    }

    pub async fn container_action(
        &self,
        container_id: &str,
        action: ContainerAction,
    ) -> Result<(), GatewayError> {
        self.call(Command::ContainerAction {
            container_id: container_id.to_string(),
            action,
        })
        .await
        .map(drop)
    }

    pub async fn container_logs(&self, container_id: &str, tail: u32) -> Result<String, GatewayError> {
        let value = self
            .call(Command::GetContainerLogs {
                container_id: container_id.to_string(),
                tail,
            })
            .await?;
        decode("get_container_logs", value)
    }

    pub async fn inspect_container(&self, container_id: &str) -> Result<ContainerInspect, GatewayError> {
        let value = self
            .call(Command::InspectContainer {
                container_id: container_id.to_string(),
            })
            .await?;
        decode_json_text("inspect_container", value)
    }

    pub async fn container_stats(&self, container_id: &str) -> Result<ContainerStats, GatewayError> {
        let value = self
            .call(Command::GetContainerStats {
                container_id: container_id.to_string(),
            })
            .await?;
        decode_json_text("get_container_stats", value)
    }

    pub async fn list_images(&self) -> Result<Vec<Image>, GatewayError> {
        let value = self.call(Command::ListImages).await?;
        decode("list_images", value)
    }

    pub async fn pull_image(&self, image_name: &str) -> Result<(), GatewayError> {
        self.call(Command::PullImage {
            image_name: image_name.to_string(),
        })
        .await
        .map(drop)
    }

    pub async fn remove_image(&self, image_id: &str) -> Result<(), GatewayError> {
        self.call(Command::RemoveImage {
            image_id: image_id.to_string(),
        })
        .await
        .map(drop)
    }

    pub async fn list_volumes(&self) -> Result<Vec<Volume>, GatewayError> {
        let value = self.call(Command::ListVolumes).await?;
        decode("list_volumes", value)
    }

    pub async fn create_volume(&self, volume_name: &str) -> Result<(), GatewayError> {
        self.call(Command::CreateVolume {
            volume_name: volume_name.to_string(),
        })
        .await
        .map(drop)
    }

    pub async fn remove_volume(&self, volume_name: &str) -> Result<(), GatewayError> {
        self.call(Command::RemoveVolume {
            volume_name: volume_name.to_string(),
        })
        .await
        .map(drop)
    }
}

fn decode<T: DeserializeOwned>(command: &'static str, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|source| decode_error(command, source))
}

/// Inspect and stats come back as JSON text; an already-parsed object is accepted too.
fn decode_json_text<T: DeserializeOwned>(
    command: &'static str,
    value: Value,
) -> Result<T, GatewayError> {
    match value {
        Value::String(text) => {
            serde_json::from_str(&text).map_err(|source| decode_error(command, source))
        }
        other => decode(command, other),
    }
}

fn decode_error(command: &'static str, source: serde_json::Error) -> GatewayError {
    tracing::warn!(
        command,
        error = %source,
        operation = "decode_response",
        "gateway response failed schema check"
    );
    GatewayError::Decode { command, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_match_backend_handlers() {
        assert_eq!(Command::ListContainers.name(), "list_containers");
        assert_eq!(
            Command::GetContainerLogs {
                container_id: "x".into(),
                tail: 1
            }
            .name(),
            "get_container_logs"
        );
        assert_eq!(
            Command::RemoveVolume {
                volume_name: "v".into()
            }
            .name(),
            "remove_volume"
        );
    }

    #[test]
    fn container_action_args_are_camel_case() {
        let cmd = Command::ContainerAction {
            container_id: "abc123".into(),
            action: ContainerAction::Stop,
        };
        assert_eq!(
            cmd.args(),
            json!({ "containerId": "abc123", "action": "stop" })
        );
    }

    #[test]
    fn decode_json_text_parses_string_payload() {
        let text = r#"{"cpu_percent":1.5,"memory_usage":10,"memory_limit":100,"memory_percent":10.0}"#;
        let stats: ContainerStats =
            decode_json_text("get_container_stats", Value::String(text.into())).unwrap();
        assert_eq!(stats.memory_usage, 10);
        assert_eq!(stats.network_rx, 0);
    }

    #[test]
    fn decode_reports_command_on_shape_mismatch() {
        let err = decode::<Vec<Container>>("list_containers", json!({ "oops": true })).unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().starts_with("list_containers:"));
    }
}
