// Gateway backed by the Docker engine API via bollard

use async_trait::async_trait;
use bollard::Docker;
use bollard::models::VolumeCreateRequest;
use bollard::query_parameters::{
    CreateImageOptionsBuilder, InspectContainerOptions, ListContainersOptions, ListImagesOptions,
    ListVolumesOptions, LogsOptions, RemoveContainerOptions, RemoveImageOptions,
    RemoveVolumeOptions, RestartContainerOptions, StartContainerOptions, StatsOptions,
    StopContainerOptions,
};
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;

use super::stats;
use super::{Command, Gateway};
use crate::config::DockerConfig;
use crate::error::GatewayError;
use crate::models::ContainerAction;

pub struct DockerGateway {
    docker: Docker,
}

impl DockerGateway {
    /// Connects to `docker.socket`, or to `DOCKER_HOST` / the default unix socket when unset.
    pub fn connect(config: &DockerConfig) -> anyhow::Result<Self> {
        let docker = match &config.socket {
            Some(path) => Docker::connect_with_socket(
                path,
                config.timeout_secs,
                bollard::API_DEFAULT_VERSION,
            )?,
            None => Docker::connect_with_unix_defaults()?.with_timeout(
                std::time::Duration::from_secs(config.timeout_secs),
            ),
        };
        Ok(Self { docker })
    }

    async fn list_containers(&self) -> Result<Value, GatewayError> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(options)).await?;
        to_value(&containers)
    }

    async fn container_action(&self, id: &str, action: ContainerAction) -> Result<(), GatewayError> {
        match action {
            ContainerAction::Start => {
                self.docker
                    .start_container(id, None::<StartContainerOptions>)
                    .await?
            }
            ContainerAction::Stop => {
                self.docker
                    .stop_container(id, None::<StopContainerOptions>)
                    .await?
            }
            ContainerAction::Restart => {
                self.docker
                    .restart_container(id, None::<RestartContainerOptions>)
                    .await?
            }
            ContainerAction::Remove => {
                let options = RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                };
                self.docker.remove_container(id, Some(options)).await?
            }
            ContainerAction::Pause => self.docker.pause_container(id).await?,
            ContainerAction::Unpause => self.docker.unpause_container(id).await?,
        }
        Ok(())
    }

    async fn container_logs(&self, id: &str, tail: u32) -> Result<Value, GatewayError> {
        let options = LogsOptions {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.logs(id, Some(options));
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk?.to_string());
        }
        Ok(Value::String(text))
    }

    async fn inspect_container(&self, id: &str) -> Result<Value, GatewayError> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        to_json_text(&inspect)
    }

    async fn container_stats(&self, id: &str) -> Result<Value, GatewayError> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        let response = match stream.next().await {
            Some(r) => r?,
            None => return Err(GatewayError::Rejected("No stats available".into())),
        };
        let stats = stats::process_statistics(&response)
            .ok_or_else(|| GatewayError::Rejected("No stats available".into()))?;
        to_json_text(&stats)
    }

    async fn list_images(&self) -> Result<Value, GatewayError> {
        let images = self
            .docker
            .list_images(Some(ListImagesOptions::default()))
            .await?;
        to_value(&images)
    }

    /// Blocks until the whole pull finished; progress messages are only traced.
    async fn pull_image(&self, name: &str) -> Result<(), GatewayError> {
        let (repo, tag) = split_reference(name);
        let mut builder = CreateImageOptionsBuilder::default().from_image(repo);
        if let Some(tag) = tag {
            builder = builder.tag(tag);
        }
        let mut stream = self.docker.create_image(Some(builder.build()), None, None);
        while let Some(progress) = stream.next().await {
            progress?;
        }
        tracing::info!(image = name, "image pulled");
        Ok(())
    }

    async fn remove_image(&self, id: &str) -> Result<(), GatewayError> {
        self.docker
            .remove_image(id, None::<RemoveImageOptions>, None)
            .await?;
        Ok(())
    }

    async fn list_volumes(&self) -> Result<Value, GatewayError> {
        let response = self
            .docker
            .list_volumes(None::<ListVolumesOptions>)
            .await?;
        to_value(&response.volumes.unwrap_or_default())
    }

    async fn create_volume(&self, name: &str) -> Result<(), GatewayError> {
        let options = VolumeCreateRequest {
            name: Some(name.to_string()),
            ..Default::default()
        };
        self.docker.create_volume(options).await?;
        Ok(())
    }

    async fn remove_volume(&self, name: &str) -> Result<(), GatewayError> {
        self.docker
            .remove_volume(name, None::<RemoveVolumeOptions>)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Gateway for DockerGateway {
    async fn invoke(&self, command: &Command) -> Result<Value, GatewayError> {
        tracing::debug!(command = command.name(), args = %command.args(), "invoke");
        let result = match command {
            Command::ListContainers => self.list_containers().await,
            Command::ContainerAction {
                container_id,
                action,
            } => self
                .container_action(container_id, *action)
                .await
                .map(|()| Value::Null),
            Command::GetContainerLogs { container_id, tail } => {
                self.container_logs(container_id, *tail).await
            }
            Command::InspectContainer { container_id } => {
                self.inspect_container(container_id).await
            }
            Command::GetContainerStats { container_id } => {
                self.container_stats(container_id).await
            }
            Command::ListImages => self.list_images().await,
            Command::PullImage { image_name } => {
                self.pull_image(image_name).await.map(|()| Value::Null)
            }
            Command::RemoveImage { image_id } => {
                self.remove_image(image_id).await.map(|()| Value::Null)
            }
            Command::ListVolumes => self.list_volumes().await,
            Command::CreateVolume { volume_name } => {
                self.create_volume(volume_name).await.map(|()| Value::Null)
            }
            Command::RemoveVolume { volume_name } => {
                self.remove_volume(volume_name).await.map(|()| Value::Null)
            }
        };
        if let Err(e) = &result {
            tracing::debug!(command = command.name(), error = %e, "command rejected");
        }
        result
    }
}

fn to_value<T: Serialize>(v: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(v).map_err(|e| GatewayError::Rejected(format!("Failed to serialize: {}", e)))
}

fn to_json_text<T: Serialize>(v: &T) -> Result<Value, GatewayError> {
    serde_json::to_string(v)
        .map(Value::String)
        .map_err(|e| GatewayError::Rejected(format!("Failed to serialize: {}", e)))
}

/// Splits `repo[:tag]` for the create-image call. Untagged names pull `latest`,
/// digest references are passed through whole.
fn split_reference(name: &str) -> (&str, Option<&str>) {
    if name.contains('@') {
        return (name, None);
    }
    let name_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[name_start..].rfind(':') {
        Some(i) => (&name[..name_start + i], Some(&name[name_start + i + 1..])),
        None => (name, Some("latest")),
    }
}

#[cfg(test)]
mod tests {
    use super::split_reference;

    #[test]
    fn split_reference_defaults_to_latest() {
        assert_eq!(split_reference("nginx"), ("nginx", Some("latest")));
    }

    #[test]
    fn split_reference_keeps_explicit_tag() {
        assert_eq!(split_reference("redis:7-alpine"), ("redis", Some("7-alpine")));
    }

    #[test]
    fn split_reference_ignores_registry_port() {
        assert_eq!(
            split_reference("localhost:5000/team/app"),
            ("localhost:5000/team/app", Some("latest"))
        );
    }

    #[test]
    fn split_reference_passes_digest_through() {
        let name = "alpine@sha256:abcd";
        assert_eq!(split_reference(name), (name, None));
    }
}
