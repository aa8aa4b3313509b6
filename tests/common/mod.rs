// Shared test helpers: a scripted gateway and engine-shaped fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use colima_dash::config::{LogsConfig, PollingConfig};
use colima_dash::dashboard::Dashboard;
use colima_dash::error::GatewayError;
use colima_dash::gateway::{Command, Gateway};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type Responder = Box<dyn Fn(&Command) -> Result<Value, String> + Send + Sync>;

/// Gateway that answers from per-command scripts and records every call.
/// Unscripted lists answer `[]`, logs `""`, actions `null`; inspect/stats reject.
#[derive(Default)]
pub struct FakeGateway {
    responders: Mutex<HashMap<&'static str, Responder>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
    calls: Mutex<Vec<Command>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every later call of `command` returns `result`.
    pub fn set(&self, command: &'static str, result: Result<Value, &str>) {
        let result = result.map_err(str::to_string);
        self.respond(command, move |_| result.clone());
    }

    pub fn respond(
        &self,
        command: &'static str,
        f: impl Fn(&Command) -> Result<Value, String> + Send + Sync + 'static,
    ) {
        self.responders
            .lock()
            .unwrap()
            .insert(command, Box::new(f));
    }

    /// Calls of `command` block until the returned semaphore receives permits.
    pub fn gate(&self, command: &'static str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(command, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<Command> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name() == command)
            .count()
    }
}

fn unscripted(command: &Command) -> Result<Value, String> {
    match command {
        Command::ListContainers | Command::ListImages | Command::ListVolumes => Ok(json!([])),
        Command::GetContainerLogs { .. } => Ok(json!("")),
        Command::InspectContainer { .. } | Command::GetContainerStats { .. } => {
            Err(format!("{} not scripted", command.name()))
        }
        _ => Ok(Value::Null),
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn invoke(&self, command: &Command) -> Result<Value, GatewayError> {
        self.calls.lock().unwrap().push(command.clone());
        let gate = self.gates.lock().unwrap().get(command.name()).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        let responders = self.responders.lock().unwrap();
        let result = match responders.get(command.name()) {
            Some(f) => f(command),
            None => unscripted(command),
        };
        result.map_err(GatewayError::Rejected)
    }
}

pub fn dashboard(gateway: Arc<FakeGateway>) -> Dashboard {
    Dashboard::new(gateway, PollingConfig::default(), LogsConfig::default())
}

pub fn container_json(id: &str, name: &str, state: &str) -> Value {
    json!({
        "Id": id,
        "Names": [name],
        "Image": "nginx:latest",
        "ImageID": "sha256:4f67c83422ec",
        "Command": "nginx -g 'daemon off;'",
        "Created": 1_700_000_000,
        "Ports": [{ "IP": "0.0.0.0", "PrivatePort": 80, "PublicPort": 8080, "Type": "tcp" }],
        "State": state,
        "Status": if state == "running" { "Up 5 minutes" } else { "Exited (0) 1 minute ago" },
        "Labels": {}
    })
}

pub fn image_json(id: &str, tag: &str) -> Value {
    json!({
        "Id": id,
        "ParentId": "",
        "RepoTags": [tag],
        "RepoDigests": [],
        "Created": 1_700_000_000,
        "Size": 187_654_321,
        "SharedSize": -1,
        "Labels": null,
        "Containers": -1
    })
}

pub fn volume_json(name: &str) -> Value {
    json!({
        "Name": name,
        "Driver": "local",
        "Mountpoint": format!("/var/lib/docker/volumes/{}/_data", name),
        "CreatedAt": "2024-03-01T10:00:00Z",
        "Labels": null,
        "Scope": "local",
        "Options": null
    })
}

pub fn inspect_json(id: &str) -> Value {
    json!({
        "Id": id,
        "Created": "2024-03-01T10:00:00.000000000Z",
        "Path": "nginx",
        "Args": ["-g", "daemon off;"],
        "State": {
            "Status": "running", "Running": true, "Paused": false, "Restarting": false,
            "OOMKilled": false, "Dead": false, "Pid": 4242, "ExitCode": 0, "Error": "",
            "StartedAt": "2024-03-01T10:00:01Z", "FinishedAt": "0001-01-01T00:00:00Z"
        },
        "Image": "sha256:4f67c83422ec",
        "Name": "/web",
        "RestartCount": 0,
        "Config": {
            "Hostname": "web", "Env": ["PATH=/usr/bin"], "Cmd": ["nginx"],
            "Image": "nginx:latest", "WorkingDir": "", "Labels": {}
        },
        "NetworkSettings": {
            "IPAddress": "172.17.0.2",
            "Ports": { "80/tcp": [{ "HostIp": "0.0.0.0", "HostPort": "8080" }] }
        },
        "Mounts": []
    })
}

pub fn stats_json() -> Value {
    json!({
        "cpu_percent": 12.5,
        "memory_usage": 52_428_800u64,
        "memory_limit": 2_147_483_648u64,
        "memory_percent": 2.44,
        "network_rx": 1024,
        "network_tx": 2048,
        "block_read": 0,
        "block_write": 4096
    })
}

/// Lets spawned poll tasks run their pending work (paused clock advances 10 ms).
pub async fn settle() {
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
}
