// Store data -> rows and panels the renderer draws. Pure functions of an AppState snapshot.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::models::{
    BuildRecord, Container, ContainerInspect, ContainerState, ContainerStats, DetailTab, Image,
    Port, Tab, Volume,
};
use crate::store::{AppState, EntityRef};

const MB: f64 = 1024.0 * 1024.0;
const GB: f64 = MB * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateDot {
    Green,
    Gray,
    Yellow,
    Blue,
}

impl StateDot {
    /// Case-insensitive on the raw engine state.
    pub fn for_state(state: &str) -> Self {
        match ContainerState::from_docker(state) {
            ContainerState::Running => StateDot::Green,
            ContainerState::Paused => StateDot::Yellow,
            ContainerState::Restarting => StateDot::Blue,
            ContainerState::Exited | ContainerState::Unknown => StateDot::Gray,
        }
    }
}

/// First name without its leading '/', or the first 12 chars of the id.
pub fn display_name(container: &Container) -> String {
    match container.names.first() {
        Some(name) if !name.trim_start_matches('/').is_empty() => {
            name.strip_prefix('/').unwrap_or(name).to_string()
        }
        _ => short(&container.id, 12).to_string(),
    }
}

fn short(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

/// Published ports as `public:private`, `-` when nothing is published.
pub fn format_ports(ports: &[Port]) -> String {
    let published: Vec<String> = ports
        .iter()
        .filter_map(|p| p.public_port.map(|public| format!("{}:{}", public, p.private_port)))
        .collect();
    if published.is_empty() {
        "-".into()
    } else {
        published.join(", ")
    }
}

/// 1024-based size with up to two decimals.
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes <= 0 {
        return "0 B".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[unit])
}

/// Volume sizes are often unknown (-1) or zero; both render as `-`.
pub fn format_volume_size(volume: &Volume) -> String {
    match volume.usage_data {
        Some(usage) if usage.size > 0 => format_size(usage.size),
        _ => "-".into(),
    }
}

/// Unix seconds in local time.
pub fn format_timestamp(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".into(),
    }
}

fn format_rfc3339(s: &str, fmt: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Local).format(fmt).to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRow {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub dot: StateDot,
    pub ports: String,
    pub created: String,
    pub pending: bool,
    /// Exactly one of start/stop is offered, depending on whether it runs.
    pub can_start: bool,
    pub can_stop: bool,
}

impl ContainerRow {
    pub fn new(container: &Container, state: &AppState) -> Self {
        let running = container.is_running();
        Self {
            id: container.id.clone(),
            name: display_name(container),
            image: container.image.clone(),
            status: container.status.clone(),
            dot: StateDot::for_state(&container.state),
            ports: format_ports(&container.ports),
            created: format_timestamp(container.created),
            pending: state.pending.contains(&EntityRef::container(&container.id)),
            can_start: !running,
            can_stop: running,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRow {
    pub id: String,
    pub short_id: String,
    pub repository: String,
    pub tag: String,
    pub created: String,
    pub size: String,
    pub pending: bool,
}

impl ImageRow {
    pub fn new(image: &Image, state: &AppState) -> Self {
        let (repository, tag) = image.repo_and_tag();
        Self {
            id: image.id.clone(),
            short_id: image.short_id().to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
            created: format_timestamp(image.created),
            size: format_size(image.size),
            pending: state.pending.contains(&EntityRef::image(&image.id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRow {
    pub name: String,
    pub driver: String,
    pub mountpoint: String,
    pub created: String,
    pub size: String,
    pub pending: bool,
}

impl VolumeRow {
    pub fn new(volume: &Volume, state: &AppState) -> Self {
        Self {
            name: volume.name.clone(),
            driver: volume.driver.clone(),
            mountpoint: volume.mountpoint.clone(),
            created: volume
                .created_at
                .as_deref()
                .and_then(|c| format_rfc3339(c, "%Y-%m-%d"))
                .unwrap_or_else(|| "-".into()),
            size: format_volume_size(volume),
            pending: state.pending.contains(&EntityRef::volume(&volume.name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum StatsPanel {
    NotRunning { message: &'static str },
    Loading { message: &'static str },
    #[serde(rename_all = "camelCase")]
    Ready {
        cpu: String,
        /// Bar width, capped at 100.
        cpu_bar: f64,
        memory: String,
        memory_bar: f64,
        network_rx: String,
        network_tx: String,
        block_read: String,
        block_write: String,
    },
}

impl StatsPanel {
    pub fn new(running: bool, stats: Option<&ContainerStats>) -> Self {
        match (running, stats) {
            (false, _) => StatsPanel::NotRunning {
                message: "Container is not running",
            },
            (true, None) => StatsPanel::Loading {
                message: "Loading stats...",
            },
            (true, Some(s)) => StatsPanel::Ready {
                cpu: format!("{:.2}%", s.cpu_percent),
                cpu_bar: s.cpu_percent.clamp(0.0, 100.0),
                memory: format!(
                    "{:.1} MB / {:.1} GB",
                    s.memory_usage as f64 / MB,
                    s.memory_limit as f64 / GB
                ),
                memory_bar: s.memory_percent.clamp(0.0, 100.0),
                network_rx: format!("{:.2} MB", s.network_rx as f64 / MB),
                network_tx: format!("{:.2} MB", s.network_tx as f64 / MB),
                block_read: format!("{:.2} MB", s.block_read as f64 / MB),
                block_write: format!("{:.2} MB", s.block_write as f64 / MB),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectPanel {
    pub short_id: String,
    pub created: String,
    pub status: String,
    pub restart_count: i64,
    pub env: Vec<String>,
    pub mounts: Vec<String>,
    pub ip_address: String,
}

impl From<&ContainerInspect> for InspectPanel {
    fn from(inspect: &ContainerInspect) -> Self {
        Self {
            short_id: short(&inspect.id, 12).to_string(),
            created: format_rfc3339(&inspect.created, "%Y-%m-%d %H:%M:%S")
                .unwrap_or_else(|| inspect.created.clone()),
            status: inspect.state.status.clone(),
            restart_count: inspect.restart_count,
            env: inspect.config.env.clone(),
            mounts: inspect
                .mounts
                .iter()
                .map(|m| format!("{}: {} -> {}", m.mount_type, m.source, m.destination))
                .collect(),
            ip_address: if inspect.network_settings.ip_address.is_empty() {
                "-".into()
            } else {
                inspect.network_settings.ip_address.clone()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "camelCase")]
pub enum DetailPanel {
    Logs {
        logs: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<&'static str>,
    },
    /// `None` until the one inspect fetch of this selection lands.
    Inspect { inspect: Option<InspectPanel> },
    Stats { stats: StatsPanel },
    Terminal { notice: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailHeader {
    pub id: String,
    pub name: String,
    pub image: String,
    pub dot: StateDot,
    pub pending: bool,
    pub can_start: bool,
    pub can_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewModel {
    ContainerList {
        rows: Vec<ContainerRow>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<&'static str>,
    },
    #[serde(rename_all = "camelCase")]
    ContainerDetail {
        header: DetailHeader,
        detail_tab: DetailTab,
        panel: DetailPanel,
    },
    ImageList {
        rows: Vec<ImageRow>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<&'static str>,
    },
    VolumeList {
        rows: Vec<VolumeRow>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<&'static str>,
    },
    Builds {
        builds: Vec<BuildRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<&'static str>,
    },
}

/// Everything on screen: the active view plus the global banner and spinner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub view: ViewModel,
    pub banner: Option<String>,
    pub loading: bool,
}

fn placeholder_if_empty<T>(rows: &[T], text: &'static str) -> Option<&'static str> {
    rows.is_empty().then_some(text)
}

pub fn render(state: &AppState) -> Screen {
    let view = match state.active_tab {
        Tab::Containers => match &state.selected_container {
            Some(selected) => container_detail(selected, state),
            None => {
                let rows: Vec<ContainerRow> = state
                    .containers
                    .iter()
                    .map(|c| ContainerRow::new(c, state))
                    .collect();
                let placeholder = placeholder_if_empty(&rows, "No containers found");
                ViewModel::ContainerList { rows, placeholder }
            }
        },
        Tab::Images => {
            let rows: Vec<ImageRow> = state.images.iter().map(|i| ImageRow::new(i, state)).collect();
            let placeholder = placeholder_if_empty(&rows, "No images found");
            ViewModel::ImageList { rows, placeholder }
        }
        Tab::Volumes => {
            let rows: Vec<VolumeRow> = state
                .volumes
                .iter()
                .map(|v| VolumeRow::new(v, state))
                .collect();
            let placeholder = placeholder_if_empty(&rows, "No volumes found");
            ViewModel::VolumeList { rows, placeholder }
        }
        Tab::Builds => ViewModel::Builds {
            builds: Vec::new(),
            placeholder: Some("No builds yet"),
        },
    };
    Screen {
        view,
        banner: state.error.as_ref().map(ToString::to_string),
        loading: state.is_loading,
    }
}

fn container_detail(container: &Container, state: &AppState) -> ViewModel {
    let running = container.is_running();
    let header = DetailHeader {
        id: container.id.clone(),
        name: display_name(container),
        image: container.image.clone(),
        dot: StateDot::for_state(&container.state),
        pending: state.pending.contains(&EntityRef::container(&container.id)),
        can_start: !running,
        can_stop: running,
    };
    let panel = match state.detail_tab {
        DetailTab::Logs => DetailPanel::Logs {
            logs: state.container_logs.clone(),
            placeholder: state
                .container_logs
                .is_empty()
                .then_some("No logs available"),
        },
        DetailTab::Inspect => DetailPanel::Inspect {
            inspect: state.container_inspect.as_ref().map(InspectPanel::from),
        },
        DetailTab::Stats => DetailPanel::Stats {
            stats: StatsPanel::new(running, state.container_stats.as_ref()),
        },
        DetailTab::Terminal => DetailPanel::Terminal {
            notice: "Interactive terminal is not available",
        },
    };
    ViewModel::ContainerDetail {
        header,
        detail_tab: state.detail_tab,
        panel,
    }
}
