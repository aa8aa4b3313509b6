// Application state store: one AppState behind a watch channel.
// Every mutation goes through a named setter and is applied atomically; observers see whole snapshots.

mod entity;

pub use entity::{EntityKind, EntityRef};

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::DashboardError;
use crate::models::{
    Container, ContainerInspect, ContainerStats, DetailTab, Image, Tab, Volume,
};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub active_tab: Tab,

    pub containers: Vec<Container>,
    pub selected_container: Option<Container>,
    pub detail_tab: DetailTab,
    pub container_inspect: Option<ContainerInspect>,
    pub container_stats: Option<ContainerStats>,
    pub container_logs: String,

    pub images: Vec<Image>,
    pub volumes: Vec<Volume>,

    pub is_loading: bool,
    pub error: Option<DashboardError>,
    /// Entities with an action in flight.
    pub pending: BTreeSet<EntityRef>,
    /// Bumped whenever the selection changes; detail results fetched under an older epoch are dropped.
    pub selection_epoch: u64,
}

impl AppState {
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_container.as_ref().map(|c| c.id.as_str())
    }

    fn replace_selection(&mut self, container: Option<Container>) {
        self.selected_container = container;
        self.detail_tab = DetailTab::default();
        self.container_logs.clear();
        self.container_inspect = None;
        self.container_stats = None;
        self.selection_epoch += 1;
    }
}

/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<AppState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AppState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Open subscriptions, one per connected state stream.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.tx.send_modify(f);
    }

    /// Switching tabs always drops the selection.
    pub fn set_active_tab(&self, tab: Tab) {
        self.update(|s| {
            s.active_tab = tab;
            if s.selected_container.is_some() {
                s.replace_selection(None);
            }
        });
    }

    /// Replaces the list. A selected container present in it takes the fresh entry;
    /// its cached detail stays.
    pub fn set_containers(&self, containers: Vec<Container>) {
        self.update(|s| {
            if let Some(selected) = s.selected_container.as_mut()
                && let Some(fresh) = containers.iter().find(|c| c.id == selected.id)
            {
                *selected = fresh.clone();
            }
            s.containers = containers;
        });
    }

    /// Replaces the selection and clears every cached detail of the previous one.
    /// A container can only be selected while the containers tab is active; returns false if refused.
    pub fn set_selected_container(&self, container: Option<Container>) -> bool {
        let container_id = container.as_ref().map(|c| c.id.clone());
        let applied = self.tx.send_if_modified(|s| {
            if container.is_some() && s.active_tab != Tab::Containers {
                return false;
            }
            s.replace_selection(container);
            true
        });
        if applied {
            tracing::debug!(container_id = container_id.as_deref(), "selection changed");
        }
        applied
    }

    pub fn set_detail_tab(&self, tab: DetailTab) {
        self.update(|s| s.detail_tab = tab);
    }

    pub fn set_container_inspect(&self, inspect: Option<ContainerInspect>) {
        self.update(|s| s.container_inspect = inspect);
    }

    pub fn set_container_stats(&self, stats: Option<ContainerStats>) {
        self.update(|s| s.container_stats = stats);
    }

    pub fn set_container_logs(&self, logs: String) {
        self.update(|s| s.container_logs = logs);
    }

    pub fn append_container_logs(&self, log: &str) {
        self.update(|s| s.container_logs.push_str(log));
    }

    pub fn set_images(&self, images: Vec<Image>) {
        self.update(|s| s.images = images);
    }

    pub fn set_volumes(&self, volumes: Vec<Volume>) {
        self.update(|s| s.volumes = volumes);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|s| s.is_loading = loading);
    }

    pub fn set_error(&self, error: Option<DashboardError>) {
        self.update(|s| s.error = error);
    }

    pub fn selection_epoch(&self) -> u64 {
        self.tx.borrow().selection_epoch
    }

    /// Applies `f` only if the selection has not changed since `epoch` was read.
    pub fn update_for_selection(&self, epoch: u64, f: impl FnOnce(&mut AppState)) -> bool {
        self.tx.send_if_modified(|s| {
            if s.selection_epoch != epoch {
                return false;
            }
            f(s);
            true
        })
    }

    /// Marks `entity` pending. Returns false if it already was.
    pub fn mark_pending(&self, entity: EntityRef) -> bool {
        self.tx.send_if_modified(|s| s.pending.insert(entity))
    }

    pub fn clear_pending(&self, entity: &EntityRef) {
        self.tx.send_if_modified(|s| s.pending.remove(entity));
    }

    pub fn is_pending(&self, entity: &EntityRef) -> bool {
        self.tx.borrow().pending.contains(entity)
    }
}
