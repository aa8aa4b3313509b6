// Dashboard controller: mounts views, owns their polling tasks and funnels gateway results into the store.
// Mounting a view = fetch now + refresh on its timer. Unmounting = cancelling its tasks.

mod actions;
mod fetch;

pub use actions::{ActionOutcome, SkipReason};

/// Result of a selection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected,
    /// No container with that id in the current list.
    UnknownContainer,
    /// Only the containers tab has a detail view.
    WrongTab,
}

use std::sync::Arc;

use crate::config::{LogsConfig, PollingConfig};
use crate::gateway::{Gateway, GatewayClient};
use crate::models::{Container, DetailTab, Tab};
use crate::store::Store;
use crate::tasks::{Purpose, TaskKey, TaskRegistry, View};

#[derive(Clone)]
pub struct Dashboard {
    store: Store,
    gateway: GatewayClient,
    tasks: TaskRegistry,
    settings: Arc<Settings>,
}

struct Settings {
    polling: PollingConfig,
    logs_tail: u32,
}

impl Dashboard {
    pub fn new(gateway: Arc<dyn Gateway>, polling: PollingConfig, logs: LogsConfig) -> Self {
        Self {
            store: Store::new(),
            gateway: GatewayClient::new(gateway),
            tasks: TaskRegistry::new(),
            settings: Arc::new(Settings {
                polling,
                logs_tail: logs.tail,
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Mounts whatever the current state shows.
    pub async fn start(&self) {
        let tab = self.store.read(|s| s.active_tab);
        tracing::info!(?tab, "dashboard started");
        self.mount_tab(tab).await;
    }

    /// Cancels every poll task. Requests already awaited by those tasks are dropped with them.
    pub async fn shutdown(&self) {
        self.tasks.cancel_all().await;
        tracing::debug!("dashboard tasks cancelled");
    }

    /// The store switches first, so a detail task racing this call either sees the new
    /// selection epoch and stays unstarted, or is registered before `unmount_all` cancels it.
    pub async fn set_active_tab(&self, tab: Tab) {
        self.store.set_active_tab(tab);
        self.unmount_all().await;
        self.mount_tab(tab).await;
    }

    /// Opens the detail view for `container`, or returns to the list with `None`.
    /// Opening is refused unless the containers tab is active.
    pub async fn select_container(&self, container: Option<Container>) -> Selection {
        let opening = container.is_some();
        if opening && self.store.read(|s| s.active_tab) != Tab::Containers {
            return Selection::WrongTab;
        }
        self.tasks.cancel_view(View::ContainerDetail).await;
        if !self.store.set_selected_container(container) {
            // The tab changed underneath us.
            return Selection::WrongTab;
        }

        if opening {
            self.tasks.cancel_view(View::ContainerList).await;
            self.mount_detail().await;
        } else if self.store.read(|s| s.active_tab) == Tab::Containers {
            self.mount_container_list().await;
        }
        Selection::Selected
    }

    /// Selects by id from the current container list.
    pub async fn select_container_by_id(&self, id: &str) -> Selection {
        let found = self
            .store
            .read(|s| s.containers.iter().find(|c| c.id == id).cloned());
        match found {
            Some(container) => self.select_container(Some(container)).await,
            None => Selection::UnknownContainer,
        }
    }

    pub async fn set_detail_tab(&self, tab: DetailTab) {
        self.tasks.cancel_view(View::ContainerDetail).await;
        self.store.set_detail_tab(tab);
        self.mount_detail().await;
    }

    pub fn dismiss_error(&self) {
        self.store.set_error(None);
    }

    /// One-off refresh of whatever is on screen (the refresh button).
    pub async fn refresh(&self) {
        let (tab, selected) = self
            .store
            .read(|s| (s.active_tab, s.selected_container.is_some()));
        match tab {
            Tab::Containers if selected => self.refresh_detail().await,
            Tab::Containers => {
                let _ = self.fetch_containers(None).await;
            }
            Tab::Images => {
                let _ = self.fetch_images(None).await;
            }
            Tab::Volumes => {
                let _ = self.fetch_volumes(None).await;
            }
            Tab::Builds => {}
        }
    }

    async fn unmount_all(&self) {
        for view in [
            View::ContainerList,
            View::ContainerDetail,
            View::ImageList,
            View::VolumeList,
        ] {
            self.tasks.cancel_view(view).await;
        }
    }

    async fn mount_tab(&self, tab: Tab) {
        match tab {
            Tab::Containers => {
                if self.store.read(|s| s.selected_container.is_some()) {
                    self.mount_detail().await;
                } else {
                    self.mount_container_list().await;
                }
            }
            Tab::Images => {
                let this = self.clone();
                self.tasks
                    .spawn(
                        TaskKey::new(View::ImageList, Purpose::Refresh),
                        self.settings.polling.images(),
                        move |token| {
                            let this = this.clone();
                            async move {
                                let _ = this.fetch_images(Some(&token)).await;
                            }
                        },
                    )
                    .await;
            }
            Tab::Volumes => {
                let this = self.clone();
                self.tasks
                    .spawn(
                        TaskKey::new(View::VolumeList, Purpose::Refresh),
                        self.settings.polling.volumes(),
                        move |token| {
                            let this = this.clone();
                            async move {
                                let _ = this.fetch_volumes(Some(&token)).await;
                            }
                        },
                    )
                    .await;
            }
            // Build history has no data source; nothing to poll.
            Tab::Builds => {}
        }
    }

    async fn mount_container_list(&self) {
        let this = self.clone();
        self.tasks
            .spawn(
                TaskKey::new(View::ContainerList, Purpose::Refresh),
                Some(self.settings.polling.containers()),
                move |token| {
                    let this = this.clone();
                    async move {
                        let _ = this.fetch_containers(Some(&token)).await;
                    }
                },
            )
            .await;
    }

    /// Starts the fetch policy of the current detail tab for the current selection.
    /// Nothing starts if the selection moved on before the task could be registered.
    async fn mount_detail(&self) {
        let Some((id, running, tab, epoch)) = self.store.read(|s| {
            s.selected_container
                .as_ref()
                .map(|c| (c.id.clone(), c.is_running(), s.detail_tab, s.selection_epoch))
        }) else {
            return;
        };

        let still_selected = || self.store.selection_epoch() == epoch;
        let this = self.clone();
        match tab {
            DetailTab::Logs => {
                self.tasks
                    .spawn_if(
                        TaskKey::new(View::ContainerDetail, Purpose::Logs),
                        Some(self.settings.polling.logs()),
                        still_selected,
                        move |token| {
                            let this = this.clone();
                            let id = id.clone();
                            async move { this.fetch_logs(&id, epoch, Some(&token)).await }
                        },
                    )
                    .await;
            }
            DetailTab::Inspect => {
                self.tasks
                    .spawn_if(
                        TaskKey::new(View::ContainerDetail, Purpose::Inspect),
                        None,
                        still_selected,
                        move |token| {
                            let this = this.clone();
                            let id = id.clone();
                            async move { this.fetch_inspect(&id, epoch, Some(&token)).await }
                        },
                    )
                    .await;
            }
            DetailTab::Stats if running => {
                self.tasks
                    .spawn_if(
                        TaskKey::new(View::ContainerDetail, Purpose::Stats),
                        Some(self.settings.polling.stats()),
                        still_selected,
                        move |token| {
                            let this = this.clone();
                            let id = id.clone();
                            async move { this.fetch_stats(&id, epoch, Some(&token)).await }
                        },
                    )
                    .await;
            }
            DetailTab::Stats | DetailTab::Terminal => {}
        }
    }

    async fn refresh_detail(&self) {
        let Some((id, running, tab, epoch)) = self.store.read(|s| {
            s.selected_container
                .as_ref()
                .map(|c| (c.id.clone(), c.is_running(), s.detail_tab, s.selection_epoch))
        }) else {
            return;
        };
        match tab {
            DetailTab::Logs => self.fetch_logs(&id, epoch, None).await,
            DetailTab::Inspect => self.fetch_inspect(&id, epoch, None).await,
            DetailTab::Stats if running => self.fetch_stats(&id, epoch, None).await,
            DetailTab::Stats | DetailTab::Terminal => {}
        }
    }
}
