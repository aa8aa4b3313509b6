// Query side: collection and detail fetches.
// A poll tick passes its cancel token; a manual refresh passes None and always applies.

use super::Dashboard;
use crate::error::{DashboardError, FetchTarget, GatewayError};
use crate::store::Store;
use crate::tasks::CancelToken;

fn is_stale(token: Option<&CancelToken>) -> bool {
    token.is_some_and(CancelToken::is_cancelled)
}

/// Raises the loading flag; lowers it on drop, so an aborted fetch does not leave it set.
struct Loading<'a>(&'a Store);

impl<'a> Loading<'a> {
    fn start(store: &'a Store) -> Self {
        store.set_loading(true);
        Self(store)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.set_loading(false);
    }
}

impl Dashboard {
    /// Replaces the container list wholesale.
    pub async fn fetch_containers(&self, token: Option<&CancelToken>) -> Result<(), DashboardError> {
        let loading = Loading::start(&self.store);
        let result = self.gateway.list_containers().await;
        drop(loading);
        self.finish_collection(FetchTarget::Containers, token, result, Store::set_containers)
    }

    pub async fn fetch_images(&self, token: Option<&CancelToken>) -> Result<(), DashboardError> {
        let loading = Loading::start(&self.store);
        let result = self.gateway.list_images().await;
        drop(loading);
        self.finish_collection(FetchTarget::Images, token, result, Store::set_images)
    }

    pub async fn fetch_volumes(&self, token: Option<&CancelToken>) -> Result<(), DashboardError> {
        let loading = Loading::start(&self.store);
        let result = self.gateway.list_volumes().await;
        drop(loading);
        self.finish_collection(FetchTarget::Volumes, token, result, Store::set_volumes)
    }

    fn finish_collection<T>(
        &self,
        target: FetchTarget,
        token: Option<&CancelToken>,
        result: Result<T, GatewayError>,
        apply: impl FnOnce(&Store, T),
    ) -> Result<(), DashboardError> {
        if is_stale(token) {
            tracing::debug!(?target, "discarding result of cancelled fetch");
            return Ok(());
        }
        match result {
            Ok(items) => {
                apply(&self.store, items);
                self.store.set_error(None);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(?target, error = %e, operation = "fetch", "fetch failed");
                let err = DashboardError::fetch(target, e);
                self.store.set_error(Some(err.clone()));
                Err(err)
            }
        }
    }

    /// Replaces the log buffer with the latest `tail` lines.
    pub(crate) async fn fetch_logs(&self, id: &str, epoch: u64, token: Option<&CancelToken>) {
        let result = self.gateway.container_logs(id, self.settings.logs_tail).await;
        if is_stale(token) {
            return;
        }
        match result {
            Ok(logs) => {
                if !self
                    .store
                    .update_for_selection(epoch, |s| s.container_logs = logs)
                {
                    tracing::debug!(container_id = id, "dropping logs of previous selection");
                }
            }
            Err(e) => self.detail_failed(FetchTarget::Logs, id, epoch, e),
        }
    }

    pub(crate) async fn fetch_inspect(&self, id: &str, epoch: u64, token: Option<&CancelToken>) {
        let result = self.gateway.inspect_container(id).await;
        if is_stale(token) {
            return;
        }
        match result {
            Ok(inspect) => {
                self.store
                    .update_for_selection(epoch, |s| s.container_inspect = Some(inspect));
            }
            Err(e) => self.detail_failed(FetchTarget::Inspect, id, epoch, e),
        }
    }

    /// Stats failures are logged only; the stats panel keeps showing its last state.
    pub(crate) async fn fetch_stats(&self, id: &str, epoch: u64, token: Option<&CancelToken>) {
        let result = self.gateway.container_stats(id).await;
        if is_stale(token) {
            return;
        }
        match result {
            Ok(stats) => {
                self.store
                    .update_for_selection(epoch, |s| s.container_stats = Some(stats));
            }
            Err(e) => {
                tracing::warn!(
                    container_id = id,
                    error = %e,
                    operation = "get_container_stats",
                    "stats fetch failed"
                );
            }
        }
    }

    fn detail_failed(&self, target: FetchTarget, id: &str, epoch: u64, e: GatewayError) {
        tracing::warn!(?target, container_id = id, error = %e, operation = "fetch", "detail fetch failed");
        let err = DashboardError::fetch(target, e);
        self.store
            .update_for_selection(epoch, |s| s.error = Some(err));
    }
}
