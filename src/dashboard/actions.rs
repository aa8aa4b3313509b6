// Command side: user actions. Each one marks its entity pending, issues a single gateway call
// and on success re-fetches the owning collection.

use std::future::Future;

use super::Dashboard;
use crate::error::{ActionKind, DashboardError, GatewayError};
use crate::models::ContainerAction;
use crate::store::{EntityRef, Store};
use crate::tasks::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// Nothing was sent to the gateway.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An action on the same entity is still in flight.
    Pending,
    /// Pull or create with a blank name.
    EmptyName,
}

/// Clears the pending flag when the action finishes, fails or is dropped mid-flight.
struct PendingGuard<'a> {
    store: &'a Store,
    entity: EntityRef,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.store.clear_pending(&self.entity);
    }
}

impl Dashboard {
    pub async fn container_action(
        &self,
        container_id: &str,
        action: ContainerAction,
    ) -> Result<ActionOutcome, DashboardError> {
        self.dispatch(
            EntityRef::container(container_id),
            ActionKind::Container(action),
            self.gateway.container_action(container_id, action),
            self.after_container_action(container_id, action),
        )
        .await
    }

    async fn after_container_action(&self, container_id: &str, action: ContainerAction) {
        let selected = self.store.read(|s| s.selected_id() == Some(container_id));
        if selected && action == ContainerAction::Remove {
            // Back to the list, which mounts with a fresh fetch of its own.
            self.select_container(None).await;
            return;
        }
        let _ = self.fetch_containers(None).await;
        if selected {
            // Running state may have flipped; the stats tab polls only while running.
            self.tasks.cancel_view(View::ContainerDetail).await;
            self.mount_detail().await;
        }
    }

    pub async fn pull_image(&self, image_name: &str) -> Result<ActionOutcome, DashboardError> {
        let image_name = image_name.trim();
        if image_name.is_empty() {
            return Ok(ActionOutcome::Skipped(SkipReason::EmptyName));
        }
        self.dispatch(
            EntityRef::image(image_name),
            ActionKind::PullImage,
            self.gateway.pull_image(image_name),
            self.refetch_images(),
        )
        .await
    }

    pub async fn remove_image(&self, image_id: &str) -> Result<ActionOutcome, DashboardError> {
        self.dispatch(
            EntityRef::image(image_id),
            ActionKind::RemoveImage,
            self.gateway.remove_image(image_id),
            self.refetch_images(),
        )
        .await
    }

    pub async fn create_volume(&self, volume_name: &str) -> Result<ActionOutcome, DashboardError> {
        let volume_name = volume_name.trim();
        if volume_name.is_empty() {
            return Ok(ActionOutcome::Skipped(SkipReason::EmptyName));
        }
        self.dispatch(
            EntityRef::volume(volume_name),
            ActionKind::CreateVolume,
            self.gateway.create_volume(volume_name),
            self.refetch_volumes(),
        )
        .await
    }

    pub async fn remove_volume(&self, volume_name: &str) -> Result<ActionOutcome, DashboardError> {
        self.dispatch(
            EntityRef::volume(volume_name),
            ActionKind::RemoveVolume,
            self.gateway.remove_volume(volume_name),
            self.refetch_volumes(),
        )
        .await
    }

    async fn refetch_images(&self) {
        let _ = self.fetch_images(None).await;
    }

    async fn refetch_volumes(&self) {
        let _ = self.fetch_volumes(None).await;
    }

    /// Pending stays set until `refresh` has completed too.
    async fn dispatch(
        &self,
        entity: EntityRef,
        action: ActionKind,
        call: impl Future<Output = Result<(), GatewayError>>,
        refresh: impl Future<Output = ()>,
    ) -> Result<ActionOutcome, DashboardError> {
        if !self.store.mark_pending(entity.clone()) {
            tracing::debug!(?entity, ?action, "action skipped, entity busy");
            return Ok(ActionOutcome::Skipped(SkipReason::Pending));
        }
        let _guard = PendingGuard {
            store: &self.store,
            entity: entity.clone(),
        };

        tracing::info!(?entity, ?action, "dispatching action");
        if let Err(e) = call.await {
            tracing::warn!(?entity, ?action, error = %e, operation = "action", "action failed");
            let err = DashboardError::action(entity, action, e);
            self.store.set_error(Some(err.clone()));
            return Err(err);
        }
        refresh.await;
        Ok(ActionOutcome::Completed)
    }
}
