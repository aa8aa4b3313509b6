// Polling task registry: one cancellable task per (view, purpose).
// Cancelling aborts the timer task (and the request it is awaiting) and flips its token,
// so a result that already arrived is dropped instead of applied.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    ContainerList,
    ContainerDetail,
    ImageList,
    VolumeList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Refresh,
    Logs,
    Inspect,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub view: View,
    pub purpose: Purpose,
}

impl TaskKey {
    pub const fn new(view: View, purpose: Purpose) -> Self {
        Self { view, purpose }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

struct PollTask {
    handle: JoinHandle<()>,
    token: CancelToken,
}

impl PollTask {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<RwLock<HashMap<TaskKey, PollTask>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `job` immediately, then every `period` (only once when `None`), until cancelled.
    /// A task already registered under `key` is cancelled first.
    /// Ticks never overlap: a slow job delays the next run instead of racing it.
    pub async fn spawn<F, Fut>(&self, key: TaskKey, period: Option<Duration>, job: F)
    where
        F: Fn(CancelToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn_if(key, period, || true, job).await;
    }

    /// Like `spawn`, but only if `wanted` still holds once the registry lock is taken.
    /// Returns false, leaving any previous task under `key` untouched, when it does not.
    pub async fn spawn_if<F, Fut>(
        &self,
        key: TaskKey,
        period: Option<Duration>,
        wanted: impl FnOnce() -> bool,
        job: F,
    ) -> bool
    where
        F: Fn(CancelToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.write().await;
        if !wanted() {
            tracing::debug!(?key, "poll task no longer wanted, not started");
            return false;
        }
        if let Some(previous) = tasks.remove(&key) {
            previous.cancel();
        }

        let token = CancelToken::default();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let Some(period) = period else {
                job(task_token).await;
                return;
            };
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                if task_token.is_cancelled() {
                    break;
                }
                job(task_token.clone()).await;
            }
        });
        tracing::debug!(?key, ?period, "poll task started");
        tasks.insert(key, PollTask { handle, token });
        true
    }

    pub async fn cancel(&self, key: TaskKey) {
        if let Some(task) = self.tasks.write().await.remove(&key) {
            tracing::debug!(?key, "poll task cancelled");
            task.cancel();
        }
    }

    /// Cancels every task the view registered (its unmount).
    pub async fn cancel_view(&self, view: View) {
        let mut tasks = self.tasks.write().await;
        let keys: Vec<TaskKey> = tasks.keys().filter(|k| k.view == view).copied().collect();
        for key in keys {
            if let Some(task) = tasks.remove(&key) {
                tracing::debug!(?key, "poll task cancelled");
                task.cancel();
            }
        }
    }

    pub async fn cancel_all(&self) {
        let mut tasks = self.tasks.write().await;
        for (_, task) in tasks.drain() {
            task.cancel();
        }
    }

    /// True while the task under `key` is registered and has not run to completion.
    pub async fn is_active(&self, key: TaskKey) -> bool {
        self.tasks
            .read()
            .await
            .get(&key)
            .is_some_and(|t| !t.handle.is_finished())
    }

    pub async fn active_keys(&self) -> Vec<TaskKey> {
        self.tasks
            .read()
            .await
            .iter()
            .filter(|(_, t)| !t.handle.is_finished())
            .map(|(k, _)| *k)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const LIST: TaskKey = TaskKey::new(View::ContainerList, Purpose::Refresh);

    fn counting_job(
        counter: Arc<AtomicUsize>,
    ) -> impl Fn(CancelToken) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + 'static
    {
        move |_token| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_task_runs_immediately_then_on_every_tick() {
        let registry = TaskRegistry::new();
        let runs = Arc::new(AtomicUsize::new(0));
        registry
            .spawn(LIST, Some(Duration::from_secs(5)), counting_job(runs.clone()))
            .await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_task_runs_once() {
        let registry = TaskRegistry::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::new(View::ContainerDetail, Purpose::Inspect);
        registry.spawn(key, None, counting_job(runs.clone())).await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!registry.is_active(key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_view_stops_future_ticks() {
        let registry = TaskRegistry::new();
        let runs = Arc::new(AtomicUsize::new(0));
        registry
            .spawn(LIST, Some(Duration::from_secs(5)), counting_job(runs.clone()))
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        registry.cancel_view(View::ContainerList).await;
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(registry.active_keys().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_key_leaves_other_views_running() {
        let registry = TaskRegistry::new();
        let list = Arc::new(AtomicUsize::new(0));
        let logs = Arc::new(AtomicUsize::new(0));
        let logs_key = TaskKey::new(View::ContainerDetail, Purpose::Logs);
        registry
            .spawn(LIST, Some(Duration::from_secs(5)), counting_job(list.clone()))
            .await;
        registry
            .spawn(logs_key, Some(Duration::from_secs(3)), counting_job(logs.clone()))
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        registry.cancel(LIST).await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(list.load(Ordering::SeqCst), 1);
        assert_eq!(logs.load(Ordering::SeqCst), 3);
        assert_eq!(registry.active_keys().await, vec![logs_key]);
    }

    #[tokio::test(start_paused = true)]
    async fn respawn_under_same_key_replaces_previous_task() {
        let registry = TaskRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        registry
            .spawn(LIST, Some(Duration::from_secs(5)), counting_job(first.clone()))
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        registry
            .spawn(LIST, Some(Duration::from_secs(5)), counting_job(second.clone()))
            .await;

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_if_skips_when_no_longer_wanted() {
        let registry = TaskRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        registry
            .spawn(LIST, Some(Duration::from_secs(5)), counting_job(first.clone()))
            .await;
        let started = registry
            .spawn_if(
                LIST,
                Some(Duration::from_secs(5)),
                || false,
                counting_job(skipped.clone()),
            )
            .await;
        assert!(!started);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(skipped.load(Ordering::SeqCst), 0);
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(registry.active_keys().await, vec![LIST]);
    }
}
