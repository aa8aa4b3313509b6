// Refresh timers: what polls, how often, and what stops when a view goes away

mod common;

use colima_dash::config::{LogsConfig, PollingConfig};
use colima_dash::dashboard::{Dashboard, Selection};
use colima_dash::gateway::Command;
use colima_dash::models::{DetailTab, Tab};
use colima_dash::tasks::{Purpose, TaskKey, View};
use common::*;
use serde_json::json;
use tokio::time::{Duration, sleep};

const LIST: TaskKey = TaskKey::new(View::ContainerList, Purpose::Refresh);

fn running_and_exited() -> serde_json::Value {
    json!([
        container_json("run1", "/web", "running"),
        container_json("exit1", "/old", "exited"),
    ])
}

#[tokio::test(start_paused = true)]
async fn container_list_polls_every_five_seconds() {
    let gateway = FakeGateway::new();
    let dashboard = dashboard(gateway.clone());
    dashboard.start().await;
    settle().await;
    assert_eq!(gateway.count("list_containers"), 1);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(gateway.count("list_containers"), 2);
    sleep(Duration::from_secs(10)).await;
    assert_eq!(gateway.count("list_containers"), 4);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn opening_detail_stops_list_and_polls_logs() {
    let gateway = FakeGateway::new();
    gateway.set("list_containers", Ok(running_and_exited()));
    let dashboard = dashboard(gateway.clone());
    dashboard.start().await;
    settle().await;

    dashboard.select_container_by_id("run1").await;
    settle().await;
    assert!(!dashboard.tasks().is_active(LIST).await);
    assert_eq!(gateway.count("get_container_logs"), 1);

    sleep(Duration::from_secs(9)).await;
    assert_eq!(gateway.count("list_containers"), 1);
    assert_eq!(gateway.count("get_container_logs"), 4);
    assert!(gateway.calls().contains(&Command::GetContainerLogs {
        container_id: "run1".into(),
        tail: 500,
    }));

    // Back to the list: logs stop, list resumes with an immediate fetch.
    dashboard.select_container(None).await;
    settle().await;
    assert_eq!(gateway.count("list_containers"), 2);
    sleep(Duration::from_secs(9)).await;
    assert_eq!(gateway.count("get_container_logs"), 4);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn inspect_fetches_once_per_selection() {
    let gateway = FakeGateway::new();
    gateway.set("list_containers", Ok(running_and_exited()));
    gateway.set("inspect_container", Ok(json!(inspect_json("run1").to_string())));
    let dashboard = dashboard(gateway.clone());
    dashboard.fetch_containers(None).await.unwrap();
    dashboard.select_container_by_id("run1").await;

    dashboard.set_detail_tab(DetailTab::Inspect).await;
    sleep(Duration::from_secs(30)).await;
    assert_eq!(gateway.count("inspect_container"), 1);
    assert!(dashboard.tasks().active_keys().await.is_empty());
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stats_poll_only_for_running_container() {
    let gateway = FakeGateway::new();
    gateway.set("list_containers", Ok(running_and_exited()));
    gateway.set("get_container_stats", Ok(json!(stats_json().to_string())));
    let dashboard = dashboard(gateway.clone());
    dashboard.fetch_containers(None).await.unwrap();

    dashboard.select_container_by_id("exit1").await;
    dashboard.set_detail_tab(DetailTab::Stats).await;
    sleep(Duration::from_secs(10)).await;
    assert_eq!(gateway.count("get_container_stats"), 0);

    dashboard.select_container_by_id("run1").await;
    // Selecting resets the detail tab to logs.
    assert_eq!(dashboard.store().read(|s| s.detail_tab), DetailTab::Logs);
    dashboard.set_detail_tab(DetailTab::Stats).await;
    settle().await;
    sleep(Duration::from_secs(4)).await;
    assert_eq!(gateway.count("get_container_stats"), 3);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn switching_detail_tab_cancels_previous_poll() {
    let gateway = FakeGateway::new();
    gateway.set("list_containers", Ok(running_and_exited()));
    gateway.set("get_container_stats", Ok(json!(stats_json().to_string())));
    let dashboard = dashboard(gateway.clone());
    dashboard.fetch_containers(None).await.unwrap();
    dashboard.select_container_by_id("run1").await;
    settle().await;

    dashboard.set_detail_tab(DetailTab::Stats).await;
    settle().await;
    let logs_before = gateway.count("get_container_logs");
    sleep(Duration::from_secs(6)).await;
    assert_eq!(gateway.count("get_container_logs"), logs_before);

    dashboard.set_detail_tab(DetailTab::Terminal).await;
    let stats_before = gateway.count("get_container_stats");
    sleep(Duration::from_secs(6)).await;
    assert_eq!(gateway.count("get_container_stats"), stats_before);
    assert!(dashboard.tasks().active_keys().await.is_empty());
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn images_fetch_once_unless_interval_configured() {
    let gateway = FakeGateway::new();
    let dashboard = dashboard(gateway.clone());
    dashboard.set_active_tab(Tab::Images).await;
    sleep(Duration::from_secs(60)).await;
    assert_eq!(gateway.count("list_images"), 1);

    let gateway = FakeGateway::new();
    let polling = PollingConfig {
        volumes_interval_ms: Some(1000),
        ..PollingConfig::default()
    };
    let dashboard = Dashboard::new(gateway.clone(), polling, LogsConfig::default());
    dashboard.set_active_tab(Tab::Volumes).await;
    settle().await;
    sleep(Duration::from_secs(3)).await;
    assert_eq!(gateway.count("list_volumes"), 4);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn tab_switch_cancels_in_flight_list_fetch() {
    let gateway = FakeGateway::new();
    let gate = gateway.gate("list_containers");
    gateway.set("list_containers", Ok(running_and_exited()));
    let dashboard = dashboard(gateway.clone());
    dashboard.start().await;
    settle().await;
    assert_eq!(gateway.count("list_containers"), 1);

    dashboard.set_active_tab(Tab::Builds).await;
    gate.add_permits(1);
    settle().await;
    let state = dashboard.store().snapshot();
    assert!(state.containers.is_empty());
    assert!(!state.is_loading);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn selecting_outside_containers_tab_is_refused() {
    let gateway = FakeGateway::new();
    gateway.set("list_containers", Ok(running_and_exited()));
    let dashboard = dashboard(gateway.clone());
    dashboard.fetch_containers(None).await.unwrap();
    dashboard.set_active_tab(Tab::Images).await;

    assert_eq!(dashboard.select_container_by_id("run1").await, Selection::WrongTab);
    sleep(Duration::from_secs(9)).await;
    let state = dashboard.store().snapshot();
    assert!(state.selected_container.is_none());
    assert_eq!(state.active_tab, Tab::Images);
    assert!(
        !dashboard
            .tasks()
            .is_active(TaskKey::new(View::ContainerDetail, Purpose::Logs))
            .await
    );
    assert_eq!(gateway.count("get_container_logs"), 0);
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn tab_switch_racing_selection_leaves_no_detail_poll() {
    let gateway = FakeGateway::new();
    gateway.set("list_containers", Ok(running_and_exited()));
    let dashboard = dashboard(gateway.clone());
    dashboard.fetch_containers(None).await.unwrap();

    let _ = tokio::join!(
        dashboard.select_container_by_id("run1"),
        dashboard.set_active_tab(Tab::Volumes),
    );
    settle().await;
    let logs_after_switch = gateway.count("get_container_logs");
    assert!(logs_after_switch <= 1);

    sleep(Duration::from_secs(9)).await;
    assert_eq!(gateway.count("get_container_logs"), logs_after_switch);
    assert!(dashboard.store().read(|s| s.selected_container.is_none()));
    let keys = dashboard.tasks().active_keys().await;
    assert!(keys.iter().all(|k| k.view != View::ContainerDetail));
    dashboard.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_everything() {
    let gateway = FakeGateway::new();
    let dashboard = dashboard(gateway.clone());
    dashboard.start().await;
    settle().await;
    dashboard.shutdown().await;

    sleep(Duration::from_secs(30)).await;
    assert_eq!(gateway.count("list_containers"), 1);
}
