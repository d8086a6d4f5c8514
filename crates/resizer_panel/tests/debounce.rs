//! Debounced commits, run on paused tokio time.

use anyhow::Result;
use core::time::Duration;
use origin_settings::{KeyValueStore, MemoryStore};
use resizer_panel::{Debouncer, LogNotifier, MessageSink, PanelConfig, SettingsPanel};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::time::Instant;

#[derive(Clone, Default)]
struct RecordingSink {
    sent: Rc<RefCell<Vec<Value>>>,
}

impl MessageSink for RecordingSink {
    fn deliver(&self, message: Value) -> Result<()> {
        self.sent.borrow_mut().push(message);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn tickets_fire_after_the_quiet_period() {
    let debouncer = Debouncer::new(Duration::from_millis(300));
    let start = Instant::now();

    assert!(debouncer.schedule().wait().await);
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn newer_tickets_supersede_older_ones() {
    let debouncer = Debouncer::new(Duration::from_millis(300));
    let first = debouncer.schedule();
    let second = debouncer.schedule();

    assert!(!first.is_latest());
    let (first, second) = tokio::join!(first.wait(), second.wait());
    assert!(!first);
    assert!(second);

    let third = debouncer.schedule();
    debouncer.cancel();
    assert!(!third.wait().await);
}

#[tokio::test(start_paused = true)]
async fn a_burst_of_slider_moves_commits_once() -> Result<()> {
    let store = MemoryStore::new();
    let sink = RecordingSink::default();
    let mut panel = SettingsPanel::open(
        store.clone(),
        sink.clone(),
        LogNotifier,
        Some("https://blog.example/post"),
        PanelConfig::default(),
    )
    .await;

    panel.increase();
    let first = panel.schedule_commit();
    panel.increase();
    let second = panel.schedule_commit();
    panel.increase();
    let third = panel.schedule_commit();

    let (first, second, third) = tokio::join!(
        panel.commit_after(first),
        panel.commit_after(second),
        panel.commit_after(third)
    );
    assert!(!first?);
    assert!(!second?);
    assert!(third?);

    assert_eq!(sink.sent.borrow().len(), 1);
    assert_eq!(
        store.get("blog.example").await?,
        Some(json!({"scale": 130, "forceResize": true, "ignoreSvg": true}))
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_a_pending_commit() -> Result<()> {
    let store = MemoryStore::new();
    let sink = RecordingSink::default();
    let mut panel = SettingsPanel::open(
        store.clone(),
        sink.clone(),
        LogNotifier,
        Some("https://blog.example/post"),
        PanelConfig::new(50, 300, 10, 50),
    )
    .await;

    panel.set_scale(250);
    let pending = panel.schedule_commit();
    panel.reset().await?;

    assert!(!panel.commit_after(pending).await?);
    assert_eq!(
        store.get("blog.example").await?,
        Some(json!({"scale": 100, "forceResize": true, "ignoreSvg": true}))
    );
    assert_eq!(sink.sent.borrow()[0]["action"], "reset");
    assert_eq!(sink.sent.borrow().len(), 1);
    Ok(())
}

#[test]
fn config_normalizes_its_bounds() {
    let config = PanelConfig::new(300, 50, 0, 300);
    assert_eq!((config.min_scale, config.max_scale, config.step), (50, 300, 1));
    assert_eq!(config.clamp(20), 50);
    assert_eq!(config.clamp(120), 120);
    assert_eq!(PanelConfig::default().debounce(), Duration::from_millis(300));
}
