use anyhow::Result;
use origin_settings::{KeyValueStore, MemoryStore, OriginSettings, SettingsStore};
use resizer_panel::{
    LogNotifier, MessageSink, NOTIFICATION_TITLE, Notifier, PanelConfig, RESET_MESSAGE,
    SettingsPanel,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

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

#[derive(Clone, Default)]
struct RecordingNotifier {
    shown: Rc<RefCell<Vec<(String, String)>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.shown
            .borrow_mut()
            .push((title.to_owned(), message.to_owned()));
    }
}

type Panel = SettingsPanel<MemoryStore, RecordingSink, RecordingNotifier>;

async fn open(store: &MemoryStore, url: Option<&str>) -> (Panel, RecordingSink, RecordingNotifier) {
    let sink = RecordingSink::default();
    let notifier = RecordingNotifier::default();
    let panel = SettingsPanel::open(
        store.clone(),
        sink.clone(),
        notifier.clone(),
        url,
        PanelConfig::default(),
    )
    .await;
    (panel, sink, notifier)
}

#[tokio::test]
async fn unknown_sites_open_with_the_defaults() {
    init_logger();
    let store = MemoryStore::new();
    let (panel, _, _) = open(&store, Some("https://shop.example/cart")).await;

    assert_eq!(panel.hostname(), Some("shop.example"));
    assert_eq!(panel.current(), OriginSettings::panel_defaults());
}

#[tokio::test]
async fn saved_settings_are_loaded() -> Result<()> {
    let store = MemoryStore::new();
    let record = OriginSettings {
        scale: 150,
        force_resize_containers: false,
        ignore_vector: false,
    };
    SettingsStore::new(store.clone())
        .save("shop.example", &record)
        .await?;

    let (panel, _, _) = open(&store, Some("https://shop.example/")).await;

    assert_eq!(panel.current(), record);
    Ok(())
}

#[tokio::test]
async fn zero_or_out_of_range_scales_do_not_reach_the_slider() -> Result<()> {
    let store = MemoryStore::new();
    store
        .set("zero.example", json!({"scale": 0, "forceResize": false, "ignoreSvg": true}))
        .await?;
    store.set("huge.example", json!({"scale": 1000})).await?;

    let (zero, _, _) = open(&store, Some("https://zero.example/")).await;
    assert_eq!(zero.scale(), 100);
    assert!(!zero.force_resize_containers());
    assert!(zero.ignore_vector());

    let (huge, _, _) = open(&store, Some("https://huge.example/")).await;
    assert_eq!(huge.scale(), 300);
    Ok(())
}

#[tokio::test]
async fn steps_stay_within_bounds() {
    let store = MemoryStore::new();
    let (mut panel, _, _) = open(&store, Some("https://shop.example/")).await;

    assert_eq!(panel.increase(), 110);
    assert_eq!(panel.set_scale(60), 60);
    assert_eq!(panel.decrease(), 50);
    assert_eq!(panel.decrease(), 50);
    assert_eq!(panel.set_scale(295), 295);
    assert_eq!(panel.increase(), 300);
    assert_eq!(panel.set_scale(10), 50);
}

#[tokio::test]
async fn commit_saves_and_sends_a_resize() -> Result<()> {
    let store = MemoryStore::new();
    let (mut panel, sink, _) = open(&store, Some("https://shop.example/")).await;
    panel.set_scale(120);
    panel.set_ignore_vector(false);

    assert!(panel.commit().await?);

    assert_eq!(
        store.get("shop.example").await?,
        Some(json!({"scale": 120, "forceResize": true, "ignoreSvg": false}))
    );
    assert_eq!(
        *sink.sent.borrow(),
        vec![json!({
            "action": "resize",
            "data": {"scale": 120, "forceResize": true, "ignoreSvg": false}
        })]
    );
    Ok(())
}

#[tokio::test]
async fn pages_without_a_hostname_never_commit() -> Result<()> {
    for url in [None, Some("not a url"), Some("file:///home/user/page.html")] {
        let store = MemoryStore::new();
        let (mut panel, sink, _) = open(&store, url).await;
        assert_eq!(panel.hostname(), None, "url {url:?}");
        assert_eq!(panel.current(), OriginSettings::panel_defaults());

        panel.increase();
        assert!(!panel.commit().await?);
        assert!(store.keys()?.is_empty());
        assert!(sink.sent.borrow().is_empty());
    }
    Ok(())
}

#[tokio::test]
async fn reset_restores_defaults_and_notifies() -> Result<()> {
    init_logger();
    let store = MemoryStore::new();
    let (mut panel, sink, notifier) = open(&store, Some("https://shop.example/")).await;
    panel.set_scale(200);
    panel.set_force_resize_containers(false);

    panel.reset().await?;

    assert_eq!(panel.current(), OriginSettings::panel_defaults());
    assert_eq!(
        store.get("shop.example").await?,
        Some(json!({"scale": 100, "forceResize": true, "ignoreSvg": true}))
    );
    assert_eq!(
        *sink.sent.borrow(),
        vec![json!({"action": "reset", "data": {"forceResize": true, "ignoreSvg": true}})]
    );
    assert_eq!(
        *notifier.shown.borrow(),
        vec![(NOTIFICATION_TITLE.to_owned(), RESET_MESSAGE.to_owned())]
    );
    Ok(())
}

#[tokio::test]
async fn reset_without_a_hostname_still_reaches_the_page() -> Result<()> {
    let store = MemoryStore::new();
    let (mut panel, sink, notifier) = open(&store, None).await;

    panel.reset().await?;

    assert!(store.keys()?.is_empty());
    assert_eq!(sink.sent.borrow().len(), 1);
    assert_eq!(notifier.shown.borrow().len(), 1);
    Ok(())
}

#[tokio::test]
async fn log_notifier_accepts_notifications() {
    init_logger();
    LogNotifier.notify(NOTIFICATION_TITLE, RESET_MESSAGE);
}

#[tokio::test]
async fn reset_saves_the_scale_it_shows() -> Result<()> {
    let store = MemoryStore::new();
    let mut panel = SettingsPanel::open(
        store.clone(),
        RecordingSink::default(),
        RecordingNotifier::default(),
        Some("https://shop.example/"),
        PanelConfig::new(120, 300, 10, 300),
    )
    .await;
    assert_eq!(panel.scale(), 120);
    panel.set_scale(250);

    panel.reset().await?;

    assert_eq!(panel.scale(), 120);
    assert_eq!(
        SettingsStore::new(store).settings_for("shop.example").await,
        Some(panel.current())
    );
    Ok(())
}
