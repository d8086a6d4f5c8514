use anyhow::Result;
use dom::{Document, NodeKey};
use resizer::{Command, DimensionLedger, ResetParams, ScaleParams, dispatch};
use serde_json::json;
use url::Url;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn resize_and_reset_messages_decode() {
    init_logger();
    let resize = json!({
        "action": "resize",
        "data": {"scale": 150, "forceResize": true, "ignoreSvg": false}
    });
    assert_eq!(
        Command::from_message(&resize),
        Some(Command::Resize(ScaleParams {
            scale: 150,
            force_resize_containers: true,
            ignore_vector: false,
        }))
    );

    let reset = json!({"action": "reset", "data": {"forceResize": true, "ignoreSvg": true}});
    assert_eq!(
        Command::from_message(&reset),
        Some(Command::Reset(ResetParams {
            force_resize_containers: true,
            ignore_vector: true,
        }))
    );
}

#[test]
fn omitted_flags_default_to_false() {
    let resize = json!({"action": "resize", "data": {"scale": 80}});
    assert_eq!(
        Command::from_message(&resize),
        Some(Command::Resize(ScaleParams {
            scale: 80,
            force_resize_containers: false,
            ignore_vector: false,
        }))
    );
}

#[test]
fn unknown_and_malformed_messages_are_ignored() {
    init_logger();
    let ignored = [
        json!({"action": "zoom", "data": {"scale": 150}}),
        json!({"data": {"scale": 150}}),
        json!({"action": 7}),
        json!({"action": "resize", "data": {"scale": "big"}}),
        json!({"action": "resize", "data": {"scale": -10}}),
        json!("resize"),
    ];
    for message in ignored {
        assert_eq!(Command::from_message(&message), None, "message {message}");
    }
}

#[test]
fn commands_encode_with_the_transport_field_names() -> Result<()> {
    let command = Command::Reset(ResetParams::default());
    assert_eq!(
        command.to_message()?,
        json!({"action": "reset", "data": {"forceResize": false, "ignoreSvg": false}})
    );

    let command = Command::Resize(ScaleParams {
        scale: 200,
        force_resize_containers: true,
        ignore_vector: true,
    });
    let message = command.to_message()?;
    assert_eq!(message["action"], "resize");
    assert_eq!(message["data"]["scale"], 200);
    assert_eq!(Command::from_message(&message), Some(command));
    Ok(())
}

#[test]
fn dispatch_runs_the_command_over_the_whole_document() -> Result<()> {
    init_logger();
    let mut doc = Document::new(Url::parse("https://news.example/")?);
    let first = doc.create_element("img");
    let second = doc.create_element("img");
    let section = doc.create_element("section");
    doc.append_child(NodeKey::ROOT, first)?;
    doc.append_child(NodeKey::ROOT, section)?;
    doc.append_child(section, second)?;
    doc.set_layout_size(first, 100.0, 50.0)?;
    doc.set_layout_size(second, 64.0, 64.0)?;
    let mut ledger = DimensionLedger::new();

    let resize = Command::Resize(ScaleParams {
        scale: 150,
        force_resize_containers: false,
        ignore_vector: true,
    });
    let report = dispatch(&mut doc, &mut ledger, resize);
    assert_eq!(report.elements, 2);
    assert_eq!(doc.style_property(first, "width").as_deref(), Some("150px"));
    assert_eq!(doc.style_property(second, "width").as_deref(), Some("96px"));

    let report = dispatch(&mut doc, &mut ledger, Command::Reset(ResetParams::default()));
    assert_eq!(report.elements, 2);
    assert_eq!(doc.style_property(first, "width").as_deref(), Some("100px"));
    assert_eq!(doc.style_property(second, "height").as_deref(), Some("64px"));
    assert!(ledger.is_empty());
    Ok(())
}
