//! Snapshots are serialized for the attribute layer.

use std::sync::Arc;

use serde_json::json;

use joist::driver::InstantDriver;
use joist::keys::Key;
use joist::panel::{PanelConfig, PanelLifecycle};
use joist::widgets::accordion::{Accordion, AccordionConfig};
use joist::widgets::checkbox::{CheckedState, Checkbox};
use joist::widgets::progress::Progress;
use joist::widgets::slider::{Slider, SliderConfig};

#[test]
fn test_panel_snapshot_json() {
    let panel = PanelLifecycle::new(
        PanelConfig::new().hidden_until_found(true),
        Arc::new(InstantDriver::new()),
    );
    let value = serde_json::to_value(panel.snapshot()).unwrap();
    assert_eq!(
        value,
        json!({
            "phase": "mounted-hidden",
            "presence": "hidden",
            "mounted": true,
            "hidden": "until-found",
            "transition": "idle",
            "open": false,
        })
    );
}

#[test]
fn test_accordion_item_snapshot_json() {
    let root = Accordion::new(
        AccordionConfig::new(),
        None,
        vec!["first"],
        Arc::new(InstantDriver::new()),
    );
    let first = root.item(Some("first"), 0u32).unwrap();
    let value = serde_json::to_value(first.snapshot()).unwrap();

    assert_eq!(value["value"], "first");
    assert_eq!(value["index"], 0);
    assert_eq!(value["open"], true);
    assert_eq!(value["tab_index"], 0);
    assert_eq!(value["panel"]["phase"], "open");

    let context = serde_json::to_value(&*root.snapshot()).unwrap();
    assert_eq!(context["mode"], "single");
    assert_eq!(context["orientation"], "vertical");
    assert_eq!(context["direction"], "ltr");
}

#[test]
fn test_checkbox_state_json() {
    let checkbox = Checkbox::new(None, CheckedState::Indeterminate);
    let value = serde_json::to_value(checkbox.snapshot()).unwrap();
    assert_eq!(value["checked"], "indeterminate");

    let parsed: CheckedState = serde_json::from_str("\"checked\"").unwrap();
    assert_eq!(parsed, CheckedState::Checked);
}

#[test]
fn test_range_snapshots_json() {
    let progress = Progress::indeterminate();
    let value = serde_json::to_value(progress.snapshot()).unwrap();
    assert_eq!(value["status"], "indeterminate");
    assert!(value["value"].is_null());

    let slider = Slider::new(SliderConfig::new(), None, vec![20.0, 80.0]).unwrap();
    let value = serde_json::to_value(slider.snapshot()).unwrap();
    assert_eq!(value["values"], json!([20.0, 80.0]));
    assert_eq!(value["orientation"], "horizontal");
}

#[test]
fn test_key_json() {
    let key: Key = serde_json::from_str("\"arrow-down\"").unwrap();
    assert_eq!(key, Key::ArrowDown);
}
