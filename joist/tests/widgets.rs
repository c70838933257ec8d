mod common;

use std::sync::Arc;

use common::{Call, RecordingDriver};
use joist::driver::InstantDriver;
use joist::error::ConfigError;
use joist::focus::{Direction, Orientation};
use joist::handle::ElementHandle;
use joist::keys::Key;
use joist::notifier::ChangeReason;
use joist::panel::{HiddenMode, PanelPhase};
use joist::widgets::checkbox::{CheckedState, Checkbox};
use joist::widgets::collapsible::{Collapsible, CollapsibleConfig};
use joist::widgets::meter::Meter;
use joist::widgets::navigation_menu::{NavigationMenu, NavigationMenuConfig};
use joist::widgets::progress::{Progress, ProgressStatus};
use joist::widgets::radio::{RadioConfig, RadioGroup};
use joist::widgets::slider::{Slider, SliderConfig};
use joist::widgets::switch::Switch;
use joist::widgets::toolbar::{Toolbar, ToolbarConfig};
use joist::widgets::RangeConfig;

// =============================================================================
// Collapsible Tests
// =============================================================================

#[tokio::test]
async fn test_collapsible_press_opens_panel() {
    let driver = RecordingDriver::new();
    let collapsible = Collapsible::new(CollapsibleConfig::new(), None, false, driver.clone());
    assert_eq!(collapsible.panel().phase(), PanelPhase::Unmounted);

    assert!(collapsible.press());
    assert!(collapsible.is_open());
    assert!(collapsible.context().snapshot().open);
    assert_eq!(collapsible.panel().phase(), PanelPhase::Opening);

    let handle = ElementHandle::new();
    collapsible.panel().attach(handle);
    collapsible.panel().sync_driver().await.unwrap();
    assert_eq!(
        driver.calls()[0],
        Call::Initialize {
            handle,
            initially_open: false,
            prefix: "collapsible-panel".to_string(),
        }
    );
    driver.complete_open(&handle);
    assert_eq!(collapsible.snapshot().panel.phase, PanelPhase::Open);
}

#[test]
fn test_collapsible_controlled() {
    let collapsible = Collapsible::new(
        CollapsibleConfig::new(),
        Some(false),
        false,
        Arc::new(InstantDriver::new()),
    );
    assert!(collapsible.press());
    assert!(!collapsible.is_open());

    assert_eq!(collapsible.set_open(Some(true)), Ok(true));
    assert!(collapsible.is_open());
    assert_eq!(collapsible.panel().phase(), PanelPhase::Opening);
    assert!(collapsible.set_open(None).is_err());
}

#[test]
fn test_collapsible_disabled_and_keys() {
    let collapsible = Collapsible::new(
        CollapsibleConfig::new().disabled(true),
        None,
        false,
        Arc::new(InstantDriver::new()),
    );
    assert!(!collapsible.handle_key(Key::Enter));

    collapsible.set_disabled(false);
    assert!(collapsible.handle_key(Key::Space));
    assert!(!collapsible.handle_key(Key::ArrowDown));
    assert!(collapsible.is_open());
}

#[test]
fn test_collapsible_reveal() {
    let collapsible = Collapsible::new(
        CollapsibleConfig::new().hidden_until_found(true),
        None,
        false,
        Arc::new(InstantDriver::new()),
    );
    assert_eq!(
        collapsible.panel().hidden_mode(),
        Some(HiddenMode::UntilFound)
    );

    assert!(collapsible.reveal());
    assert!(collapsible.is_open());
    assert!(!collapsible.reveal());
}

// =============================================================================
// Checkbox Tests
// =============================================================================

#[test]
fn test_checkbox_toggle() {
    let checkbox = Checkbox::unchecked();
    assert!(checkbox.toggle());
    assert_eq!(checkbox.checked(), CheckedState::Checked);
    assert!(checkbox.toggle());
    assert_eq!(checkbox.checked(), CheckedState::Unchecked);
}

#[test]
fn test_indeterminate_press_checks() {
    let checkbox = Checkbox::new(None, CheckedState::Indeterminate);
    assert!(!checkbox.is_checked());
    assert!(checkbox.toggle());
    assert_eq!(checkbox.checked(), CheckedState::Checked);
}

#[test]
fn test_checkbox_disabled_and_read_only() {
    let checkbox = Checkbox::unchecked();
    checkbox.set_disabled(true);
    assert!(!checkbox.toggle());

    checkbox.set_disabled(false);
    checkbox.set_read_only(true);
    assert!(!checkbox.handle_key(Key::Space));
    assert_eq!(checkbox.checked(), CheckedState::Unchecked);
}

#[test]
fn test_checkbox_space_only() {
    let checkbox = Checkbox::unchecked().required(true);
    assert!(!checkbox.handle_key(Key::Enter));
    assert!(checkbox.handle_key(Key::Space));
    assert!(checkbox.snapshot().required);
    assert!(checkbox.is_dirty());
}

#[test]
fn test_checkbox_controlled() {
    let checkbox = Checkbox::new(Some(CheckedState::Unchecked), CheckedState::Unchecked);
    assert!(checkbox.toggle());
    assert_eq!(checkbox.checked(), CheckedState::Unchecked);
    assert_eq!(checkbox.set_external(Some(CheckedState::Checked)), Ok(true));
    assert!(checkbox.is_checked());
}

// =============================================================================
// Switch Tests
// =============================================================================

#[test]
fn test_switch_toggle() {
    let switch = Switch::default();
    assert!(switch.handle_key(Key::Enter));
    assert!(switch.is_checked());
    assert!(switch.handle_key(Key::Space));
    assert!(!switch.is_checked());
}

#[test]
fn test_switch_cancel_and_read_only() {
    let switch = Switch::new(None, true);
    switch.on_checked_change(|_, request| request.cancel());
    assert!(!switch.toggle());
    assert!(switch.is_checked());

    switch.set_read_only(true);
    assert!(switch.snapshot().read_only);
    assert!(!switch.toggle());
}

// =============================================================================
// Radio Tests
// =============================================================================

#[test]
fn test_radio_press_selects() {
    let group = RadioGroup::new(RadioConfig::new(), None, None);
    let a = group.radio("a", 0u32);
    let b = group.radio("b", 1u32);

    assert!(a.press());
    assert!(a.is_checked());
    assert!(b.press());
    assert_eq!(group.value(), Some("b"));
    assert!(!a.is_checked());
    assert!(!b.press());
}

#[test]
fn test_radio_arrows_select_and_skip_disabled() {
    let group = RadioGroup::new(RadioConfig::new(), None, Some("a"));
    let a = group.radio("a", 0u32);
    let b = group.radio("b", 1u32);
    let c = group.radio("c", 2u32);
    b.set_disabled(true);

    assert_eq!(group.tab_stop(), Some(a.handle()));
    assert!(group.handle_key(Key::ArrowDown));
    assert_eq!(group.value(), Some("c"));
    assert_eq!(c.snapshot().tab_index, 0);

    assert!(group.handle_key(Key::ArrowDown));
    assert_eq!(group.value(), Some("a"));
}

#[test]
fn test_radio_rtl_flips_horizontal() {
    let group = RadioGroup::new(
        RadioConfig::new().direction(Direction::Rtl),
        None,
        Some("a"),
    );
    group.radio("a", 0u32);
    group.radio("b", 1u32);

    assert!(group.handle_key(Key::ArrowLeft));
    assert_eq!(group.value(), Some("b"));
}

#[test]
fn test_radio_read_only_group() {
    let group = RadioGroup::new(RadioConfig::new().read_only(true), None, None);
    let a = group.radio("a", 0u32);
    assert!(!a.press());
    assert_eq!(group.value(), None);
}

#[test]
fn test_radio_unmount_reindexes() {
    let group = RadioGroup::new(RadioConfig::new(), None, None);
    let a = group.radio(1, 0u32);
    let b = group.radio(2, 1u32);
    a.unmount();
    assert_eq!(b.index(), Some(0));
}

// =============================================================================
// Toolbar Tests
// =============================================================================

#[test]
fn test_toolbar_horizontal_roving() {
    let toolbar = Toolbar::new(ToolbarConfig::new());
    let a = toolbar.item(0u32, false, true);
    let b = toolbar.item(1u32, false, true);

    assert_eq!(a.snapshot().tab_index, 0);
    assert_eq!(toolbar.handle_key(Key::ArrowDown), None);
    assert_eq!(toolbar.handle_key(Key::ArrowRight), Some(a.handle()));
    assert_eq!(toolbar.handle_key(Key::ArrowRight), Some(b.handle()));
    assert_eq!(b.snapshot().tab_index, 0);
}

#[test]
fn test_toolbar_disabled_items() {
    let toolbar = Toolbar::new(ToolbarConfig::new().loop_focus(false));
    let a = toolbar.item(0u32, false, true);
    let b = toolbar.item(1u32, true, true);
    let c = toolbar.item(2u32, true, false);
    a.focus();

    assert!(b.is_disabled());
    // Focusable while disabled.
    assert_eq!(toolbar.handle_key(Key::ArrowRight), Some(b.handle()));
    // Not focusable: skipped, and no loop.
    assert_eq!(toolbar.handle_key(Key::ArrowRight), None);
    assert!(!c.focus());
}

#[test]
fn test_toolbar_context_follows_config() {
    let toolbar = Toolbar::new(ToolbarConfig::new());
    let context = toolbar.context();
    toolbar.set_orientation(Orientation::Vertical);
    assert_eq!(context.snapshot().orientation, Orientation::Vertical);
    assert_eq!(context.version(), 1);
}

// =============================================================================
// Navigation Menu Tests
// =============================================================================

#[test]
fn test_navigation_menu_activate_and_close() {
    let menu = NavigationMenu::new(
        NavigationMenuConfig::new(),
        None,
        None,
        Arc::new(InstantDriver::new()),
    );
    let products = menu.item(Some("products"), 0u32).unwrap();
    let docs = menu.item(Some("docs"), 1u32).unwrap();

    assert!(products.press());
    assert!(products.is_active());
    assert_eq!(products.content().phase(), PanelPhase::Opening);

    assert!(docs.press());
    assert_eq!(menu.value(), Some("docs"));
    assert_eq!(products.content().phase(), PanelPhase::Unmounted);

    // Pressing the active trigger closes it.
    assert!(docs.press());
    assert!(!menu.is_open());
}

#[test]
fn test_navigation_menu_escape() {
    let menu = NavigationMenu::new(
        NavigationMenuConfig::new(),
        None,
        Some("docs"),
        Arc::new(InstantDriver::new()),
    );
    let docs = menu.item(Some("docs"), 0u32).unwrap();
    assert_eq!(docs.content().phase(), PanelPhase::Open);

    assert!(menu.handle_key(Key::Escape));
    assert_eq!(menu.value(), None);
    assert_eq!(docs.content().phase(), PanelPhase::Closing);
    assert!(!menu.handle_key(Key::Escape));
}

#[test]
fn test_navigation_menu_trigger_focus() {
    let menu: NavigationMenu<&str> = NavigationMenu::new(
        NavigationMenuConfig::new(),
        None,
        None,
        Arc::new(InstantDriver::new()),
    );
    let a = menu.item(Some("a"), 0u32).unwrap();
    let b = menu.item(Some("b"), 1u32).unwrap();
    a.press();

    assert!(menu.handle_key(Key::ArrowRight));
    assert_eq!(b.snapshot().tab_index, 0);
}

// =============================================================================
// Slider Tests
// =============================================================================

#[test]
fn test_slider_rejects_bad_config() {
    assert_eq!(
        Slider::new(SliderConfig::new().range(10.0, 10.0), None, vec![10.0]).err(),
        Some(ConfigError::InvalidRange {
            min: 10.0,
            max: 10.0
        })
    );
    assert_eq!(
        Slider::new(SliderConfig::new().step(0.0), None, vec![0.0]).err(),
        Some(ConfigError::InvalidStep { step: 0.0 })
    );
}

#[test]
fn test_slider_snaps_and_clamps() {
    let slider = Slider::new(SliderConfig::new().step(5.0), None, vec![12.0]).unwrap();
    assert_eq!(slider.values(), vec![10.0]);

    assert!(slider.set_thumb(0, 150.0, ChangeReason::Pointer));
    assert_eq!(slider.value(0), Some(100.0));
    assert!(slider.set_thumb(0, -3.0, ChangeReason::Pointer));
    assert_eq!(slider.value(0), Some(0.0));
}

#[test]
fn test_slider_decimal_step() {
    let slider = Slider::new(
        SliderConfig::new().range(0.0, 1.0).step(0.1),
        None,
        vec![0.0],
    )
    .unwrap();
    for _ in 0..3 {
        slider.handle_key(0, Key::ArrowRight);
    }
    assert_eq!(slider.value(0), Some(0.3));
}

#[test]
fn test_slider_thumbs_do_not_cross() {
    let slider = Slider::new(
        SliderConfig::new().min_steps_between_values(2),
        None,
        vec![40.0, 20.0],
    )
    .unwrap();
    assert_eq!(slider.values(), vec![20.0, 40.0]);

    slider.set_thumb(0, 90.0, ChangeReason::Pointer);
    assert_eq!(slider.values(), vec![38.0, 40.0]);
    slider.set_thumb(1, 0.0, ChangeReason::Pointer);
    assert_eq!(slider.values(), vec![38.0, 40.0]);
}

#[test]
fn test_slider_keys() {
    let slider = Slider::new(SliderConfig::new(), None, vec![50.0]).unwrap();
    slider.handle_key(0, Key::ArrowRight);
    assert_eq!(slider.value(0), Some(51.0));
    slider.handle_key(0, Key::PageDown);
    assert_eq!(slider.value(0), Some(41.0));
    slider.handle_key(0, Key::End);
    assert_eq!(slider.value(0), Some(100.0));
    assert!(!slider.handle_key(0, Key::ArrowUp));
    slider.handle_key(0, Key::Home);
    assert_eq!(slider.value(0), Some(0.0));
    assert!(!slider.handle_key(3, Key::Home));
}

#[test]
fn test_slider_rtl_flips_arrows() {
    let slider = Slider::new(
        SliderConfig::new().direction(Direction::Rtl),
        None,
        vec![50.0],
    )
    .unwrap();
    slider.handle_key(0, Key::ArrowRight);
    assert_eq!(slider.value(0), Some(49.0));
    slider.handle_key(0, Key::ArrowUp);
    assert_eq!(slider.value(0), Some(50.0));
}

#[test]
fn test_slider_disabled_and_snapshot() {
    let slider = Slider::new(SliderConfig::new().range(0.0, 200.0), None, vec![50.0]).unwrap();
    let snapshot = slider.snapshot();
    assert_eq!(snapshot.percents, vec![25.0]);

    slider.set_disabled(true);
    assert!(!slider.handle_key(0, Key::End));
    assert!(slider.snapshot().disabled);
}

#[test]
fn test_slider_controlled() {
    let slider = Slider::new(SliderConfig::new(), Some(vec![10.0]), vec![]).unwrap();
    assert!(slider.set_thumb(0, 20.0, ChangeReason::Pointer));
    assert_eq!(slider.values(), vec![10.0]);
    assert_eq!(slider.set_values(Some(vec![20.0])), Ok(true));
    assert_eq!(slider.values(), vec![20.0]);
}

// =============================================================================
// Progress and Meter Tests
// =============================================================================

#[test]
fn test_progress_status() {
    let progress = Progress::new(RangeConfig::default(), Some(30.0)).unwrap();
    assert_eq!(progress.status(), ProgressStatus::Progressing);
    assert_eq!(progress.percent(), Some(30.0));

    assert!(progress.set_value(Some(250.0)));
    assert_eq!(progress.value(), Some(100.0));
    assert_eq!(progress.status(), ProgressStatus::Complete);

    assert!(progress.set_value(None));
    assert_eq!(progress.status(), ProgressStatus::Indeterminate);
    assert_eq!(progress.percent(), None);
    assert!(!progress.set_value(None));
}

#[test]
fn test_progress_custom_range() {
    let progress = Progress::new(RangeConfig::new(10.0, 20.0), Some(15.0)).unwrap();
    assert_eq!(progress.percent(), Some(50.0));
    assert!(Progress::new(RangeConfig::new(5.0, 1.0), None).is_err());
    assert_eq!(Progress::indeterminate().status(), ProgressStatus::Indeterminate);
}

#[test]
fn test_meter_clamps() {
    let meter = Meter::new(RangeConfig::new(0.0, 1.0), 1.5).unwrap();
    assert_eq!(meter.value(), 1.0);
    assert_eq!(meter.percent(), 100.0);

    assert!(meter.set_value(0.25));
    assert_eq!(meter.snapshot().percent, 25.0);
    assert!(Meter::new(RangeConfig::new(0.0, f64::INFINITY), 0.0).is_err());
}
