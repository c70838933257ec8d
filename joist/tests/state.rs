use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use joist::error::ConfigError;
use joist::notifier::{ChangeNotifier, ChangeReason, ChangeRequest};
use joist::render::{self, SourceKind};
use joist::state::ControlledValueStore;

// =============================================================================
// ChangeNotifier Tests
// =============================================================================

#[test]
fn test_notify_without_listeners_is_not_canceled() {
    let notifier: ChangeNotifier<i32> = ChangeNotifier::new();
    let mut request = ChangeRequest::new(1, ChangeReason::Programmatic);
    assert!(notifier.notify(&0, &mut request));
    assert!(!request.is_canceled());
}

#[test]
fn test_listeners_run_in_subscription_order() {
    let notifier: ChangeNotifier<i32> = ChangeNotifier::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for name in ["a", "b", "c"] {
        let order = Arc::clone(&order);
        notifier.subscribe(move |_, _| order.lock().unwrap().push(name));
    }

    let mut request = ChangeRequest::new(1, ChangeReason::Programmatic);
    notifier.notify(&0, &mut request);
    assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_cancel_is_sticky_across_listeners() {
    let notifier: ChangeNotifier<i32> = ChangeNotifier::new();
    let saw_canceled = Arc::new(AtomicUsize::new(0));
    notifier.subscribe(|_, request| request.cancel());
    {
        let saw_canceled = Arc::clone(&saw_canceled);
        notifier.subscribe(move |_, request| {
            if request.is_canceled() {
                saw_canceled.fetch_add(1, Ordering::SeqCst);
            }
        });
    }

    let mut request = ChangeRequest::new(1, ChangeReason::Programmatic);
    assert!(!notifier.notify(&0, &mut request));
    assert_eq!(saw_canceled.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listener_sees_pre_change_value_and_reason() {
    let notifier: ChangeNotifier<&str> = ChangeNotifier::new();
    let seen = Arc::new(Mutex::new(None));
    {
        let seen = Arc::clone(&seen);
        notifier.subscribe(move |current, request| {
            *seen.lock().unwrap() = Some((*current, *request.proposed(), request.reason()));
        });
    }

    let mut request = ChangeRequest::new("next", ChangeReason::Keyboard);
    notifier.notify(&"current", &mut request);
    assert_eq!(
        *seen.lock().unwrap(),
        Some(("current", "next", ChangeReason::Keyboard))
    );
}

#[test]
fn test_unsubscribe() {
    let notifier: ChangeNotifier<i32> = ChangeNotifier::new();
    let id = notifier.subscribe(|_, request| request.cancel());
    assert_eq!(notifier.len(), 1);

    assert!(notifier.unsubscribe(id));
    assert!(!notifier.unsubscribe(id));
    assert!(notifier.is_empty());

    let mut request = ChangeRequest::new(1, ChangeReason::Programmatic);
    assert!(notifier.notify(&0, &mut request));
}

// =============================================================================
// Uncontrolled Store Tests
// =============================================================================

#[test]
fn test_uncontrolled_starts_at_default() {
    let store = ControlledValueStore::new(None, 5);
    assert!(!store.is_controlled());
    assert_eq!(store.current(), 5);
}

#[test]
fn test_uncontrolled_commits_accepted_change() {
    let store = ControlledValueStore::uncontrolled(false);
    assert!(store.request_change(true, ChangeReason::TriggerPress));
    assert!(store.current());
    assert!(store.is_dirty());

    store.clear_dirty();
    assert!(!store.is_dirty());
}

#[test]
fn test_canceled_change_leaves_value() {
    let store = ControlledValueStore::uncontrolled(1);
    store.on_change(|_, request| request.cancel());

    assert!(!store.request_change(2, ChangeReason::Programmatic));
    assert_eq!(store.current(), 1);
    assert!(!store.is_dirty());
}

#[test]
fn test_unchanged_candidate_raises_no_notification() {
    let store = ControlledValueStore::uncontrolled(3);
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = Arc::clone(&calls);
        store.on_change(move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert!(!store.request_change(3, ChangeReason::Programmatic));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_can_be_removed() {
    let store = ControlledValueStore::uncontrolled(0);
    let id = store.on_change(|_, request| request.cancel());
    assert!(store.remove_listener(id));

    assert!(store.request_change(1, ChangeReason::Programmatic));
    assert_eq!(store.current(), 1);
}

#[test]
fn test_reentrant_request_is_rejected() {
    let store = ControlledValueStore::uncontrolled(0);
    let inner_result = Arc::new(Mutex::new(None));
    {
        let inner = store.clone();
        let inner_result = Arc::clone(&inner_result);
        store.on_change(move |_, _| {
            let accepted = inner.request_change(100, ChangeReason::Programmatic);
            *inner_result.lock().unwrap() = Some(accepted);
        });
    }

    assert!(store.request_change(1, ChangeReason::Programmatic));
    assert_eq!(*inner_result.lock().unwrap(), Some(false));
    assert_eq!(store.current(), 1);
}

#[test]
fn test_panicking_listener_is_dropped() {
    let store = ControlledValueStore::uncontrolled(0);
    store.on_change(|_, _| panic!("listener failed"));
    let later = Arc::new(AtomicUsize::new(0));
    {
        let later = Arc::clone(&later);
        store.on_change(move |_, _| {
            later.fetch_add(1, Ordering::SeqCst);
        });
    }

    // The failed pass cancels the change but still reaches later listeners.
    assert!(!store.request_change(1, ChangeReason::Programmatic));
    assert_eq!(store.current(), 0);
    assert_eq!(later.load(Ordering::SeqCst), 1);

    assert!(store.request_change(2, ChangeReason::Programmatic));
    assert_eq!(store.current(), 2);
    assert_eq!(later.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Controlled Store Tests
// =============================================================================

#[test]
fn test_controlled_by_presence_not_value() {
    // Supplying a value equal to the default still makes it controlled.
    let store = ControlledValueStore::new(Some(0), 0);
    assert!(store.is_controlled());
}

#[test]
fn test_controlled_accepts_without_committing() {
    let store = ControlledValueStore::controlled(false);
    assert!(store.request_change(true, ChangeReason::TriggerPress));
    assert!(!store.current());
}

#[test]
fn test_controlled_reflects_parent_value() {
    let store = ControlledValueStore::controlled(vec!["first"]);
    assert_eq!(store.set_external(Some(vec!["second"])), Ok(true));
    assert_eq!(store.current(), vec!["second"]);
    assert_eq!(store.set_external(Some(vec!["second"])), Ok(false));
}

#[test]
fn test_mode_switch_rejected() {
    let controlled = ControlledValueStore::controlled(1);
    assert_eq!(
        controlled.set_external(None),
        Err(ConfigError::ControlModeSwitch {
            was_controlled: true
        })
    );
    assert_eq!(controlled.current(), 1);

    let uncontrolled = ControlledValueStore::uncontrolled(1);
    assert_eq!(
        uncontrolled.set_external(Some(2)),
        Err(ConfigError::ControlModeSwitch {
            was_controlled: false
        })
    );
    assert_eq!(uncontrolled.current(), 1);
    assert_eq!(uncontrolled.set_external(None), Ok(false));
}

// =============================================================================
// Render Request Tests
// =============================================================================

#[tokio::test]
async fn test_commit_requests_render() {
    let (sender, mut receiver) = render::channel();
    let store = ControlledValueStore::uncontrolled(0);
    store.install_render(sender);

    store.request_change(1, ChangeReason::Programmatic);
    store.request_change(2, ChangeReason::Programmatic);
    let pass = receiver.take_pass();
    assert_eq!(pass.sources(), &[store.render_source()]);
    assert!(receiver.take_pass().is_empty());
}

#[tokio::test]
async fn test_canceled_change_requests_no_render() {
    let (sender, mut receiver) = render::channel();
    let store = ControlledValueStore::uncontrolled(0);
    store.install_render(sender);
    store.on_change(|_, request| request.cancel());

    store.request_change(1, ChangeReason::Programmatic);
    assert!(receiver.take_pass().is_empty());
}

#[tokio::test]
async fn test_pass_collects_sources_in_first_request_order() {
    let (sender, mut receiver) = render::channel();
    let first = ControlledValueStore::uncontrolled(0);
    let second = ControlledValueStore::uncontrolled(0);
    first.install_render(sender.clone());
    second.install_render(sender);

    second.request_change(1, ChangeReason::Programmatic);
    first.request_change(1, ChangeReason::Programmatic);
    second.request_change(2, ChangeReason::Programmatic);

    let pass = receiver.recv().await;
    assert_eq!(pass.sources(), &[second.render_source(), first.render_source()]);
    assert_eq!(pass.of_kind(SourceKind::Store).count(), 2);
}

#[tokio::test]
async fn test_recv_wakes_on_request_from_another_task() {
    let (sender, mut receiver) = render::channel();
    let store = ControlledValueStore::uncontrolled(0);
    store.install_render(sender);

    let remote = store.clone();
    tokio::spawn(async move {
        remote.request_change(5, ChangeReason::Programmatic);
    });

    let pass = tokio::time::timeout(std::time::Duration::from_secs(1), receiver.recv())
        .await
        .unwrap();
    assert!(pass.contains(store.render_source()));
}

// =============================================================================
// Property Tests
// =============================================================================

mod properties {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use joist::notifier::ChangeReason;
    use joist::state::ControlledValueStore;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn canceled_requests_never_change_the_value(
            controlled in any::<bool>(),
            steps in prop::collection::vec((0u8..8, any::<bool>()), 0..48),
        ) {
            let store = ControlledValueStore::new(controlled.then_some(0u8), 0u8);
            let veto = Arc::new(AtomicBool::new(false));
            {
                let veto = Arc::clone(&veto);
                store.on_change(move |_, request| {
                    if veto.load(Ordering::SeqCst) {
                        request.cancel();
                    }
                });
            }

            let mut expected = 0u8;
            for (candidate, cancel) in steps {
                veto.store(cancel, Ordering::SeqCst);
                let accepted = store.request_change(candidate, ChangeReason::Programmatic);

                prop_assert_eq!(accepted, !cancel && candidate != expected);
                if accepted && !controlled {
                    expected = candidate;
                }
                prop_assert_eq!(store.current(), expected);
            }
        }
    }
}
