//! Interface to the external animation driver.
//!
//! The driver measures element geometry and plays the open/close
//! transitions. It lives outside this crate; panels only issue commands and
//! receive completion callbacks through a [`TransitionSink`]. Every call may
//! fail with [`DriverError::Disconnected`] or [`DriverError::Canceled`] when
//! the host page goes away.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::DriverError;
use crate::handle::ElementHandle;

/// Receiver of driver completion callbacks.
pub trait TransitionCallbacks: Send + Sync {
    /// The open transition finished.
    fn on_open_complete(&self);
    /// The close transition finished.
    fn on_close_complete(&self);
}

/// Callback identity handed to the driver at initialization.
#[derive(Clone)]
pub struct TransitionSink {
    target: Arc<dyn TransitionCallbacks>,
}

impl TransitionSink {
    /// Wrap a callback receiver.
    pub fn new(target: Arc<dyn TransitionCallbacks>) -> Self {
        Self { target }
    }

    /// Report that the open transition finished.
    pub fn on_open_complete(&self) {
        self.target.on_open_complete();
    }

    /// Report that the close transition finished.
    pub fn on_close_complete(&self) {
        self.target.on_close_complete();
    }
}

impl std::fmt::Debug for TransitionSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSink").finish_non_exhaustive()
    }
}

/// The four operations of an animation driver, addressed by element handle.
///
/// Every `open`/`close` that returns `Ok` is answered by exactly one
/// completion through the sink, also when a later command interrupts it.
/// Panels count unanswered commands and only act on the answer to the
/// latest one.
#[async_trait]
pub trait AnimationDriver: Send + Sync {
    /// Prepare measurement and transition variables for `handle`.
    ///
    /// Called at most once per mounted lifetime of a handle, before any
    /// `open`/`close`.
    async fn initialize(
        &self,
        handle: ElementHandle,
        sink: TransitionSink,
        initially_open: bool,
        css_var_prefix: &str,
    ) -> Result<(), DriverError>;

    /// Begin the open transition. Completion is reported through the sink.
    async fn open(&self, handle: ElementHandle, immediate: bool) -> Result<(), DriverError>;

    /// Begin the close transition. Completion is reported through the sink.
    async fn close(&self, handle: ElementHandle) -> Result<(), DriverError>;

    /// Release driver-side resources. Idempotent.
    async fn dispose(&self, handle: ElementHandle) -> Result<(), DriverError>;
}

/// Driver without animation: every transition completes during the call.
///
/// Suitable for hosts that do not animate and for driving widgets in tests.
#[derive(Debug, Default)]
pub struct InstantDriver {
    sinks: Mutex<HashMap<ElementHandle, TransitionSink>>,
}

impl InstantDriver {
    /// Create a driver with no initialized handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently initialized.
    pub fn initialized(&self) -> usize {
        self.sinks.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn sink(&self, handle: &ElementHandle) -> Option<TransitionSink> {
        self.sinks
            .lock()
            .ok()
            .and_then(|guard| guard.get(handle).cloned())
    }
}

#[async_trait]
impl AnimationDriver for InstantDriver {
    async fn initialize(
        &self,
        handle: ElementHandle,
        sink: TransitionSink,
        _initially_open: bool,
        _css_var_prefix: &str,
    ) -> Result<(), DriverError> {
        if let Ok(mut guard) = self.sinks.lock() {
            guard.insert(handle, sink);
        }
        Ok(())
    }

    async fn open(&self, handle: ElementHandle, _immediate: bool) -> Result<(), DriverError> {
        let sink = self.sink(&handle).ok_or(DriverError::Disconnected)?;
        sink.on_open_complete();
        Ok(())
    }

    async fn close(&self, handle: ElementHandle) -> Result<(), DriverError> {
        let sink = self.sink(&handle).ok_or(DriverError::Disconnected)?;
        sink.on_close_complete();
        Ok(())
    }

    async fn dispose(&self, handle: ElementHandle) -> Result<(), DriverError> {
        if let Ok(mut guard) = self.sinks.lock() {
            guard.remove(&handle);
        }
        Ok(())
    }
}
