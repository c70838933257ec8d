//! Shared test helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use joist::driver::{AnimationDriver, TransitionSink};
use joist::error::DriverError;
use joist::handle::ElementHandle;

/// A driver call as seen by [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initialize {
        handle: ElementHandle,
        initially_open: bool,
        prefix: String,
    },
    Open {
        handle: ElementHandle,
        immediate: bool,
    },
    Close(ElementHandle),
    Dispose(ElementHandle),
}

/// Driver that records every call and completes transitions only when the
/// test says so.
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<Call>>,
    sinks: Mutex<HashMap<ElementHandle, TransitionSink>>,
    failure: Mutex<Option<DriverError>>,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make the next driver call fail with `error`.
    pub fn fail_next(&self, error: DriverError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// The sink captured when `handle` was initialized.
    pub fn sink(&self, handle: &ElementHandle) -> TransitionSink {
        self.sinks
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .expect("handle was never initialized")
    }

    pub fn complete_open(&self, handle: &ElementHandle) {
        self.sink(handle).on_open_complete();
    }

    pub fn complete_close(&self, handle: &ElementHandle) {
        self.sink(handle).on_close_complete();
    }

    fn record(&self, call: Call) -> Result<(), DriverError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AnimationDriver for RecordingDriver {
    async fn initialize(
        &self,
        handle: ElementHandle,
        sink: TransitionSink,
        initially_open: bool,
        css_var_prefix: &str,
    ) -> Result<(), DriverError> {
        self.record(Call::Initialize {
            handle,
            initially_open,
            prefix: css_var_prefix.to_string(),
        })?;
        self.sinks.lock().unwrap().insert(handle, sink);
        Ok(())
    }

    async fn open(&self, handle: ElementHandle, immediate: bool) -> Result<(), DriverError> {
        self.record(Call::Open { handle, immediate })
    }

    async fn close(&self, handle: ElementHandle) -> Result<(), DriverError> {
        self.record(Call::Close(handle))
    }

    async fn dispose(&self, handle: ElementHandle) -> Result<(), DriverError> {
        self.record(Call::Dispose(handle))
    }
}
