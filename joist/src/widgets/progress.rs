//! Progress indicator state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::{RenderHandle, RenderSender, RenderSource, SourceKind};
use crate::widgets::RangeConfig;

/// Where a task stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    /// No value; the amount of work is unknown.
    Indeterminate,
    Progressing,
    Complete,
}

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub value: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub status: ProgressStatus,
    pub percent: Option<f64>,
}

/// Progress of a task. `None` means indeterminate.
///
/// Cloning shares the value.
#[derive(Debug, Clone)]
pub struct Progress {
    range: RangeConfig,
    value: Arc<RwLock<Option<f64>>>,
    dirty: Arc<AtomicBool>,
    render: RenderHandle,
}

impl Progress {
    /// Create a progress indicator. The value is clamped into `range`.
    pub fn new(range: RangeConfig, value: Option<f64>) -> Result<Self, ConfigError> {
        range.validate()?;
        Ok(Self {
            range,
            value: Arc::new(RwLock::new(value.map(|v| range.clamp(v)))),
            dirty: Arc::new(AtomicBool::new(false)),
            render: RenderHandle::new(SourceKind::Progress),
        })
    }

    /// Indeterminate progress over 0 to 100.
    pub fn indeterminate() -> Self {
        Self {
            range: RangeConfig::default(),
            value: Arc::new(RwLock::new(None)),
            dirty: Arc::new(AtomicBool::new(false)),
            render: RenderHandle::new(SourceKind::Progress),
        }
    }

    pub fn range(&self) -> RangeConfig {
        self.range
    }

    pub fn value(&self) -> Option<f64> {
        *self
            .value
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> ProgressStatus {
        match self.value() {
            None => ProgressStatus::Indeterminate,
            Some(v) if v >= self.range.max => ProgressStatus::Complete,
            Some(_) => ProgressStatus::Progressing,
        }
    }

    /// Percentage complete, or `None` when indeterminate.
    pub fn percent(&self) -> Option<f64> {
        self.value().map(|v| self.range.percent(v))
    }

    /// Update the value. Returns whether it changed.
    pub fn set_value(&self, value: Option<f64>) -> bool {
        let next = value.map(|v| self.range.clamp(v));
        let Ok(mut guard) = self.value.write() else {
            return false;
        };
        if *guard == next {
            return false;
        }
        *guard = next;
        drop(guard);
        self.dirty.store(true, Ordering::SeqCst);
        self.render.request();
        true
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            value: self.value(),
            min: self.range.min,
            max: self.range.max,
            status: self.status(),
            percent: self.percent(),
        }
    }

    pub fn install_render(&self, sender: RenderSender) {
        self.render.install(sender);
    }

    pub fn render_source(&self) -> RenderSource {
        self.render.source()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}
