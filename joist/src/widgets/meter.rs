//! Meter: a scalar measurement within a known range.

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::error::ConfigError;
use crate::render::{RenderHandle, RenderSender, RenderSource, SourceKind};
use crate::widgets::RangeConfig;

/// Snapshot for the attribute layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct Meter {
    range: RangeConfig,
    value: Arc<RwLock<f64>>,
    render: RenderHandle,
}

impl Meter {
    /// Create a meter. The value is clamped into `range`.
    pub fn new(range: RangeConfig, value: f64) -> Result<Self, ConfigError> {
        range.validate()?;
        Ok(Self {
            range,
            value: Arc::new(RwLock::new(range.clamp(value))),
            render: RenderHandle::new(SourceKind::Meter),
        })
    }

    pub fn range(&self) -> RangeConfig {
        self.range
    }

    pub fn value(&self) -> f64 {
        *self
            .value
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn percent(&self) -> f64 {
        self.range.percent(self.value())
    }

    /// Update the value, clamped into range. Returns whether it changed.
    pub fn set_value(&self, value: f64) -> bool {
        let next = self.range.clamp(value);
        let Ok(mut guard) = self.value.write() else {
            return false;
        };
        if *guard == next {
            return false;
        }
        *guard = next;
        drop(guard);
        self.render.request();
        true
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            value: self.value(),
            min: self.range.min,
            max: self.range.max,
            percent: self.percent(),
        }
    }

    pub fn install_render(&self, sender: RenderSender) {
        self.render.install(sender);
    }

    pub fn render_source(&self) -> RenderSource {
        self.render.source()
    }
}
