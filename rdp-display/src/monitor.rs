//! Per-monitor HiDPI factors.
//!
//! A window's display scale depends on the monitor it sits on. The
//! windowing layer reports monitor areas in physical desktop coordinates;
//! [`MonitorScales`] maps a window origin to the factor of the monitor
//! holding it, so the [`WindowMetrics`] handed to the cursor pipeline carry
//! the right display scale.

use crate::platform::WindowMetrics;
use rdp_common::{Point, Rect};
use tracing::debug;

/// HiDPI factor of each monitor, keyed by its physical desktop area.
#[derive(Debug, Clone, Default)]
pub struct MonitorScales {
    monitors: Vec<(Rect, f64)>,
    primary: Option<usize>,
}

impl MonitorScales {
    /// Record a monitor covering `area` with HiDPI factor `scale`.
    ///
    /// The first monitor becomes primary unless a later one claims it.
    pub fn push(&mut self, area: Rect, scale: f64, is_primary: bool) {
        debug!(
            "Monitor {}x{}+{}+{} @{:.2}x (primary: {})",
            area.width, area.height, area.x, area.y, scale, is_primary
        );
        if is_primary || self.primary.is_none() {
            self.primary = Some(self.monitors.len());
        }
        self.monitors.push((area, scale));
    }

    /// Number of monitors known.
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// True if no monitor is known.
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// HiDPI factor of the primary monitor, 1.0 without monitors.
    pub fn primary_scale(&self) -> f64 {
        self.primary
            .and_then(|index| self.monitors.get(index))
            .map_or(1.0, |&(_, scale)| scale)
    }

    /// HiDPI factor at desktop position `point`, falling back to the
    /// primary monitor.
    pub fn scale_at(&self, point: Point) -> f64 {
        self.monitors
            .iter()
            .find(|(area, _)| area.contains_point(point.x, point.y))
            .map_or_else(|| self.primary_scale(), |&(_, scale)| scale)
    }

    /// `metrics` with the display scale of the monitor holding the window
    /// origin `origin`.
    pub fn apply(&self, metrics: WindowMetrics, origin: Point) -> WindowMetrics {
        WindowMetrics {
            display_scale: self.scale_at(origin),
            ..metrics
        }
    }
}
