//! Health Monitor: backend liveness polling with a debounced banner.

mod monitor;
mod tracker;

pub use monitor::{spawn_health_monitor, HealthHandle, HealthMonitor, Visibility};
pub use tracker::{BannerEvent, HealthDisplay, HealthStatus, HealthTracker, HideToken};
