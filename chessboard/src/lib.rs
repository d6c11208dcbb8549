//! Chess board client core.
//!
//! - [`position_store`]: the authoritative position for one screen
//! - [`session`]: move handling and backend request sequencing
//! - [`engines`]: engine listing and confirmed selection
//! - [`health`]: backend liveness with a debounced banner

pub mod config;
pub mod engines;
pub mod health;
pub mod position_store;
pub mod session;
pub mod terminal;

pub use config::ClientConfig;
pub use engines::{EngineInfo, EngineSelector, SelectStart, SelectionError};
pub use health::{spawn_health_monitor, BannerEvent, HealthDisplay, HealthHandle, HealthStatus};
pub use position_store::{MoveEvent, PositionStore, StoreError};
pub use session::{spawn_session, SessionHandle, SessionMode, SessionSnapshot, SessionState};
