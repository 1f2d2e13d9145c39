//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (client → surface coordinates)
//! - Time
//! - Storage (LocalStorage on web, JSON files natively)

pub mod input;
pub mod storage;
pub mod time;

pub use input::{ClientRect, client_to_surface, first_touch};
pub use storage::{KeyValueStore, MemoryStore, PlatformStore};
pub use time::now_ms;
