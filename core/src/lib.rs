//! # Hax Core
//!
//! Reversible action engine shared by the Hax editors: actions, grouped
//! undo/redo history, change notifications and the cross-thread action
//! queue.

pub mod abstract_editor;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
