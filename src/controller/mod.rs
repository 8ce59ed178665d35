//! Popup controller module
//!
//! This module contains the transient UI side: the controller speaking the
//! command protocol and the view model it keeps up to date.

pub mod popup;
pub mod view;

// Re-export main types
pub use popup::PopupController;
pub use view::{format_compact_time, format_date, PopupView, RecordRow, EMPTY_HISTORY};
