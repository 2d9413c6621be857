//! Platform abstraction layer
//!
//! Turns raw key events from whatever front end is driving the session into
//! per-tick `Controls`.

pub mod input;

pub use input::{InputBridge, Key, KeyEvent};
