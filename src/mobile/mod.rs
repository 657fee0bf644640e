//! Clipfeed Mobile — Touch-First Interaction
//!
//! - Swipe gesture tracking with axis lock (swipe vs. scroll)
//! - Swipeable action rows for egui
//! - Injected platform capabilities (haptics, clipboard, share)

pub mod capability;
pub mod touch;
pub mod ui;
