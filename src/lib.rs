//! Read-later selection client for Feedcircuit.
//!
//! Turns checkbox toggles on the feed and selected-item lists into add/remove
//! mutations, sends them, and runs the page's post-response continuation.

pub mod capture;
pub mod config;
pub mod dispatch;
pub mod selection;
