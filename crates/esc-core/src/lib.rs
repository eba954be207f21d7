//! Hardware-independent core library for esc-panel
//!
//! This crate contains all platform-agnostic logic for driving an electronic
//! speed controller through the `pigpiod` daemon: pulse-width types, the
//! daemon's command frame codec, the calibration script and its runner, the
//! panel configuration model, and the UI (widgets and pages).
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles for the desktop
//! panel and for host tests without pulling in any OS services.

#![no_std]

extern crate alloc;

pub mod calibration;
pub mod config;
pub mod output;
pub mod pages;
pub mod pigpio;
pub mod pulse;
pub mod ui;
