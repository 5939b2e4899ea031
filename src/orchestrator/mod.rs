//! Application-level orchestration.
//!
//! This module owns the run lifecycle (start/stop/quit) and what happens once a run
//! completes. UI/CLI layers send commands in and render the events that come out.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, UiCommand};
