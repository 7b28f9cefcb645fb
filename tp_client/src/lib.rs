//! Internal modules for the TaskPilot terminal client.
//!
//! This library provides command parsing, command execution, and logging
//! setup used by the tp_client binary.

pub mod commands;
pub mod logging;
pub mod session;
