// Main library entry point for include_trace.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
