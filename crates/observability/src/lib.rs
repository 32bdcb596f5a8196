//! Tracing/logging setup shared by the binaries and tests.

pub mod subscriber;

pub use subscriber::{init, LogFormat, UnknownLogFormat};
