//! The `utils` module provides small shared helpers used across the
//! application, currently logging initialization.

pub mod logging;
