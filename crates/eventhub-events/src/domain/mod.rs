//! Domain shapes returned to callers.

pub mod models;
