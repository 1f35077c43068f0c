//! Application services for the Events context.

pub mod event_service;
