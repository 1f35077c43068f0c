//! Eventhub — Events bounded context.
//!
//! Responsible for event aggregates, the ticket packages attached to them,
//! and the service that creates, reads and deletes them.

pub mod application;
pub mod data;
pub mod domain;
