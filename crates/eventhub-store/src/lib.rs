//! Eventhub Store — PostgreSQL storage context.
//!
//! Implements `Store<T>` for events, packages and the join rows between
//! them. The schema lives in the workspace `migrations/` directory.

pub mod pg_context;
mod predicate;
