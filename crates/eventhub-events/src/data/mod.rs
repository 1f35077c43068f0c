//! Persistence-facing entities, the in-process storage context and the
//! event repository.

pub mod entities;
pub mod event_repository;
pub mod memory;
