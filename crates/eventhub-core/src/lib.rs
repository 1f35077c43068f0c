//! Eventhub Core — shared persistence abstractions.
//!
//! This crate defines the result types, the storage-context contract and the
//! generic repository that every entity kind is persisted through. It
//! contains no infrastructure code.

pub mod entity;
pub mod error;
pub mod repository;
pub mod result;
pub mod store;
