//! Repository Module
//!
//! Data access layer for the Postgres job store.

pub mod job;

pub use job as job_repository;
