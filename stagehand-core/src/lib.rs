//! Stagehand Core
//!
//! Core types and decision logic for staging local work as queued build jobs.
//!
//! This crate contains:
//! - Domain types: repository identity, branch tracking state, patches, jobs
//! - DTOs: requests and outcomes exchanged with the job queue
//! - The payload builder
//!
//! Nothing in here performs I/O. Git access lives in the CLI, persistence in
//! the queue crate.

pub mod domain;
pub mod dto;
pub mod payload;
