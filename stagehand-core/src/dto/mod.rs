//! Data Transfer Objects
//!
//! Requests and outcomes exchanged between the CLI and the job queue.

pub mod job;
