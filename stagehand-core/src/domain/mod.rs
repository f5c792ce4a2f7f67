//! Core domain types
//!
//! These types describe what a staging run resolves about the local
//! repository and what it hands to the job queue. They are shared between the
//! CLI (which resolves them) and the queue (which persists them).

pub mod job;
pub mod patch;
pub mod repository;
