//! Service layer
//!
//! The decision logic of a staging run. Each service talks to git only
//! through the [`Vcs`](crate::vcs::Vcs) trait and to the queue only through
//! [`JobQueue`](stagehand_queue::JobQueue), so everything here runs against
//! test doubles.

pub mod patch;
pub mod stage;
pub mod upstream;
