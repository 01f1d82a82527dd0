//! Background jobs and the status surface over them.
//!
//! - `WorkPool`: one worker thread per exploration job, results streamed
//!   back over a channel
//! - `StatusService`: job status and paginated results with links

pub mod status;
pub mod work_pool;

pub use status::{ResultsPage, Response, StatusService, WorkSummary};
pub use work_pool::{JobId, JobStatus, WorkPool};
