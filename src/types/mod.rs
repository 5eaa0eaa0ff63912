pub mod job;
pub mod resume;

pub use job::{Guidance, JobResult, JobSearchData, JobSearchRequest, JobSearchResponse};
pub use resume::{DeleteAck, ResumeRecord};
