pub mod jobs;
pub mod keywords;
pub mod pipeline;
pub mod posts;
