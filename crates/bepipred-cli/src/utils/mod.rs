pub mod jobs;
pub mod progress;
