pub mod callbacks;
pub mod destinations;
pub mod dispatch;
pub mod jobs;
