//! Per-resource endpoint services.

mod arrays;
mod buckets;
mod file_systems;
mod logs;
mod policies;

pub use arrays::ArraysService;
pub use buckets::BucketsService;
pub use file_systems::FileSystemsService;
pub use logs::LogsService;
pub use policies::PoliciesService;
