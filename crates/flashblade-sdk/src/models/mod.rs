//! Data models for the FlashBlade SDK.
//!
//! Resource models keep every field optional: the array only returns the
//! fields a given API version knows about. Fields this crate does not model
//! are kept in `extra`.

mod api_version;
mod arrays;
mod buckets;
mod common;
mod file_systems;
mod policies;

pub use api_version::*;
pub use arrays::*;
pub use buckets::*;
pub use common::*;
pub use file_systems::*;
pub use policies::*;

/// Implements [`Reference`](crate::Reference) for a model with optional
/// `id` and `name` fields.
macro_rules! impl_reference {
    ($($model:ty),+ $(,)?) => {
        $(
            impl $crate::reference::Reference for $model {
                fn id(&self) -> Option<&str> {
                    self.id.as_deref()
                }

                fn name(&self) -> Option<&str> {
                    self.name.as_deref()
                }
            }
        )+
    };
}

impl_reference!(Array, Bucket, FileSystem, Policy);
