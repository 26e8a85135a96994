//! Avatar resolution: uid -> local image path.
//!
//! The local directory is the cache. Remote profile lookup and image download
//! sit behind traits so the resolver can be driven without network access.

pub mod http;
pub mod resolver;

pub use http::{HttpImageFetch, HttpProfileLookup};
pub use resolver::{AvatarResolver, ImageFetch, ProfileLookup, Resolution};
