//! Diorama Images - Remote images on artwork surfaces
//!
//! Bindings collected by the apply pass are fetched here, off the
//! synchronous path, with a cap on in-flight downloads and a url cache that
//! lives as long as the loader.

mod fetch;
mod loader;
mod target;

pub use fetch::{decode_image, HttpFetcher, ImageFetcher};
pub use loader::{BindingFailure, BindingReport, ImageBindingLoader, DEFAULT_MAX_CONCURRENT};
pub use target::{SharedScene, SurfaceTarget};
