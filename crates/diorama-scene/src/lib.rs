//! Diorama Scene - The live scene of identified objects
//!
//! This crate wraps hecs with stable string object ids, provenance
//! tracking and the surfaces reconciliation writes to. It also loads
//! authored scene files, which populate the world with fixed objects.

mod authored;
mod components;
mod environment;
mod identity;
mod world;

pub use authored::{
    load_scene, load_scene_string, save_scene, save_scene_string, AuthoredObject, AuthoredScene,
    SceneMetadata,
};
pub use components::{Active, ImageOverride, ImageSurface, Provenance, Renderable, SurfaceImage};
pub use environment::{ActiveSkybox, Environment};
pub use identity::{ensure_id, Placement};
pub use world::{ObjectView, SceneWorld};
