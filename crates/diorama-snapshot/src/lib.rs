//! Diorama Snapshot - The serializable record of a scene
//!
//! A snapshot lists every identified object's transform, material and
//! provenance, the images bound to artwork surfaces and the active skybox.
//! Values are rounded on capture so that capture, apply and capture again
//! yields identical records.

mod codec;
pub mod math;
mod migrate;
mod model;

pub use codec::{from_json, from_json_with_policy, to_json, to_json_pretty};
pub use migrate::{migrate_document, upgrade, SchemaPolicy};
pub use model::{
    ImageBindingRecord, ObjectRecord, SkyboxPreset, Snapshot, CURRENT_SCHEMA_VERSION,
};
