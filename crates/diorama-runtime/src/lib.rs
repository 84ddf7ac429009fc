//! Diorama Runtime - Session orchestration
//!
//! A `Session` ties a live scene to its catalogs, engines and image loader,
//! and moves snapshots between the scene, a blob store, a download sink and
//! remote urls. Configuration is layered from defaults, TOML files and the
//! environment.

mod artworks;
mod collection;
mod config;
mod remote;
mod session;
mod store;

pub use artworks::{merge_selected_artworks, ordered_resolver, ArtworkMeta};
pub use collection::{collection_bindings, fetch_collection_bindings};
pub use config::{ApplySection, DioramaConfig, DioramaConfigFile, ImagesSection, SceneSection};
pub use remote::scenario_url_from_query;
pub use session::{AppliedScenario, Session};
pub use store::{safe_file_name, BlobStore, ByteSink, DirectorySink, FileStore, MemoryStore};
