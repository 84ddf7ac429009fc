//! Where loaded images are written

use diorama_core::Result;
use diorama_scene::{ImageOverride, SceneWorld};
use parking_lot::Mutex;
use std::sync::Arc;

/// The live scene as shared between the apply pass and the image loader
pub type SharedScene = Arc<Mutex<SceneWorld>>;

/// Resolves an object id at write time and attaches an image to its surface
pub trait SurfaceTarget: Send + Sync {
    fn attach(&self, object_id: &str, image: ImageOverride) -> Result<()>;
}

impl SurfaceTarget for Mutex<SceneWorld> {
    fn attach(&self, object_id: &str, image: ImageOverride) -> Result<()> {
        self.lock().set_image_override(object_id, image)
    }
}
