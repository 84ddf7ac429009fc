//! Components attached to identified objects

use diorama_catalog::Material;
use std::fmt;
use std::sync::Arc;

/// Where an object came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Authored directly in the scene; never created or destroyed by reconciliation
    Fixed,
    /// Instantiated from a prefab catalog entry
    Spawned { template_id: String },
}

impl Provenance {
    pub fn is_spawned(&self) -> bool {
        matches!(self, Provenance::Spawned { .. })
    }

    /// The template id, empty for fixed objects
    pub fn template_id(&self) -> &str {
        match self {
            Provenance::Fixed => "",
            Provenance::Spawned { template_id } => template_id,
        }
    }
}

/// Active flag. Inactive objects are hidden but still captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active(pub bool);

/// The renderable surface and the material currently bound to it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Renderable {
    pub material: Option<Material>,
}

/// A decoded RGBA8 image
#[derive(Clone, PartialEq, Eq)]
pub struct SurfaceImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SurfaceImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }
}

impl fmt::Debug for SurfaceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceImage({}x{})", self.width, self.height)
    }
}

/// A per-object image attached on top of the shared material
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOverride {
    pub url: String,
    pub image: Arc<SurfaceImage>,
}

/// The surface remote images are bound to (artwork frames)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSurface {
    pub override_image: Option<ImageOverride>,
}

impl ImageSurface {
    pub fn url(&self) -> Option<&str> {
        self.override_image.as_ref().map(|o| o.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_template_id() {
        assert_eq!(Provenance::Fixed.template_id(), "");
        let spawned = Provenance::Spawned {
            template_id: "frame".into(),
        };
        assert!(spawned.is_spawned());
        assert_eq!(spawned.template_id(), "frame");
    }

    #[test]
    fn test_image_surface_url() {
        let mut surface = ImageSurface::default();
        assert_eq!(surface.url(), None);
        surface.override_image = Some(ImageOverride {
            url: "https://img/a.png".into(),
            image: Arc::new(SurfaceImage::new(1, 1, vec![0, 0, 0, 255])),
        });
        assert_eq!(surface.url(), Some("https://img/a.png"));
    }
}
