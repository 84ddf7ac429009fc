//! Scene backdrop state

use diorama_catalog::Material;

/// The skybox currently shown behind the scene
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSkybox {
    /// Material catalog id the skybox was resolved from
    pub material_id: String,
    pub material: Material,
    /// Rotation in degrees, only set when the material supports it
    pub rotation: Option<f32>,
}

/// Backdrop and ambient lighting state of the scene
#[derive(Debug, Clone, Default)]
pub struct Environment {
    skybox: Option<ActiveSkybox>,
    /// Bumped on every backdrop change so lighting can be recomputed
    ambient_generation: u64,
}

impl Environment {
    pub fn skybox(&self) -> Option<&ActiveSkybox> {
        self.skybox.as_ref()
    }

    /// Replace the backdrop and request an ambient lighting refresh
    pub fn set_skybox(&mut self, skybox: ActiveSkybox) {
        self.skybox = Some(skybox);
        self.ambient_generation += 1;
    }

    pub fn clear(&mut self) {
        self.skybox = None;
        self.ambient_generation += 1;
    }

    pub fn ambient_generation(&self) -> u64 {
        self.ambient_generation
    }
}
