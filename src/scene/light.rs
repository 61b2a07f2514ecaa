use glam::Vec3;

use super::ScenePath;

/// Light attribute object.
///
/// A zero direction marks a light that has not been initialized by the scene
/// yet; such lights are skipped when the frame constants are built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl Light {
    #[must_use]
    pub fn new_directional(direction: Vec3, intensity: f32) -> Self {
        Self {
            direction,
            intensity,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn has_direction(&self) -> bool {
        self.direction != Vec3::ZERO
    }
}

/// Lights in registration order.
#[derive(Debug, Default)]
pub struct LightRegistry {
    lights: Vec<(ScenePath, Light)>,
}

impl LightRegistry {
    /// Inserts or replaces the light at `id`. Replacing keeps the original position.
    pub fn insert(&mut self, id: ScenePath, light: Light) {
        if let Some(slot) = self.lights.iter_mut().find(|(lid, _)| *lid == id) {
            slot.1 = light;
        } else {
            self.lights.push((id, light));
        }
    }

    pub fn remove(&mut self, id: ScenePath) -> Option<Light> {
        let idx = self.lights.iter().position(|(lid, _)| *lid == id)?;
        Some(self.lights.remove(idx).1)
    }

    #[must_use]
    pub fn get(&self, id: ScenePath) -> Option<&Light> {
        self.lights.iter().find(|(lid, _)| *lid == id).map(|(_, l)| l)
    }

    pub fn get_mut(&mut self, id: ScenePath) -> Option<&mut Light> {
        self.lights.iter_mut().find(|(lid, _)| *lid == id).map(|(_, l)| l)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().map(|(_, l)| l)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}
