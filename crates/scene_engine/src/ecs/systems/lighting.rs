//! Lighting system for converting light entities to render data
//!
//! Systems contain logic, components contain data: lights are packed into a
//! single [`MultiLightEnvironment`] per frame, grouped by type.

use crate::ecs::components::{Light, LightKind, Transform};
use crate::ecs::ComponentStore;
use crate::foundation::math::{decompose_translation_rotation, Quat, Vec3};
use crate::render::{
    DirectionalLightData, MultiLightEnvironment, PointLightData, SpotLightData, MAX_DIRECTIONAL_LIGHTS,
    MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS,
};

/// Packs enabled lights into the renderer's light buffer layout
pub struct LightingSystem {
    environment: MultiLightEnvironment,
}

impl Default for LightingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingSystem {
    /// Creates a lighting system with an empty environment
    pub fn new() -> Self {
        Self {
            environment: MultiLightEnvironment::new(Vec3::zeros(), 0.0),
        }
    }

    /// The environment built by the last [`Self::pack`]
    pub fn environment(&self) -> &MultiLightEnvironment {
        &self.environment
    }

    /// Rebuild the environment from every enabled `Light`.
    ///
    /// Positions come from the entity's resolved world matrix and directions are
    /// rotated into world space. Lights without a Transform sit at the origin.
    /// Lights beyond a type's capacity are dropped with a warning.
    pub fn pack(&mut self, store: &ComponentStore, ambient_color: Vec3, ambient_intensity: f32) -> &MultiLightEnvironment {
        let mut environment = MultiLightEnvironment::new(ambient_color, ambient_intensity);
        let mut directional = 0;
        let mut point = 0;
        let mut spot = 0;

        for (entity, light) in store.iter::<Light>() {
            if !light.enabled {
                continue;
            }
            let (position, rotation) = store
                .get::<Transform>(entity)
                .map_or((Vec3::zeros(), Quat::identity()), |t| decompose_translation_rotation(&t.local_to_world));
            let color = [light.color.x, light.color.y, light.color.z, 0.0];
            let intensity = [light.ambient, light.diffuse, light.specular, 0.0];

            match light.kind {
                LightKind::Directional { direction } => {
                    if directional >= MAX_DIRECTIONAL_LIGHTS {
                        log::warn!("Dropping directional light of {:?}: limit is {}", entity, MAX_DIRECTIONAL_LIGHTS);
                        continue;
                    }
                    let direction = world_direction(&rotation, &direction);
                    environment.directional_lights[directional] = DirectionalLightData {
                        direction: [direction.x, direction.y, direction.z, 0.0],
                        color,
                        intensity,
                    };
                    directional += 1;
                }
                LightKind::Point { range } => {
                    if point >= MAX_POINT_LIGHTS {
                        log::warn!("Dropping point light of {:?}: limit is {}", entity, MAX_POINT_LIGHTS);
                        continue;
                    }
                    environment.point_lights[point] = PointLightData {
                        position: [position.x, position.y, position.z, range],
                        color,
                        intensity,
                    };
                    point += 1;
                }
                LightKind::Spot {
                    direction,
                    range,
                    inner_cone,
                    outer_cone,
                } => {
                    if spot >= MAX_SPOT_LIGHTS {
                        log::warn!("Dropping spot light of {:?}: limit is {}", entity, MAX_SPOT_LIGHTS);
                        continue;
                    }
                    let direction = world_direction(&rotation, &direction);
                    environment.spot_lights[spot] = SpotLightData {
                        position: [position.x, position.y, position.z, range],
                        direction: [direction.x, direction.y, direction.z, 0.0],
                        color,
                        intensity,
                        cone_angles: [inner_cone, outer_cone, 0.0, 0.0],
                    };
                    spot += 1;
                }
            }
        }

        environment.header.directional_light_count = directional as u32;
        environment.header.point_light_count = point as u32;
        environment.header.spot_light_count = spot as u32;
        log::trace!("Packed {} directional, {} point, {} spot lights", directional, point, spot);

        self.environment = environment;
        &self.environment
    }
}

fn world_direction(rotation: &Quat, direction: &Vec3) -> Vec3 {
    let rotated = rotation * direction;
    rotated.try_normalize(f32::EPSILON).unwrap_or(rotated)
}
