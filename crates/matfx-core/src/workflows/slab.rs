use crate::core::models::material::MaterialProperties;
use crate::core::models::state::StateVector;
use crate::engine::interface::{MaterialOracle, TrajectoryPropagator};
use nalgebra::Vector3;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Directions with a smaller z-component never reach the next plane.
const PARALLEL_TOLERANCE: f64 = 1e-12;
/// Points closer than this to a plane (cm) count as lying on it.
const PLANE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum GeometryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Layer {index} refers to unknown material preset '{name}'")]
    UnknownMaterial { index: usize, name: String },
    #[error("Layer {index} has non-positive thickness {thickness} cm")]
    InvalidThickness { index: usize, thickness: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LayerMaterial {
    Preset(String),
    Explicit(MaterialProperties),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerSpec {
    material: LayerMaterial,
    thickness: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct GeometryFile {
    #[serde(default)]
    start: f64,
    layers: Vec<LayerSpec>,
}

/// One slab, `[front, back)` along z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub front: f64,
    pub back: f64,
    pub material: MaterialProperties,
}

/// A stack of planar layers perpendicular to the z axis, surrounded by vacuum.
///
/// Boundary distances are exact for straight tracks; field-driven curvature is ignored.
#[derive(Debug, Clone, Default)]
pub struct SlabGeometry {
    layers: Vec<Layer>,
    debug_level: u32,
}

impl SlabGeometry {
    /// Stacks `(material, thickness)` layers one after another starting at z = `start`.
    pub fn new(
        start: f64,
        layers: impl IntoIterator<Item = (MaterialProperties, f64)>,
    ) -> Result<Self, GeometryLoadError> {
        let mut front = start;
        let mut stack = Vec::new();
        for (index, (material, thickness)) in layers.into_iter().enumerate() {
            if !(thickness > 0.0) {
                return Err(GeometryLoadError::InvalidThickness { index, thickness });
            }
            stack.push(Layer {
                front,
                back: front + thickness,
                material,
            });
            front += thickness;
        }
        Ok(Self {
            layers: stack,
            debug_level: 0,
        })
    }

    pub fn load(path: &Path) -> Result<Self, GeometryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| GeometryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: GeometryFile = toml::from_str(&content).map_err(|e| GeometryLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let layers = file
            .layers
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                let material = match spec.material {
                    LayerMaterial::Explicit(material) => material,
                    LayerMaterial::Preset(name) => MaterialProperties::preset(&name)
                        .ok_or(GeometryLoadError::UnknownMaterial { index, name })?,
                };
                Ok((material, spec.thickness))
            })
            .collect::<Result<Vec<_>, GeometryLoadError>>()?;

        Self::new(file.start, layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// z of the near side of the first layer, or `None` for an empty stack.
    pub fn front(&self) -> Option<f64> {
        self.layers.first().map(|layer| layer.front)
    }

    /// z of the far side of the last layer, or `None` for an empty stack.
    pub fn back(&self) -> Option<f64> {
        self.layers.last().map(|layer| layer.back)
    }

    fn material_at(&self, z: f64, heading_z: f64) -> MaterialProperties {
        // On a plane, the layer the track is heading into wins.
        let z = if heading_z < 0.0 { z - PLANE_TOLERANCE } else { z + PLANE_TOLERANCE };
        self.layers
            .iter()
            .find(|layer| z >= layer.front && z < layer.back)
            .map(|layer| layer.material)
            .unwrap_or_else(MaterialProperties::vacuum)
    }

    fn planes(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers
            .first()
            .map(|layer| layer.front)
            .into_iter()
            .chain(self.layers.iter().map(|layer| layer.back))
    }
}

impl MaterialOracle for SlabGeometry {
    fn properties(&mut self, position: &Vector3<f64>, direction: &Vector3<f64>) -> MaterialProperties {
        self.material_at(position.z, direction.z)
    }

    fn find_next_boundary(
        &mut self,
        state: &StateVector,
        max_distance: f64,
        _non_uniform_field: bool,
    ) -> f64 {
        let sign = if max_distance < 0.0 { -1.0 } else { 1.0 };
        let z = state.position().z;
        let dz = state.direction().z * sign;

        if dz.abs() < PARALLEL_TOLERANCE {
            return max_distance;
        }

        let nearest = self
            .planes()
            .map(|plane| (plane - z) / dz)
            .filter(|&path| path > PLANE_TOLERANCE)
            .fold(f64::INFINITY, f64::min);

        let distance = sign * nearest.min(max_distance.abs());
        if self.debug_level > 0 {
            debug!(z, distance, "next slab plane");
        }
        distance
    }

    fn set_debug_level(&mut self, level: u32) {
        self.debug_level = level;
    }
}

/// Field-free transport: straight lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLinePropagator;

impl TrajectoryPropagator for StraightLinePropagator {
    fn advance(&self, state: &StateVector, distance: f64, _non_uniform_field: bool) -> StateVector {
        let mut next = *state;
        next.nudge(distance);
        next
    }
}
