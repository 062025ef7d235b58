use indexmap::IndexMap;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::Renderer;

/// Groups geometry by texture identity and emits one draw call per group.
///
/// Groups iterate in insertion order, and geometry within a group in `add`
/// order; that determines device draw order, which matters for alpha-blended
/// overlap (later quads paint over earlier ones — there is no depth test).
/// Stacked scenes can be rendered back to front for layering.
#[derive(Default)]
pub struct Scene {
    groups: IndexMap<String, Vec<Geometry>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies by the geometry's texture name and appends it to that
    /// group.
    pub fn add(&mut self, geometry: impl Into<Geometry>) {
        let geometry = geometry.into();
        self.groups
            .entry(geometry.texture_name().to_string())
            .or_default()
            .push(geometry);
    }

    /// Serializes every group into the renderer's shared vertex buffer and
    /// flushes each as a single batched draw call.
    pub fn render(&self, renderer: &mut Renderer) -> Result<()> {
        for (texture_name, group) in &self.groups {
            for geometry in group {
                renderer.push_quad(geometry.bounds(), geometry.uv_bounds())?;
            }

            renderer.use_texture(texture_name)?;
            let vertex_count = renderer.flush()?;
            log::debug!(
                "batch {texture_name:?}: {} quads, {vertex_count} vertices",
                group.len()
            );
        }
        Ok(())
    }

    /// Number of texture groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total geometry count across groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
