//! Per-frame statistics

use crate::ecs::systems::RenderStats;
use crate::physics::BridgeStats;

/// What one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Physics bodies built
    pub bodies_created: usize,
    /// Physics bodies released
    pub bodies_destroyed: usize,
    /// Bodies moved from edited transforms
    pub transforms_synced: usize,
    /// Fixed physics steps taken
    pub substeps: u32,
    /// Dynamic body poses written back into transforms
    pub poses_written: usize,
    /// Collision records after the step
    pub collisions: usize,
    /// Transforms whose matrices were recomputed
    pub transforms_resolved: usize,
    /// Parented transforms composed with their ancestors
    pub hierarchy_resolved: usize,
    /// Lights packed into the light buffer
    pub lights_packed: usize,
    /// Cameras rendered
    pub cameras_rendered: usize,
    /// Draws accepted by the renderer
    pub draws_submitted: usize,
    /// Draws skipped
    pub draws_skipped: usize,
}

impl FrameStats {
    pub(crate) fn record_physics(&mut self, stats: BridgeStats) {
        self.bodies_created += stats.bodies_created;
        self.bodies_destroyed += stats.bodies_destroyed;
        self.transforms_synced += stats.transforms_synced;
        self.substeps += stats.substeps;
    }

    pub(crate) fn record_render(&mut self, stats: RenderStats) {
        self.cameras_rendered += stats.cameras;
        self.draws_submitted += stats.draws_submitted;
        self.draws_skipped += stats.draws_skipped;
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bodies +{}/-{}, {} substeps, {} collisions, {} transforms, {} lights, {} draws ({} skipped)",
            self.bodies_created,
            self.bodies_destroyed,
            self.substeps,
            self.collisions,
            self.transforms_resolved,
            self.lights_packed,
            self.draws_submitted,
            self.draws_skipped
        )
    }
}
