//! Read-only views for renderers
//!
//! Renderers call `get_all` once per frame and never touch `SimState`
//! directly. World coordinates are pixels with y growing downward and the
//! camera at the viewport's top-left corner.

use glam::Vec2;
use serde::Serialize;

use super::effects::EffectKind;
use super::state::{EntityId, SimState};

/// Everything a renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind_id: String,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub anim_phase: f32,
    /// Recently damaged
    pub flashing: bool,
    pub direction: Option<Vec2>,
    pub is_elite: bool,
    pub is_boss: bool,
    pub stunned: bool,
    pub burning: bool,
    pub visible: bool,
}

impl EntityView {
    /// Fraction of health left, for health bars
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Snapshot of every live entity in id order
pub fn get_all(state: &SimState) -> Vec<EntityView> {
    let now = state.now_ms;
    let unit = state.unit();
    state
        .entities()
        .iter()
        .map(|e| EntityView {
            id: e.id,
            kind_id: e.kind.id.clone(),
            pos: e.pos,
            radius: e.radius(unit),
            hp: e.hp,
            max_hp: e.max_hp,
            anim_phase: e.anim_phase,
            flashing: now < e.flash_until_ms,
            direction: e.direction,
            is_elite: e.is_elite,
            is_boss: e.is_boss,
            stunned: e.has_effect(EffectKind::Stun, now),
            burning: e.has_effect(EffectKind::Burn, now),
            visible: e.visible,
        })
        .collect()
}

/// Hide every entity from renderers. Purely cosmetic; hidden entities keep
/// moving and can still be hit.
pub fn hide_all(state: &mut SimState) {
    for entity in &mut state.entities {
        entity.visible = false;
    }
}

/// Screen cell containing world position `pos` for a grid of `cell_px`
/// square cells anchored at the camera
pub fn world_to_cell(pos: Vec2, camera: Vec2, cell_px: f32) -> (i32, i32) {
    let local = (pos - camera) / cell_px.max(f32::EPSILON);
    (local.x.floor() as i32, local.y.floor() as i32)
}
