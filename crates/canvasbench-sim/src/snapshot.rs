//! Render-ready snapshot records and the double buffer that publishes them

use crate::entity::Entity;
use bytemuck::{Pod, Zeroable};
use canvasbench_core::{Result, SimError, SlotId};

/// Number of `f32`s per record in the flat snapshot buffer
pub const RECORD_STRIDE: usize = 12;

/// Set in `EntityRecord::flags` when the entity is selected
pub const FLAG_SELECTED: f32 = 1.0;

/// Per-entity render record.
/// 48 bytes, laid out as three vec4 rows so it can be uploaded as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct EntityRecord {
    /// Stable slot id; renderers key their visual handles by it. Exact
    /// because pools never exceed `MAX_SLOTS`.
    pub id: f32,
    pub shape: f32,
    pub flags: f32,
    /// 0xRRGGBB as float
    pub tint: f32,

    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Radians
    pub rotation: f32,

    pub scale_x: f32,
    pub scale_y: f32,
    pub alpha: f32,
    pub age_ratio: f32,
}

impl EntityRecord {
    pub fn from_entity(id: SlotId, e: &Entity) -> Self {
        Self {
            id: id.raw() as f32,
            shape: e.shape.as_f32(),
            flags: if e.selected { FLAG_SELECTED } else { 0.0 },
            tint: e.visual.tint.as_f32(),
            x: e.position.x,
            y: e.position.y,
            size: e.visual.size,
            rotation: e.visual.rotation,
            scale_x: e.visual.scale_x,
            scale_y: e.visual.scale_y,
            alpha: e.visual.alpha.clamp(0.0, 1.0),
            age_ratio: e.age_ratio(),
        }
    }

    pub fn slot_id(&self) -> SlotId {
        SlotId(self.id as u32)
    }

    pub fn is_selected(&self) -> bool {
        self.flags == FLAG_SELECTED
    }
}

/// One published frame of entity records, in spawn order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<EntityRecord>,
    tick: u64,
}

impl Snapshot {
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// The flat `f32` view: `len() * RECORD_STRIDE` values
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Engine tick that produced this snapshot
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn memory_bytes(&self) -> usize {
        self.records.capacity() * std::mem::size_of::<EntityRecord>()
    }
}

/// Front/back snapshot pair. The front buffer is what readers see; a tick
/// writes the back buffer and swaps, so a published buffer is never mutated
/// in place.
#[derive(Debug, Default)]
pub(crate) struct SnapshotBuffers {
    front: Snapshot,
    back: Snapshot,
}

impl SnapshotBuffers {
    pub(crate) fn front(&self) -> &Snapshot {
        &self.front
    }

    /// Make room for `len` records in the back buffer
    pub(crate) fn reserve_back(&mut self, len: usize) -> Result<()> {
        let additional = len.saturating_sub(self.back.records.len());
        self.back
            .records
            .try_reserve(additional)
            .map_err(|_| SimError::Allocation {
                requested: additional,
            })
    }

    /// Fill the back buffer from `records` and make it the front buffer.
    pub(crate) fn publish(&mut self, tick: u64, records: impl Iterator<Item = EntityRecord>) {
        self.back.records.clear();
        self.back.records.extend(records);
        self.back.tick = tick;
        std::mem::swap(&mut self.front, &mut self.back);
    }

    pub(crate) fn clear(&mut self) {
        self.front.records.clear();
        self.back.records.clear();
    }

    pub(crate) fn memory_bytes(&self) -> usize {
        self.front.memory_bytes() + self.back.memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use canvasbench_core::{Tint, Vec2};

    #[test]
    fn record_layout() {
        assert_eq!(std::mem::size_of::<EntityRecord>(), RECORD_STRIDE * 4);
        assert_eq!(std::mem::size_of::<EntityRecord>(), 48);
    }

    #[test]
    fn record_from_entity() {
        let mut e = Entity::idle();
        e.active = true;
        e.position = Vec2::new(3.0, 4.0);
        e.shape = ShapeKind::Circle;
        e.visual.tint = Tint(0x4ECDC4);
        e.visual.alpha = 1.5;
        e.selected = true;
        e.lifetime = f32::INFINITY;
        let r = EntityRecord::from_entity(SlotId(17), &e);
        assert_eq!(r.slot_id(), SlotId(17));
        assert_eq!(r.shape, 1.0);
        assert_eq!(r.tint as u32, 0x4ECDC4);
        assert_eq!((r.x, r.y), (3.0, 4.0));
        assert_eq!(r.alpha, 1.0);
        assert_eq!(r.age_ratio, 0.0);
        assert!(r.is_selected());
    }

    #[test]
    fn largest_slot_id_is_exact() {
        let last = SlotId::from_index(crate::pool::MAX_SLOTS - 1);
        let below = SlotId::from_index(crate::pool::MAX_SLOTS - 2);
        let e = Entity::idle();
        let a = EntityRecord::from_entity(last, &e);
        let b = EntityRecord::from_entity(below, &e);
        assert_eq!(a.slot_id(), last);
        assert_eq!(b.slot_id(), below);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn publish_swaps_buffers() {
        let mut buffers = SnapshotBuffers::default();
        let record = EntityRecord::zeroed();
        buffers.reserve_back(2).unwrap();
        buffers.publish(1, std::iter::repeat(record).take(2));
        assert_eq!(buffers.front().len(), 2);
        assert_eq!(buffers.front().tick(), 1);
        assert_eq!(buffers.front().as_floats().len(), 2 * RECORD_STRIDE);

        buffers.publish(2, std::iter::empty());
        assert!(buffers.front().is_empty());
        assert_eq!(buffers.front().tick(), 2);

        buffers.clear();
        assert!(buffers.front().is_empty());
    }
}
