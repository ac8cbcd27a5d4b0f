//! Scene registry of drawn primitives.
//!
//! Every primitive the drawing session shows on a map (the boundary, each
//! road, each tree marker and the vertices of the shape being drawn) lives in
//! a [`SceneRegistry`] slot and is addressed by a generational
//! [`PrimitiveId`]. Removing a primitive frees its slot; an id that outlived
//! its primitive never resolves to a later occupant of the same slot.
//!
//! A presentation layer keeps its own handles keyed by [`PrimitiveId`] and
//! mirrors `add`/`remove`/`clear` instead of holding references into the
//! session.

use crate::geometry::GeoPoint;
use std::fmt;

/// Identifier for a primitive (slot index, generation).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(u32, u32);

impl PrimitiveId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    #[inline]
    fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot when this id was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrimitiveId({}v{})", self.0, self.1)
    }
}

/// What kind of primitive a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boundary,
    Road,
    Tree,
    PendingVertex,
}

/// A drawn primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// The committed farm outline.
    Boundary(Vec<GeoPoint>),
    /// A committed road centerline, with its index in the session.
    Road { index: usize, points: Vec<GeoPoint> },
    /// A tree marker.
    Tree(GeoPoint),
    /// A vertex of the shape currently being drawn.
    PendingVertex(GeoPoint),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Boundary(_) => PrimitiveKind::Boundary,
            Self::Road { .. } => PrimitiveKind::Road,
            Self::Tree(_) => PrimitiveKind::Tree,
            Self::PendingVertex(_) => PrimitiveKind::PendingVertex,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    primitive: Primitive,
}

/// Generational arena of primitives.
#[derive(Clone, Default)]
pub struct SceneRegistry {
    slots: Vec<Option<Slot>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    live: usize,
}

impl fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneRegistry")
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .field("free_list", &self.free_list.len())
            .finish()
    }
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a primitive and return its id.
    pub fn add(&mut self, primitive: Primitive) -> PrimitiveId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(Slot {
                generation,
                primitive,
            });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(Slot {
                generation,
                primitive,
            }));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        self.live += 1;
        #[allow(clippy::cast_possible_truncation, reason = "PrimitiveId uses 32-bit indices.")]
        let id = PrimitiveId::new(idx as u32, generation);
        id
    }

    /// Remove a primitive. Returns it if `id` was live.
    pub fn remove(&mut self, id: PrimitiveId) -> Option<Primitive> {
        if !self.is_alive(id) {
            return None;
        }
        let slot = self.slots[id.idx()].take()?;
        self.free_list.push(id.idx());
        self.live -= 1;
        Some(slot.primitive)
    }

    /// Look up a live primitive.
    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        match self.slots.get(id.idx()) {
            Some(Some(slot)) if slot.generation == id.generation() => Some(&slot.primitive),
            _ => None,
        }
    }

    /// Check whether `id` still refers to a live primitive.
    pub fn is_alive(&self, id: PrimitiveId) -> bool {
        self.get(id).is_some()
    }

    /// Remove every primitive. Issued ids all become stale.
    pub fn clear(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
        self.live = 0;
    }

    /// Remove every primitive of one kind.
    pub fn remove_kind(&mut self, kind: PrimitiveKind) -> usize {
        let ids: Vec<PrimitiveId> = self
            .iter()
            .filter(|(_, p)| p.kind() == kind)
            .map(|(id, _)| id)
            .collect();
        let removed = ids.len();
        for id in ids {
            self.remove(id);
        }
        removed
    }

    /// Number of live primitives.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Count live primitives of one kind.
    pub fn count(&self, kind: PrimitiveKind) -> usize {
        self.iter().filter(|(_, p)| p.kind() == kind).count()
    }

    /// Iterate live primitives in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|s| {
                #[allow(clippy::cast_possible_truncation, reason = "PrimitiveId uses 32-bit indices.")]
                let id = PrimitiveId::new(i as u32, s.generation);
                (id, &s.primitive)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> GeoPoint {
        GeoPoint::new(36.5, 128.7)
    }

    #[test]
    fn test_add_get_remove() {
        let mut scene = SceneRegistry::new();
        let a = scene.add(Primitive::Tree(p()));
        let b = scene.add(Primitive::Boundary(vec![p(), p(), p()]));

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(a), Some(&Primitive::Tree(p())));
        assert_eq!(scene.get(b).map(Primitive::kind), Some(PrimitiveKind::Boundary));

        assert_eq!(scene.remove(a), Some(Primitive::Tree(p())));
        assert_eq!(scene.remove(a), None);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_stale_id_does_not_resolve_reused_slot() {
        let mut scene = SceneRegistry::new();
        let old = scene.add(Primitive::Tree(p()));
        scene.remove(old);
        let new = scene.add(Primitive::PendingVertex(p()));

        assert_ne!(old, new);
        assert!(new.generation() > old.generation());
        assert!(!scene.is_alive(old));
        assert_eq!(scene.get(old), None);
        assert_eq!(scene.get(new), Some(&Primitive::PendingVertex(p())));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut scene = SceneRegistry::new();
        let ids: Vec<_> = (0..4).map(|_| scene.add(Primitive::Tree(p()))).collect();
        scene.clear();

        assert!(scene.is_empty());
        assert!(ids.iter().all(|id| !scene.is_alive(*id)));

        let reused = scene.add(Primitive::Tree(p()));
        assert!(ids.iter().all(|id| *id != reused));
    }

    #[test]
    fn test_remove_kind() {
        let mut scene = SceneRegistry::new();
        scene.add(Primitive::Tree(p()));
        scene.add(Primitive::Tree(p()));
        let road = scene.add(Primitive::Road {
            index: 0,
            points: vec![p(), p()],
        });

        assert_eq!(scene.remove_kind(PrimitiveKind::Tree), 2);
        assert_eq!(scene.count(PrimitiveKind::Tree), 0);
        assert!(scene.is_alive(road));
        assert_eq!(scene.iter().count(), 1);
    }
}
