use std::collections::BTreeMap;

use crate::constants::frozen_speed;
use crate::types::EffectKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    Player,
    Ghost(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveEffect {
    pub started_at: u64,
    pub duration_ms: u64,
}

impl ActiveEffect {
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_at) < self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.started_at + self.duration_ms).saturating_sub(now_ms)
    }
}

/// Timed status effects keyed by entity. An entity absent from the table has no effect.
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    entries: BTreeMap<(EntityId, EffectKind), ActiveEffect>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `kind` on `entity`, replacing any running instance of the same kind.
    pub fn apply(&mut self, entity: EntityId, kind: EffectKind, duration_ms: u64, now_ms: u64) {
        self.entries.insert(
            (entity, kind),
            ActiveEffect {
                started_at: now_ms,
                duration_ms,
            },
        );
    }

    /// Like `apply`, but leaves a running instance untouched. Returns whether it applied.
    pub fn apply_if_inactive(
        &mut self,
        entity: EntityId,
        kind: EffectKind,
        duration_ms: u64,
        now_ms: u64,
    ) -> bool {
        if self.is_active(entity, kind, now_ms) {
            return false;
        }
        self.apply(entity, kind, duration_ms, now_ms);
        true
    }

    pub fn is_active(&self, entity: EntityId, kind: EffectKind, now_ms: u64) -> bool {
        self.entries
            .get(&(entity, kind))
            .is_some_and(|effect| effect.is_active(now_ms))
    }

    pub fn remaining_ms(&self, entity: EntityId, kind: EffectKind, now_ms: u64) -> u64 {
        self.entries
            .get(&(entity, kind))
            .map(|effect| effect.remaining_ms(now_ms))
            .unwrap_or(0)
    }

    pub fn remove(&mut self, entity: EntityId, kind: EffectKind) -> bool {
        self.entries.remove(&(entity, kind)).is_some()
    }

    pub fn clear_entity(&mut self, entity: EntityId) {
        self.entries.retain(|(owner, _), _| *owner != entity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops expired entries. Returns how many were dropped.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, effect| effect.is_active(now_ms));
        before - self.entries.len()
    }

    /// Pixels per tick after movement effects. Entangled pins the entity; Frozen slows it.
    pub fn movement_speed(&self, entity: EntityId, base_speed: f32, now_ms: u64) -> f32 {
        if self.is_active(entity, EffectKind::Entangled, now_ms) {
            0.0
        } else if self.is_active(entity, EffectKind::Frozen, now_ms) {
            frozen_speed(base_speed)
        } else {
            base_speed
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_SPEED;

    #[test]
    fn effect_expires_exactly_at_duration() {
        let mut registry = EffectRegistry::new();
        registry.apply(EntityId::Player, EffectKind::Frozen, 7_000, 1_000);
        assert!(registry.is_active(EntityId::Player, EffectKind::Frozen, 1_000));
        assert!(registry.is_active(EntityId::Player, EffectKind::Frozen, 7_999));
        assert!(!registry.is_active(EntityId::Player, EffectKind::Frozen, 8_000));
        assert!(!registry.is_active(EntityId::Player, EffectKind::Frozen, 9_000));
        assert_eq!(registry.remaining_ms(EntityId::Player, EffectKind::Frozen, 2_500), 5_500);
        assert_eq!(registry.remaining_ms(EntityId::Player, EffectKind::Frozen, 9_000), 0);
    }

    #[test]
    fn reapplying_refreshes_the_same_kind() {
        let mut registry = EffectRegistry::new();
        let ghost = EntityId::Ghost(2);
        registry.apply(ghost, EffectKind::Scared, 5_000, 0);
        registry.apply(ghost, EffectKind::Scared, 5_000, 4_000);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_active(ghost, EffectKind::Scared, 8_000));
        assert!(!registry.apply_if_inactive(ghost, EffectKind::Scared, 1, 8_000));
        assert!(registry.apply_if_inactive(ghost, EffectKind::Frozen, 3_000, 8_000));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn sweep_counts_and_removes_expired_entries() {
        let mut registry = EffectRegistry::new();
        registry.apply(EntityId::Player, EffectKind::Entangled, 3_000, 0);
        registry.apply(EntityId::Ghost(0), EffectKind::Scared, 5_000, 0);
        assert_eq!(registry.sweep(2_999), 0);
        assert_eq!(registry.sweep(3_000), 1);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_active(EntityId::Player, EffectKind::Entangled, 3_000));
        assert!(registry.is_active(EntityId::Ghost(0), EffectKind::Scared, 3_000));
        registry.clear_entity(EntityId::Ghost(0));
        assert!(registry.is_empty());
    }

    #[test]
    fn entangled_overrides_frozen() {
        let mut registry = EffectRegistry::new();
        let player = EntityId::Player;
        let base = BASE_SPEED as f32;
        assert_eq!(registry.movement_speed(player, base, 0), base);
        registry.apply(player, EffectKind::Frozen, 7_000, 0);
        let frozen = registry.movement_speed(player, base, 0);
        assert!((frozen - base / 3.0).abs() < 1e-5, "frozen speed {frozen}");
        registry.apply(player, EffectKind::Entangled, 3_000, 0);
        assert_eq!(registry.movement_speed(player, base, 100), 0.0);
        assert_eq!(registry.movement_speed(player, base, 3_000), frozen);
        assert!(registry.remove(player, EffectKind::Frozen));
        assert!(!registry.remove(player, EffectKind::Frozen));
    }
}
