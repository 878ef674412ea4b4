use super::*;

impl GameEngine {
    /// Rebuilds everything the layout defines: collectibles, ghosts and the player's position.
    /// Score, lives and skill charges carry over.
    pub(super) fn populate_level(&mut self, now_ms: u64) {
        self.traps.clear();
        self.clones.clear();
        self.effects.clear();
        self.spawn_collectibles();
        self.spawn_ghosts(now_ms);
        self.reset_player_position();
    }

    pub(super) fn spawn_collectibles(&mut self) {
        let tile = self.level.tile_size;
        let inset = (tile - PELLET_SIZE) / 2;
        self.collectibles = self
            .level
            .food_cells
            .iter()
            .map(|cell| Collectible {
                body: Body::square(cell.x + inset, cell.y + inset, PELLET_SIZE),
                kind: CollectibleKind::Food,
            })
            .collect();

        let mut candidates: Vec<usize> = (0..self.collectibles.len()).collect();
        let mut converted = 0;
        while converted < POWER_PLUS_PER_LEVEL && !candidates.is_empty() {
            let pick = candidates.swap_remove(self.rng.pick_index(candidates.len()));
            self.collectibles[pick].kind = CollectibleKind::PowerPlus;
            converted += 1;
        }
    }

    pub(super) fn spawn_ghosts(&mut self, now_ms: u64) {
        let tile = self.level.tile_size;
        self.ghosts = self
            .level
            .ghost_spawns
            .iter()
            .map(|spawn| Ghost::new(spawn.variant, spawn.position, tile, now_ms))
            .collect();
    }

    pub(super) fn respawn_ghost(&mut self, idx: usize, now_ms: u64) {
        let Some(ghost) = self.ghosts.get(idx) else {
            return;
        };
        let fresh = Ghost::new(ghost.variant, ghost.spawn, ghost.body.width, now_ms);
        self.ghosts[idx] = fresh;
        self.effects.clear_entity(EntityId::Ghost(idx));
        debug!(ghost = idx, "ghost respawned");
        self.events
            .push(RuntimeEvent::GhostRespawned { ghost_id: idx });
    }

    pub(super) fn reset_player_position(&mut self) {
        let spawn = self.player.spawn;
        self.player.body = Body::square(spawn.x, spawn.y, self.player.body.width);
        self.player.dir = Direction::Left;
        self.player.next_dir = None;
        self.player.move_buffer = 0.0;
    }

    /// A caught player with lives left restarts at the spawn without charges or effects.
    pub(super) fn reset_player_after_hit(&mut self) {
        self.reset_player_position();
        self.player.skill_charges = 0;
        self.clones.clear();
        self.effects.clear_entity(EntityId::Player);
    }
}
