use super::*;

/// Short-lived projectile fired by the player's skill.
#[derive(Clone, Copy, Debug)]
pub(super) struct SkillClone {
    pub(super) id: u64,
    pub(super) body: Body,
    pub(super) dir: Direction,
    pub(super) speed: i32,
    pub(super) rotation: f32,
}

impl SkillClone {
    fn view(&self) -> CloneView {
        CloneView {
            id: self.id,
            x: self.body.x,
            y: self.body.y,
            dir: self.dir,
            rotation: self.rotation,
        }
    }
}

impl GameEngine {
    /// Spends one skill charge on a clone. Returns false when no charge is available.
    pub(super) fn activate_skill(&mut self) -> bool {
        if self.player.skill_charges <= 0 {
            return false;
        }
        self.player.skill_charges -= 1;
        self.next_clone_id += 1;
        let clone = SkillClone {
            id: self.next_clone_id,
            body: self.player.body,
            dir: self.player.dir,
            speed: clone_speed(),
            rotation: self.player.dir.angle(),
        };
        debug!(clone = clone.id, dir = ?clone.dir, "clone fired");
        self.events.push(RuntimeEvent::CloneFired {
            clone_id: clone.id,
            dir: clone.dir,
        });
        self.clones.push(clone);
        true
    }

    pub(super) fn update_clones(&mut self, now_ms: u64) {
        let clones = std::mem::take(&mut self.clones);
        let mut survivors = Vec::with_capacity(clones.len());
        for mut clone in clones {
            let (vx, vy) = clone.dir.velocity(clone.speed);
            clone.body = clone.body.moved(vx, vy);
            clone.rotation = (clone.rotation + CLONE_ROTATION_STEP) % 360.0;

            let end = if self.level.overlaps_wall(&clone.body) {
                Some(CloneEnd::Wall)
            } else if let Some(idx) = self
                .ghosts
                .iter()
                .position(|ghost| ghost.alive && overlaps(&ghost.body, &clone.body))
            {
                self.strike_ghost(idx, now_ms);
                Some(CloneEnd::Ghost)
            } else if !self.level.contains(&clone.body) {
                Some(CloneEnd::OutOfBounds)
            } else {
                None
            };

            match end {
                Some(reason) => self.events.push(RuntimeEvent::CloneDestroyed {
                    clone_id: clone.id,
                    reason,
                }),
                None => survivors.push(clone),
            }
        }
        self.clones = survivors;
    }

    /// Clone impact. Pink absorbs hits with its shield; everyone else is scared outright.
    pub(super) fn strike_ghost(&mut self, idx: usize, now_ms: u64) {
        let ghost = &mut self.ghosts[idx];
        let duration_ms = match &mut ghost.ability {
            Ability::Shield { charges } if *charges > 0 => {
                *charges -= 1;
                let remaining = *charges;
                debug!(ghost = idx, remaining, "shield hit");
                self.events.push(RuntimeEvent::ShieldHit {
                    ghost_id: idx,
                    remaining,
                });
                if remaining > 0 {
                    return;
                }
                SHIELD_BREAK_SCARED_DURATION_MS
            }
            Ability::Shield { .. } => SHIELD_BREAK_SCARED_DURATION_MS,
            _ => SCARED_DURATION_MS,
        };
        self.effects
            .apply(EntityId::Ghost(idx), EffectKind::Scared, duration_ms, now_ms);
        self.events.push(RuntimeEvent::GhostScared {
            ghost_id: idx,
            duration_ms,
        });
    }

    pub(super) fn clone_views(&self) -> Vec<CloneView> {
        self.clones.iter().map(SkillClone::view).collect()
    }
}
