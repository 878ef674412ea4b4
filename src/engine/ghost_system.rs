use super::*;

/// Variant-specific ability state. Cooldowns store the earliest sim time the ability may fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Ability {
    Teleport { ready_at: u64 },
    Shield { charges: i32 },
    SilkTrap { ready_at: u64 },
    IceOnDeath,
}

impl Ability {
    /// Timed abilities start on a full cooldown, so a fresh or respawned Red does not teleport
    /// on its first tick.
    pub(super) fn for_variant(variant: GhostVariant, now_ms: u64) -> Self {
        match variant {
            GhostVariant::Red => Self::Teleport {
                ready_at: now_ms + TELEPORT_COOLDOWN_MS,
            },
            GhostVariant::Pink => Self::Shield {
                charges: PINK_SHIELD_CHARGES,
            },
            GhostVariant::Orange => Self::SilkTrap {
                ready_at: now_ms + SILK_TRAP_COOLDOWN_MS,
            },
            GhostVariant::Blue => Self::IceOnDeath,
        }
    }
}

#[derive(Clone, Debug)]
pub(super) struct Ghost {
    pub(super) variant: GhostVariant,
    pub(super) body: Body,
    pub(super) dir: Direction,
    pub(super) spawn: Vec2,
    pub(super) move_buffer: f32,
    pub(super) alive: bool,
    pub(super) died_at: Option<u64>,
    pub(super) ability: Ability,
}

impl Ghost {
    pub(super) fn new(variant: GhostVariant, spawn: Vec2, tile: i32, now_ms: u64) -> Self {
        Self {
            variant,
            body: Body::square(spawn.x, spawn.y, tile),
            dir: Direction::Up,
            spawn,
            move_buffer: 0.0,
            alive: true,
            died_at: None,
            ability: Ability::for_variant(variant, now_ms),
        }
    }

    pub(super) fn shield(&self) -> Option<i32> {
        match self.ability {
            Ability::Shield { charges } => Some(charges),
            _ => None,
        }
    }
}

/// Direction a ghost would like to take given the offset (dx, dy) to the player.
pub(super) fn preferred_direction(
    variant: GhostVariant,
    dx: i32,
    dy: i32,
    scared: bool,
    rng: &mut Rng,
) -> Direction {
    let orient = |dir: Direction| if scared { dir.opposite() } else { dir };
    let pursue = orient(primary_axis_direction(dx, dy));
    match variant {
        GhostVariant::Red if rng.bool(RED_DETOUR_CHANCE) => random_direction(rng),
        GhostVariant::Pink if rng.bool(PINK_SECONDARY_AXIS_CHANCE) => {
            orient(secondary_axis_direction(dx, dy))
        }
        GhostVariant::Orange if rng.bool(ORANGE_RANDOM_CHANCE) => random_direction(rng),
        _ => pursue,
    }
}

/// Free directions other than the reverse of `dir`.
pub(super) fn free_turns(
    body: &Body,
    dir: Direction,
    speed: i32,
    level: &Level,
) -> SmallVec<[Direction; 4]> {
    Direction::ALL
        .into_iter()
        .filter(|candidate| *candidate != dir.opposite() && can_move(body, *candidate, speed, level))
        .collect()
}

impl GameEngine {
    pub(super) fn update_ghosts(&mut self, now_ms: u64) {
        for idx in 0..self.ghosts.len() {
            self.update_ghost(idx, now_ms);
        }
    }

    fn update_ghost(&mut self, idx: usize, now_ms: u64) {
        if !self.ghosts[idx].alive {
            let due = self.ghosts[idx]
                .died_at
                .is_some_and(|died_at| now_ms.saturating_sub(died_at) >= GHOST_RESPAWN_MS);
            if due {
                self.respawn_ghost(idx, now_ms);
            }
            return;
        }

        let speed = self
            .effects
            .movement_speed(EntityId::Ghost(idx), BASE_SPEED as f32, now_ms);
        let speed = drain_move_buffer(&mut self.ghosts[idx].move_buffer, speed);
        if speed > 0 {
            self.steer_ghost(idx, speed, now_ms);
        }
        self.run_ghost_ability(idx, now_ms);
    }

    fn steer_ghost(&mut self, idx: usize, speed: i32, now_ms: u64) {
        let scared = self
            .effects
            .is_active(EntityId::Ghost(idx), EffectKind::Scared, now_ms);
        let ghost = &self.ghosts[idx];
        let body = ghost.body;
        let current = ghost.dir;
        let variant = ghost.variant;
        let (dx, dy) = delta_to(&body, &self.player.body);

        let free = free_turns(&body, current, speed, &self.level);
        let mut dir = current;
        let mut turned = false;
        if free.len() > 1 && self.rng.bool(INTERSECTION_TURN_CHANCE) {
            let options: SmallVec<[Direction; 4]> =
                free.iter().copied().filter(|d| *d != current).collect();
            if !options.is_empty() {
                dir = options[self.rng.pick_index(options.len())];
                turned = true;
            }
        }
        if !turned {
            let preferred = preferred_direction(variant, dx, dy, scared, &mut self.rng);
            let reverse_allowed = scared || preferred != current.opposite();
            if preferred != current
                && reverse_allowed
                && can_move(&body, preferred, speed, &self.level)
            {
                dir = preferred;
            }
        }

        let velocity = aligned_velocity(&body, dir, speed, self.level.tile_size);
        let mut moved = body;
        let clear = attempt_move(&mut moved, velocity, &self.level)
            && !self.bumps_into_ghost(idx, &body, &moved);
        let ghost = &mut self.ghosts[idx];
        ghost.dir = dir;
        if clear {
            ghost.body = moved;
        } else {
            let options = free_turns(&body, dir, speed, &self.level);
            ghost.dir = if options.is_empty() {
                dir.opposite()
            } else {
                options[self.rng.pick_index(options.len())]
            };
        }
    }

    /// True when moving ghost `idx` from `before` to `after` runs into another live ghost.
    /// Ghosts already stacked on each other may still separate.
    fn bumps_into_ghost(&self, idx: usize, before: &Body, after: &Body) -> bool {
        self.ghosts.iter().enumerate().any(|(other, ghost)| {
            other != idx
                && ghost.alive
                && overlaps(&ghost.body, after)
                && !overlaps(&ghost.body, before)
        })
    }

    fn run_ghost_ability(&mut self, idx: usize, now_ms: u64) {
        let ability = self.ghosts[idx].ability;
        match ability {
            Ability::Teleport { ready_at } if now_ms >= ready_at => {
                self.teleport_ghost(idx);
                self.ghosts[idx].ability = Ability::Teleport {
                    ready_at: now_ms + TELEPORT_COOLDOWN_MS,
                };
            }
            Ability::SilkTrap { ready_at } if now_ms >= ready_at => {
                let body = self.ghosts[idx].body;
                self.place_trap(body, TrapKind::Entangle, idx, now_ms);
                self.ghosts[idx].ability = Ability::SilkTrap {
                    ready_at: now_ms + SILK_TRAP_COOLDOWN_MS,
                };
            }
            _ => {}
        }
    }

    /// Random search for an open cell free of other ghosts. A failed search leaves the ghost
    /// in place.
    fn teleport_ghost(&mut self, idx: usize) {
        let tile = self.level.tile_size;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let col = self.rng.int(0, self.level.columns - 1);
            let row = self.rng.int(0, self.level.rows - 1);
            if self.level.cell(col, row) != Some(CellKind::Open) {
                continue;
            }
            let target = Body::square(col * tile, row * tile, self.ghosts[idx].body.width);
            let occupied = self.ghosts.iter().enumerate().any(|(other, ghost)| {
                other != idx && ghost.alive && overlaps(&ghost.body, &target)
            });
            if occupied || self.level.overlaps_wall(&target) {
                continue;
            }
            self.ghosts[idx].body = target;
            debug!(ghost = idx, col, row, "ghost teleported");
            self.events.push(RuntimeEvent::GhostTeleported {
                ghost_id: idx,
                x: target.x,
                y: target.y,
            });
            return;
        }
        debug!(ghost = idx, "teleport found no open cell");
    }

    pub(super) fn place_trap(
        &mut self,
        at: Body,
        kind: TrapKind,
        owner: usize,
        now_ms: u64,
    ) -> u64 {
        let body = Body::square(at.x, at.y, self.level.tile_size);
        let trap_id = self
            .traps
            .spawn_trap(body, kind, TRAP_DURATION_MS, Some(owner), now_ms);
        debug!(trap = trap_id, ?kind, owner, x = body.x, y = body.y, "trap placed");
        self.events.push(RuntimeEvent::TrapPlaced {
            trap_id,
            kind,
            x: body.x,
            y: body.y,
        });
        trap_id
    }

    /// Eaten while scared. The ghost leaves play until its respawn timer elapses.
    pub(super) fn kill_ghost(&mut self, idx: usize, now_ms: u64) {
        let ghost = &mut self.ghosts[idx];
        ghost.alive = false;
        ghost.died_at = Some(now_ms);
        let body = ghost.body;
        let variant = ghost.variant;
        self.effects.clear_entity(EntityId::Ghost(idx));
        match variant {
            GhostVariant::Blue => {
                self.place_trap(body, TrapKind::Freeze, idx, now_ms);
            }
            GhostVariant::Orange => {
                self.place_trap(body, TrapKind::Entangle, idx, now_ms);
            }
            GhostVariant::Red | GhostVariant::Pink => {}
        }
        debug!(ghost = idx, ?variant, "ghost died");
    }

    pub(super) fn ghost_view(&self, idx: usize, now_ms: u64) -> GhostView {
        let ghost = &self.ghosts[idx];
        let id = EntityId::Ghost(idx);
        let status = if !ghost.alive {
            let died_at = ghost.died_at.unwrap_or(now_ms);
            GhostStatus::Dead {
                respawn_in_ms: (died_at + GHOST_RESPAWN_MS).saturating_sub(now_ms),
            }
        } else if self.effects.is_active(id, EffectKind::Scared, now_ms) {
            GhostStatus::Scared {
                remaining_ms: self.effects.remaining_ms(id, EffectKind::Scared, now_ms),
            }
        } else {
            GhostStatus::Normal
        };
        GhostView {
            id: idx,
            variant: ghost.variant,
            x: ghost.body.x,
            y: ghost.body.y,
            width: ghost.body.width,
            height: ghost.body.height,
            dir: ghost.dir,
            status,
            shield: ghost.shield(),
            frozen_ms: self.effects.remaining_ms(id, EffectKind::Frozen, now_ms),
            entangled_ms: self.effects.remaining_ms(id, EffectKind::Entangled, now_ms),
        }
    }
}
