use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::constants::{
    clone_speed, BASE_SPEED, CLONE_ROTATION_STEP, ENTANGLED_DURATION_MS, FOOD_POINTS,
    FROZEN_DURATION_MS, GHOST_EAT_POINTS, GHOST_RESPAWN_MS, INTERSECTION_TURN_CHANCE,
    ORANGE_RANDOM_CHANCE, PELLET_SIZE, PINK_SECONDARY_AXIS_CHANCE, PINK_SHIELD_CHARGES,
    PLACEMENT_ATTEMPTS, POWER_PLUS_PER_LEVEL, POWER_PLUS_POINTS,
    RED_DETOUR_CHANCE, SCARED_DURATION_MS, SHIELD_BREAK_SCARED_DURATION_MS,
    SILK_TRAP_COOLDOWN_MS, STARTING_LIVES, TELEPORT_COOLDOWN_MS, TRAP_DURATION_MS,
};
use crate::rng::Rng;
use crate::types::{
    Body, CellKind, CloneEnd, CloneView, CollectibleKind, CollectibleView, Command, Direction,
    EffectKind, GameState, GameSummary, GhostStatus, GhostVariant, GhostView, LevelClearPolicy,
    PlayerView, RuntimeEvent, Snapshot, TrapKind, Vec2, WorldInit,
};
use crate::world::{parse_tile_map, to_world_init, Level, MapError};

mod clone_system;
pub mod effects;
mod ghost_system;
pub mod physics;
mod spawn_system;
pub mod traps;
mod utils;

pub use self::effects::{EffectRegistry, EntityId};
use self::clone_system::SkillClone;
use self::ghost_system::{Ability, Ghost};
use self::physics::{aligned_velocity, attempt_move, can_move, drain_move_buffer, overlaps};
use self::traps::{Trap, TrapField};
use self::utils::{delta_to, primary_axis_direction, random_direction, secondary_axis_direction};

/// Effect length for anyone caught in a trap of `kind`.
fn trap_effect_ms(kind: TrapKind) -> u64 {
    match kind {
        TrapKind::Entangle => ENTANGLED_DURATION_MS,
        TrapKind::Freeze => FROZEN_DURATION_MS,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Collectible {
    body: Body,
    kind: CollectibleKind,
}

#[derive(Clone, Debug)]
struct PlayerInternal {
    body: Body,
    dir: Direction,
    next_dir: Option<Direction>,
    spawn: Vec2,
    move_buffer: f32,
    lives: i32,
    score: i32,
    skill_charges: i32,
}

impl PlayerInternal {
    fn new(spawn: Vec2, tile: i32) -> Self {
        Self {
            body: Body::square(spawn.x, spawn.y, tile),
            dir: Direction::Left,
            next_dir: None,
            spawn,
            move_buffer: 0.0,
            lives: STARTING_LIVES,
            score: 0,
            skill_charges: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GameEngineOptions {
    pub seed: u64,
    pub level_clear_policy: LevelClearPolicy,
    /// Custom tile rows. `None` uses the built-in reference maze.
    pub layout: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub level: Level,

    rng: Rng,
    policy: LevelClearPolicy,
    state: GameState,
    level_number: u32,
    player: PlayerInternal,
    ghosts: Vec<Ghost>,
    clones: Vec<SkillClone>,
    collectibles: Vec<Collectible>,
    effects: EffectRegistry,
    traps: TrapField,
    events: Vec<RuntimeEvent>,

    now_ms: u64,
    tick_counter: u64,
    next_clone_id: u64,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions) -> Result<Self, MapError> {
        let level = match &options.layout {
            Some(rows) => parse_tile_map(rows.as_slice())?,
            None => Level::reference()?,
        };
        let player = PlayerInternal::new(level.player_spawn, level.tile_size);
        let mut engine = Self {
            level,
            rng: Rng::new(options.seed),
            policy: options.level_clear_policy,
            state: GameState::Start,
            level_number: 1,
            player,
            ghosts: Vec::new(),
            clones: Vec::new(),
            collectibles: Vec::new(),
            effects: EffectRegistry::new(),
            traps: TrapField::new(),
            events: Vec::new(),
            now_ms: 0,
            tick_counter: 0,
            next_clone_id: 0,
        };
        engine.populate_level(0);
        Ok(engine)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn handle_command(&mut self, command: Command) {
        let now_ms = self.now_ms;
        match command {
            Command::StartGame => {
                if self.state == GameState::Start {
                    self.state = GameState::Running;
                    info!(level = self.level_number, "run started");
                }
            }
            Command::RestartGame => self.restart(),
            _ if self.state != GameState::Running => {}
            Command::Turn(dir) => {
                if !self
                    .effects
                    .is_active(EntityId::Player, EffectKind::Entangled, now_ms)
                {
                    self.player.next_dir = Some(dir);
                }
            }
            Command::ActivateSkill => {
                self.activate_skill();
            }
            Command::BreakIce => {
                if self
                    .effects
                    .is_active(EntityId::Player, EffectKind::Frozen, now_ms)
                {
                    self.effects.remove(EntityId::Player, EffectKind::Frozen);
                    self.events.push(RuntimeEvent::IceBroken);
                }
            }
        }
    }

    /// Advances the simulation by one tick of `dt_ms`. Does nothing unless running.
    pub fn step(&mut self, dt_ms: u64) {
        if self.state != GameState::Running {
            return;
        }
        self.tick_counter += 1;
        self.now_ms += dt_ms;
        let now_ms = self.now_ms;

        let expired = self.effects.sweep(now_ms);
        if expired > 0 {
            trace!(tick = self.tick_counter, expired, "effects expired");
        }
        self.update_player(now_ms);
        self.update_ghosts(now_ms);
        self.update_clones(now_ms);
        self.resolve_ghost_contacts(now_ms);
        if self.state != GameState::Running {
            return;
        }
        self.resolve_trap_contacts(now_ms);
        self.resolve_pickups();
        self.effects.sweep(now_ms);
        self.traps.sweep_expired(now_ms);
        self.check_level_clear(now_ms);
    }

    fn restart(&mut self) {
        self.player = PlayerInternal::new(self.level.player_spawn, self.level.tile_size);
        self.level_number = 1;
        self.populate_level(self.now_ms);
        self.state = GameState::Running;
        info!("run restarted");
    }

    fn update_player(&mut self, now_ms: u64) {
        let speed = self
            .effects
            .movement_speed(EntityId::Player, BASE_SPEED as f32, now_ms);
        let speed = drain_move_buffer(&mut self.player.move_buffer, speed);
        if speed == 0 {
            return;
        }
        if let Some(next) = self.player.next_dir {
            if next == self.player.dir {
                self.player.next_dir = None;
            } else if can_move(&self.player.body, next, speed, &self.level) {
                self.player.dir = next;
                self.player.next_dir = None;
            }
        }
        let velocity = aligned_velocity(
            &self.player.body,
            self.player.dir,
            speed,
            self.level.tile_size,
        );
        attempt_move(&mut self.player.body, velocity, &self.level);
    }

    /// Scared ghosts in contact are eaten; the first other contact costs a life and ends the pass.
    fn resolve_ghost_contacts(&mut self, now_ms: u64) {
        for idx in 0..self.ghosts.len() {
            let ghost = &self.ghosts[idx];
            if !ghost.alive || !overlaps(&ghost.body, &self.player.body) {
                continue;
            }
            let variant = ghost.variant;
            if self
                .effects
                .is_active(EntityId::Ghost(idx), EffectKind::Scared, now_ms)
            {
                self.player.score += GHOST_EAT_POINTS;
                self.kill_ghost(idx, now_ms);
                self.events.push(RuntimeEvent::GhostEaten {
                    ghost_id: idx,
                    variant,
                    points: GHOST_EAT_POINTS,
                });
            } else {
                self.hit_player(idx);
                break;
            }
        }
    }

    fn hit_player(&mut self, ghost_idx: usize) {
        if self.player.lives <= 0 {
            return;
        }
        self.player.lives -= 1;
        let lives_left = self.player.lives;
        debug!(ghost = ghost_idx, lives_left, "player caught");
        self.events.push(RuntimeEvent::PlayerHit { lives_left });
        if lives_left == 0 {
            self.state = GameState::GameOver;
            info!(score = self.player.score, level = self.level_number, "game over");
            self.events.push(RuntimeEvent::GameOver {
                score: self.player.score,
            });
        } else {
            self.reset_player_after_hit();
        }
    }

    fn resolve_trap_contacts(&mut self, now_ms: u64) {
        if let Some(trap) = self.traps.check_contact(&self.player.body, now_ms, None) {
            self.effects.apply(
                EntityId::Player,
                trap.kind.effect(),
                trap_effect_ms(trap.kind),
                now_ms,
            );
            self.traps.consume(trap.id);
            if trap.kind == TrapKind::Entangle {
                self.player.next_dir = None;
            }
            debug!(trap = trap.id, kind = ?trap.kind, "player trapped");
            self.events.push(RuntimeEvent::TrapTriggered {
                trap_id: trap.id,
                kind: trap.kind,
            });
        }

        for idx in 0..self.ghosts.len() {
            if !self.ghosts[idx].alive {
                continue;
            }
            let body = self.ghosts[idx].body;
            let hits: SmallVec<[Trap; 4]> = self.traps.contacts(&body, now_ms, Some(idx)).collect();
            for trap in hits {
                self.effects.apply_if_inactive(
                    EntityId::Ghost(idx),
                    trap.kind.effect(),
                    trap_effect_ms(trap.kind),
                    now_ms,
                );
            }
        }
    }

    fn resolve_pickups(&mut self) {
        let player = self.player.body;
        let mut eaten: SmallVec<[Collectible; 2]> = SmallVec::new();
        self.collectibles.retain(|item| {
            if overlaps(&item.body, &player) {
                eaten.push(*item);
                false
            } else {
                true
            }
        });
        for item in eaten {
            let (x, y) = (item.body.x, item.body.y);
            match item.kind {
                CollectibleKind::Food => {
                    self.player.score += FOOD_POINTS;
                    self.events.push(RuntimeEvent::FoodEaten { x, y });
                }
                CollectibleKind::PowerPlus => {
                    self.player.score += POWER_PLUS_POINTS;
                    self.player.skill_charges += 1;
                    self.events.push(RuntimeEvent::PowerPlusEaten {
                        x,
                        y,
                        charges: self.player.skill_charges,
                    });
                }
            }
        }
    }

    fn check_level_clear(&mut self, now_ms: u64) {
        if !self.collectibles.is_empty() {
            return;
        }
        match self.policy {
            LevelClearPolicy::Reload => {
                let cleared = self.level_number;
                self.level_number += 1;
                info!(level = cleared, score = self.player.score, "level cleared");
                self.events
                    .push(RuntimeEvent::LevelCleared { level: cleared });
                self.populate_level(now_ms);
            }
            LevelClearPolicy::Win => {
                self.state = GameState::Win;
                info!(score = self.player.score, "level cleared, run won");
                self.events.push(RuntimeEvent::Victory {
                    score: self.player.score,
                });
            }
        }
    }

    pub fn get_world_init(&self) -> WorldInit {
        to_world_init(&self.level)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let now_ms = self.now_ms;
        let food_left = self
            .collectibles
            .iter()
            .filter(|item| item.kind == CollectibleKind::Food)
            .count();
        Snapshot {
            tick: self.tick_counter,
            now_ms,
            state: self.state,
            level: self.level_number,
            player: PlayerView {
                x: self.player.body.x,
                y: self.player.body.y,
                width: self.player.body.width,
                height: self.player.body.height,
                dir: self.player.dir,
                lives: self.player.lives,
                score: self.player.score,
                skill_charges: self.player.skill_charges,
                frozen_ms: self
                    .effects
                    .remaining_ms(EntityId::Player, EffectKind::Frozen, now_ms),
                entangled_ms: self
                    .effects
                    .remaining_ms(EntityId::Player, EffectKind::Entangled, now_ms),
            },
            ghosts: (0..self.ghosts.len())
                .map(|idx| self.ghost_view(idx, now_ms))
                .collect(),
            traps: self
                .traps
                .iter()
                .filter(|trap| trap.is_live(now_ms))
                .map(|trap| trap.view(now_ms))
                .collect(),
            clones: self.clone_views(),
            collectibles: self
                .collectibles
                .iter()
                .map(|item| CollectibleView {
                    kind: item.kind,
                    x: item.body.x,
                    y: item.body.y,
                })
                .collect(),
            food_left,
            power_plus_left: self.collectibles.len() - food_left,
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            state: self.state,
            level: self.level_number,
            score: self.player.score,
            lives: self.player.lives,
            duration_ms: self.now_ms,
            ticks: self.tick_counter,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::constants::{TICK_MS, TILE_SIZE};

    fn running_engine(seed: u64) -> GameEngine {
        let mut engine = GameEngine::new(GameEngineOptions {
            seed,
            ..GameEngineOptions::default()
        })
        .expect("reference layout");
        engine.handle_command(Command::StartGame);
        engine
    }

    fn ghost_of(engine: &GameEngine, variant: GhostVariant) -> usize {
        engine
            .ghosts
            .iter()
            .position(|ghost| ghost.variant == variant)
            .expect("reference layout has every variant")
    }

    #[test]
    fn engine_waits_for_start_command() {
        let mut engine = GameEngine::new(GameEngineOptions::default()).expect("reference");
        assert_eq!(engine.state(), GameState::Start);
        engine.step(TICK_MS);
        assert_eq!(engine.tick(), 0);
        engine.handle_command(Command::StartGame);
        engine.step(TICK_MS);
        assert_eq!(engine.tick(), 1);
        assert_eq!(engine.now_ms(), TICK_MS);
    }

    #[test]
    fn three_ghost_contacts_end_the_run() {
        let mut engine = running_engine(1);
        let red = ghost_of(&engine, GhostVariant::Red);
        for expected in [2, 1, 0] {
            engine.ghosts[red].body = engine.player.body;
            engine.resolve_ghost_contacts(engine.now_ms);
            assert_eq!(engine.player.lives, expected);
        }
        assert_eq!(engine.state(), GameState::GameOver);

        engine.ghosts[red].body = engine.player.body;
        engine.resolve_ghost_contacts(engine.now_ms);
        engine.step(TICK_MS);
        assert_eq!(engine.player.lives, 0);
        assert_eq!(engine.tick(), 0);
    }

    #[test]
    fn losing_a_life_resets_only_the_player() {
        let mut engine = running_engine(2);
        let red = ghost_of(&engine, GhostVariant::Red);
        let blue = ghost_of(&engine, GhostVariant::Blue);
        engine.player.skill_charges = 4;
        engine.player.score = 120;
        engine.player.body = engine.player.body.moved(-64, 0);
        engine.effects.apply(
            EntityId::Player,
            EffectKind::Frozen,
            FROZEN_DURATION_MS,
            0,
        );
        engine.ghosts[red].body = engine.player.body;
        let blue_body = engine.ghosts[blue].body;

        engine.resolve_ghost_contacts(engine.now_ms);
        assert_eq!(engine.player.lives, STARTING_LIVES - 1);
        assert_eq!(engine.player.body.origin(), engine.level.player_spawn);
        assert_eq!(engine.player.skill_charges, 0);
        assert_eq!(engine.player.score, 120);
        assert!(!engine
            .effects
            .is_active(EntityId::Player, EffectKind::Frozen, 0));
        assert_eq!(engine.ghosts[blue].body, blue_body);
    }

    #[test]
    fn scared_ghosts_are_eaten_before_a_normal_contact_costs_a_life() {
        let mut engine = running_engine(3);
        let red = ghost_of(&engine, GhostVariant::Red);
        let pink = ghost_of(&engine, GhostVariant::Pink);
        let blue = ghost_of(&engine, GhostVariant::Blue);
        for idx in [red, pink, blue] {
            engine.ghosts[idx].body = engine.player.body;
        }
        engine
            .effects
            .apply(EntityId::Ghost(red), EffectKind::Scared, SCARED_DURATION_MS, 0);

        engine.resolve_ghost_contacts(0);
        assert_eq!(engine.player.score, GHOST_EAT_POINTS);
        assert!(!engine.ghosts[red].alive);
        assert_eq!(engine.player.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn eaten_ghost_respawns_after_exactly_thirty_seconds() {
        let mut engine = running_engine(4);
        let orange = ghost_of(&engine, GhostVariant::Orange);
        engine.now_ms = 1_000;
        engine.ghosts[orange].body = engine.player.body;
        engine.ghosts[orange].dir = Direction::Right;
        engine.effects.apply(
            EntityId::Ghost(orange),
            EffectKind::Scared,
            SCARED_DURATION_MS,
            1_000,
        );
        engine.resolve_ghost_contacts(1_000);
        assert_eq!(engine.player.score, GHOST_EAT_POINTS);
        assert!(!engine.ghosts[orange].alive);

        engine.ghosts[orange].body = engine.player.body;
        engine.resolve_ghost_contacts(1_000);
        assert_eq!(engine.player.lives, STARTING_LIVES);

        engine.now_ms = 1_000 + GHOST_RESPAWN_MS - 1;
        engine.update_ghosts(engine.now_ms);
        assert!(!engine.ghosts[orange].alive);

        engine.now_ms = 1_000 + GHOST_RESPAWN_MS;
        engine.update_ghosts(engine.now_ms);
        let ghost = &engine.ghosts[orange];
        assert!(ghost.alive);
        assert_eq!(ghost.body.origin(), ghost.spawn);
        assert_eq!(ghost.dir, Direction::Up);
        assert_eq!(
            ghost.ability,
            Ability::SilkTrap {
                ready_at: 1_000 + GHOST_RESPAWN_MS + SILK_TRAP_COOLDOWN_MS
            }
        );
    }

    #[test]
    fn entangle_trap_blocks_turns_until_it_expires() {
        let mut engine = running_engine(5);
        let start = engine.player.body;
        engine.traps.spawn_trap(
            Body::square(start.x, start.y, TILE_SIZE),
            TrapKind::Entangle,
            TRAP_DURATION_MS,
            Some(0),
            0,
        );
        engine.resolve_trap_contacts(0);
        assert_eq!(engine.traps.live_count(0), 0);
        assert_eq!(
            engine
                .effects
                .remaining_ms(EntityId::Player, EffectKind::Entangled, 0),
            ENTANGLED_DURATION_MS
        );

        engine.handle_command(Command::Turn(Direction::Right));
        assert_eq!(engine.player.next_dir, None);
        engine.update_player(100);
        assert_eq!(engine.player.body, start);

        engine.now_ms = ENTANGLED_DURATION_MS;
        engine.handle_command(Command::Turn(Direction::Right));
        assert_eq!(engine.player.next_dir, Some(Direction::Right));
    }

    #[test]
    fn freeze_trap_slows_and_break_ice_clears_it() {
        let mut engine = running_engine(6);
        let start = engine.player.body;
        engine.traps.spawn_trap(
            Body::square(start.x, start.y, TILE_SIZE),
            TrapKind::Freeze,
            TRAP_DURATION_MS,
            None,
            0,
        );
        engine.resolve_trap_contacts(0);
        engine.update_player(0);
        assert_eq!(engine.player.body.x, start.x - 2);

        engine.handle_command(Command::BreakIce);
        assert!(!engine
            .effects
            .is_active(EntityId::Player, EffectKind::Frozen, 0));
        assert_eq!(engine.events.last(), Some(&RuntimeEvent::IceBroken));
    }

    #[test]
    fn ghosts_are_affected_by_traps_without_consuming_them() {
        let mut engine = running_engine(7);
        let pink = ghost_of(&engine, GhostVariant::Pink);
        let body = engine.ghosts[pink].body;
        engine
            .traps
            .spawn_trap(body, TrapKind::Freeze, TRAP_DURATION_MS, None, 0);
        engine.resolve_trap_contacts(0);
        assert_eq!(
            engine
                .effects
                .remaining_ms(EntityId::Ghost(pink), EffectKind::Frozen, 0),
            FROZEN_DURATION_MS
        );
        assert_eq!(engine.traps.live_count(0), 1);
    }

    #[test]
    fn eating_pellets_scores_and_grants_charges() {
        let mut engine = running_engine(8);
        let player = engine.player.body;
        engine.collectibles.retain(|item| !overlaps(&item.body, &player));
        let inset = (TILE_SIZE - PELLET_SIZE) / 2;
        engine.collectibles.push(Collectible {
            body: Body::square(player.x + inset, player.y + inset, PELLET_SIZE),
            kind: CollectibleKind::PowerPlus,
        });
        engine.resolve_pickups();
        assert_eq!(engine.player.score, POWER_PLUS_POINTS);
        assert_eq!(engine.player.skill_charges, 1);
    }

    #[test]
    fn clearing_the_board_reloads_the_level() {
        let mut engine = running_engine(9);
        let total = engine.collectibles.len();
        engine.player.score = 500;
        engine.collectibles.clear();
        engine.check_level_clear(engine.now_ms);

        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.level, 2);
        assert_eq!(snapshot.state, GameState::Running);
        assert_eq!(snapshot.power_plus_left, POWER_PLUS_PER_LEVEL);
        assert_eq!(snapshot.food_left + snapshot.power_plus_left, total);
        assert_eq!(snapshot.player.score, 500);
        assert!(snapshot
            .events
            .contains(&RuntimeEvent::LevelCleared { level: 1 }));
    }

    #[test]
    fn win_policy_ends_the_run_on_clear() {
        let mut engine = GameEngine::new(GameEngineOptions {
            level_clear_policy: LevelClearPolicy::Win,
            ..GameEngineOptions::default()
        })
        .expect("reference");
        engine.handle_command(Command::StartGame);
        engine.collectibles.clear();
        engine.step(TICK_MS);
        assert_eq!(engine.state(), GameState::Win);
        assert!(engine.is_ended());

        engine.handle_command(Command::RestartGame);
        assert_eq!(engine.state(), GameState::Running);
        assert_eq!(engine.summary().lives, STARTING_LIVES);
        assert_eq!(engine.collectibles.len(), engine.level.food_cells.len());
    }

    #[test]
    fn same_seed_gives_identical_runs() {
        let script = [
            Command::Turn(Direction::Up),
            Command::Turn(Direction::Right),
            Command::ActivateSkill,
            Command::Turn(Direction::Down),
            Command::Turn(Direction::Left),
        ];
        let run = |seed: u64| {
            let mut engine = running_engine(seed);
            let mut frames = Vec::new();
            for tick in 0..600usize {
                if tick % 40 == 0 {
                    engine.handle_command(script[(tick / 40) % script.len()]);
                }
                engine.step(TICK_MS);
                frames.push(
                    serde_json::to_string(&engine.build_snapshot(true)).expect("serialize"),
                );
            }
            frames
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn positions_stay_on_the_board_and_off_walls() {
        let mut engine = running_engine(11);
        let directions = Direction::ALL;
        for tick in 0..2_000usize {
            if tick % 25 == 0 {
                engine.handle_command(Command::Turn(directions[(tick / 25) % 4]));
            }
            engine.step(TICK_MS);
            if engine.is_ended() {
                engine.handle_command(Command::RestartGame);
            }
            assert!(engine.level.contains(&engine.player.body));
            assert!(!engine.level.overlaps_wall(&engine.player.body));
            for ghost in engine.ghosts.iter().filter(|ghost| ghost.alive) {
                assert!(engine.level.contains(&ghost.body));
                assert!(!engine.level.overlaps_wall(&ghost.body));
            }
        }
    }

    #[test]
    fn frozen_player_moves_at_a_third_of_base_speed() {
        let layout = Some(vec![
            "XXXXXXXXXXXXXX".to_string(),
            "X           PX".to_string(),
            "XXXXXXXXXXXXXX".to_string(),
        ]);
        let distance_after_12_ticks = |frozen: bool| {
            let mut engine = GameEngine::new(GameEngineOptions {
                layout: layout.clone(),
                ..GameEngineOptions::default()
            })
            .expect("corridor layout");
            engine.handle_command(Command::StartGame);
            if frozen {
                engine
                    .effects
                    .apply(EntityId::Player, EffectKind::Frozen, FROZEN_DURATION_MS, 0);
            }
            let start = engine.player.body.x;
            for _ in 0..12 {
                engine.step(TICK_MS);
            }
            start - engine.player.body.x
        };

        let normal = distance_after_12_ticks(false);
        assert_eq!(normal, 12 * BASE_SPEED);
        assert_eq!(distance_after_12_ticks(true), normal / 3);
    }

    #[test]
    fn live_ghosts_never_move_into_each_other() {
        let mut engine = running_engine(21);
        for _ in 0..3_000 {
            engine.step(TICK_MS);
            if engine.state() != GameState::Running {
                break;
            }
            for (a, first) in engine.ghosts.iter().enumerate() {
                for second in engine.ghosts.iter().skip(a + 1) {
                    assert!(
                        !(first.alive && second.alive && overlaps(&first.body, &second.body)),
                        "{:?} and {:?} overlap at tick {}",
                        first.variant,
                        second.variant,
                        engine.tick()
                    );
                }
            }
        }
    }
}
