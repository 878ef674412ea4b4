use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::rng::Rng;
use crate::types::{Command, Direction, GameState, GhostStatus, Snapshot, WorldInit};

/// Cells further than this from any pellet are scored as unreachable.
const UNREACHABLE: i32 = i32::MAX / 4;
const SKILL_RANGE_TILES: i32 = 8;

/// Scripted player used by the headless simulator. Reads snapshots, emits commands.
#[derive(Clone, Debug)]
pub struct Autopilot {
    columns: i32,
    rows: i32,
    tile_size: i32,
    walkable: Vec<bool>,
    rng: Rng,
}

impl Autopilot {
    pub fn new(world: &WorldInit, seed: u64) -> Self {
        let walkable = world
            .tiles
            .iter()
            .flat_map(|row| row.chars().map(|ch| ch != 'X'))
            .collect();
        Self {
            columns: world.columns,
            rows: world.rows,
            tile_size: world.tile_size,
            walkable,
            rng: Rng::new(seed),
        }
    }

    pub fn decide(&mut self, snapshot: &Snapshot) -> SmallVec<[Command; 3]> {
        let mut commands = SmallVec::new();
        if snapshot.state != GameState::Running {
            return commands;
        }
        if snapshot.player.frozen_ms > 0 {
            commands.push(Command::BreakIce);
        }
        if snapshot.player.skill_charges > 0 && self.ghost_in_line_of_fire(snapshot) {
            commands.push(Command::ActivateSkill);
        }
        if let Some(dir) = self.choose_pellet_direction(snapshot) {
            commands.push(Command::Turn(dir));
        }
        commands
    }

    fn cell_of(&self, x: i32, y: i32) -> (i32, i32) {
        let half = self.tile_size / 2;
        ((x + half) / self.tile_size, (y + half) / self.tile_size)
    }

    fn is_walkable(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col >= self.columns || row >= self.rows {
            return false;
        }
        self.walkable
            .get((row * self.columns + col) as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Multi-source BFS: steps from every walkable cell to its nearest pellet.
    fn pellet_distances(&self, snapshot: &Snapshot) -> Vec<i32> {
        let mut distance = vec![UNREACHABLE; (self.columns * self.rows) as usize];
        let mut queue = VecDeque::new();
        for item in &snapshot.collectibles {
            let (col, row) = self.cell_of(item.x, item.y);
            if !self.is_walkable(col, row) {
                continue;
            }
            let index = (row * self.columns + col) as usize;
            if distance[index] != 0 {
                distance[index] = 0;
                queue.push_back((col, row));
            }
        }
        while let Some((col, row)) = queue.pop_front() {
            let next = distance[(row * self.columns + col) as usize] + 1;
            for dir in Direction::ALL {
                let (dx, dy) = dir.delta();
                let (nc, nr) = (col + dx, row + dy);
                if !self.is_walkable(nc, nr) {
                    continue;
                }
                let index = (nr * self.columns + nc) as usize;
                if distance[index] > next {
                    distance[index] = next;
                    queue.push_back((nc, nr));
                }
            }
        }
        distance
    }

    fn nearest_threat(&self, snapshot: &Snapshot, col: i32, row: i32) -> Option<i32> {
        snapshot
            .ghosts
            .iter()
            .filter(|ghost| ghost.status == GhostStatus::Normal)
            .map(|ghost| {
                let (gc, gr) = self.cell_of(ghost.x, ghost.y);
                (gc - col).abs() + (gr - row).abs()
            })
            .min()
    }

    fn choose_pellet_direction(&mut self, snapshot: &Snapshot) -> Option<Direction> {
        let distance = self.pellet_distances(snapshot);
        let (col, row) = self.cell_of(snapshot.player.x, snapshot.player.y);
        let mut best = None;
        let mut best_score = f32::NEG_INFINITY;

        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let (nc, nr) = (col + dx, row + dy);
            if !self.is_walkable(nc, nr) {
                continue;
            }
            let steps = distance[(nr * self.columns + nc) as usize];
            let mut score = -(steps.min(UNREACHABLE / 2) as f32);
            if let Some(threat) = self.nearest_threat(snapshot, nc, nr) {
                score += threat.min(6) as f32 * 0.6;
                if threat <= 1 {
                    score -= 8.0;
                }
            }
            score += self.rng.next_f32() * 0.2;
            if score > best_score {
                best_score = score;
                best = Some(dir);
            }
        }
        best
    }

    fn ghost_in_line_of_fire(&self, snapshot: &Snapshot) -> bool {
        let player = &snapshot.player;
        let (dx, dy) = player.dir.delta();
        let reach = SKILL_RANGE_TILES * self.tile_size;
        let half = self.tile_size / 2;
        snapshot
            .ghosts
            .iter()
            .filter(|ghost| !matches!(ghost.status, GhostStatus::Dead { .. }))
            .any(|ghost| {
                let (ox, oy) = (ghost.x - player.x, ghost.y - player.y);
                if dx != 0 {
                    oy.abs() < half && ox.signum() == dx && ox.abs() <= reach
                } else {
                    ox.abs() < half && oy.signum() == dy && oy.abs() <= reach
                }
            })
    }
}
