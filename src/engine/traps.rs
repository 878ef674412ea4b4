use crate::types::{Body, TrapKind, TrapView};

use super::physics::overlaps;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trap {
    pub id: u64,
    pub body: Body,
    pub kind: TrapKind,
    pub started_at: u64,
    pub duration_ms: u64,
    pub active: bool,
    /// Ghost that laid the trap. It never reacts to its own traps.
    pub owner: Option<usize>,
}

impl Trap {
    pub fn is_live(&self, now_ms: u64) -> bool {
        self.active && now_ms.saturating_sub(self.started_at) < self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.started_at + self.duration_ms).saturating_sub(now_ms)
    }

    pub fn view(&self, now_ms: u64) -> TrapView {
        TrapView {
            id: self.id,
            kind: self.kind,
            x: self.body.x,
            y: self.body.y,
            size: self.body.width,
            remaining_ms: self.remaining_ms(now_ms),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrapField {
    traps: Vec<Trap>,
    next_id: u64,
}

impl TrapField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_trap(
        &mut self,
        body: Body,
        kind: TrapKind,
        duration_ms: u64,
        owner: Option<usize>,
        now_ms: u64,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.traps.push(Trap {
            id,
            body,
            kind,
            started_at: now_ms,
            duration_ms,
            active: true,
            owner,
        });
        id
    }

    /// Removes consumed and timed-out traps. Returns how many were dropped.
    pub fn sweep_expired(&mut self, now_ms: u64) -> usize {
        let before = self.traps.len();
        self.traps.retain(|trap| trap.is_live(now_ms));
        before - self.traps.len()
    }

    /// First live trap touching `body`, skipping traps laid by `ignore_owner`.
    pub fn check_contact(
        &self,
        body: &Body,
        now_ms: u64,
        ignore_owner: Option<usize>,
    ) -> Option<Trap> {
        self.contacts(body, now_ms, ignore_owner).next()
    }

    pub fn contacts<'a>(
        &'a self,
        body: &'a Body,
        now_ms: u64,
        ignore_owner: Option<usize>,
    ) -> impl Iterator<Item = Trap> + 'a {
        self.traps
            .iter()
            .filter(move |trap| {
                trap.is_live(now_ms)
                    && (ignore_owner.is_none() || trap.owner != ignore_owner)
                    && overlaps(&trap.body, body)
            })
            .copied()
    }

    pub fn consume(&mut self, id: u64) -> bool {
        match self.traps.iter_mut().find(|trap| trap.id == id && trap.active) {
            Some(trap) => {
                trap.active = false;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trap> {
        self.traps.iter()
    }

    pub fn live_count(&self, now_ms: u64) -> usize {
        self.traps.iter().filter(|trap| trap.is_live(now_ms)).count()
    }

    pub fn clear(&mut self) {
        self.traps.clear();
    }
}
