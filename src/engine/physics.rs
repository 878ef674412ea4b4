use crate::types::{Body, Direction};
use crate::world::Level;

/// Strict AABB intersection: boxes that only share an edge do not overlap.
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Banks `speed` into the sub-pixel buffer and takes out the whole pixels available this tick.
pub(super) fn drain_move_buffer(buffer: &mut f32, speed: f32) -> i32 {
    *buffer += speed.max(0.0);
    let whole = buffer.floor();
    *buffer -= whole;
    whole as i32
}

/// Length of the next step along one axis, shortened so the mover lands on tile boundaries.
pub(super) fn grid_step(coord: i32, positive: bool, speed: i32, tile: i32) -> i32 {
    let offset = coord.rem_euclid(tile);
    let to_boundary = match (offset, positive) {
        (0, _) => speed,
        (_, true) => tile - offset,
        (_, false) => offset,
    };
    speed.min(to_boundary)
}

/// Velocity for `dir` at `speed`, snapped so agents never drift off the tile lattice.
pub(super) fn aligned_velocity(body: &Body, dir: Direction, speed: i32, tile: i32) -> (i32, i32) {
    if speed <= 0 {
        return (0, 0);
    }
    let (dx, dy) = dir.delta();
    let step = if dir.is_horizontal() {
        grid_step(body.x, dx > 0, speed, tile)
    } else {
        grid_step(body.y, dy > 0, speed, tile)
    };
    (dx * step, dy * step)
}

/// Horizontal wrap for bodies inside the portal band. Returns true when a wrap happened.
pub(super) fn wrap_portal(body: &mut Body, vx: i32, level: &Level) -> bool {
    if vx == 0 || !level.in_portal_band(body.y) {
        return false;
    }
    if vx < 0 && body.x <= 0 {
        body.x = level.width() - body.width;
        return true;
    }
    if vx > 0 && body.right() >= level.width() {
        body.x = 0;
        return true;
    }
    false
}

pub(super) fn blocked(body: &Body, level: &Level) -> bool {
    level.overlaps_wall(body) || !level.contains(body)
}

/// Moves `body` by `velocity`. On wall or boundary contact the previous position is
/// restored and `false` is returned.
pub fn attempt_move(body: &mut Body, velocity: (i32, i32), level: &Level) -> bool {
    let (vx, vy) = velocity;
    if vx == 0 && vy == 0 {
        return true;
    }
    let before = *body;
    *body = body.moved(vx, vy);
    wrap_portal(body, vx, level);
    if blocked(body, level) {
        *body = before;
        return false;
    }
    true
}

pub fn can_move(body: &Body, dir: Direction, speed: i32, level: &Level) -> bool {
    let velocity = aligned_velocity(body, dir, speed, level.tile_size);
    if velocity == (0, 0) {
        return false;
    }
    let mut trial = *body;
    attempt_move(&mut trial, velocity, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BASE_SPEED, TILE_SIZE};
    use crate::world::parse_tile_map;

    fn corridor() -> Level {
        parse_tile_map(&["XXXXX", "XP  X", "XXXXX"]).expect("corridor layout")
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Body::square(0, 0, 32);
        assert!(!overlaps(&a, &Body::square(32, 0, 32)));
        assert!(!overlaps(&a, &Body::square(0, 32, 32)));
        assert!(overlaps(&a, &Body::square(31, 31, 32)));
        assert!(overlaps(&a, &Body::new(14, 14, 4, 4)));
    }

    #[test]
    fn rejected_move_restores_position() {
        let level = corridor();
        let mut body = Body::square(TILE_SIZE, TILE_SIZE, TILE_SIZE);
        assert!(!attempt_move(&mut body, (0, -BASE_SPEED), &level));
        assert_eq!(body, Body::square(TILE_SIZE, TILE_SIZE, TILE_SIZE));
        assert!(attempt_move(&mut body, (BASE_SPEED, 0), &level));
        assert_eq!(body.x, TILE_SIZE + BASE_SPEED);
        assert!(!level.overlaps_wall(&body));
    }

    #[test]
    fn grid_step_stops_on_tile_boundaries() {
        assert_eq!(grid_step(0, true, 8, 32), 8);
        assert_eq!(grid_step(34, true, 8, 32), 8);
        assert_eq!(grid_step(60, true, 8, 32), 4);
        assert_eq!(grid_step(34, false, 8, 32), 2);
        assert_eq!(grid_step(64, false, 2, 32), 2);
    }

    #[test]
    fn can_move_checks_without_moving() {
        let level = corridor();
        let body = Body::square(TILE_SIZE, TILE_SIZE, TILE_SIZE);
        assert!(can_move(&body, Direction::Right, BASE_SPEED, &level));
        assert!(!can_move(&body, Direction::Left, BASE_SPEED, &level));
        assert!(!can_move(&body, Direction::Right, 0, &level));
        assert_eq!(body.x, TILE_SIZE);
    }

    #[test]
    fn portal_band_wraps_both_edges() {
        let level = crate::world::Level::reference().expect("reference layout");
        let row = 9 * TILE_SIZE;
        let mut body = Body::square(BASE_SPEED, row, TILE_SIZE);
        assert!(attempt_move(&mut body, (-BASE_SPEED, 0), &level));
        assert_eq!(body.x, level.width() - TILE_SIZE);

        let mut body = Body::square(level.width() - TILE_SIZE, row, TILE_SIZE);
        assert!(attempt_move(&mut body, (BASE_SPEED, 0), &level));
        assert_eq!(body.x, 0);
    }

    #[test]
    fn leaving_the_board_outside_the_band_is_blocked() {
        let level = parse_tile_map(&["P  ", "   "]).expect("open layout");
        let mut body = Body::square(0, 0, TILE_SIZE);
        assert!(!attempt_move(&mut body, (-BASE_SPEED, 0), &level));
        assert!(!attempt_move(&mut body, (0, -BASE_SPEED), &level));
        assert_eq!(body, Body::square(0, 0, TILE_SIZE));
    }

    #[test]
    fn move_buffer_carries_fractional_speed() {
        let speed = crate::constants::frozen_speed(BASE_SPEED as f32);
        let mut buffer = 0.0;
        let steps: Vec<i32> = (0..6)
            .map(|_| drain_move_buffer(&mut buffer, speed))
            .collect();
        assert_eq!(steps, vec![2, 3, 3, 2, 3, 3]);
        assert!(buffer < 0.01);

        let mut buffer = 0.0;
        assert_eq!(drain_move_buffer(&mut buffer, BASE_SPEED as f32), BASE_SPEED);
        assert_eq!(drain_move_buffer(&mut buffer, 0.0), 0);
    }
}
