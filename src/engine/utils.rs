use crate::rng::Rng;
use crate::types::{Body, Direction};

pub(super) fn random_direction(rng: &mut Rng) -> Direction {
    match rng.int(0, 3) {
        0 => Direction::Up,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Right,
    }
}

/// Direction along the dominant axis of (dx, dy). Ties go vertical.
pub(super) fn primary_axis_direction(dx: i32, dy: i32) -> Direction {
    if dx.abs() > dy.abs() {
        horizontal_toward(dx)
    } else {
        vertical_toward(dy)
    }
}

pub(super) fn secondary_axis_direction(dx: i32, dy: i32) -> Direction {
    if dx.abs() > dy.abs() {
        vertical_toward(dy)
    } else {
        horizontal_toward(dx)
    }
}

fn horizontal_toward(dx: i32) -> Direction {
    if dx > 0 {
        Direction::Right
    } else {
        Direction::Left
    }
}

fn vertical_toward(dy: i32) -> Direction {
    if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

/// Offset from `from` to `to`, measured between box origins.
pub(super) fn delta_to(from: &Body, to: &Body) -> (i32, i32) {
    (to.x - from.x, to.y - from.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_axis_follows_larger_delta() {
        assert_eq!(primary_axis_direction(100, 10), Direction::Right);
        assert_eq!(primary_axis_direction(-100, 10), Direction::Left);
        assert_eq!(primary_axis_direction(10, -100), Direction::Up);
        assert_eq!(primary_axis_direction(32, 32), Direction::Down);
    }

    #[test]
    fn secondary_axis_is_the_other_axis() {
        assert_eq!(secondary_axis_direction(100, 10), Direction::Down);
        assert_eq!(secondary_axis_direction(10, -100), Direction::Right);
    }

    #[test]
    fn random_direction_covers_all_directions() {
        let mut rng = Rng::new(5);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(random_direction(&mut rng));
        }
        assert_eq!(seen.len(), 4);
    }
}
