use serde::{Deserialize, Serialize};

/// Window rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Bounds {
    /// Shifts the origin by `step` toward `direction`; size is untouched.
    pub fn nudged(self, direction: Direction, step: f64) -> Self {
        let (dx, dy) = match direction {
            Direction::Left => (-step, 0.0),
            Direction::Right => (step, 0.0),
            Direction::Up => (0.0, -step),
            Direction::Down => (0.0, step),
        };
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Bounds = Bounds {
        x: 100.0,
        y: 50.0,
        width: 800.0,
        height: 300.0,
    };

    #[test]
    fn nudge_moves_only_the_matching_axis() {
        assert_eq!(ORIGIN.nudged(Direction::Left, 10.0).x, 90.0);
        assert_eq!(ORIGIN.nudged(Direction::Right, 10.0).x, 110.0);
        assert_eq!(ORIGIN.nudged(Direction::Up, 10.0).y, 40.0);
        assert_eq!(ORIGIN.nudged(Direction::Down, 10.0).y, 60.0);

        let moved = ORIGIN.nudged(Direction::Down, 10.0);
        assert_eq!((moved.x, moved.width, moved.height), (100.0, 800.0, 300.0));
    }

    #[test]
    fn opposite_nudges_cancel_out() {
        let pairs = [
            (Direction::Left, Direction::Right),
            (Direction::Right, Direction::Left),
            (Direction::Up, Direction::Down),
            (Direction::Down, Direction::Up),
        ];
        for (there, back) in pairs {
            assert_eq!(ORIGIN.nudged(there, 10.0).nudged(back, 10.0), ORIGIN);
        }
    }

    #[test]
    fn nudges_compose_additively() {
        let moved = (0..5).fold(ORIGIN, |bounds, _| bounds.nudged(Direction::Right, 10.0));
        assert_eq!(moved.x, 150.0);
    }
}
