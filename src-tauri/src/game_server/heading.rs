//! Heading - The four axis-aligned directions the track can run in
//!
//! The world is y-up. North is +Z and east is +X, so a right turn rotates
//! clockwise when seen from above.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Direction of travel along the track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

impl Heading {
    /// Unit vector for this heading
    pub fn to_vec3(self) -> Vec3 {
        match self {
            Heading::North => Vec3::Z,
            Heading::East => Vec3::X,
            Heading::South => Vec3::NEG_Z,
            Heading::West => Vec3::NEG_X,
        }
    }

    /// Heading after a 90 degree turn
    pub fn turned(self, turn: TurnDirection) -> Self {
        match (self, turn) {
            (Heading::North, TurnDirection::Right) => Heading::East,
            (Heading::East, TurnDirection::Right) => Heading::South,
            (Heading::South, TurnDirection::Right) => Heading::West,
            (Heading::West, TurnDirection::Right) => Heading::North,
            (Heading::North, TurnDirection::Left) => Heading::West,
            (Heading::West, TurnDirection::Left) => Heading::South,
            (Heading::South, TurnDirection::Left) => Heading::East,
            (Heading::East, TurnDirection::Left) => Heading::North,
        }
    }

    /// Whether this heading runs along the X axis
    pub fn is_lateral(self) -> bool {
        matches!(self, Heading::East | Heading::West)
    }

    /// Rotate a prefab-space extent (authored facing north) into world space.
    pub fn rotate_extent(self, size: Vec3) -> Vec3 {
        if self.is_lateral() {
            Vec3::new(size.z, size.y, size.x)
        } else {
            size
        }
    }
}

/// Side of a turn request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Interpret a signed turn axis value (-1 left, +1 right).
    ///
    /// Returns `None` for a centred axis.
    pub fn from_axis(value: f32) -> Option<Self> {
        if value < 0.0 {
            Some(TurnDirection::Left)
        } else if value > 0.0 {
            Some(TurnDirection::Right)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_turn_is_clockwise() {
        assert_eq!(Heading::North.turned(TurnDirection::Right), Heading::East);
        assert_eq!(Heading::East.turned(TurnDirection::Right), Heading::South);
        assert_eq!(Heading::North.turned(TurnDirection::Left), Heading::West);
    }

    #[test]
    fn left_undoes_right() {
        for heading in [Heading::North, Heading::East, Heading::South, Heading::West] {
            let back = heading
                .turned(TurnDirection::Right)
                .turned(TurnDirection::Left);
            assert_eq!(back, heading);
        }
    }

    #[test]
    fn turned_vector_is_perpendicular() {
        let forward = Heading::South.to_vec3();
        let right = Heading::South.turned(TurnDirection::Right).to_vec3();
        assert_eq!(forward.dot(right), 0.0);
        assert_eq!(right, Vec3::NEG_X);
    }

    #[test]
    fn lateral_headings_swap_extent() {
        let size = Vec3::new(12.0, 0.5, 4.0);
        assert_eq!(Heading::North.rotate_extent(size), size);
        assert_eq!(Heading::West.rotate_extent(size), Vec3::new(4.0, 0.5, 12.0));
    }

    #[test]
    fn axis_maps_to_turns() {
        assert_eq!(TurnDirection::from_axis(-1.0), Some(TurnDirection::Left));
        assert_eq!(TurnDirection::from_axis(1.0), Some(TurnDirection::Right));
        assert_eq!(TurnDirection::from_axis(0.0), None);
    }
}
