//! Geometry constants and the 24-direction compass used for bond snapping.
//!
//! Every length in the editor is derived from a single base bond length,
//! so changing [`DEFAULT_BOND_LENGTH`] rescales the whole drawing. The
//! derived values are bundled in [`GeomConsts`] rather than recomputed at
//! each call site.

use serde::{Deserialize, Serialize};

use crate::vector::{vec2, Vector};

/// Default length of a single bond, in SVG user units.
pub const DEFAULT_BOND_LENGTH: f64 = 20.0;

/// Angular spacing between adjacent compass directions, in degrees.
pub const FREQ_DEG: f64 = 15.0;

/// Default interior bond angle for automatically placed bonds, in degrees.
pub const BOND_ANGLE_DEG: f64 = 120.0;

/// Maximum number of bonds a single atom may carry before it is full.
pub const MAX_BONDS: usize = 10;

/// Ratio of bond stroke width to bond length.
pub const WIDTH_TO_LENGTH: f64 = 0.04;

/// Offset factor between the two lines of a double bond.
pub const BETWEEN_DBL_BONDS: f64 = 0.065;

/// Offset factor between the outer lines of a triple bond.
pub const BETWEEN_TRP_BONDS: f64 = 0.1;

/// Size factor of an arrow head relative to arrow length.
pub const ARROW_SIZE: f64 = 0.065;

/// Fraction of the arrow length at which the head begins.
pub const ARROW_START: f64 = 0.85;

/// Font size for atom labels, in SVG user units.
pub const FONT_SIZE: f64 = 18.0;

/// Font size for subscripts inside atom labels.
pub const SUB_FONT_SIZE: f64 = 14.0;

/// Distance by which arrow-key moves shift selected items.
pub const MOVE_STEP: f64 = 5.0;

/// Padding added around the drawing when computing the transfer viewBox.
pub const CANVAS_PADDING: f64 = 20.0;

/// Maximum number of snapshots kept by the undo history.
pub const MAX_HISTORY: usize = 10;

/// Decimal precision used when comparing snapped vectors.
pub const VECTOR_PRECISION: i32 = 5;

/// One of the 24 compass directions at 15° spacing.
///
/// `N` points straight up on screen; indices advance clockwise, so
/// `E` is index 6, `S` is 12 and `W` is 18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    Ne1,
    Ne2,
    Ne3,
    Ne4,
    Ne5,
    E,
    Se1,
    Se2,
    Se3,
    Se4,
    Se5,
    S,
    Sw1,
    Sw2,
    Sw3,
    Sw4,
    Sw5,
    W,
    Nw1,
    Nw2,
    Nw3,
    Nw4,
    Nw5,
}

impl Direction {
    /// All 24 directions in clockwise order starting at North.
    pub const ALL: [Direction; 24] = [
        Direction::N,
        Direction::Ne1,
        Direction::Ne2,
        Direction::Ne3,
        Direction::Ne4,
        Direction::Ne5,
        Direction::E,
        Direction::Se1,
        Direction::Se2,
        Direction::Se3,
        Direction::Se4,
        Direction::Se5,
        Direction::S,
        Direction::Sw1,
        Direction::Sw2,
        Direction::Sw3,
        Direction::Sw4,
        Direction::Sw5,
        Direction::W,
        Direction::Nw1,
        Direction::Nw2,
        Direction::Nw3,
        Direction::Nw4,
        Direction::Nw5,
    ];

    /// Index of this direction in clockwise order, 0 through 23.
    pub fn index(self) -> usize {
        Direction::ALL
            .iter()
            .position(|d| *d == self)
            .unwrap_or(0)
    }

    /// Returns the direction at the given clockwise index, wrapping
    /// modulo 24.
    pub fn from_index(index: usize) -> Direction {
        Direction::ALL[index % 24]
    }

    /// Returns the opposite direction, 180° away.
    pub fn opposite(self) -> Direction {
        Direction::from_index(self.index() + 12)
    }

    /// Canonical name of this direction, e.g. `"NE3"`.
    pub fn name(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::Ne1 => "NE1",
            Direction::Ne2 => "NE2",
            Direction::Ne3 => "NE3",
            Direction::Ne4 => "NE4",
            Direction::Ne5 => "NE5",
            Direction::E => "E",
            Direction::Se1 => "SE1",
            Direction::Se2 => "SE2",
            Direction::Se3 => "SE3",
            Direction::Se4 => "SE4",
            Direction::Se5 => "SE5",
            Direction::S => "S",
            Direction::Sw1 => "SW1",
            Direction::Sw2 => "SW2",
            Direction::Sw3 => "SW3",
            Direction::Sw4 => "SW4",
            Direction::Sw5 => "SW5",
            Direction::W => "W",
            Direction::Nw1 => "NW1",
            Direction::Nw2 => "NW2",
            Direction::Nw3 => "NW3",
            Direction::Nw4 => "NW4",
            Direction::Nw5 => "NW5",
        }
    }

    /// Parses a canonical direction name back into a [`Direction`].
    pub fn from_name(name: &str) -> Option<Direction> {
        Direction::ALL.iter().copied().find(|d| d.name() == name)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry constants derived from a base bond length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeomConsts {
    /// Base bond length.
    pub bond_length: f64,
    /// Stroke width of bond lines.
    pub bond_width: f64,
    /// Radius of the aromatic ring circle.
    pub aromatic_r: f64,
    /// Hit-test tolerance around an atom position.
    pub circ_r: f64,
    /// Absolute offset between the lines of a double bond.
    pub between_dbl: f64,
    /// Absolute offset between the outer lines of a triple bond.
    pub between_trp: f64,
    /// Absolute size of arrow heads.
    pub arrow_size: f64,
    /// One bond vector per compass direction, indexed by
    /// [`Direction::index`].
    bond_vectors: Vec<Vector>,
}

impl GeomConsts {
    /// Builds the derived constants for the given base bond length.
    pub fn new(bond_length: f64) -> Self {
        let north = vec2(0.0, -bond_length);
        let bond_vectors = (0..24)
            .map(|i| north.rotate_cw(FREQ_DEG * i as f64))
            .collect();
        Self {
            bond_length,
            bond_width: bond_length * WIDTH_TO_LENGTH,
            aromatic_r: bond_length * 0.45,
            circ_r: bond_length * 0.12,
            between_dbl: bond_length * BETWEEN_DBL_BONDS,
            between_trp: bond_length * BETWEEN_TRP_BONDS,
            arrow_size: bond_length * ARROW_SIZE,
            bond_vectors,
        }
    }

    /// Returns the bond vector for a compass direction.
    pub fn bond_vector(&self, direction: Direction) -> Vector {
        self.bond_vectors[direction.index()]
    }

    /// Returns all 24 bond vectors in clockwise order starting at North.
    pub fn bond_vectors(&self) -> &[Vector] {
        &self.bond_vectors
    }
}

impl Default for GeomConsts {
    fn default() -> Self {
        GeomConsts::new(DEFAULT_BOND_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::vec2;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(
                (dir.opposite().index() + 24 - dir.index()) % 24,
                12,
                "opposite of {} is not 180° away",
                dir
            );
        }
    }

    #[test]
    fn test_cardinal_bond_vectors() {
        let consts = GeomConsts::default();
        assert!(consts.bond_vector(Direction::N).compare(vec2(0.0, -20.0), 5));
        assert!(consts.bond_vector(Direction::E).compare(vec2(20.0, 0.0), 5));
        assert!(consts.bond_vector(Direction::S).compare(vec2(0.0, 20.0), 5));
        assert!(consts.bond_vector(Direction::W).compare(vec2(-20.0, 0.0), 5));
    }

    #[test]
    fn test_all_bond_vectors_have_bond_length() {
        let consts = GeomConsts::default();
        for v in consts.bond_vectors() {
            assert!((v.length() - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_name(dir.name()), Some(dir));
        }
        assert_eq!(Direction::from_name("NNE"), None);
    }

    #[test]
    fn test_derived_lengths() {
        let consts = GeomConsts::new(20.0);
        assert_eq!(consts.bond_width, 0.8);
        assert_eq!(consts.aromatic_r, 9.0);
        assert_eq!(consts.circ_r, 2.4);
        assert_eq!(consts.between_dbl, 1.3);
    }
}
