//! Piece model: tetromino shapes per rotation state.
//!
//! Rotation is plain state stepping within a 4x4 bounding box. There are no
//! kick tables: a rotation that would collide is rejected by the engine and
//! the piece keeps its state.

use crate::types::{PieceKind, Rotation, BOARD_WIDTH};

/// Offset of a single block relative to the piece anchor.
pub type BlockOffset = (i8, i8);

/// Shape of a piece: 4 block offsets from the anchor.
pub type PieceShape = [BlockOffset; 4];

/// Spawn anchor for new pieces: top-center of the board.
pub const SPAWN_POSITION: (i8, i8) = ((BOARD_WIDTH as i8 - 4) / 2, 0);

/// Get the block offsets for a piece kind and rotation.
pub fn shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    match kind {
        PieceKind::I => i_shape(rotation),
        PieceKind::O => o_shape(rotation),
        PieceKind::T => t_shape(rotation),
        PieceKind::S => s_shape(rotation),
        PieceKind::Z => z_shape(rotation),
        PieceKind::J => j_shape(rotation),
        PieceKind::L => l_shape(rotation),
    }
}

fn i_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 1), (1, 1), (2, 1), (3, 1)],
        Rotation::East => [(2, 0), (2, 1), (2, 2), (2, 3)],
        Rotation::South => [(0, 2), (1, 2), (2, 2), (3, 2)],
        Rotation::West => [(1, 0), (1, 1), (1, 2), (1, 3)],
    }
}

/// O piece is identical in all four states.
fn o_shape(_rotation: Rotation) -> PieceShape {
    [(1, 0), (2, 0), (1, 1), (2, 1)]
}

fn t_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (1, 1), (2, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (1, 2)],
        Rotation::West => [(1, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn s_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(1, 0), (2, 0), (0, 1), (1, 1)],
        Rotation::East => [(1, 0), (1, 1), (2, 1), (2, 2)],
        Rotation::South => [(1, 1), (2, 1), (0, 2), (1, 2)],
        Rotation::West => [(0, 0), (0, 1), (1, 1), (1, 2)],
    }
}

fn z_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (1, 0), (1, 1), (2, 1)],
        Rotation::East => [(2, 0), (1, 1), (2, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (1, 2), (2, 2)],
        Rotation::West => [(1, 0), (0, 1), (1, 1), (0, 2)],
    }
}

fn j_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(0, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (2, 0), (1, 1), (1, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (2, 2)],
        Rotation::West => [(1, 0), (1, 1), (0, 2), (1, 2)],
    }
}

fn l_shape(rotation: Rotation) -> PieceShape {
    match rotation {
        Rotation::North => [(2, 0), (0, 1), (1, 1), (2, 1)],
        Rotation::East => [(1, 0), (1, 1), (1, 2), (2, 2)],
        Rotation::South => [(0, 1), (1, 1), (2, 1), (0, 2)],
        Rotation::West => [(0, 0), (1, 0), (1, 1), (1, 2)],
    }
}

/// A falling piece: kind, rotation state and board anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at the spawn anchor.
    pub fn new(kind: PieceKind) -> Self {
        let (x, y) = SPAWN_POSITION;
        Self {
            kind,
            rotation: Rotation::North,
            x,
            y,
        }
    }

    /// Create a tetromino at an explicit anchor (deterministic tests).
    pub fn at(kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> Self {
        Self { kind, rotation, x, y }
    }

    /// Block offsets for the current rotation.
    pub fn shape(&self) -> PieceShape {
        shape(self.kind, self.rotation)
    }

    /// Absolute board cells occupied by this piece.
    pub fn cells(&self) -> [(i8, i8); 4] {
        let mut out = self.shape();
        for cell in &mut out {
            cell.0 += self.x;
            cell.1 += self.y;
        }
        out
    }

    /// Copy of this piece shifted by (dx, dy).
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Copy of this piece stepped to the adjacent rotation state.
    pub fn rotated(&self, clockwise: bool) -> Self {
        let rotation = if clockwise {
            self.rotation.rotate_cw()
        } else {
            self.rotation.rotate_ccw()
        };
        Self { rotation, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    #[test]
    fn every_shape_has_four_blocks_within_bounding_box() {
        for kind in PieceKind::ALL {
            for rotation in ALL_ROTATIONS {
                let s = shape(kind, rotation);
                assert_eq!(s.len(), 4);
                for (dx, dy) in s {
                    assert!((0..4).contains(&dx), "{:?} {:?} dx={}", kind, rotation, dx);
                    assert!((0..4).contains(&dy), "{:?} {:?} dy={}", kind, rotation, dy);
                }
            }
        }
    }

    #[test]
    fn shapes_have_no_duplicate_blocks() {
        for kind in PieceKind::ALL {
            for rotation in ALL_ROTATIONS {
                let s = shape(kind, rotation);
                for i in 0..4 {
                    for j in (i + 1)..4 {
                        assert_ne!(s[i], s[j], "{:?} {:?}", kind, rotation);
                    }
                }
            }
        }
    }

    #[test]
    fn o_piece_is_rotation_invariant() {
        let reference = shape(PieceKind::O, Rotation::North);
        for rotation in ALL_ROTATIONS {
            assert_eq!(shape(PieceKind::O, rotation), reference);
        }
    }

    #[test]
    fn rotation_steps_are_inverses() {
        let piece = Tetromino::new(PieceKind::T);
        assert_eq!(piece.rotated(true).rotated(false), piece);
        assert_eq!(
            piece.rotated(true).rotated(true).rotated(true).rotated(true),
            piece
        );
    }

    #[test]
    fn spawn_position_is_top_center() {
        let piece = Tetromino::new(PieceKind::L);
        assert_eq!((piece.x, piece.y), (3, 0));
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn cells_translate_offsets_by_anchor() {
        let piece = Tetromino::at(PieceKind::O, Rotation::North, 4, 10);
        let cells = piece.cells();
        assert!(cells.contains(&(5, 10)));
        assert!(cells.contains(&(6, 10)));
        assert!(cells.contains(&(5, 11)));
        assert!(cells.contains(&(6, 11)));
    }
}
