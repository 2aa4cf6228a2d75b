//! Board: the 10x20 playfield grid.
//!
//! Flat row-major array of cells for cache locality. Coordinates are (x, y)
//! with x in 0..10 left to right and y in 0..20 top to bottom. The board does
//! collision testing, block placement, full-row detection/removal and the
//! top-row game-over probe; it knows nothing about pieces in flight.

use arrayvec::ArrayVec;

use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The game board. `Clone` is a deep copy; preview computations work on a
/// clone, never on the authoritative grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Cell at (x, y); `None` when out of bounds.
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at (x, y); returns false when out of bounds.
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// True iff every given absolute cell is within bounds and unoccupied.
    /// Callers must check this before `place` and before committing any move.
    pub fn can_place(&self, cells: &[(i8, i8)]) -> bool {
        cells
            .iter()
            .all(|&(x, y)| matches!(self.get(x, y), Some(None)))
    }

    /// Mark the given absolute cells occupied with `kind`.
    /// No bounds or collision check; the caller has validated via `can_place`.
    pub fn place(&mut self, cells: &[(i8, i8)], kind: PieceKind) {
        for &(x, y) in cells {
            self.set(x, y, Some(kind));
        }
    }

    /// True iff the row is completely filled.
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        self.cells[start..start + BOARD_WIDTH as usize]
            .iter()
            .all(|cell| cell.is_some())
    }

    /// Indices of all full rows, top to bottom. At most 4 rows can complete
    /// from a single lock.
    pub fn find_full_rows(&self) -> ArrayVec<usize, 4> {
        let mut rows = ArrayVec::new();
        for y in 0..BOARD_HEIGHT as usize {
            if self.is_row_full(y) {
                // More than 4 full rows means the grid was corrupted by the
                // caller; ignore the excess rather than panic.
                if rows.try_push(y).is_err() {
                    break;
                }
            }
        }
        rows
    }

    /// Remove the given rows, compacting everything above each one downwards
    /// and leaving empty rows at the top. Returns the number of rows removed.
    ///
    /// Runs as a single mark-then-compact pass so non-contiguous rows are
    /// handled without double shifting. Empty input is a no-op.
    pub fn clear_rows(&mut self, rows: &[usize]) -> usize {
        if rows.is_empty() {
            return 0;
        }

        let width = BOARD_WIDTH as usize;
        let mut write_y = BOARD_HEIGHT as usize;
        let mut removed = 0usize;

        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if rows.contains(&read_y) {
                removed += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * width;
                let dst = write_y * width;
                self.cells.copy_within(src..src + width, dst);
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = None;
        }

        removed
    }

    /// Game-over probe: true iff any cell of the topmost row is occupied.
    /// Checked after locking and after spawn collisions.
    pub fn is_top_row_occupied(&self) -> bool {
        self.cells[..BOARD_WIDTH as usize]
            .iter()
            .any(|cell| cell.is_some())
    }

    /// Raw cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Serialize the grid into u8 codes (0 = empty).
    pub fn write_codes(&self, out: &mut [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        for y in 0..BOARD_HEIGHT as usize {
            for x in 0..BOARD_WIDTH as usize {
                out[y][x] = self.cells[y * BOARD_WIDTH as usize + x]
                    .map(|kind| kind.code())
                    .unwrap_or(0);
            }
        }
    }

    /// Rebuild a board from u8 codes; rejects unknown codes.
    pub fn from_codes(
        codes: &[[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    ) -> Option<Self> {
        let mut board = Self::new();
        for (y, row) in codes.iter().enumerate() {
            for (x, &code) in row.iter().enumerate() {
                let cell = if code == 0 {
                    None
                } else {
                    Some(PieceKind::from_code(code)?)
                };
                board.cells[y * BOARD_WIDTH as usize + x] = cell;
            }
        }
        Some(board)
    }

    /// Clear the entire grid.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i8) {
        for x in 0..BOARD_WIDTH as i8 {
            board.set(x, y, Some(PieceKind::T));
        }
    }

    #[test]
    fn index_maps_row_major() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn can_place_rejects_out_of_bounds_and_occupied() {
        let mut board = Board::new();
        assert!(board.can_place(&[(0, 0), (9, 19)]));
        assert!(!board.can_place(&[(-1, 0)]));
        assert!(!board.can_place(&[(10, 0)]));
        assert!(!board.can_place(&[(0, 20)]));

        board.set(4, 10, Some(PieceKind::S));
        assert!(!board.can_place(&[(4, 10)]));
        assert!(board.can_place(&[(4, 9), (4, 11)]));
    }

    #[test]
    fn place_marks_cells_with_kind() {
        let mut board = Board::new();
        board.place(&[(3, 5), (4, 5), (3, 6), (4, 6)], PieceKind::O);
        assert_eq!(board.get(3, 5), Some(Some(PieceKind::O)));
        assert_eq!(board.get(4, 6), Some(Some(PieceKind::O)));
        assert_eq!(board.get(5, 5), Some(None));
    }

    #[test]
    fn find_full_rows_returns_top_to_bottom() {
        let mut board = Board::new();
        fill_row(&mut board, 17);
        fill_row(&mut board, 12);
        fill_row(&mut board, 19);
        assert_eq!(board.find_full_rows().as_slice(), &[12, 17, 19]);
    }

    #[test]
    fn clear_rows_empty_input_is_noop() {
        let mut board = Board::new();
        board.set(5, 19, Some(PieceKind::J));
        let before = board.clone();
        assert_eq!(board.clear_rows(&[]), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn clear_rows_compacts_non_contiguous_rows_once() {
        let mut board = Board::new();
        // Markers to track where surviving rows land.
        board.set(0, 2, Some(PieceKind::I));
        board.set(1, 5, Some(PieceKind::J));
        board.set(2, 10, Some(PieceKind::L));
        fill_row(&mut board, 3);
        fill_row(&mut board, 7);

        assert_eq!(board.clear_rows(&[3, 7]), 2);

        // Rows below the lowest cleared row are untouched.
        assert_eq!(board.get(2, 10), Some(Some(PieceKind::L)));
        // A row between the cleared pair shifts down by one.
        assert_eq!(board.get(1, 6), Some(Some(PieceKind::J)));
        assert_eq!(board.get(1, 5), Some(None));
        // A row above both shifts down by two.
        assert_eq!(board.get(0, 4), Some(Some(PieceKind::I)));
        assert_eq!(board.get(0, 2), Some(None));
        // Two empty rows inserted at the top.
        for x in 0..BOARD_WIDTH as i8 {
            assert_eq!(board.get(x, 0), Some(None));
            assert_eq!(board.get(x, 1), Some(None));
        }
    }

    #[test]
    fn clearing_every_row_leaves_a_consistent_empty_board() {
        let mut board = Board::new();
        for y in 0..BOARD_HEIGHT as i8 {
            fill_row(&mut board, y);
        }
        let rows: Vec<usize> = (0..BOARD_HEIGHT as usize).collect();
        assert_eq!(board.clear_rows(&rows), BOARD_HEIGHT as usize);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn top_row_probe() {
        let mut board = Board::new();
        assert!(!board.is_top_row_occupied());
        board.set(9, 0, Some(PieceKind::Z));
        assert!(board.is_top_row_occupied());
    }

    #[test]
    fn code_grid_round_trip() {
        let mut board = Board::new();
        board.set(0, 0, Some(PieceKind::I));
        board.set(5, 10, Some(PieceKind::T));

        let mut codes = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        board.write_codes(&mut codes);
        assert_eq!(codes[0][0], PieceKind::I.code());
        assert_eq!(codes[10][5], PieceKind::T.code());

        let back = Board::from_codes(&codes).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn from_codes_rejects_unknown_code() {
        let mut codes = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        codes[3][3] = 8;
        assert!(Board::from_codes(&codes).is_none());
    }
}
