//! Uniform hash grid for broad-phase neighbour queries.
//!
//! The grid stores slice indices, so it must be rebuilt whenever the backing
//! slice is reordered (resource removal uses `swap_remove`).
//!
//! Cell size must be at least the largest query distance; queries only look at
//! the 3×3 block of cells around the query point.

use crate::types::Point;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        SpatialGrid {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    fn world_to_cell(&self, pos: Point) -> (i64, i64) {
        (
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
        )
    }

    /// Clears the grid, keeping allocations of cells that were populated.
    pub fn clear(&mut self) {
        // Cells left empty by the previous rebuild are dropped so stale cells don't pile up
        self.cells.retain(|_, v| {
            let keep = !v.is_empty();
            v.clear();
            keep
        });
    }

    /// Rebuilds the grid from a list of positions; entries are their indices.
    pub fn rebuild<I: IntoIterator<Item = Point>>(&mut self, positions: I) {
        self.clear();
        for (index, pos) in positions.into_iter().enumerate() {
            if !pos.is_finite() {
                continue;
            }
            let cell = self.world_to_cell(pos);
            self.cells.entry(cell).or_default().push(index);
        }
    }

    /// Indices in the 3×3 cell block around `pos`. This over-approximates:
    /// callers still do the exact distance check.
    pub fn neighbors(&self, pos: Point) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.world_to_cell(pos);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |cell| self.cells.get(&cell))
            .flat_map(|indices| indices.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_include_adjacent_cells_only() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild(vec![
            Point::new(1.0, 1.0),   // 0: same cell as the query point
            Point::new(12.0, 1.0),  // 1: adjacent cell
            Point::new(-5.0, -5.0), // 2: diagonal neighbour cell
            Point::new(35.0, 1.0),  // 3: too far away
        ]);
        let mut found: Vec<usize> = grid.neighbors(Point::new(2.0, 2.0)).collect();
        found.sort();
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn test_rebuild_replaces_previous_contents() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild(vec![Point::new(0.0, 0.0)]);
        grid.rebuild(vec![Point::new(100.0, 100.0)]);
        assert_eq!(grid.neighbors(Point::new(0.0, 0.0)).count(), 0);
        assert_eq!(grid.neighbors(Point::new(100.0, 100.0)).count(), 1);
    }

    #[test]
    fn test_non_finite_positions_are_skipped() {
        let mut grid = SpatialGrid::new(10.0);
        grid.rebuild(vec![Point::new(f64::NAN, 0.0), Point::new(0.0, 0.0)]);
        let found: Vec<usize> = grid.neighbors(Point::ZERO).collect();
        assert_eq!(found, vec![1]);
    }
}
