// Uniform spatial hash grid for circle neighbour queries.
//
// Each circle is bucketed by the cell holding its center. With the cell size at least the
// largest interaction diameter, every circle that can touch a query circle sits in the 3x3
// block of cells around the query center.

use rustc_hash::FxHashMap;

use crate::circle::Circle;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// `cell_size` should be at least the largest interaction diameter of the circles inserted.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: usize, circle: &Circle) {
        let cell = self.cell_of(circle.x, circle.y);
        self.cells.entry(cell).or_default().push(id);
    }

    /// Ids bucketed in the 3x3 block around `circle`'s center, in a fixed cell order.
    ///
    /// May include false positives; the caller does the exact distance check.
    pub fn neighbours(&self, circle: &Circle, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy) = self.cell_of(circle.x, circle.y);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(ids) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend_from_slice(ids);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn rebuild<'a>(&mut self, circles: impl IntoIterator<Item = &'a Circle>) {
        self.clear();
        for (id, c) in circles.into_iter().enumerate() {
            self.insert(id, c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours_cover_adjacent_cells() {
        let mut grid = SpatialGrid::new(10.0);
        let circles = [
            Circle::new(5.0, 5.0, 2.0),
            Circle::new(14.0, 5.0, 2.0),
            Circle::new(55.0, 55.0, 2.0),
        ];
        grid.rebuild(circles.iter());

        let mut out = Vec::new();
        grid.neighbours(&circles[0], &mut out);
        assert!(out.contains(&0));
        assert!(out.contains(&1));
        assert!(!out.contains(&2));
    }

    #[test]
    fn test_negative_coordinates_bucket_correctly() {
        let mut grid = SpatialGrid::new(10.0);
        let circles = [Circle::new(-1.0, -1.0, 1.0), Circle::new(1.0, 1.0, 1.0)];
        grid.rebuild(circles.iter());

        let mut out = Vec::new();
        grid.neighbours(&circles[1], &mut out);
        assert_eq!(out.len(), 2);
    }
}
