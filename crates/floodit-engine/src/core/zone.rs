//! Connected-component analysis.
//!
//! Zones are maximal 4-connected regions of equal color, found by breadth-first
//! flood fill. [`partition`] splits a whole board into the upper-left zone (with
//! BFS depth per cell) and the remaining blobs.

use std::collections::VecDeque;

use super::board::{Board, Point};

/// A cell of the upper-left zone, annotated with its BFS distance from `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneCell {
    pub point: Point,
    pub distance: usize,
}

/// The board split into the upper-left zone and the other connected regions.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Cells of the upper-left zone in BFS order (non-decreasing distance).
    pub upper_left: Vec<ZoneCell>,
    /// Maximal same-color regions outside the upper-left zone.
    pub blobs: Vec<Vec<Point>>,
}

/// Flood fills from `origin`, marking every reached cell in `visited`.
///
/// Returns the reached cells with their BFS distance from `origin`, in visiting
/// order. Cells already marked in `visited` are treated as walls.
fn flood_fill(board: &Board, origin: Point, visited: &mut [bool]) -> Vec<ZoneCell> {
    let size = board.size();
    let color = board.cell(origin);
    let mut zone = vec![];
    let mut queue = VecDeque::new();

    visited[origin.index(size)] = true;
    queue.push_back(ZoneCell {
        point: origin,
        distance: 0,
    });
    while let Some(cell) = queue.pop_front() {
        zone.push(cell);
        for next in cell.point.neighbors(size) {
            let index = next.index(size);
            if !visited[index] && board.cell(next) == color {
                visited[index] = true;
                queue.push_back(ZoneCell {
                    point: next,
                    distance: cell.distance + 1,
                });
            }
        }
    }
    zone
}

/// Returns the same-color region containing `origin`.
#[must_use]
pub fn zone_from(board: &Board, origin: Point) -> Vec<Point> {
    let mut visited = vec![false; board.len()];
    flood_fill(board, origin, &mut visited)
        .into_iter()
        .map(|c| c.point)
        .collect()
}

/// Splits the board into the upper-left zone and the remaining blobs.
///
/// Every cell belongs to exactly one of them.
#[must_use]
pub fn partition(board: &Board) -> Partition {
    if board.is_empty() {
        return Partition::default();
    }
    let size = board.size();
    let mut visited = vec![false; board.len()];
    let upper_left = flood_fill(board, Point::new(0, 0), &mut visited);

    let mut blobs = vec![];
    for index in 0..board.len() {
        if visited[index] {
            continue;
        }
        let blob = flood_fill(board, Point::from_index(index, size), &mut visited);
        blobs.push(blob.into_iter().map(|c| c.point).collect());
    }

    Partition { upper_left, blobs }
}

/// Groups the upper-left zone into waves of equal distance, nearest first.
#[must_use]
pub fn waves(upper_left: &[ZoneCell]) -> Vec<Vec<Point>> {
    upper_left
        .chunk_by(|a, b| a.distance == b.distance)
        .map(|wave| wave.iter().map(|c| c.point).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::Color;

    use super::*;

    fn board_from_rows(rows: &[&[Color]]) -> Board {
        let size = rows.len();
        let mut board = Board::filled(size, rows[0][0]);
        let mut batch = board.begin_batch();
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), size);
            for (x, color) in row.iter().enumerate() {
                batch.set(Point::new(x, y), *color).unwrap();
            }
        }
        batch.finish();
        board
    }

    const R: Color = Color::RED;
    const B: Color = Color::BLUE;
    const G: Color = Color::GREEN;

    #[test]
    fn test_partition_covers_every_cell_once() {
        let board = board_from_rows(&[&[R, R, B], &[B, R, B], &[G, B, R]]);
        let partition = partition(&board);

        let mut seen = vec![0; board.len()];
        for cell in &partition.upper_left {
            seen[cell.point.index(3)] += 1;
        }
        for blob in &partition.blobs {
            for p in blob {
                seen[p.index(3)] += 1;
            }
        }
        assert!(seen.iter().all(|n| *n == 1), "{seen:?}");
        assert_eq!(partition.upper_left.len(), 3);
        // {(2,0),(2,1)}, {(0,1)}, {(0,2)}, {(1,2)}, {(2,2)}
        assert_eq!(partition.blobs.len(), 5);
    }

    #[test]
    fn test_upper_left_distances() {
        let board = board_from_rows(&[&[R, R, R], &[B, B, R], &[R, R, R]]);
        let partition = partition(&board);
        let distances = partition
            .upper_left
            .iter()
            .map(|c| (c.point, c.distance))
            .collect::<Vec<_>>();
        assert_eq!(
            distances,
            vec![
                (Point::new(0, 0), 0),
                (Point::new(1, 0), 1),
                (Point::new(2, 0), 2),
                (Point::new(2, 1), 3),
                (Point::new(2, 2), 4),
                (Point::new(1, 2), 5),
                (Point::new(0, 2), 6),
            ]
        );
        assert!(partition.upper_left.is_sorted_by_key(|c| c.distance));
    }

    #[test]
    fn test_waves_group_by_distance() {
        let board = Board::filled(3, R);
        let partition = partition(&board);
        let waves = waves(&partition.upper_left);
        let lens = waves.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(lens, vec![1, 2, 3, 2, 1]);
        assert_eq!(waves[0], vec![Point::new(0, 0)]);
        assert!(partition.blobs.is_empty());
    }

    #[test]
    fn test_zone_from_ignores_diagonals() {
        let board = board_from_rows(&[&[R, B], &[B, R]]);
        assert_eq!(zone_from(&board, Point::new(0, 0)), vec![Point::new(0, 0)]);
        assert_eq!(
            zone_from(&board, Point::new(1, 0)),
            vec![Point::new(1, 0)]
        );
    }
}
