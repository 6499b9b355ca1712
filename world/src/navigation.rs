//! Path extraction over the static tile grid.

use std::collections::VecDeque;

use tile_defence_core::{CellCoord, Path, TileGrid, TileKind};

/// Extracts the shortest walkable route from the start tile to the end tile.
///
/// The search is a breadth-first traversal over the four orthogonal
/// neighbours, restricted to path, start and end tiles. Each cell is visited
/// at most once. Returns an empty path when the grid lacks a start or an end
/// tile, or when no route connects them; callers treat that as an
/// unplayable level rather than a fault.
#[must_use]
pub fn find_path(grid: &TileGrid) -> Path {
    let (Some(start), Some(end)) = (grid.locate(TileKind::Start), grid.locate(TileKind::End))
    else {
        return Path::default();
    };

    let width = grid.columns() as usize;
    let cell_count = width * grid.rows() as usize;
    let mut parents: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    let mut queue = VecDeque::new();

    visited[index(width, start)] = true;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell == end {
            return Path::new(backtrack(&parents, width, start, end));
        }

        for neighbor in neighbors(cell, grid.columns(), grid.rows()) {
            let walkable = grid.tile(neighbor).is_some_and(TileKind::is_walkable);
            let slot = index(width, neighbor);
            if !walkable || visited[slot] {
                continue;
            }

            visited[slot] = true;
            parents[slot] = Some(cell);
            queue.push_back(neighbor);
        }
    }

    Path::default()
}

fn backtrack(
    parents: &[Option<CellCoord>],
    width: usize,
    start: CellCoord,
    end: CellCoord,
) -> Vec<CellCoord> {
    let mut waypoints = vec![end];
    let mut cell = end;
    while cell != start {
        let Some(parent) = parents[index(width, cell)] else {
            break;
        };
        waypoints.push(parent);
        cell = parent;
    }
    waypoints.reverse();
    waypoints
}

/// Orthogonal neighbours in up, down, left, right order.
fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if cell.row() + 1 < height {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() + 1));
        count += 1;
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    if cell.column() + 1 < width {
        candidates[count] = Some(CellCoord::new(cell.column() + 1, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> usize {
    cell.row() as usize * width + cell.column() as usize
}
