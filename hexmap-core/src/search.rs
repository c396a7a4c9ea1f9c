//! Path search with turn-budget movement costs
//!
//! Best-first cost relaxation over the grid: priority is distance plus the
//! hex distance to the target, computed once when a cell is first reached.
//! Per-cell search fields are validated by a phase stamp instead of being
//! reset, so repeated searches on a large grid cost only what they visit.
//!
//! Moves are never split across turns: a move that would overflow the
//! current turn's movement points starts at the beginning of the next turn.

use serde::Serialize;

use crate::cell::CellIndex;
use crate::coordinates::{HexDirection, DIRECTIONS};
use crate::error::{HexMapError, Result};
use crate::frontier::SearchFrontier;
use crate::grid::HexGrid;
use crate::metrics::EdgeType;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Cost of following a road
pub const ROAD_MOVE_COST: i32 = 1;

/// Base cost of a flat step
pub const FLAT_MOVE_COST: i32 = 5;

/// Base cost of climbing or descending a slope
pub const SLOPE_MOVE_COST: i32 = 10;

// ============================================================================
// MOVE COSTS
// ============================================================================

/// Cost of moving from `from` into its neighbor `to` through `direction`.
///
/// `None` if the edge cannot be crossed: cliffs, and wall lines not
/// breached by a road.
pub fn move_cost(grid: &HexGrid, from: CellIndex, to: CellIndex, direction: HexDirection) -> Option<i32> {
    let edge = grid.edge_type(from, to)?;
    if edge == EdgeType::Cliff {
        return None;
    }

    let here = grid.cell(from);
    if here.has_road_through_edge(direction) {
        return Some(ROAD_MOVE_COST);
    }

    let there = grid.cell(to);
    if here.walled() != there.walled() {
        return None;
    }

    let base = if edge == EdgeType::Flat {
        FLAT_MOVE_COST
    } else {
        SLOPE_MOVE_COST
    };
    Some(base + there.urban_level() as i32 + there.farm_level() as i32 + there.plant_level() as i32)
}

/// Distance after a move, deferring moves that would overflow the turn
pub fn turn_adjusted_distance(current_distance: i32, move_cost: i32, speed: i32) -> i32 {
    let current_turn = current_distance / speed;
    let distance = current_distance + move_cost;
    let turn = distance / speed;
    if turn > current_turn {
        turn * speed + move_cost
    } else {
        distance
    }
}

// ============================================================================
// PATH RESULT
// ============================================================================

/// One cell on a found path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub cell: CellIndex,
    /// Accumulated movement cost on arrival
    pub distance: i32,
    /// Turn in which the unit arrives (`distance / speed`)
    pub turn: i32,
}

/// Path from source to target, both inclusive
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Path {
    steps: Vec<PathStep>,
    speed: u32,
}

impl Path {
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn cells(&self) -> Vec<CellIndex> {
        self.steps.iter().map(|step| step.cell).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Total movement cost at the target
    pub fn cost(&self) -> i32 {
        self.steps.last().map_or(0, |step| step.distance)
    }

    /// Number of turns until the target is reached
    pub fn turns(&self) -> i32 {
        self.steps.last().map_or(0, |step| step.turn)
    }

    pub fn source(&self) -> Option<CellIndex> {
        self.steps.first().map(|step| step.cell)
    }

    pub fn target(&self) -> Option<CellIndex> {
        self.steps.last().map(|step| step.cell)
    }
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

/// The most recent `find_path` request
#[derive(Clone, Copy, Debug)]
struct PathQuery {
    from: CellIndex,
    to: CellIndex,
    speed: u32,
    found: bool,
    /// Phase the search ran under; the stamps it left are only valid while
    /// no later search has run on the grid
    phase: u32,
}

/// Path search engine owning its phase counter and frontier.
///
/// Any number of engines may share one grid: each search starts above the
/// highest phase the grid has seen, so stamps left by another engine never
/// look settled.
#[derive(Clone, Debug, Default)]
pub struct PathSearch {
    phase: u32,
    frontier: SearchFrontier,
    current: Option<PathQuery>,
}

impl PathSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frontier_capacity(capacity: usize) -> Self {
        Self {
            phase: 0,
            frontier: SearchFrontier::with_capacity(capacity),
            current: None,
        }
    }

    /// Search and remember the result for `path`
    pub fn find_path(&mut self, grid: &mut HexGrid, from: CellIndex, to: CellIndex, speed: u32) -> Result<bool> {
        self.clear_path();
        let found = self.search(grid, from, to, speed)?;
        self.current = Some(PathQuery {
            from,
            to,
            speed,
            found,
            phase: self.phase,
        });
        Ok(found)
    }

    pub fn has_path(&self) -> bool {
        self.current.is_some_and(|query| query.found)
    }

    /// Drop the remembered path
    pub fn clear_path(&mut self) {
        self.current = None;
    }

    /// Source and target of the remembered request, found or not
    pub fn endpoints(&self) -> Option<(CellIndex, CellIndex)> {
        self.current.map(|query| (query.from, query.to))
    }

    /// Walk the predecessor chain of the remembered path.
    ///
    /// `None` once another search has run on `grid`, since that search
    /// overwrote the predecessors.
    pub fn path(&self, grid: &HexGrid) -> Option<Path> {
        let query = self.current.filter(|query| query.found && query.phase == grid.search_phase)?;
        let speed = query.speed as i32;

        let mut steps = Vec::new();
        let mut current = query.to;
        loop {
            let cell = grid.get(current)?;
            let distance = cell.search_distance();
            steps.push(PathStep {
                cell: current,
                distance,
                turn: distance / speed,
            });
            if current == query.from {
                break;
            }
            current = cell.path_from()?;
        }
        steps.reverse();

        Some(Path {
            steps,
            speed: query.speed,
        })
    }

    /// Run one search. Returns whether `to` was reached.
    pub fn search(&mut self, grid: &mut HexGrid, from: CellIndex, to: CellIndex, speed: u32) -> Result<bool> {
        if speed == 0 {
            return Err(HexMapError::InvalidSpeed);
        }
        grid.check_index(from)?;
        grid.check_index(to)?;

        let speed = speed as i32;
        let mut base = self.phase.max(grid.search_phase);
        // Settling adds one on top of the new phase
        if base.checked_add(3).is_none() {
            grid.reset_search_phases();
            base = 0;
        }
        let phase = base + 2;
        self.phase = phase;
        grid.search_phase = phase;
        self.frontier.clear();

        let target = grid.cell(to).coordinates();
        let heuristic = grid.cell(from).coordinates().distance_to(target);
        let source = &mut grid.cells[from.0].search;
        source.phase = phase;
        source.distance = 0;
        source.heuristic = heuristic;
        source.path_from = None;
        self.frontier.enqueue(&mut grid.cells, from);

        let mut settled = 0usize;
        let mut found = false;

        while let Some(current) = self.frontier.dequeue(&mut grid.cells) {
            grid.cells[current.0].search.phase += 1;
            settled += 1;

            if current == to {
                found = true;
                break;
            }

            let current_distance = grid.cells[current.0].search.distance;

            for d in DIRECTIONS {
                let Some(neighbor) = grid.neighbor(current, d) else {
                    continue;
                };
                let next = grid.cell(neighbor);
                if next.search.phase > phase || next.is_underwater() || next.unit().is_some() {
                    continue;
                }
                let Some(cost) = move_cost(grid, current, neighbor, d) else {
                    continue;
                };

                let distance = turn_adjusted_distance(current_distance, cost, speed);
                let heuristic = next.coordinates().distance_to(target);

                let search = &mut grid.cells[neighbor.0].search;
                if search.phase < phase {
                    search.phase = phase;
                    search.distance = distance;
                    search.path_from = Some(current);
                    search.heuristic = heuristic;
                    self.frontier.enqueue(&mut grid.cells, neighbor);
                } else if distance < search.distance {
                    let old_priority = search.priority();
                    search.distance = distance;
                    search.path_from = Some(current);
                    self.frontier.change(&mut grid.cells, neighbor, old_priority);
                }
            }
        }

        tracing::debug!(
            "Search {} -> {} (speed {}): {} after settling {} cells",
            grid.cell(from).coordinates(),
            target,
            speed,
            if found { "found" } else { "no path" },
            settled
        );
        Ok(found)
    }
}

// ============================================================================
// TESTS
// ============================================================================
