use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::ai::AiConfig;
use crate::level::Level;

/// Moves in grid cells: walk right/left, jump up two cells (straight or
/// diagonal), drop one cell.
const MOVES: [(i32, i32); 6] = [(1, 0), (-1, 0), (0, -2), (1, -2), (-1, -2), (0, 1)];

/// A point the follower steers toward (a grid cell center).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub x: f32,
    pub y: f32,
}

/// Planner output.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub waypoints: Vec<Waypoint>,
    /// True when the search gave up and the plan is just "go to the goal".
    pub fallback: bool,
    pub expansions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Cell {
    cx: i32,
    cy: i32,
}

impl Cell {
    fn containing(x: f32, y: f32, size: f32) -> Self {
        Self {
            cx: (x / size).floor() as i32,
            cy: (y / size).floor() as i32,
        }
    }

    fn center(&self, size: f32) -> Waypoint {
        Waypoint {
            x: self.cx as f32 * size + size / 2.0,
            y: self.cy as f32 * size + size / 2.0,
        }
    }

    fn offset(&self, (dx, dy): (i32, i32)) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
        }
    }
}

/// Open-set entry ordered so `BinaryHeap` pops the lowest f first, oldest
/// first among equals.
struct OpenEntry {
    f: f32,
    seq: u64,
    cell: Cell,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn manhattan(a: Waypoint, b: Waypoint) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

fn euclidean(a: Waypoint, b: Waypoint) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Whether a platform the planner can rely on sits just below `(px, py)`.
/// Triggered collapsing platforms are already on their way out and do not count.
pub fn has_support(level: &Level, px: f32, py: f32, config: &AiConfig) -> bool {
    level.platforms.iter().any(|p| {
        p.is_reliable_support()
            && px >= p.rect.x - config.support_margin
            && px <= p.rect.right() + config.support_margin
            && py <= p.rect.y
            && py >= p.rect.y - config.support_band
    })
}

fn inside_visible_spike(level: &Level, px: f32, py: f32) -> bool {
    level
        .spikes
        .iter()
        .any(|s| s.is_dangerous() && s.rect.contains(px, py))
}

fn passable(level: &Level, to: Cell, dy: i32, config: &AiConfig, size: f32) -> bool {
    let p = to.center(size);
    if p.x < 0.0 || p.x >= level.width || p.y < 0.0 || p.y >= level.height {
        return false;
    }
    if inside_visible_spike(level, p.x, p.y) {
        return false;
    }
    // Walking and dropping need ground; jumps do not.
    dy < 0 || has_support(level, p.x, p.y, config)
}

/// Plan a route from the entity's top-left corner `(x, y)` to the goal center
/// over the current state of `level`.
///
/// Never fails: if the goal is not reached within the expansion budget the
/// plan is a single waypoint at the goal cell.
pub fn find_path(level: &Level, x: f32, y: f32, config: &AiConfig) -> Plan {
    let size = config.cell_size.max(1.0);
    let (gx, gy) = level.goal.center();
    let start = Cell::containing(x, y, size);
    let goal = Cell::containing(gx, gy, size);
    let goal_point = goal.center(size);

    let mut open = BinaryHeap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, f32> = HashMap::new();
    let mut seq = 0u64;
    let mut expansions = 0usize;

    g_score.insert(start, 0.0);
    open.push(OpenEntry {
        f: manhattan(start.center(size), goal_point),
        seq,
        cell: start,
    });

    while expansions < config.max_expansions {
        let Some(OpenEntry { cell: current, .. }) = open.pop() else {
            break;
        };
        // Stale duplicate of an already expanded cell
        if !closed.insert(current) {
            continue;
        }
        expansions += 1;

        if current == goal {
            return Plan {
                waypoints: reconstruct(&came_from, current, size),
                fallback: false,
                expansions,
            };
        }

        let current_point = current.center(size);
        let current_g = g_score.get(&current).copied().unwrap_or(f32::INFINITY);
        for mv in MOVES {
            let next = current.offset(mv);
            if closed.contains(&next) || !passable(level, next, mv.1, config, size) {
                continue;
            }
            let next_point = next.center(size);
            let tentative = current_g + euclidean(current_point, next_point);
            if g_score.get(&next).is_none_or(|g| tentative < *g) {
                came_from.insert(next, current);
                g_score.insert(next, tentative);
                seq += 1;
                open.push(OpenEntry {
                    f: tentative + manhattan(next_point, goal_point),
                    seq,
                    cell: next,
                });
            }
        }
    }

    tracing::debug!(expansions, "no route to goal, heading straight for it");
    Plan {
        waypoints: vec![goal_point],
        fallback: true,
        expansions,
    }
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, end: Cell, size: f32) -> Vec<Waypoint> {
    let mut cells = vec![end];
    let mut current = end;
    while let Some(prev) = came_from.get(&current) {
        cells.push(*prev);
        current = *prev;
    }
    cells.iter().rev().map(|c| c.center(size)).collect()
}
