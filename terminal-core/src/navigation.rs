//! Mobile-unit pathing.
//!
//! Two breadth-first passes over unblocked cells: the first finds the most
//! "ideal" reachable cell (an edge cell if any is reachable, otherwise the
//! cell deepest toward the target edge); the second floods path lengths out
//! from that target. The walk then descends path lengths, preferring to
//! alternate between horizontal and vertical moves.

use std::collections::VecDeque;

use crate::constants::{ARENA_SIZE, MAX_PATH_STEPS};
use crate::geometry::{Edge, Location};
use crate::map::GameMap;

#[derive(Clone, Copy)]
struct Node {
    visited_idealness: bool,
    visited_validate: bool,
    blocked: bool,
    path_length: i32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            visited_idealness: false,
            visited_validate: false,
            blocked: false,
            path_length: -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastMove {
    None,
    Horizontal,
    Vertical,
}

struct PathSearch {
    nodes: Vec<Node>,
    end_points: Vec<Location>,
    heading: (i32, i32),
}

/// Path a mobile unit starting at `start` would walk toward `edge`,
/// including the start cell. `None` when the start is blocked or off-board.
pub fn find_path(map: &GameMap, start: Location, edge: Edge) -> Option<Vec<Location>> {
    if !start.in_arena() || map.contains_structure(start) {
        return None;
    }

    let mut search = PathSearch::new(map, edge);
    let ideal = search.idealness_search(start);
    search.validate(ideal);
    Some(search.walk(start))
}

impl PathSearch {
    fn new(map: &GameMap, edge: Edge) -> Self {
        let mut nodes = vec![Node::default(); (ARENA_SIZE * ARENA_SIZE) as usize];
        for unit in map.units() {
            if unit.is_structure() {
                nodes[Self::slot(unit.location)].blocked = true;
            }
        }
        Self {
            nodes,
            end_points: edge.cells(),
            heading: edge.heading(),
        }
    }

    fn slot(location: Location) -> usize {
        (location.x * ARENA_SIZE + location.y) as usize
    }

    fn node(&self, location: Location) -> &Node {
        &self.nodes[Self::slot(location)]
    }

    fn node_mut(&mut self, location: Location) -> &mut Node {
        &mut self.nodes[Self::slot(location)]
    }

    fn walkable(&self, location: Location) -> bool {
        location.in_arena() && !self.node(location).blocked
    }

    fn idealness(&self, location: Location) -> i64 {
        if self.end_points.contains(&location) {
            return i64::MAX;
        }
        let (dx, dy) = self.heading;
        let row = if dy == 1 {
            location.y
        } else {
            ARENA_SIZE - 1 - location.y
        };
        let column = if dx == 1 {
            location.x
        } else {
            ARENA_SIZE - 1 - location.x
        };
        (ARENA_SIZE * row + column) as i64
    }

    fn idealness_search(&mut self, start: Location) -> Location {
        let mut queue = VecDeque::from([start]);
        let mut best_idealness = self.idealness(start);
        let mut most_ideal = start;
        self.node_mut(start).visited_idealness = true;

        while let Some(current) = queue.pop_front() {
            for neighbor in current.neighbors() {
                if !self.walkable(neighbor) {
                    continue;
                }
                let idealness = self.idealness(neighbor);
                if idealness > best_idealness {
                    best_idealness = idealness;
                    most_ideal = neighbor;
                }
                if !self.node(neighbor).visited_idealness {
                    self.node_mut(neighbor).visited_idealness = true;
                    queue.push_back(neighbor);
                }
            }
        }

        most_ideal
    }

    fn validate(&mut self, ideal: Location) {
        let seeds = if self.end_points.contains(&ideal) {
            self.end_points.clone()
        } else {
            vec![ideal]
        };

        let mut queue = VecDeque::new();
        for seed in seeds {
            let node = self.node_mut(seed);
            node.path_length = 0;
            node.visited_validate = true;
            queue.push_back(seed);
        }

        while let Some(current) = queue.pop_front() {
            let current_node = *self.node(current);
            if current_node.blocked {
                continue;
            }
            for neighbor in current.neighbors() {
                if !self.walkable(neighbor) || self.node(neighbor).visited_validate {
                    continue;
                }
                let node = self.node_mut(neighbor);
                node.path_length = current_node.path_length + 1;
                node.visited_validate = true;
                queue.push_back(neighbor);
            }
        }
    }

    fn walk(&self, start: Location) -> Vec<Location> {
        let mut path = vec![start];
        let mut current = start;
        let mut last_move = LastMove::None;

        while self.node(current).path_length != 0 && path.len() <= MAX_PATH_STEPS {
            let next = self.next_move(current, last_move);
            if next == current {
                break;
            }
            last_move = if next.x == current.x {
                LastMove::Vertical
            } else {
                LastMove::Horizontal
            };
            path.push(next);
            current = next;
        }

        path
    }

    fn next_move(&self, current: Location, last_move: LastMove) -> Location {
        let mut best = current;
        let mut best_length = self.node(current).path_length;

        for neighbor in current.neighbors() {
            if !self.walkable(neighbor) {
                continue;
            }
            let length = self.node(neighbor).path_length;
            if length < 0 || length > best_length {
                continue;
            }
            let strictly_better = length < best_length;
            if !strictly_better && !self.better_direction(current, neighbor, best, last_move) {
                continue;
            }
            best = neighbor;
            best_length = length;
        }

        best
    }

    fn better_direction(
        &self,
        from: Location,
        candidate: Location,
        best: Location,
        last_move: LastMove,
    ) -> bool {
        match last_move {
            LastMove::Horizontal if candidate.x != best.x => return from.y != candidate.y,
            LastMove::Vertical if candidate.y != best.y => return from.x != candidate.x,
            LastMove::None => return from.y != candidate.y,
            _ => {}
        }

        let (dx, dy) = self.heading;
        if candidate.y == best.y {
            return (dx == 1 && candidate.x > best.x) || (dx == -1 && candidate.x < best.x);
        }
        if candidate.x == best.x {
            return (dy == 1 && candidate.y > best.y) || (dy == -1 && candidate.y < best.y);
        }
        true
    }
}
