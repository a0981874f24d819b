use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::{ARENA_SIZE, HALF_ARENA, RANGE_INCLUSION_SLACK};

/// A board cell. Serialized the way the engine writes it, as `[x, y]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Location) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when the cell is inside the diamond-shaped arena.
    pub fn in_arena(self) -> bool {
        let Location { x, y } = self;
        if y < 0 || y >= ARENA_SIZE {
            return false;
        }
        let row_size = if y < HALF_ARENA {
            y + 1
        } else {
            ARENA_SIZE - y
        };
        let start_x = HALF_ARENA - row_size;
        let end_x = start_x + 2 * row_size - 1;
        x >= start_x && x <= end_x
    }

    /// Our half of the board: the rows we may build or deploy on.
    pub fn in_own_half(self) -> bool {
        self.y < HALF_ARENA
    }

    pub fn neighbors(self) -> [Location; 4] {
        let Location { x, y } = self;
        [
            Location::new(x, y + 1),
            Location::new(x, y - 1),
            Location::new(x + 1, y),
            Location::new(x - 1, y),
        ]
    }

    /// In-arena cells whose centers are within `radius` (+ inclusion slack).
    pub fn within(self, radius: f64) -> Vec<Location> {
        let reach = radius.ceil() as i32;
        let mut cells = Vec::new();
        for x in (self.x - reach)..=(self.x + reach) {
            for y in (self.y - reach)..=(self.y + reach) {
                let cell = Location::new(x, y);
                if cell.in_arena() && self.distance(cell) < radius + RANGE_INCLUSION_SLACK {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

impl From<[i32; 2]> for Location {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Location {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The engine occasionally emits coordinates as floats.
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Location::new(x as i32, y as i32))
    }
}

/// Shorthand for building location lists from literal pairs.
pub fn locations(pairs: &[[i32; 2]]) -> Vec<Location> {
    pairs.iter().copied().map(Location::from).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    TopRight,
    TopLeft,
    BottomLeft,
    BottomRight,
}

impl Edge {
    pub const ALL: [Edge; 4] = [
        Edge::TopRight,
        Edge::TopLeft,
        Edge::BottomLeft,
        Edge::BottomRight,
    ];

    pub fn cells(self) -> Vec<Location> {
        (0..HALF_ARENA)
            .map(|n| match self {
                Edge::TopRight => Location::new(HALF_ARENA + n, ARENA_SIZE - 1 - n),
                Edge::TopLeft => Location::new(HALF_ARENA - 1 - n, ARENA_SIZE - 1 - n),
                Edge::BottomLeft => Location::new(HALF_ARENA - 1 - n, n),
                Edge::BottomRight => Location::new(HALF_ARENA + n, n),
            })
            .collect()
    }

    pub fn contains(self, location: Location) -> bool {
        let n = match self {
            Edge::TopRight | Edge::BottomRight => location.x - HALF_ARENA,
            Edge::TopLeft | Edge::BottomLeft => HALF_ARENA - 1 - location.x,
        };
        if !(0..HALF_ARENA).contains(&n) {
            return false;
        }
        match self {
            Edge::TopRight | Edge::TopLeft => location.y == ARENA_SIZE - 1 - n,
            Edge::BottomLeft | Edge::BottomRight => location.y == n,
        }
    }

    /// The edge a mobile unit starting at `start` walks toward.
    pub fn target_for(start: Location) -> Edge {
        let left = start.x < HALF_ARENA;
        let bottom = start.y < HALF_ARENA;
        match (left, bottom) {
            (true, true) => Edge::TopRight,
            (true, false) => Edge::BottomRight,
            (false, true) => Edge::TopLeft,
            (false, false) => Edge::BottomLeft,
        }
    }

    /// Unit direction `(dx, dy)` pointing from the board center toward the edge.
    pub fn heading(self) -> (i32, i32) {
        match self {
            Edge::TopRight => (1, 1),
            Edge::TopLeft => (-1, 1),
            Edge::BottomLeft => (-1, -1),
            Edge::BottomRight => (1, -1),
        }
    }
}

/// Whether a mobile unit may be deployed on `location` by us.
pub fn is_friendly_edge(location: Location) -> bool {
    Edge::BottomLeft.contains(location) || Edge::BottomRight.contains(location)
}

/// All in-arena cells, column by column.
pub fn arena_cells() -> impl Iterator<Item = Location> {
    (0..ARENA_SIZE)
        .flat_map(|x| (0..ARENA_SIZE).map(move |y| Location::new(x, y)))
        .filter(|cell| cell.in_arena())
}
