//! "Guide the Fliffy home": steer a Fliffy across a small grid to its house
//! before the timer runs out.

use super::logic::TICKS_PER_SECOND;
use super::random::{pick_index, RandomSource};

pub const GRID_SIZE: i32 = 10;
pub const OBSTACLE_COUNT: usize = 8;
/// Minimum Manhattan distance between the Fliffy and its house.
pub const MIN_HOUSE_DISTANCE: i32 = GRID_SIZE / 2;
pub const TIME_LIMIT_SECS: u32 = 20;
/// Fliff Bucks lost when time runs out.
pub const PENALTY: f64 = 30.0;
/// Result stays on screen this long before it is paid out.
const RESOLVE_DELAY_TICKS: u32 = 2 * TICKS_PER_SECOND;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    fn in_bounds(self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinigameStatus {
    Playing,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Final result, handed back once the resolve delay has passed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinigameOutcome {
    pub won: bool,
    pub amount: f64,
}

#[derive(Clone, Debug)]
pub struct Minigame {
    pub fliffy: Pos,
    pub house: Pos,
    pub obstacles: Vec<Pos>,
    pub status: MinigameStatus,
    /// Reward fixed when the round starts.
    pub reward: f64,
    ticks_left: u32,
    resolve_in: u32,
}

fn all_cells() -> Vec<Pos> {
    (0..GRID_SIZE)
        .flat_map(|y| (0..GRID_SIZE).map(move |x| Pos::new(x, y)))
        .collect()
}

fn take_random(cells: &mut Vec<Pos>, rng: &mut dyn RandomSource) -> Option<Pos> {
    if cells.is_empty() {
        return None;
    }
    let idx = pick_index(rng, cells.len());
    Some(cells.swap_remove(idx))
}

impl Minigame {
    /// New round paying `reward` on a win.
    pub fn new(reward: f64, rng: &mut dyn RandomSource) -> Self {
        let mut free = all_cells();
        let fliffy = take_random(&mut free, rng).unwrap_or(Pos::new(0, 0));

        let mut far: Vec<Pos> = free
            .iter()
            .copied()
            .filter(|p| p.distance(fliffy) >= MIN_HOUSE_DISTANCE)
            .collect();
        // Every cell of a 10x10 grid has a cell at least 5 steps away.
        let house = take_random(&mut far, rng).unwrap_or(Pos::new(GRID_SIZE - 1, GRID_SIZE - 1));
        free.retain(|p| *p != house);

        let obstacles = (0..OBSTACLE_COUNT)
            .filter_map(|_| take_random(&mut free, rng))
            .collect();

        Self {
            fliffy,
            house,
            obstacles,
            status: MinigameStatus::Playing,
            reward,
            ticks_left: TIME_LIMIT_SECS * TICKS_PER_SECOND,
            resolve_in: RESOLVE_DELAY_TICKS,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.ticks_left.div_ceil(TICKS_PER_SECOND)
    }

    pub fn is_obstacle(&self, pos: Pos) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Move one cell. Edges and obstacles block. Returns whether the Fliffy moved.
    pub fn step(&mut self, dir: Direction) -> bool {
        if self.status != MinigameStatus::Playing {
            return false;
        }
        let (dx, dy) = dir.delta();
        let next = Pos::new(self.fliffy.x + dx, self.fliffy.y + dy);
        if !next.in_bounds() || self.is_obstacle(next) {
            return false;
        }
        self.fliffy = next;
        if next == self.house {
            self.status = MinigameStatus::Won;
        }
        true
    }

    /// Advance the clock. Returns the outcome once, after the resolve delay.
    pub fn tick(&mut self, delta_ticks: u32) -> Option<MinigameOutcome> {
        let mut remaining = delta_ticks;
        if self.status == MinigameStatus::Playing {
            let used = remaining.min(self.ticks_left);
            self.ticks_left -= used;
            remaining -= used;
            if self.ticks_left == 0 {
                self.status = MinigameStatus::Lost;
            } else {
                return None;
            }
        }

        if self.resolve_in == 0 {
            return None;
        }
        self.resolve_in = self.resolve_in.saturating_sub(remaining);
        if self.resolve_in > 0 {
            return None;
        }
        Some(self.outcome())
    }

    /// Outcome of a round that is already won or lost but not yet paid out.
    pub fn decided_outcome(&self) -> Option<MinigameOutcome> {
        if self.status == MinigameStatus::Playing || self.resolve_in == 0 {
            return None;
        }
        Some(self.outcome())
    }

    fn outcome(&self) -> MinigameOutcome {
        match self.status {
            MinigameStatus::Won => MinigameOutcome {
                won: true,
                amount: self.reward,
            },
            _ => MinigameOutcome {
                won: false,
                amount: PENALTY,
            },
        }
    }
}
