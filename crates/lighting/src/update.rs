//! Incremental light repair.
//!
//! A walk re-derives the light leaving one cell in one direction and follows
//! it cell by cell until the value arriving at the next cell equals what is
//! already stored there. Every changed input schedules the perpendicular
//! walks of the next reflection level at that cell. Walks are queued rather
//! than recursed into, so stack depth stays constant on large grids.

use std::collections::VecDeque;

use crate::material::MaterialStrategy;
use crate::propagation::{neighbor, output};
use crate::storage::LightGrid;
use tilelight_core::{Direction, GridSize, LightChannel, LightLevel};

/// One pending walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Walk {
    level: LightLevel,
    channel: LightChannel,
    direction: Direction,
    start: usize,
}

/// Work performed by an incremental update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Walks processed, including ones that stopped immediately.
    pub walks: usize,
    /// Directional inputs whose stored value changed.
    pub cells_written: usize,
}

impl UpdateStats {
    /// True when the update did not change any stored input.
    pub fn is_noop(&self) -> bool {
        self.cells_written == 0
    }
}

impl std::ops::AddAssign for UpdateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.walks += rhs.walks;
        self.cells_written += rhs.cells_written;
    }
}

/// FIFO of pending walks, reused across updates.
#[derive(Debug, Default)]
pub struct WalkQueue {
    queue: VecDeque<Walk>,
}

impl WalkQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(64),
        }
    }

    /// Schedule the walk of `level` light leaving `start` away from `direction`.
    pub fn enqueue(
        &mut self,
        level: LightLevel,
        channel: LightChannel,
        direction: Direction,
        start: usize,
    ) {
        self.queue.push_back(Walk {
            level,
            channel,
            direction,
            start,
        });
    }

    /// Schedule the walks of every direction of one level and channel.
    pub fn enqueue_all_directions(&mut self, level: LightLevel, channel: LightChannel, start: usize) {
        for direction in Direction::ALL {
            self.enqueue(level, channel, direction, start);
        }
    }

    /// Number of pending walks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when no walk is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Process walks until the queue drains.
    pub fn run<M: MaterialStrategy>(
        &mut self,
        grid: &mut LightGrid,
        materials: &M,
        size: GridSize,
    ) -> UpdateStats {
        let mut stats = UpdateStats::default();
        while let Some(walk) = self.queue.pop_front() {
            stats.walks += 1;
            stats.cells_written += self.walk(grid, materials, size, walk);
        }
        stats
    }

    fn walk<M: MaterialStrategy>(
        &mut self,
        grid: &mut LightGrid,
        materials: &M,
        size: GridSize,
        walk: Walk,
    ) -> usize {
        let Walk {
            level,
            channel,
            direction,
            start,
        } = walk;
        let mut written = 0;
        let mut index = start;
        while let Some(next) = neighbor(size, index, direction) {
            let value = output(grid, materials, level, channel, index, direction);
            if grid.input(level, next, direction, channel) == value {
                break;
            }
            grid.set_input(level, next, direction, channel, value as i64);
            written += 1;
            if let Some(reflected) = level.next() {
                for perpendicular in direction.perpendicular() {
                    self.enqueue(reflected, channel, perpendicular, next);
                }
            }
            index = next;
        }
        written
    }
}
