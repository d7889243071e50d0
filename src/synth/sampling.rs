//! Sampling primitives shared by the generators

use super::spec::{CanvasRegion, LetterGrid, ReservedBlock};
use super::Difficulty;
use crate::error::{Error, Result};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Attempts per shape before placement gives up
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V',
    'W', 'X', 'Y', 'Z',
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Every attempt collided; `last` is the final position drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exhausted {
    pub last: Position,
    pub attempts: usize,
}

/// Draw a center for a shape of `size` inside `region` whose distance to
/// every already placed center exceeds `size + padding`.
pub fn place_non_overlapping(
    rng: &mut dyn RngCore,
    region: CanvasRegion,
    size: f64,
    padding: f64,
    placed: &[Position],
    max_attempts: usize,
) -> std::result::Result<Position, Exhausted> {
    let min_distance = size + padding;
    let half = size / 2.0;
    let x_span = (region.width - size).max(0.0);
    let y_span = (region.height - size).max(0.0);

    let mut last = Position { x: half, y: half };
    for _ in 0..max_attempts {
        let candidate = Position {
            x: half + rng.random::<f64>() * x_span,
            y: half + rng.random::<f64>() * y_span,
        };
        if placed.iter().all(|p| p.distance(&candidate) > min_distance) {
            return Ok(candidate);
        }
        last = candidate;
    }
    Err(Exhausted {
        last,
        attempts: max_attempts,
    })
}

/// `n` distinct integers in `[min, max]`, in draw order.
pub fn distinct_in_range(rng: &mut dyn RngCore, min: u32, max: u32, n: usize) -> Result<Vec<u32>> {
    if max < min || ((max - min) as usize + 1) < n {
        return Err(Error::InvalidRequest(format!(
            "cannot draw {n} distinct values from [{min}, {max}]"
        )));
    }
    let mut picked = Vec::with_capacity(n);
    while picked.len() < n {
        let v = rng.random_range(min..=max);
        if !picked.contains(&v) {
            picked.push(v);
        }
    }
    Ok(picked)
}

/// A permutation of `0..n`; with `derange_identity` it is never `0, 1, 2, ...`
/// as long as `n > 1`.
pub fn permutation(rng: &mut dyn RngCore, n: usize, derange_identity: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    if derange_identity && n > 1 && order.iter().enumerate().all(|(i, &v)| i == v) {
        order.rotate_left(1);
    }
    order
}

/// `count` distinct positions in `range`, sorted.
pub fn pick_positions(rng: &mut dyn RngCore, range: std::ops::Range<usize>, count: usize) -> Vec<usize> {
    let mut all: Vec<usize> = range.collect();
    all.shuffle(rng);
    all.truncate(count);
    all.sort_unstable();
    all
}

/// Letter slots a grid must offer at each difficulty
pub fn required_letter_slots(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 24,
        Difficulty::Medium => 36,
        Difficulty::Hard => 48,
    }
}

/// Share of free cells holding the target letter, in percent
pub fn target_percent(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 25,
        Difficulty::Medium => 35,
        Difficulty::Hard => 40,
    }
}

/// Smallest side `N >= 6` with `N * N - reserved >= required`
pub fn grid_side(required: usize, reserved: usize) -> usize {
    let mut n = 6;
    while n * n < required + reserved {
        n += 1;
    }
    n
}

/// Fill an N×N letter grid around an optional 3×3 reserved block.
///
/// The target fills `floor(pct * free / 100)` free cells; the rest get
/// uniformly drawn distractors that are never the target.
pub fn carve_letter_grid(
    rng: &mut dyn RngCore,
    target: char,
    difficulty: Difficulty,
    reserve_block: bool,
) -> LetterGrid {
    let target = target.to_ascii_uppercase();
    let reserved_cells = if reserve_block {
        ReservedBlock::SIZE * ReservedBlock::SIZE
    } else {
        0
    };
    let size = grid_side(required_letter_slots(difficulty), reserved_cells);

    let reserved = reserve_block.then(|| {
        let max = size - ReservedBlock::SIZE;
        ReservedBlock {
            row: rng.random_range(0..=max),
            col: rng.random_range(0..=max),
        }
    });

    let free = size * size - reserved_cells;
    let target_count = free * target_percent(difficulty) / 100;

    let distractors: Vec<char> = ALPHABET.iter().copied().filter(|&c| c != target).collect();
    let mut letters: Vec<char> = Vec::with_capacity(free);
    letters.extend(std::iter::repeat(target).take(target_count));
    while letters.len() < free {
        if let Some(&c) = distractors.choose(rng) {
            letters.push(c);
        }
    }
    letters.shuffle(rng);

    let mut fill = letters.into_iter();
    let mut cells = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let inside = reserved.map(|b| b.contains(row, col)).unwrap_or(false);
            cells.push(if inside { None } else { fill.next() });
        }
    }

    LetterGrid {
        target,
        difficulty,
        size,
        cells,
        reserved,
        picture: None,
        target_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::test_support::rng;

    #[test]
    fn placed_shapes_keep_their_distance() {
        let mut r = rng(7);
        let region = CanvasRegion { width: 600.0, height: 600.0 };
        let mut placed = Vec::new();
        for _ in 0..12 {
            let p = place_non_overlapping(&mut r, region, 40.0, 10.0, &placed, MAX_PLACEMENT_ATTEMPTS).unwrap();
            assert!(p.x >= 20.0 && p.x <= 580.0);
            assert!(p.y >= 20.0 && p.y <= 580.0);
            placed.push(p);
        }
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(a.distance(b) > 50.0);
            }
        }
    }

    #[test]
    fn placement_reports_exhaustion() {
        let mut r = rng(1);
        let region = CanvasRegion { width: 40.0, height: 40.0 };
        let placed = [Position { x: 20.0, y: 20.0 }];
        let err = place_non_overlapping(&mut r, region, 40.0, 10.0, &placed, 5).unwrap_err();
        assert_eq!(err.attempts, 5);
        assert_eq!(err.last, Position { x: 20.0, y: 20.0 });
    }

    #[test]
    fn distinct_values_stay_in_range() {
        let mut r = rng(3);
        for _ in 0..200 {
            let v = distinct_in_range(&mut r, 1, 5, 3).unwrap();
            assert_eq!(v.len(), 3);
            assert!(v.iter().all(|x| (1..=5).contains(x)));
            assert!(v[0] != v[1] && v[1] != v[2] && v[0] != v[2]);
        }
        assert!(distinct_in_range(&mut r, 1, 2, 3).is_err());
    }

    #[test]
    fn deranged_permutation_is_never_identity() {
        let mut r = rng(11);
        for _ in 0..100 {
            let p = permutation(&mut r, 4, true);
            assert_ne!(p, vec![0, 1, 2, 3]);
            let mut sorted = p.clone();
            sorted.sort();
            assert_eq!(sorted, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn grid_side_is_smallest_fit() {
        assert_eq!(grid_side(24, 0), 6);
        assert_eq!(grid_side(24, 9), 6);
        assert_eq!(grid_side(36, 0), 6);
        assert_eq!(grid_side(36, 9), 7);
        assert_eq!(grid_side(48, 0), 7);
        assert_eq!(grid_side(48, 9), 8);
    }

    #[test]
    fn carved_grid_respects_reserve_and_frequency() {
        for seed in 0..20 {
            for difficulty in Difficulty::ALL {
                let grid = carve_letter_grid(&mut rng(seed), 'm', difficulty, true);
                let block = grid.reserved.unwrap();
                assert!(block.row + 3 <= grid.size && block.col + 3 <= grid.size);

                let free = grid.size * grid.size - 9;
                assert_eq!(grid.free_cell_count(), free);
                for row in 0..grid.size {
                    for col in 0..grid.size {
                        assert_eq!(block.contains(row, col), grid.cell(row, col).is_none());
                    }
                }
                let hits = grid.cells.iter().filter(|c| **c == Some('M')).count();
                assert_eq!(hits, free * target_percent(difficulty) / 100);
                assert_eq!(hits, grid.target_count);
            }
        }
    }

    #[test]
    fn unreserved_grid_fills_every_cell() {
        let grid = carve_letter_grid(&mut rng(5), 'B', Difficulty::Hard, false);
        assert_eq!(grid.size, 7);
        assert!(grid.reserved.is_none());
        assert_eq!(grid.free_cell_count(), 49);
        assert_eq!(grid.target_count, 19);
    }
}
