//! Reasoning and visual-discrimination worksheets

use super::sampling::{permutation, pick_positions};
use super::spec::*;
use super::{ContentSpec, Difficulty, Registry, SynthContext, WorksheetRequest, WorksheetTypeId};
use crate::catalog::{AssetRef, DECOR_GLYPHS};
use crate::error::Result;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};

pub(crate) fn register(reg: &mut Registry) {
    reg.register(WorksheetTypeId::Maze, maze);
    reg.register(WorksheetTypeId::ShadowMatching, shadow_matching);
    reg.register(WorksheetTypeId::Sorting, sorting);
    reg.register(WorksheetTypeId::PatternCompare, pattern_compare);
    reg.register(WorksheetTypeId::PatternSequencing, pattern_sequencing);
    reg.register(WorksheetTypeId::OddOneOut, odd_one_out);
    reg.register(WorksheetTypeId::MatchingHalves, matching_halves);
    reg.register(WorksheetTypeId::LogicGrid, logic_grid);
    reg.register(WorksheetTypeId::ShapeSynthesis, shape_synthesis);
}

pub const PATTERN_ROWS: usize = 4;
const MATCH_PAIRS: usize = 4;
const SORT_GROUP_SIZE: usize = 4;
const SPOT_DIFFERENCES: u8 = 5;
const LOGIC_HIDDEN_CELLS: usize = 3;

const SHAPE_COMBOS: [(ShapeKind, ShapeKind, &str, &str); 6] = [
    (ShapeKind::Triangle, ShapeKind::Square, "house", "🏠"),
    (ShapeKind::Circle, ShapeKind::Rectangle, "lollipop", "🍭"),
    (ShapeKind::Circle, ShapeKind::Triangle, "ice cream", "🍦"),
    (ShapeKind::Rectangle, ShapeKind::Circle, "car", "🚗"),
    (ShapeKind::Triangle, ShapeKind::Rectangle, "tree", "🌲"),
    (ShapeKind::Oval, ShapeKind::Triangle, "fish", "🐟"),
];

const FALLBACK_SYMBOLS: [&str; 3] = ["🔴", "🟦", "⭐"];

/// Side length of the maze at each difficulty
pub fn maze_side(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 8,
        Difficulty::Medium => 12,
        Difficulty::Hard => 16,
    }
}

/// Carve a perfect maze with an iterative recursive backtracker.
pub fn carve_maze(rng: &mut dyn RngCore, width: usize, height: usize) -> Vec<u8> {
    let all = WALL_NORTH | WALL_EAST | WALL_SOUTH | WALL_WEST;
    let mut walls = vec![all; width * height];
    if walls.is_empty() {
        return walls;
    }
    let mut visited = vec![false; width * height];
    let mut stack = vec![(0usize, 0usize)];
    visited[0] = true;

    while let Some(&(row, col)) = stack.last() {
        let mut options = Vec::with_capacity(4);
        if row > 0 && !visited[(row - 1) * width + col] {
            options.push((row - 1, col, WALL_NORTH, WALL_SOUTH));
        }
        if col + 1 < width && !visited[row * width + col + 1] {
            options.push((row, col + 1, WALL_EAST, WALL_WEST));
        }
        if row + 1 < height && !visited[(row + 1) * width + col] {
            options.push((row + 1, col, WALL_SOUTH, WALL_NORTH));
        }
        if col > 0 && !visited[row * width + col - 1] {
            options.push((row, col - 1, WALL_WEST, WALL_EAST));
        }

        match options.choose(rng) {
            Some(&(nr, nc, here, there)) => {
                walls[row * width + col] &= !here;
                walls[nr * width + nc] &= !there;
                visited[nr * width + nc] = true;
                stack.push((nr, nc));
            }
            None => {
                stack.pop();
            }
        }
    }
    walls
}

fn maze(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let side = maze_side(req.difficulty_or_random(rng));
    let walls = carve_maze(rng, side, side);
    let end_picture = ctx.pictures(1, rng).pop().unwrap_or_default();
    let body = ContentBody::Maze(Maze {
        width: side,
        height: side,
        walls,
        start: (0, 0),
        end: (side - 1, side - 1),
        start_picture: ctx.catalog.character(ctx.theme),
        end_picture,
    });
    Ok(ctx.page(
        WorksheetTypeId::Maze,
        "Find the Way",
        "Help your friend find the path through the maze.",
        body,
        rng,
    ))
}

fn picture_matching(ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> PictureMatching {
    let left = ctx.pictures(MATCH_PAIRS, rng);
    let order = permutation(rng, left.len(), true);
    let mut answers = vec![0; left.len()];
    for (slot, &source) in order.iter().enumerate() {
        answers[source] = slot;
    }
    let right = order.iter().map(|&i| left[i].clone()).collect();
    PictureMatching { left, right, answers }
}

fn shadow_matching(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let body = ContentBody::PictureMatching(picture_matching(ctx, rng));
    Ok(ctx.page(
        WorksheetTypeId::ShadowMatching,
        "Match the Shadows",
        "Draw a line from each picture to its shadow.",
        body,
        rng,
    ))
}

fn matching_halves(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let body = ContentBody::PictureMatching(picture_matching(ctx, rng));
    Ok(ctx.page(
        WorksheetTypeId::MatchingHalves,
        "Match the Halves",
        "Draw a line to join the two halves of each picture.",
        body,
        rng,
    ))
}

fn sorting(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let themed = ctx.pictures(SORT_GROUP_SIZE, rng);
    let mut other = ctx.catalog.decor_pictures(SORT_GROUP_SIZE, rng);
    other.retain(|p| !themed.contains(p));

    let groups = vec![
        SortGroup {
            label: title_word(ctx.theme.as_str()),
            sample: themed.first().cloned().unwrap_or_default(),
        },
        SortGroup {
            label: "Other Things".to_string(),
            sample: other.first().cloned().unwrap_or_default(),
        },
    ];
    let mut items: Vec<SortItem> = themed
        .into_iter()
        .map(|picture| SortItem { picture, group: 0 })
        .chain(other.into_iter().map(|picture| SortItem { picture, group: 1 }))
        .collect();
    items.shuffle(rng);

    Ok(ctx.page(
        WorksheetTypeId::Sorting,
        "Sort It Out",
        "Cut out the pictures and glue each one into the right group.",
        ContentBody::Sorting(Sorting { groups, items }),
        rng,
    ))
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pattern_compare(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let body = ContentBody::SpotDifference(SpotDifference {
        picture: ctx.catalog.spot_difference(ctx.theme, rng),
        differences: SPOT_DIFFERENCES,
    });
    Ok(ctx.page(
        WorksheetTypeId::PatternCompare,
        "Spot the Difference",
        format!("Find {SPOT_DIFFERENCES} differences between the two pictures."),
        body,
        rng,
    ))
}

/// Build one pattern row from a unit and its two pictures.
pub fn pattern_row(unit: UnitPattern, slots: [AssetRef; 2]) -> PatternRow {
    let sequence = unit.expand(UnitPattern::DISPLAY_LEN);
    let tokens = unit.unit();
    let next = tokens[UnitPattern::DISPLAY_LEN % tokens.len()];
    PatternRow {
        unit,
        slots,
        sequence,
        next,
    }
}

fn pattern_sequencing(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let mut pool = ctx.catalog.theme_pictures(ctx.theme, PATTERN_ROWS * 2, rng);
    // Three or more entries keep consecutive row pairs apart.
    for glyph in DECOR_GLYPHS {
        if pool.len() >= 3 {
            break;
        }
        let g = AssetRef::Glyph(glyph.to_string());
        if !pool.contains(&g) {
            pool.push(g);
        }
    }
    pool.shuffle(rng);

    let rows = (0..PATTERN_ROWS)
        .map(|i| {
            let unit = *UnitPattern::ALL.choose(rng).unwrap_or(&UnitPattern::Ab);
            let a = pool[(2 * i) % pool.len()].clone();
            let b = pool[(2 * i + 1) % pool.len()].clone();
            pattern_row(unit, [a, b])
        })
        .collect();

    Ok(ctx.page(
        WorksheetTypeId::PatternSequencing,
        "What Comes Next?",
        "Look at each pattern and draw the picture that comes next.",
        ContentBody::PatternRows(PatternRows { rows }),
        rng,
    ))
}

fn odd_one_out(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let main = ctx.pictures(4, rng);
    let decor = ctx.catalog.decor_pictures(DECOR_GLYPHS.len(), rng);

    let rows = main
        .into_iter()
        .map(|picture| {
            let odd = decor
                .iter()
                .filter(|d| **d != picture)
                .cloned()
                .collect::<Vec<_>>()
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| AssetRef::Glyph("❓".to_string()));
            let odd_index = rng.random_range(0..4);
            let items = (0..4)
                .map(|i| if i == odd_index { odd.clone() } else { picture.clone() })
                .collect();
            OddRow { items, odd_index }
        })
        .collect();

    Ok(ctx.page(
        WorksheetTypeId::OddOneOut,
        "Which One Is Different?",
        "Circle the picture that does not belong in each row.",
        ContentBody::OddOneOut(OddOneOut { rows }),
        rng,
    ))
}

fn logic_grid(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let mut symbols = ctx.catalog.theme_pictures(ctx.theme, 3, rng);
    for glyph in FALLBACK_SYMBOLS {
        if symbols.len() >= 3 {
            break;
        }
        let g = AssetRef::Glyph(glyph.to_string());
        if !symbols.contains(&g) {
            symbols.push(g);
        }
    }

    let rows = permutation(rng, 3, false);
    let cols = permutation(rng, 3, false);
    let relabel = permutation(rng, 3, false);
    let grid = (0..9)
        .map(|cell| relabel[(rows[cell / 3] + cols[cell % 3]) % 3])
        .collect();
    let hidden = pick_positions(rng, 0..9, LOGIC_HIDDEN_CELLS);

    Ok(ctx.page(
        WorksheetTypeId::LogicGrid,
        "Picture Sudoku",
        "Each row and column has one of each picture. Draw the missing ones.",
        ContentBody::LogicGrid(LogicGrid { symbols, grid, hidden }),
        rng,
    ))
}

fn shape_synthesis(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let mut combos = SHAPE_COMBOS.to_vec();
    combos.shuffle(rng);
    let problems = combos
        .into_iter()
        .take(3)
        .map(|(a, b, result, glyph)| ShapeCombo {
            parts: [a, b],
            result: result.to_string(),
            glyph: glyph.to_string(),
        })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::ShapeSynthesis,
        "Shape Builders",
        "Put the two shapes together. What do they make?",
        ContentBody::ShapeSynthesis(ShapeSynthesis { problems }),
        rng,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{empty_catalog, rng};
    use super::*;
    use crate::catalog::FsAssetCatalog;
    use std::collections::VecDeque;

    fn run(req: WorksheetRequest, seed: u64) -> ContentSpec {
        Registry::standard()
            .synthesize(&req, &empty_catalog(), &mut rng(seed))
            .unwrap()
    }

    fn reachable(walls: &[u8], width: usize, height: usize) -> usize {
        let mut seen = vec![false; walls.len()];
        let mut queue = VecDeque::from([(0usize, 0usize)]);
        seen[0] = true;
        let mut count = 0;
        while let Some((r, c)) = queue.pop_front() {
            count += 1;
            let w = walls[r * width + c];
            let mut next = Vec::new();
            if w & WALL_NORTH == 0 {
                next.push((r - 1, c));
            }
            if w & WALL_SOUTH == 0 {
                next.push((r + 1, c));
            }
            if w & WALL_EAST == 0 {
                next.push((r, c + 1));
            }
            if w & WALL_WEST == 0 {
                next.push((r, c - 1));
            }
            for (nr, nc) in next {
                assert!(nr < height && nc < width);
                if !seen[nr * width + nc] {
                    seen[nr * width + nc] = true;
                    queue.push_back((nr, nc));
                }
            }
        }
        count
    }

    #[test]
    fn maze_is_perfect() {
        for seed in 0..5 {
            let walls = carve_maze(&mut rng(seed), 12, 12);
            assert_eq!(reachable(&walls, 12, 12), 144);
            // a spanning tree over n cells opens exactly n - 1 passages
            let open: u32 = walls
                .iter()
                .map(|w| (!w & (WALL_NORTH | WALL_EAST | WALL_SOUTH | WALL_WEST)).count_ones())
                .sum();
            assert_eq!(open, 2 * 143);
        }
    }

    #[test]
    fn maze_size_follows_difficulty() {
        let req = WorksheetRequest::new(WorksheetTypeId::Maze).with_difficulty(Difficulty::Hard);
        let ContentBody::Maze(m) = run(req, 2).body else { panic!("wrong body") };
        assert_eq!((m.width, m.height), (16, 16));
        assert_eq!(m.end, (15, 15));
    }

    #[test]
    fn pattern_rows_are_valid_expansions() {
        for seed in 0..30 {
            let ContentBody::PatternRows(p) = run(WorksheetRequest::new(WorksheetTypeId::PatternSequencing), seed).body
            else {
                panic!("wrong body")
            };
            assert_eq!(p.rows.len(), PATTERN_ROWS);
            for row in &p.rows {
                assert_eq!(row.sequence.len(), 6);
                assert!(UnitPattern::ALL.iter().any(|u| u.expand(6) == row.sequence));
                assert_eq!(row.sequence, row.unit.expand(6));
                assert_ne!(row.slots[0], row.slots[1]);
            }
            for pair in p.rows.windows(2) {
                assert_ne!(pair[0].slots, pair[1].slots);
            }
        }
    }

    #[test]
    fn small_theme_pools_still_vary_row_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("uploads/assets/A_main_assets/dinosaur/color");
        std::fs::create_dir_all(&color).unwrap();
        for name in ["rex_color.png", "stego_color.png"] {
            std::fs::write(color.join(name), b"x").unwrap();
        }
        let catalog = FsAssetCatalog::new(dir.path());
        let req = WorksheetRequest::new(WorksheetTypeId::PatternSequencing).with_theme("dinosaur");

        for seed in 0..20 {
            let spec = Registry::standard().synthesize(&req, &catalog, &mut rng(seed)).unwrap();
            let ContentBody::PatternRows(p) = spec.body else { panic!("wrong body") };
            assert!(p.rows.iter().any(|r| r.slots.iter().any(|s| s.image_path().is_some())));
            for pair in p.rows.windows(2) {
                assert_ne!(pair[0].slots, pair[1].slots);
            }
        }
    }

    #[test]
    fn next_slot_continues_the_unit() {
        assert_eq!(pattern_row(UnitPattern::Aabb, Default::default()).next, PatternSlot::B);
        assert_eq!(pattern_row(UnitPattern::Aab, Default::default()).next, PatternSlot::A);
        assert_eq!(pattern_row(UnitPattern::Abab, Default::default()).next, PatternSlot::A);
    }

    #[test]
    fn matching_answers_are_a_shuffle() {
        for seed in 0..20 {
            let ContentBody::PictureMatching(m) = run(WorksheetRequest::new(WorksheetTypeId::ShadowMatching), seed).body
            else {
                panic!("wrong body")
            };
            assert_eq!(m.left.len(), 4);
            assert_ne!(m.answers, vec![0, 1, 2, 3]);
            for (i, picture) in m.left.iter().enumerate() {
                assert_eq!(&m.right[m.answers[i]], picture);
            }
        }
    }

    #[test]
    fn odd_one_out_has_one_stranger_per_row() {
        let ContentBody::OddOneOut(o) = run(WorksheetRequest::new(WorksheetTypeId::OddOneOut), 5).body else {
            panic!("wrong body")
        };
        assert_eq!(o.rows.len(), 4);
        for row in o.rows {
            let odd = &row.items[row.odd_index];
            assert_eq!(row.items.iter().filter(|i| *i == odd).count(), 1);
        }
    }

    #[test]
    fn logic_grid_is_a_latin_square() {
        for seed in 0..20 {
            let ContentBody::LogicGrid(g) = run(WorksheetRequest::new(WorksheetTypeId::LogicGrid), seed).body else {
                panic!("wrong body")
            };
            assert_eq!(g.symbols.len(), 3);
            for i in 0..3 {
                let mut row: Vec<usize> = (0..3).map(|c| g.grid[i * 3 + c]).collect();
                let mut col: Vec<usize> = (0..3).map(|r| g.grid[r * 3 + i]).collect();
                row.sort();
                col.sort();
                assert_eq!(row, vec![0, 1, 2]);
                assert_eq!(col, vec![0, 1, 2]);
            }
            assert_eq!(g.hidden.len(), 3);
        }
    }

    #[test]
    fn sorting_items_belong_to_a_group() {
        let ContentBody::Sorting(s) = run(WorksheetRequest::new(WorksheetTypeId::Sorting), 3).body else {
            panic!("wrong body")
        };
        assert_eq!(s.groups.len(), 2);
        assert_eq!(s.groups[0].label, "Dinosaur");
        assert!(s.items.iter().all(|i| i.group < 2));
        assert_eq!(s.items.iter().filter(|i| i.group == 0).count(), 4);
    }
}
