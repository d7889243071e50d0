//! Number and arithmetic worksheets

use super::sampling::{distinct_in_range, pick_positions, place_non_overlapping, Position, MAX_PLACEMENT_ATTEMPTS};
use super::spec::*;
use super::{ContentSpec, Difficulty, Registry, SynthContext, WorksheetRequest, WorksheetTypeId};
use crate::error::{Error, Result};
use log::debug;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};
use std::f64::consts::PI;

pub(crate) fn register(reg: &mut Registry) {
    reg.register(WorksheetTypeId::NumberTracing, number_tracing);
    reg.register(WorksheetTypeId::CountingObjects, counting_objects);
    reg.register(WorksheetTypeId::CountAndWrite, count_and_write);
    reg.register(WorksheetTypeId::NumberPath, number_path);
    reg.register(WorksheetTypeId::WhichIsMore, which_is_more);
    reg.register(WorksheetTypeId::NumberBonds, number_bonds);
    reg.register(WorksheetTypeId::TenFrame, ten_frame);
    reg.register(WorksheetTypeId::PictureAddition, picture_addition);
    reg.register(WorksheetTypeId::CountShapes, count_shapes);
    reg.register(WorksheetTypeId::PictureSubtraction, picture_subtraction);
    reg.register(WorksheetTypeId::NumberSequencing, number_sequencing);
}

pub const BOND_WHOLE: u32 = 10;
pub const BONDS_PER_PAGE: usize = 8;

pub const SHAPE_REGION: CanvasRegion = CanvasRegion {
    width: 640.0,
    height: 560.0,
};
pub const SHAPE_SIZE: f64 = 50.0;
pub const SHAPE_PADDING: f64 = 10.0;

const TRACING_RANGES: [(u32, u32); 2] = [(0, 4), (5, 9)];

/// Option range for the counting pages
pub fn counting_range(difficulty: Difficulty) -> (u32, u32) {
    match difficulty {
        Difficulty::Easy => (1, 5),
        Difficulty::Medium => (3, 8),
        Difficulty::Hard => (5, 10),
    }
}

fn number_tracing(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let (lo, hi) = match req.text("range") {
        Some(r) => TRACING_RANGES
            .iter()
            .copied()
            .find(|(a, b)| format!("{a}-{b}") == r)
            .ok_or_else(|| Error::InvalidRequest(format!("unknown number range {r:?}")))?,
        None => *TRACING_RANGES.choose(rng).unwrap_or(&TRACING_RANGES[0]),
    };
    let numbers: Vec<u32> = (lo..=hi).collect();
    let pictures = ctx.pictures(numbers.len(), rng);
    let body = ContentBody::NumberTracing(NumberTracing {
        range: format!("{lo}-{hi}"),
        numbers,
        pictures,
    });
    Ok(ctx.page(
        WorksheetTypeId::NumberTracing,
        format!("Trace the Numbers {lo} to {hi}"),
        "Trace each number and count the pictures.",
        body,
        rng,
    ))
}

fn counting(
    req: &WorksheetRequest,
    ctx: &SynthContext<'_>,
    rng: &mut dyn RngCore,
    mode: AnswerMode,
    row_count: usize,
) -> Result<Counting> {
    let (min, max) = counting_range(req.difficulty_or_random(rng));
    let pictures = ctx.pictures(row_count, rng);
    let mut rows = Vec::with_capacity(row_count);
    for picture in pictures {
        let drawn = distinct_in_range(rng, min, max, 3)?;
        let options = [drawn[0], drawn[1], drawn[2]];
        let count = options[rng.random_range(0..options.len())];
        rows.push(CountingRow { picture, count, options });
    }
    Ok(Counting { mode, min, max, rows })
}

fn counting_objects(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let body = counting(req, ctx, rng, AnswerMode::Circle, 4)?;
    Ok(ctx.page(
        WorksheetTypeId::CountingObjects,
        "Count the Objects",
        "Count the pictures in each row and circle the right number.",
        ContentBody::Counting(body),
        rng,
    ))
}

fn count_and_write(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let body = counting(req, ctx, rng, AnswerMode::Write, 6)?;
    Ok(ctx.page(
        WorksheetTypeId::CountAndWrite,
        "Count and Write",
        "Count the pictures and write the number in the box.",
        ContentBody::Counting(body),
        rng,
    ))
}

/// Closed outline in a 100×100 box as a dense polyline
fn outline_polyline(outline: Outline) -> Vec<(f64, f64)> {
    let (cx, cy) = (50.0, 50.0);
    match outline {
        Outline::Circle => (0..360)
            .map(|i| {
                let t = i as f64 / 360.0 * 2.0 * PI - PI / 2.0;
                (cx + 40.0 * t.cos(), cy + 40.0 * t.sin())
            })
            .collect(),
        Outline::Star => (0..10)
            .map(|i| {
                let r = if i % 2 == 0 { 44.0 } else { 19.0 };
                let t = i as f64 / 10.0 * 2.0 * PI - PI / 2.0;
                (cx + r * t.cos(), cy + r * t.sin())
            })
            .collect(),
        Outline::Heart => (0..360)
            .map(|i| {
                let t = i as f64 / 360.0 * 2.0 * PI;
                let x = 16.0 * t.sin().powi(3);
                let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
                (cx + x * 2.5, cy - y * 2.5)
            })
            .collect(),
        Outline::Diamond => vec![(cx, 8.0), (88.0, cy), (cx, 92.0), (12.0, cy)],
    }
}

/// `n` points evenly spaced by arc length around a closed polyline
fn spaced_along(poly: &[(f64, f64)], n: usize) -> Vec<(f64, f64)> {
    let segments: Vec<((f64, f64), (f64, f64), f64)> = poly
        .iter()
        .zip(poly.iter().cycle().skip(1))
        .map(|(&a, &b)| (a, b, ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()))
        .collect();
    let perimeter: f64 = segments.iter().map(|s| s.2).sum();
    if perimeter <= 0.0 {
        return vec![poly.first().copied().unwrap_or((50.0, 50.0)); n];
    }

    let mut points = Vec::with_capacity(n);
    let mut seg = 0;
    let mut walked = 0.0;
    for i in 0..n {
        let at = perimeter * i as f64 / n as f64;
        while seg + 1 < segments.len() && walked + segments[seg].2 < at {
            walked += segments[seg].2;
            seg += 1;
        }
        let (a, b, len) = segments[seg];
        let f = if len > 0.0 { ((at - walked) / len).clamp(0.0, 1.0) } else { 0.0 };
        points.push((a.0 + (b.0 - a.0) * f, a.1 + (b.1 - a.1) * f));
    }
    points
}

fn number_path(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let count = req.uint("dots")?.unwrap_or(20).clamp(10, 60) as usize;
    let outline = match req.text("shape") {
        Some(s) => Outline::parse(s).ok_or_else(|| Error::InvalidRequest(format!("unknown outline {s:?}")))?,
        None => *Outline::ALL.choose(rng).unwrap_or(&Outline::Circle),
    };

    let dots = spaced_along(&outline_polyline(outline), count)
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| Dot {
            number: i as u32 + 1,
            x: (x + rng.random_range(-1.5..=1.5)).clamp(2.0, 98.0),
            y: (y + rng.random_range(-1.5..=1.5)).clamp(2.0, 98.0),
        })
        .collect();

    let body = ContentBody::DotToDot(DotToDot {
        outline,
        dots,
        character: ctx.catalog.character(ctx.theme),
    });
    Ok(ctx.page(
        WorksheetTypeId::NumberPath,
        "Connect the Dots",
        format!("Join the dots from 1 to {count}, then color the picture."),
        body,
        rng,
    ))
}

fn which_is_more(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let max = match req.difficulty_or_random(rng) {
        Difficulty::Easy => 5,
        Difficulty::Medium => 7,
        Difficulty::Hard => 10,
    };
    let mut rows = Vec::with_capacity(4);
    for picture in ctx.pictures(4, rng) {
        let pair = distinct_in_range(rng, 1, max, 2)?;
        rows.push(ComparisonRow {
            picture,
            left: pair[0],
            right: pair[1],
        });
    }
    Ok(ctx.page(
        WorksheetTypeId::WhichIsMore,
        "Which Is More?",
        "Circle the group that has more.",
        ContentBody::Comparison(Comparison { rows }),
        rng,
    ))
}

fn number_bonds(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let mut pairs: Vec<[u32; 2]> = (0..=BOND_WHOLE).map(|a| [a, BOND_WHOLE - a]).collect();
    pairs.shuffle(rng);
    let bonds = pairs
        .into_iter()
        .take(BONDS_PER_PAGE)
        .map(|parts| {
            let (hidden, answer) = if rng.random_bool(0.5) {
                (BondPart::First, parts[0])
            } else {
                (BondPart::Second, parts[1])
            };
            Bond { parts, hidden, answer }
        })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::NumberBonds,
        "Number Bonds to 10",
        "Write the missing number so both parts make 10.",
        ContentBody::NumberBonds(NumberBonds {
            whole: BOND_WHOLE,
            bonds,
        }),
        rng,
    ))
}

fn ten_frame(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let counts = distinct_in_range(rng, 1, 10, 4)?;
    let frames = ctx
        .pictures(counts.len(), rng)
        .into_iter()
        .zip(counts)
        .map(|(picture, count)| TenFrame { picture, count })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::TenFrame,
        "Ten Frames",
        "Count the pictures in each ten frame and write the number.",
        ContentBody::TenFrames(TenFrames { frames }),
        rng,
    ))
}

fn picture_addition(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let problems = ctx
        .pictures(4, rng)
        .into_iter()
        .map(|picture| {
            let a = rng.random_range(1..=5);
            let b = rng.random_range(1..=5);
            AdditionProblem { picture, a, b, sum: a + b }
        })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::PictureAddition,
        "Picture Addition",
        "Count both groups and write how many there are altogether.",
        ContentBody::PictureAddition(PictureAddition { problems }),
        rng,
    ))
}

fn count_shapes(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let mut tallies = Vec::with_capacity(ShapeKind::COUNTABLE.len());
    let mut centers: Vec<Position> = Vec::new();
    let mut shapes = Vec::new();

    for kind in ShapeKind::COUNTABLE {
        let count = rng.random_range(5..=9u32);
        tallies.push(ShapeTally { kind, count });
        for _ in 0..count {
            let (pos, forced) =
                match place_non_overlapping(rng, SHAPE_REGION, SHAPE_SIZE, SHAPE_PADDING, &centers, MAX_PLACEMENT_ATTEMPTS) {
                    Ok(pos) => (pos, false),
                    Err(exhausted) => {
                        debug!(
                            "No free spot for a {} after {} attempts; placing it anyway",
                            kind.name(),
                            exhausted.attempts
                        );
                        (exhausted.last, true)
                    }
                };
            centers.push(pos);
            shapes.push(ShapeInstance {
                kind,
                x: pos.x,
                y: pos.y,
                forced,
            });
        }
    }
    shapes.shuffle(rng);

    let body = ContentBody::ShapeCount(ShapeCount {
        region: SHAPE_REGION,
        shape_size: SHAPE_SIZE,
        padding: SHAPE_PADDING,
        tallies,
        shapes,
    });
    Ok(ctx.page(
        WorksheetTypeId::CountShapes,
        "Count the Shapes",
        "Count each kind of shape and write the number in its box.",
        body,
        rng,
    ))
}

fn picture_subtraction(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let fixed_total = req.uint("total")?;
    if let Some(t) = fixed_total {
        if !(2..=20).contains(&t) {
            return Err(Error::InvalidRequest(format!("total must be between 2 and 20, got {t}")));
        }
    }

    let problems = ctx
        .pictures(4, rng)
        .into_iter()
        .map(|picture| {
            let total = fixed_total.unwrap_or_else(|| rng.random_range(3..=10));
            let subtract = rng.random_range(1..total);
            SubtractionProblem {
                picture,
                total,
                subtract,
                result: total - subtract,
            }
        })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::PictureSubtraction,
        "Picture Subtraction",
        "Cross out the pictures that go away and write how many are left.",
        ContentBody::PictureSubtraction(PictureSubtraction { problems }),
        rng,
    ))
}

fn number_sequencing(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let hidden_count = match req.difficulty_or_random(rng) {
        Difficulty::Easy => 1,
        Difficulty::Medium | Difficulty::Hard => 2,
    };
    let rows = (0..5)
        .map(|_| {
            let start = rng.random_range(1..=16u32);
            NumberRow {
                numbers: (start..start + 5).collect(),
                hidden: pick_positions(rng, 0..5, hidden_count),
            }
        })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::NumberSequencing,
        "Number Sequencing",
        "Write the missing numbers in each row.",
        ContentBody::NumberSequences(NumberSequences { rows }),
        rng,
    ))
}
