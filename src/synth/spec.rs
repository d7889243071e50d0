//! Fully-resolved worksheet content
//!
//! Every value here is concrete: once a [`ContentSpec`] exists nothing
//! downstream draws another random number.

use super::{Difficulty, WorksheetTypeId};
use crate::catalog::{AssetRef, LetterAsset, Theme};
use serde::{Deserialize, Serialize};

/// Content of one worksheet page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSpec {
    pub kind: WorksheetTypeId,
    pub title: String,
    pub instructions: String,
    pub theme: Theme,
    pub decor: PageDecor,
    pub body: ContentBody,
}

/// Title icon and border stickers shared by every page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageDecor {
    pub title_icon: AssetRef,
    pub stickers: Vec<AssetRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "kebab-case")]
pub enum ContentBody {
    LetterTracing(LetterTracing),
    LetterGrid(LetterGrid),
    NameTracing(NameTracing),
    AlphabetSequences(AlphabetSequences),
    LetterMatching(LetterMatching),
    CvcWords(CvcWords),
    NumberTracing(NumberTracing),
    Counting(Counting),
    DotToDot(DotToDot),
    Comparison(Comparison),
    NumberBonds(NumberBonds),
    TenFrames(TenFrames),
    PictureAddition(PictureAddition),
    ShapeCount(ShapeCount),
    PictureSubtraction(PictureSubtraction),
    NumberSequences(NumberSequences),
    Maze(Maze),
    PictureMatching(PictureMatching),
    Sorting(Sorting),
    SpotDifference(SpotDifference),
    PatternRows(PatternRows),
    OddOneOut(OddOneOut),
    LogicGrid(LogicGrid),
    ShapeSynthesis(ShapeSynthesis),
    TraceLines(TraceLines),
    ShapeTracing(ShapeTracing),
    Coloring(Coloring),
    CreativePrompt(CreativePrompt),
    ShapePath(ShapePath),
}

// ---------------------------------------------------------------- shapes

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Rectangle,
    Star,
    Heart,
    Diamond,
    Oval,
}

impl ShapeKind {
    /// Kinds used on the count-the-shapes page
    pub const COUNTABLE: [ShapeKind; 5] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Star,
        ShapeKind::Heart,
    ];

    pub const ALL: [ShapeKind; 8] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Rectangle,
        ShapeKind::Star,
        ShapeKind::Heart,
        ShapeKind::Diamond,
        ShapeKind::Oval,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Oval => "oval",
        }
    }

    pub fn parse(value: &str) -> Option<ShapeKind> {
        ShapeKind::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(value.trim()))
    }
}

// ---------------------------------------------------------------- literacy

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterCase {
    Upper,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterTracing {
    pub letter: char,
    pub case: LetterCase,
    pub picture: LetterAsset,
    pub practice_rows: u8,
}

/// Top-left corner of the 3×3 block kept free for an embedded picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedBlock {
    pub row: usize,
    pub col: usize,
}

impl ReservedBlock {
    pub const SIZE: usize = 3;

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.row && row < self.row + Self::SIZE && col >= self.col && col < self.col + Self::SIZE
    }
}

/// Square letter grid; cells inside the reserved block hold `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterGrid {
    pub target: char,
    pub difficulty: Difficulty,
    pub size: usize,
    pub cells: Vec<Option<char>>,
    pub reserved: Option<ReservedBlock>,
    pub picture: Option<AssetRef>,
    pub target_count: usize,
}

impl LetterGrid {
    pub fn cell(&self, row: usize, col: usize) -> Option<char> {
        self.cells.get(row * self.size + col).copied().flatten()
    }

    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameTracing {
    pub name: String,
    pub rows: u8,
    pub mascot: AssetRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRow {
    pub letters: Vec<char>,
    pub hidden: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphabetSequences {
    pub case: LetterCase,
    pub rows: Vec<SequenceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MatchTarget {
    Letter(char),
    Picture(LetterAsset),
}

/// Left column in order, right column shuffled; `answers[i]` is the right
/// index matching `left[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterMatching {
    pub set: String,
    pub left: Vec<char>,
    pub right: Vec<MatchTarget>,
    pub answers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvcWord {
    pub word: String,
    pub picture: AssetRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvcWords {
    pub words: Vec<CvcWord>,
}

// ---------------------------------------------------------------- math

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberTracing {
    pub range: String,
    pub numbers: Vec<u32>,
    pub pictures: Vec<AssetRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerMode {
    /// Circle the right option
    Circle,
    /// Write the number in a box; options are still printed as hints
    Write,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountingRow {
    pub picture: AssetRef,
    pub count: u32,
    pub options: [u32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counting {
    pub mode: AnswerMode,
    pub min: u32,
    pub max: u32,
    pub rows: Vec<CountingRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outline {
    Circle,
    Star,
    Heart,
    Diamond,
}

impl Outline {
    pub const ALL: [Outline; 4] = [Outline::Circle, Outline::Star, Outline::Heart, Outline::Diamond];

    pub fn parse(value: &str) -> Option<Outline> {
        match value.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(Outline::Circle),
            "star" => Some(Outline::Star),
            "heart" => Some(Outline::Heart),
            "diamond" => Some(Outline::Diamond),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub number: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotToDot {
    pub outline: Outline,
    pub dots: Vec<Dot>,
    pub character: AssetRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub picture: AssetRef,
    pub left: u32,
    pub right: u32,
}

impl ComparisonRow {
    pub fn answer(&self) -> Side {
        if self.left > self.right {
            Side::Left
        } else {
            Side::Right
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BondPart {
    First,
    Second,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub parts: [u32; 2],
    pub hidden: BondPart,
    pub answer: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberBonds {
    pub whole: u32,
    pub bonds: Vec<Bond>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenFrame {
    pub picture: AssetRef,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenFrames {
    pub frames: Vec<TenFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionProblem {
    pub picture: AssetRef,
    pub a: u32,
    pub b: u32,
    pub sum: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureAddition {
    pub problems: Vec<AdditionProblem>,
}

/// Drawing region for scattered shapes, in page units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasRegion {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeInstance {
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    /// Placed after every attempt collided; may overlap a neighbour
    pub forced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeTally {
    pub kind: ShapeKind,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCount {
    pub region: CanvasRegion,
    pub shape_size: f64,
    pub padding: f64,
    pub tallies: Vec<ShapeTally>,
    pub shapes: Vec<ShapeInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtractionProblem {
    pub picture: AssetRef,
    pub total: u32,
    pub subtract: u32,
    pub result: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureSubtraction {
    pub problems: Vec<SubtractionProblem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberRow {
    pub numbers: Vec<u32>,
    pub hidden: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberSequences {
    pub rows: Vec<NumberRow>,
}

// ---------------------------------------------------------------- logic

pub const WALL_NORTH: u8 = 1;
pub const WALL_EAST: u8 = 2;
pub const WALL_SOUTH: u8 = 4;
pub const WALL_WEST: u8 = 8;

/// Perfect maze; `walls[row * width + col]` is a bit set of `WALL_*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    pub width: usize,
    pub height: usize,
    pub walls: Vec<u8>,
    pub start: (usize, usize),
    pub end: (usize, usize),
    pub start_picture: AssetRef,
    pub end_picture: AssetRef,
}

impl Maze {
    pub fn walls_at(&self, row: usize, col: usize) -> u8 {
        self.walls[row * self.width + col]
    }
}

/// Two columns of pictures; `answers[i]` is the right index matching `left[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureMatching {
    pub left: Vec<AssetRef>,
    pub right: Vec<AssetRef>,
    pub answers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortGroup {
    pub label: String,
    pub sample: AssetRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortItem {
    pub picture: AssetRef,
    pub group: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sorting {
    pub groups: Vec<SortGroup>,
    pub items: Vec<SortItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotDifference {
    pub picture: AssetRef,
    pub differences: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternSlot {
    A,
    B,
}

/// Minimal repeating token sequence of a pattern row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitPattern {
    Ab,
    Aab,
    Abb,
    Aabb,
    Abab,
}

impl UnitPattern {
    pub const ALL: [UnitPattern; 5] = [
        UnitPattern::Ab,
        UnitPattern::Aab,
        UnitPattern::Abb,
        UnitPattern::Aabb,
        UnitPattern::Abab,
    ];

    /// Number of items displayed per row
    pub const DISPLAY_LEN: usize = 6;

    pub fn unit(&self) -> &'static [PatternSlot] {
        use PatternSlot::{A, B};
        match self {
            UnitPattern::Ab => &[A, B],
            UnitPattern::Aab => &[A, A, B],
            UnitPattern::Abb => &[A, B, B],
            UnitPattern::Aabb => &[A, A, B, B],
            UnitPattern::Abab => &[A, B, A, B],
        }
    }

    /// The unit repeated until it fills the display, cut at `len` items
    pub fn expand(&self, len: usize) -> Vec<PatternSlot> {
        self.unit().iter().copied().cycle().take(len).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRow {
    pub unit: UnitPattern,
    /// Pictures for the A and B slots
    pub slots: [AssetRef; 2],
    pub sequence: Vec<PatternSlot>,
    /// The slot that continues the sequence
    pub next: PatternSlot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRows {
    pub rows: Vec<PatternRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddRow {
    pub items: Vec<AssetRef>,
    pub odd_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddOneOut {
    pub rows: Vec<OddRow>,
}

/// 3×3 Latin square of symbol indexes with some cells left blank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicGrid {
    pub symbols: Vec<AssetRef>,
    pub grid: Vec<usize>,
    pub hidden: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeCombo {
    pub parts: [ShapeKind; 2],
    pub result: String,
    pub glyph: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSynthesis {
    pub problems: Vec<ShapeCombo>,
}

// ---------------------------------------------------------------- creativity

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Straight,
    Wavy,
    Zigzag,
    Loop,
}

impl LineKind {
    pub const ALL: [LineKind; 4] = [LineKind::Straight, LineKind::Wavy, LineKind::Zigzag, LineKind::Loop];

    pub fn parse(value: &str) -> Option<LineKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "straight" => Some(LineKind::Straight),
            "wavy" | "curve" | "curvy" => Some(LineKind::Wavy),
            "zigzag" => Some(LineKind::Zigzag),
            "loop" | "loops" => Some(LineKind::Loop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub start: AssetRef,
    pub end: AssetRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLines {
    pub line: LineKind,
    pub rows: Vec<TraceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeTracing {
    pub shape: ShapeKind,
    pub repeats: u8,
    pub picture: AssetRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coloring {
    pub art: AssetRef,
    /// Leave a blank box to draw in next to the art
    pub draw_area: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    BlankSign,
    Halfbody,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::BlankSign => "blank_sign",
            PromptKind::Halfbody => "halfbody",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativePrompt {
    pub prompt: PromptKind,
    pub art: AssetRef,
    pub caption: String,
}

/// Grid where a path of `target` shapes runs from the left edge to the right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapePath {
    pub size: usize,
    pub target: ShapeKind,
    pub cells: Vec<ShapeKind>,
    pub path: Vec<(usize, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_expand_to_six_items() {
        use PatternSlot::{A, B};
        assert_eq!(UnitPattern::Ab.expand(6), vec![A, B, A, B, A, B]);
        assert_eq!(UnitPattern::Aab.expand(6), vec![A, A, B, A, A, B]);
        assert_eq!(UnitPattern::Abb.expand(6), vec![A, B, B, A, B, B]);
        assert_eq!(UnitPattern::Aabb.expand(6), vec![A, A, B, B, A, A]);
        assert_eq!(UnitPattern::Abab.expand(6), vec![A, B, A, B, A, B]);
    }

    #[test]
    fn reserved_block_bounds() {
        let b = ReservedBlock { row: 2, col: 1 };
        assert!(b.contains(2, 1));
        assert!(b.contains(4, 3));
        assert!(!b.contains(5, 3));
        assert!(!b.contains(2, 0));
    }

    #[test]
    fn body_serializes_with_layout_tag() {
        let body = ContentBody::NumberBonds(NumberBonds {
            whole: 10,
            bonds: vec![Bond { parts: [3, 7], hidden: BondPart::Second, answer: 7 }],
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["layout"], "number-bonds");
        assert_eq!(json["bonds"][0]["answer"], 7);
        let back: ContentBody = serde_json::from_value(json).unwrap();
        assert_eq!(back, body);
    }
}
