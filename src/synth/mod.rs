//! Worksheet content synthesis
//!
//! One generator per [`WorksheetTypeId`], looked up through a [`Registry`].
//! Generators take the caller's RNG so a seeded source reproduces a page
//! exactly, and they return a [`ContentSpec`] with every choice resolved.
//!
//! | Module     | Purpose |
//! |------------|---------|
//! | `spec`     | The resolved content types |
//! | `sampling` | Bounded rejection sampling, distinct draws, grid carving |
//! | `literacy` | Letter tracing, grids, sequencing, matching |
//! | `math`     | Counting, bonds, arithmetic, dot-to-dot |
//! | `logic`    | Mazes, patterns, matching, sorting |
//! | `creative` | Line tracing, coloring, prompts, shape paths |

pub mod creative;
pub mod literacy;
pub mod logic;
pub mod math;
pub mod sampling;
pub mod spec;

pub use spec::*;

use crate::catalog::{AssetCatalog, AssetRef, Theme};
use crate::error::{Error, Result};
use log::debug;
use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Number of border stickers placed around every page
pub const STICKERS_PER_PAGE: usize = 8;

/// Every worksheet type the pipeline can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorksheetTypeId {
    // literacy
    UppercaseTracing,
    LowercaseTracing,
    LetterRecognition,
    LetterHunt,
    WriteMyName,
    AlphabetSequencing,
    BeginningSounds,
    CvcWords,
    MatchUpperLower,
    // math
    NumberTracing,
    CountingObjects,
    CountAndWrite,
    NumberPath,
    WhichIsMore,
    NumberBonds,
    TenFrame,
    PictureAddition,
    CountShapes,
    PictureSubtraction,
    NumberSequencing,
    // logic
    Maze,
    ShadowMatching,
    Sorting,
    PatternCompare,
    PatternSequencing,
    OddOneOut,
    MatchingHalves,
    LogicGrid,
    ShapeSynthesis,
    // creativity
    TraceLines,
    ShapeTracing,
    ColoringPage,
    CreativePrompt,
    TraceAndDraw,
    ShapePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Literacy,
    Math,
    Logic,
    Creativity,
}

impl WorksheetTypeId {
    pub const ALL: [WorksheetTypeId; 35] = [
        WorksheetTypeId::UppercaseTracing,
        WorksheetTypeId::LowercaseTracing,
        WorksheetTypeId::LetterRecognition,
        WorksheetTypeId::LetterHunt,
        WorksheetTypeId::WriteMyName,
        WorksheetTypeId::AlphabetSequencing,
        WorksheetTypeId::BeginningSounds,
        WorksheetTypeId::CvcWords,
        WorksheetTypeId::MatchUpperLower,
        WorksheetTypeId::NumberTracing,
        WorksheetTypeId::CountingObjects,
        WorksheetTypeId::CountAndWrite,
        WorksheetTypeId::NumberPath,
        WorksheetTypeId::WhichIsMore,
        WorksheetTypeId::NumberBonds,
        WorksheetTypeId::TenFrame,
        WorksheetTypeId::PictureAddition,
        WorksheetTypeId::CountShapes,
        WorksheetTypeId::PictureSubtraction,
        WorksheetTypeId::NumberSequencing,
        WorksheetTypeId::Maze,
        WorksheetTypeId::ShadowMatching,
        WorksheetTypeId::Sorting,
        WorksheetTypeId::PatternCompare,
        WorksheetTypeId::PatternSequencing,
        WorksheetTypeId::OddOneOut,
        WorksheetTypeId::MatchingHalves,
        WorksheetTypeId::LogicGrid,
        WorksheetTypeId::ShapeSynthesis,
        WorksheetTypeId::TraceLines,
        WorksheetTypeId::ShapeTracing,
        WorksheetTypeId::ColoringPage,
        WorksheetTypeId::CreativePrompt,
        WorksheetTypeId::TraceAndDraw,
        WorksheetTypeId::ShapePath,
    ];

    pub fn as_str(&self) -> &'static str {
        use WorksheetTypeId::*;
        match self {
            UppercaseTracing => "uppercase-tracing",
            LowercaseTracing => "lowercase-tracing",
            LetterRecognition => "letter-recognition",
            LetterHunt => "letter-hunt",
            WriteMyName => "write-my-name",
            AlphabetSequencing => "alphabet-sequencing",
            BeginningSounds => "beginning-sounds",
            CvcWords => "cvc-words",
            MatchUpperLower => "match-upper-lower",
            NumberTracing => "number-tracing",
            CountingObjects => "counting-objects",
            CountAndWrite => "count-and-write",
            NumberPath => "number-path",
            WhichIsMore => "which-is-more",
            NumberBonds => "number-bonds",
            TenFrame => "ten-frame",
            PictureAddition => "picture-addition",
            CountShapes => "count-shapes",
            PictureSubtraction => "picture-subtraction",
            NumberSequencing => "number-sequencing",
            Maze => "maze",
            ShadowMatching => "shadow-matching",
            Sorting => "sorting",
            PatternCompare => "pattern-compare",
            PatternSequencing => "pattern-sequencing",
            OddOneOut => "odd-one-out",
            MatchingHalves => "matching-halves",
            LogicGrid => "logic-grid",
            ShapeSynthesis => "shape-synthesis",
            TraceLines => "trace-lines",
            ShapeTracing => "shape-tracing",
            ColoringPage => "coloring-page",
            CreativePrompt => "creative-prompt",
            TraceAndDraw => "trace-and-draw",
            ShapePath => "shape-path",
        }
    }

    pub fn category(&self) -> Category {
        use WorksheetTypeId::*;
        match self {
            UppercaseTracing | LowercaseTracing | LetterRecognition | LetterHunt | WriteMyName
            | AlphabetSequencing | BeginningSounds | CvcWords | MatchUpperLower => Category::Literacy,
            NumberTracing | CountingObjects | CountAndWrite | NumberPath | WhichIsMore | NumberBonds
            | TenFrame | PictureAddition | CountShapes | PictureSubtraction | NumberSequencing => {
                Category::Math
            }
            Maze | ShadowMatching | Sorting | PatternCompare | PatternSequencing | OddOneOut
            | MatchingHalves | LogicGrid | ShapeSynthesis => Category::Logic,
            TraceLines | ShapeTracing | ColoringPage | CreativePrompt | TraceAndDraw | ShapePath => {
                Category::Creativity
            }
        }
    }

    /// Whether this type's pictures go through background removal
    pub fn wants_clean_pictures(&self) -> bool {
        matches!(self, WorksheetTypeId::ShadowMatching | WorksheetTypeId::MatchingHalves)
    }
}

impl fmt::Display for WorksheetTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorksheetTypeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        WorksheetTypeId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| Error::UnknownWorksheetType(wanted.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(Error::InvalidRequest(format!("unknown difficulty {other:?}"))),
        }
    }
}

/// A worksheet request; every field beyond `kind` is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksheetRequest {
    #[serde(rename = "type")]
    pub kind: WorksheetTypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Caller-fixed content fields, e.g. `letter`, `name`, `total`
    #[serde(default, rename = "explicitContent")]
    pub explicit: Map<String, Value>,
}

impl WorksheetRequest {
    pub fn new(kind: WorksheetTypeId) -> Self {
        Self {
            kind,
            theme: None,
            difficulty: None,
            explicit: Map::new(),
        }
    }

    /// Build a request from the loose `data` object callers send.
    ///
    /// `theme` and `difficulty` are lifted out; a nested `explicitContent`
    /// object is merged into the remaining top-level fields.
    pub fn from_data(kind: WorksheetTypeId, data: Value) -> Result<Self> {
        let mut explicit = match data {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidRequest(format!(
                    "request data must be an object, got {other}"
                )))
            }
        };

        let theme = match explicit.remove("theme") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => return Err(Error::InvalidRequest(format!("theme must be a string, got {other}"))),
        };
        let difficulty = match explicit.remove("difficulty") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.parse()?),
            Some(other) => {
                return Err(Error::InvalidRequest(format!("difficulty must be a string, got {other}")))
            }
        };
        if let Some(Value::Object(inner)) = explicit.remove("explicitContent") {
            for (k, v) in inner {
                explicit.entry(k).or_insert(v);
            }
        }

        Ok(Self {
            kind,
            theme,
            difficulty,
            explicit,
        })
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.explicit.insert(key.to_string(), value.into());
        self
    }

    pub fn resolved_theme(&self) -> Theme {
        Theme::resolve(self.theme.as_deref())
    }

    /// The requested difficulty, or one drawn from `rng`
    pub fn difficulty_or_random(&self, rng: &mut dyn RngCore) -> Difficulty {
        match self.difficulty {
            Some(d) => d,
            None => *Difficulty::ALL.choose(rng).unwrap_or(&Difficulty::Medium),
        }
    }

    /// A non-empty string field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.explicit
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// A non-negative integer field; numeric strings are accepted
    pub fn uint(&self, key: &str) -> Result<Option<u32>> {
        let parsed = match self.explicit.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse::<u32>().ok(),
            Some(_) => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| Error::InvalidRequest(format!("{key} must be a non-negative integer")))
    }

    /// A single ASCII letter field
    pub fn letter(&self, key: &str) -> Result<Option<char>> {
        let Some(text) = self.text(key) else {
            return Ok(None);
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(Some(c)),
            _ => Err(Error::InvalidRequest(format!("{key} must be a single letter, got {text:?}"))),
        }
    }
}

/// Everything a generator reads besides the request
pub struct SynthContext<'a> {
    pub catalog: &'a dyn AssetCatalog,
    pub theme: Theme,
}

impl<'a> SynthContext<'a> {
    pub fn new(catalog: &'a dyn AssetCatalog, theme: Theme) -> Self {
        Self { catalog, theme }
    }

    /// Exactly `count` theme pictures, repeating the pool when it is short.
    pub fn pictures(&self, count: usize, rng: &mut dyn RngCore) -> Vec<AssetRef> {
        let pool = self.catalog.theme_pictures(self.theme, count, rng);
        if pool.is_empty() {
            return vec![AssetRef::Missing; count];
        }
        pool.iter().cycle().take(count).cloned().collect()
    }

    /// Wrap a body into a page, drawing its decoration last.
    pub fn page(
        &self,
        kind: WorksheetTypeId,
        title: impl Into<String>,
        instructions: impl Into<String>,
        body: ContentBody,
        rng: &mut dyn RngCore,
    ) -> ContentSpec {
        let decor = PageDecor {
            title_icon: self.catalog.title_icon(self.theme, rng),
            stickers: self.catalog.border_stickers(self.theme, STICKERS_PER_PAGE, rng),
        };
        ContentSpec {
            kind,
            title: title.into(),
            instructions: instructions.into(),
            theme: self.theme,
            decor,
            body,
        }
    }
}

/// Signature shared by every generator
pub type SynthFn = fn(&WorksheetRequest, &SynthContext<'_>, &mut dyn RngCore) -> Result<ContentSpec>;

/// Maps worksheet types to their generators
#[derive(Clone)]
pub struct Registry {
    entries: HashMap<WorksheetTypeId, SynthFn>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry with every built-in generator
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        literacy::register(&mut reg);
        math::register(&mut reg);
        logic::register(&mut reg);
        creative::register(&mut reg);
        reg
    }

    pub fn register(&mut self, kind: WorksheetTypeId, synth: SynthFn) {
        self.entries.insert(kind, synth);
    }

    pub fn get(&self, kind: WorksheetTypeId) -> Option<SynthFn> {
        self.entries.get(&kind).copied()
    }

    /// Registered types in canonical order
    pub fn kinds(&self) -> Vec<WorksheetTypeId> {
        WorksheetTypeId::ALL
            .into_iter()
            .filter(|k| self.entries.contains_key(k))
            .collect()
    }

    pub fn synthesize(
        &self,
        request: &WorksheetRequest,
        catalog: &dyn AssetCatalog,
        rng: &mut dyn RngCore,
    ) -> Result<ContentSpec> {
        let synth = self
            .get(request.kind)
            .ok_or_else(|| Error::UnknownWorksheetType(request.kind.to_string()))?;
        let ctx = SynthContext::new(catalog, request.resolved_theme());
        debug!("Synthesizing {} ({})", request.kind, ctx.theme);
        synth(request, &ctx, rng)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("kinds", &self.kinds()).finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::catalog::FsAssetCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Catalog over a directory that does not exist: every lookup falls back
    pub fn empty_catalog() -> FsAssetCatalog {
        FsAssetCatalog::new("/nonexistent/kidsheet-test-assets")
    }

    pub fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }
}
