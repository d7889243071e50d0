//! Letter and word worksheets

use super::sampling::{carve_letter_grid, permutation, pick_positions, ALPHABET};
use super::spec::*;
use super::{ContentSpec, Difficulty, Registry, SynthContext, WorksheetRequest, WorksheetTypeId};
use crate::catalog::AssetRef;
use crate::error::{Error, Result};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};

pub(crate) fn register(reg: &mut Registry) {
    reg.register(WorksheetTypeId::UppercaseTracing, uppercase_tracing);
    reg.register(WorksheetTypeId::LowercaseTracing, lowercase_tracing);
    reg.register(WorksheetTypeId::LetterRecognition, letter_recognition);
    reg.register(WorksheetTypeId::LetterHunt, letter_hunt);
    reg.register(WorksheetTypeId::WriteMyName, write_my_name);
    reg.register(WorksheetTypeId::AlphabetSequencing, alphabet_sequencing);
    reg.register(WorksheetTypeId::BeginningSounds, beginning_sounds);
    reg.register(WorksheetTypeId::CvcWords, cvc_words);
    reg.register(WorksheetTypeId::MatchUpperLower, match_upper_lower);
}

const DEFAULT_NAME: &str = "LEO";
const CVC_WORDS_PER_PAGE: usize = 6;

const BEGINNING_SOUND_SETS: [(char, char); 5] = [('A', 'E'), ('F', 'J'), ('K', 'O'), ('P', 'T'), ('U', 'Z')];
const UPPER_LOWER_SETS: [(char, char); 5] = [('A', 'F'), ('G', 'L'), ('M', 'R'), ('S', 'V'), ('W', 'Z')];

const CVC_LIST: [(&str, &str); 20] = [
    ("cat", "🐱"),
    ("dog", "🐶"),
    ("pig", "🐷"),
    ("sun", "🌞"),
    ("bus", "🚌"),
    ("hat", "🎩"),
    ("bat", "🦇"),
    ("box", "📦"),
    ("fox", "🦊"),
    ("bed", "🛏️"),
    ("cup", "🥤"),
    ("bug", "🐛"),
    ("hen", "🐔"),
    ("map", "🗺️"),
    ("net", "🥅"),
    ("pen", "🖊️"),
    ("jam", "🍯"),
    ("van", "🚐"),
    ("web", "🕸️"),
    ("mop", "🧹"),
];

fn letter_range((from, to): (char, char)) -> Vec<char> {
    ALPHABET.iter().copied().filter(|c| (from..=to).contains(c)).collect()
}

/// Pick a named letter set like `"A-E"`, or draw one.
fn letter_set(req: &WorksheetRequest, sets: &[(char, char)], rng: &mut dyn RngCore) -> Result<(char, char)> {
    if let Some(name) = req.text("letterSet") {
        let wanted = name.to_ascii_uppercase();
        return sets
            .iter()
            .copied()
            .find(|(a, b)| format!("{a}-{b}") == wanted)
            .ok_or_else(|| Error::InvalidRequest(format!("unknown letter set {name:?}")));
    }
    sets.choose(rng)
        .copied()
        .ok_or_else(|| Error::Other("no letter sets defined".into()))
}

fn letter_tracing(
    req: &WorksheetRequest,
    ctx: &SynthContext<'_>,
    rng: &mut dyn RngCore,
    case: LetterCase,
) -> Result<ContentSpec> {
    let base = req.letter("letter")?.unwrap_or('A');
    let letter = match case {
        LetterCase::Upper => base.to_ascii_uppercase(),
        LetterCase::Lower => base.to_ascii_lowercase(),
    };
    let picture = ctx.catalog.letter_picture(letter, rng);
    let word = picture.word.clone();
    let body = ContentBody::LetterTracing(LetterTracing {
        letter,
        case,
        picture,
        practice_rows: 4,
    });
    let kind = match case {
        LetterCase::Upper => WorksheetTypeId::UppercaseTracing,
        LetterCase::Lower => WorksheetTypeId::LowercaseTracing,
    };
    let title = format!("Trace the Letter {letter}");
    Ok(ctx.page(kind, title, format!("{letter} is for {word}. Trace the letters, then write your own."), body, rng))
}

fn uppercase_tracing(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    letter_tracing(req, ctx, rng, LetterCase::Upper)
}

fn lowercase_tracing(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    letter_tracing(req, ctx, rng, LetterCase::Lower)
}

fn letter_grid(
    req: &WorksheetRequest,
    ctx: &SynthContext<'_>,
    rng: &mut dyn RngCore,
    reserve_block: bool,
) -> Result<LetterGrid> {
    let target = match req.letter("letter")? {
        Some(c) => c.to_ascii_uppercase(),
        None => *ALPHABET.choose(rng).unwrap_or(&'A'),
    };
    let difficulty = req.difficulty_or_random(rng);
    let mut grid = carve_letter_grid(rng, target, difficulty, reserve_block);
    if reserve_block {
        grid.picture = Some(ctx.catalog.letter_picture(target, rng).picture);
    }
    Ok(grid)
}

fn letter_recognition(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let grid = letter_grid(req, ctx, rng, false)?;
    let title = format!("Find the Letter {}", grid.target);
    let instructions = format!("Color every {} you can find.", grid.target);
    Ok(ctx.page(WorksheetTypeId::LetterRecognition, title, instructions, ContentBody::LetterGrid(grid), rng))
}

fn letter_hunt(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let grid = letter_grid(req, ctx, rng, true)?;
    let title = format!("Letter Hunt: {}", grid.target);
    let instructions = format!("Circle all the {} letters hiding in the grid.", grid.target);
    Ok(ctx.page(WorksheetTypeId::LetterHunt, title, instructions, ContentBody::LetterGrid(grid), rng))
}

fn write_my_name(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let name: String = req
        .text("name")
        .unwrap_or(DEFAULT_NAME)
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let name = if name.is_empty() { DEFAULT_NAME.to_string() } else { name };
    let body = ContentBody::NameTracing(NameTracing {
        name: name.clone(),
        rows: 4,
        mascot: ctx.catalog.character(ctx.theme),
    });
    Ok(ctx.page(
        WorksheetTypeId::WriteMyName,
        "Write My Name",
        format!("Trace {name}, then write it by yourself."),
        body,
        rng,
    ))
}

fn alphabet_sequencing(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let difficulty = req.difficulty_or_random(rng);
    let case = match req.text("case") {
        Some(c) if c.eq_ignore_ascii_case("lower") || c.eq_ignore_ascii_case("lowercase") => LetterCase::Lower,
        _ => LetterCase::Upper,
    };

    let mut rows = Vec::with_capacity(5);
    for _ in 0..5 {
        let len = rng.random_range(3..=5usize);
        let start = rng.random_range(0..=ALPHABET.len() - len);
        let letters: Vec<char> = ALPHABET[start..start + len]
            .iter()
            .map(|&c| match case {
                LetterCase::Upper => c,
                LetterCase::Lower => c.to_ascii_lowercase(),
            })
            .collect();
        let wanted = match difficulty {
            Difficulty::Easy => 1,
            Difficulty::Medium => rng.random_range(1..=2),
            Difficulty::Hard => 2,
        };
        // first and last letters always stay visible
        let hidden = pick_positions(rng, 1..len - 1, wanted.min(len - 2));
        rows.push(SequenceRow { letters, hidden });
    }

    Ok(ctx.page(
        WorksheetTypeId::AlphabetSequencing,
        "What Comes Next?",
        "Fill in the missing letters.",
        ContentBody::AlphabetSequences(AlphabetSequences { case, rows }),
        rng,
    ))
}

fn beginning_sounds(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let set = letter_set(req, &BEGINNING_SOUND_SETS, rng)?;
    let left = letter_range(set);
    let pictures: Vec<MatchTarget> = left
        .iter()
        .map(|&c| MatchTarget::Picture(ctx.catalog.letter_picture(c, rng)))
        .collect();
    let body = matching(format!("{}-{}", set.0, set.1), left, pictures, rng);
    Ok(ctx.page(
        WorksheetTypeId::BeginningSounds,
        "Beginning Sounds",
        "Draw a line from each letter to the picture that starts with its sound.",
        body,
        rng,
    ))
}

fn match_upper_lower(req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let set = letter_set(req, &UPPER_LOWER_SETS, rng)?;
    let left = letter_range(set);
    let lower: Vec<MatchTarget> = left.iter().map(|c| MatchTarget::Letter(c.to_ascii_lowercase())).collect();
    let body = matching(format!("{}-{}", set.0, set.1), left, lower, rng);
    Ok(ctx.page(
        WorksheetTypeId::MatchUpperLower,
        "Match Big and Small Letters",
        "Draw a line from each uppercase letter to its lowercase partner.",
        body,
        rng,
    ))
}

/// Shuffle `targets` into the right column and record where each went.
fn matching(set: String, left: Vec<char>, targets: Vec<MatchTarget>, rng: &mut dyn RngCore) -> ContentBody {
    let order = permutation(rng, targets.len(), true);
    let mut answers = vec![0; left.len()];
    for (slot, &source) in order.iter().enumerate() {
        if let Some(a) = answers.get_mut(source) {
            *a = slot;
        }
    }
    let right = order.iter().map(|&i| targets[i].clone()).collect();
    ContentBody::LetterMatching(LetterMatching {
        set,
        left,
        right,
        answers,
    })
}

fn cvc_words(_req: &WorksheetRequest, ctx: &SynthContext<'_>, rng: &mut dyn RngCore) -> Result<ContentSpec> {
    let mut pool = CVC_LIST.to_vec();
    pool.shuffle(rng);
    let words = pool
        .into_iter()
        .take(CVC_WORDS_PER_PAGE)
        .map(|(word, glyph)| CvcWord {
            word: word.to_string(),
            picture: AssetRef::Glyph(glyph.to_string()),
        })
        .collect();
    Ok(ctx.page(
        WorksheetTypeId::CvcWords,
        "Read and Write",
        "Say each sound, then write the word under its picture.",
        ContentBody::CvcWords(CvcWords { words }),
        rng,
    ))
}
