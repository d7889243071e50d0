use super::markup::Markup;
use crate::synth::{
    AlphabetSequences, CvcWords, LetterGrid, LetterMatching, LetterTracing, MatchTarget, NameTracing, ReservedBlock,
};

pub(super) const CSS: &str = r#"
.reference { display: flex; align-items: center; gap: 24px; padding: 12px 18px; border: 3px solid var(--secondary); border-radius: 16px; }
.reference .big-letter { font-size: 120px; line-height: 1; color: var(--primary); font-weight: 700; }
.reference .picture { width: 130px; height: 130px; font-size: 100px; line-height: 130px; }
.reference .word { font-size: 32px; }
.trace-row { display: flex; justify-content: space-around; border-bottom: 2px dashed #999; border-top: 2px solid #666; font-size: 84px; line-height: 104px; height: 108px; }
.write-row { height: 108px; border-top: 2px solid #666; border-bottom: 2px solid #666; background: linear-gradient(transparent 49%, #ddd 49%, #ddd 51%, transparent 51%); }
.letter-grid { display: grid; gap: 6px; flex: 1; }
.letter-grid .cell { display: flex; align-items: center; justify-content: center; border: 2px solid var(--secondary); border-radius: 10px; font-size: 30px; font-weight: 700; }
.letter-grid .reserved { display: flex; align-items: center; justify-content: center; border: 3px dashed var(--primary); border-radius: 14px; }
.letter-grid .reserved .asset { width: 80%; height: 80%; font-size: 90px; }
.target-legend { font-size: 24px; }
.target-legend b { color: var(--accent); font-size: 36px; }
.name-row { display: flex; gap: 10px; font-size: 72px; line-height: 96px; border-bottom: 2px dashed #999; }
.mascot { width: 120px; height: 120px; font-size: 96px; align-self: flex-end; }
.sequence { display: flex; gap: 14px; justify-content: center; }
.sequence .letter, .sequence .box { width: 72px; height: 72px; font-size: 48px; line-height: 66px; text-align: center; border: 3px solid var(--secondary); border-radius: 12px; }
.matching { display: flex; justify-content: space-between; flex: 1; padding: 0 60px; }
.matching .column { display: flex; flex-direction: column; justify-content: space-around; }
.matching .item { display: flex; align-items: center; gap: 12px; font-size: 52px; }
.matching .item .asset { width: 80px; height: 80px; font-size: 64px; }
.matching .dot { width: 16px; height: 16px; border-radius: 50%; background: var(--primary); }
.cvc { display: grid; grid-template-columns: repeat(3, 1fr); gap: 20px; flex: 1; }
.cvc .card { display: flex; flex-direction: column; align-items: center; justify-content: space-around; border: 3px solid var(--secondary); border-radius: 16px; }
.cvc .card .asset { width: 110px; height: 110px; font-size: 90px; }
.cvc .letters { display: flex; gap: 8px; }
"#;

pub(super) fn letter_tracing(out: &mut Markup<'_>, t: &LetterTracing) {
    let letter = t.letter.to_string();
    out.open("div", "reference")
        .element("span", "big-letter", &letter)
        .asset(&t.picture.picture, "picture")
        .element("span", "word", &t.picture.word)
        .close("div");
    for _ in 0..t.practice_rows {
        out.open("div", "trace-row");
        for _ in 0..6 {
            out.element("span", "trace", &letter);
        }
        out.close("div");
    }
    out.empty("write-row");
}

pub(super) fn letter_grid(out: &mut Markup<'_>, g: &LetterGrid) {
    out.open("div", "target-legend")
        .text("Find: ")
        .element("b", "", &g.target.to_string())
        .close("div");

    let style = format!(
        "grid-template-columns: repeat({n}, 1fr); grid-template-rows: repeat({n}, 1fr);",
        n = g.size
    );
    out.open_with("div", "letter-grid", &[("style", &style)]);
    if let Some(block) = g.reserved {
        let place = format!(
            "grid-row: {} / span {s}; grid-column: {} / span {s};",
            block.row + 1,
            block.col + 1,
            s = ReservedBlock::SIZE
        );
        out.open_with("div", "reserved", &[("style", &place)]);
        if let Some(picture) = &g.picture {
            out.asset(picture, "");
        }
        out.close("div");
    }
    for row in 0..g.size {
        for col in 0..g.size {
            if let Some(letter) = g.cell(row, col) {
                let place = format!("grid-row: {}; grid-column: {};", row + 1, col + 1);
                out.open_with("div", "cell", &[("style", &place)])
                    .text(&letter.to_string())
                    .close("div");
            }
        }
    }
    out.close("div");
}

pub(super) fn name_tracing(out: &mut Markup<'_>, n: &NameTracing) {
    for _ in 0..n.rows {
        out.open("div", "name-row");
        for letter in n.name.chars() {
            out.element("span", "trace", &letter.to_string());
        }
        out.close("div");
    }
    out.empty("write-row");
    out.asset(&n.mascot, "mascot");
}

pub(super) fn alphabet_sequences(out: &mut Markup<'_>, a: &AlphabetSequences) {
    for row in &a.rows {
        out.open("div", "sequence");
        for (i, letter) in row.letters.iter().enumerate() {
            if row.hidden.contains(&i) {
                out.empty("box");
            } else {
                out.element("span", "letter", &letter.to_string());
            }
        }
        out.close("div");
    }
}

pub(super) fn letter_matching(out: &mut Markup<'_>, m: &LetterMatching) {
    out.open("div", "matching");
    out.open("div", "column left");
    for letter in &m.left {
        out.open("div", "item")
            .element("span", "letter", &letter.to_string())
            .empty("dot")
            .close("div");
    }
    out.close("div");
    out.open("div", "column right");
    for target in &m.right {
        out.open("div", "item").empty("dot");
        match target {
            MatchTarget::Letter(c) => {
                out.element("span", "letter", &c.to_string());
            }
            MatchTarget::Picture(p) => {
                out.asset(&p.picture, "");
            }
        }
        out.close("div");
    }
    out.close("div");
    out.close("div");
}

pub(super) fn cvc_words(out: &mut Markup<'_>, c: &CvcWords) {
    out.open("div", "cvc");
    for word in &c.words {
        out.open("div", "card").asset(&word.picture, "").open("div", "letters");
        for _ in word.word.chars() {
            out.empty("box");
        }
        out.close("div").close("div");
    }
    out.close("div");
}
