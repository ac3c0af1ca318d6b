//! In-process fragment rewriting for the local modes.

use crate::collaborators::FragmentMap;
use crate::transform::mode::TransformationMode;

/// Rewrite every fragment for a local mode.
///
/// Returns `None` for modes that are not processed locally.
pub fn transform_fragments(mode: TransformationMode, fragments: &FragmentMap) -> Option<FragmentMap> {
    let rewrite: fn(&str) -> String = match mode {
        TransformationMode::XxxRandom => xxx_run,
        TransformationMode::HashesRandom => hash_run,
        TransformationMode::AbcdeBySize => alphabet_by_size,
        _ => return None,
    };

    Some(
        fragments
            .iter()
            .map(|(id, text)| (id.clone(), map_words(text, rewrite)))
            .collect(),
    )
}

/// Apply `rewrite` to each whitespace-separated word, keeping the whitespace.
fn map_words(text: &str, rewrite: fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                out.push_str(&rewrite(&word));
                word.clear();
            }
            out.push(c);
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        out.push_str(&rewrite(&word));
    }
    out
}

/// A run of `glyph` between half and one-and-a-half times the word length.
fn random_run(glyph: char, word: &str) -> String {
    let len = word.chars().count();
    let low = (len / 2).max(1);
    let high = len + len / 2;
    let n = fastrand::usize(low..=high.max(low));
    std::iter::repeat(glyph).take(n).collect()
}

fn xxx_run(word: &str) -> String {
    random_run('x', word)
}

fn hash_run(word: &str) -> String {
    random_run('#', word)
}

/// `a`, `ab`, `abc`, … sized to the word, cycling after `e`.
fn alphabet_by_size(word: &str) -> String {
    const LETTERS: [char; 5] = ['a', 'b', 'c', 'd', 'e'];
    (0..word.chars().count()).map(|i| LETTERS[i % LETTERS.len()]).collect()
}
