//! Placeholder text used to overwrite ConfigMap values

use rand::seq::SliceRandom;
use rand::Rng;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "voluptate",
];

const MIN_WORDS: usize = 4;
const MAX_WORDS: usize = 12;

/// Source of replacement text
pub trait TextSource {
    fn next_text(&mut self) -> String;
}

impl<F> TextSource for F
where
    F: FnMut() -> String,
{
    fn next_text(&mut self) -> String {
        self()
    }
}

/// Lorem ipsum sentences drawn from an owned RNG
pub struct Lorem<R> {
    rng: R,
}

impl<R: Rng> Lorem<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TextSource for Lorem<R> {
    fn next_text(&mut self) -> String {
        sentence(&mut self.rng)
    }
}

/// A capitalized sentence of 4 to 12 words ending with a period
pub fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(MIN_WORDS..=MAX_WORDS);
    let words: Vec<&str> = (0..count)
        .filter_map(|_| WORDS.choose(&mut *rng).copied())
        .collect();

    let mut text = words.join(" ");
    if let Some(first) = text.get(..1) {
        let upper = first.to_uppercase();
        text.replace_range(..1, &upper);
    }
    text.push('.');
    text
}
