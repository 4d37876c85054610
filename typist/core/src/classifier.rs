//! Character Classification
//!
//! Classifies characters into the scripts the typist knows how to fumble
//! and picks a same-script substitute for a simulated typo.
//!
//! Only precomposed Hangul syllables and ASCII Latin letters are modeled.
//! Everything else is [`CharClass::Other`] and is never distorted.

use std::ops::RangeInclusive;

use rand::Rng;

/// First precomposed Hangul syllable (가)
const HANGUL_FIRST: u32 = 0xAC00;

/// Last precomposed Hangul syllable (힣)
const HANGUL_LAST: u32 = 0xD7A3;

/// How many draws a substitute gets before the typo is abandoned
pub const SUBSTITUTE_ATTEMPTS: usize = 8;

/// Script a character belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Precomposed Hangul syllable (U+AC00..=U+D7A3)
    Hangul,
    /// ASCII letter, either case
    Latin,
    /// Anything else (digits, punctuation, whitespace, other scripts)
    Other,
}

impl CharClass {
    /// Classify a single character
    #[must_use]
    pub fn of(c: char) -> Self {
        let code = u32::from(c);
        if (HANGUL_FIRST..=HANGUL_LAST).contains(&code) {
            Self::Hangul
        } else if c.is_ascii_alphabetic() {
            Self::Latin
        } else {
            Self::Other
        }
    }

    /// Code point range substitutes are drawn from for `original`
    ///
    /// Latin keeps the case of the original so a typo in `Hello` stays
    /// lowercase after the capital.
    fn alphabet_for(self, original: char) -> Option<RangeInclusive<u32>> {
        match self {
            Self::Hangul => Some(HANGUL_FIRST..=HANGUL_LAST),
            Self::Latin if original.is_ascii_uppercase() => Some(u32::from('A')..=u32::from('Z')),
            Self::Latin => Some(u32::from('a')..=u32::from('z')),
            Self::Other => None,
        }
    }
}

/// Whether two characters count as the same keystroke
///
/// Latin letters compare case-insensitively; everything else exactly.
#[must_use]
pub fn same_keystroke(a: char, b: char) -> bool {
    a.eq_ignore_ascii_case(&b)
}

/// Produce a plausible wrong character for `original`
///
/// The substitute is drawn from the same script and never matches the
/// original (case-insensitively for Latin). [`CharClass::Other`] returns
/// `original` unchanged, as does a script where no distinct character turns
/// up within [`SUBSTITUTE_ATTEMPTS`] draws.
pub fn substitute<R: Rng + ?Sized>(original: char, rng: &mut R) -> char {
    match CharClass::of(original).alphabet_for(original) {
        Some(alphabet) => substitute_from(alphabet, original, rng, SUBSTITUTE_ATTEMPTS),
        None => original,
    }
}

/// Draw from `alphabet` until a character distinct from `original` appears
fn substitute_from<R: Rng + ?Sized>(
    alphabet: RangeInclusive<u32>,
    original: char,
    rng: &mut R,
    attempts: usize,
) -> char {
    for _ in 0..attempts {
        let candidate = char::from_u32(rng.gen_range(alphabet.clone()));
        if let Some(c) = candidate {
            if !same_keystroke(c, original) {
                return c;
            }
        }
    }
    original
}
