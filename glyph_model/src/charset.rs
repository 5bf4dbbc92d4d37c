use std::collections::HashMap;

use crate::{ModelErr, Result};

/// Amount of glyphs the model was trained on.
pub const NUM_CHARS: usize = 62;

/// Dense class id of a supported glyph, in `0..NUM_CHARS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharId(usize);

impl CharId {
    /// Returns the position of this id inside a one-hot vector.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bijection between the supported glyphs and their class ids.
///
/// Uppercase letters come first, then lowercase letters and finally digits,
/// so `'A'` is 0, `'a'` is 26 and `'0'` is 52.
#[derive(Debug, Clone)]
pub struct CharIndex {
    ids: HashMap<char, CharId>,
    chars: Vec<char>,
}

impl CharIndex {
    /// Creates a new `CharIndex`.
    ///
    /// # Returns
    /// A new `CharIndex` instance covering the 62 supported glyphs.
    pub fn new() -> Self {
        let chars: Vec<char> = ('A'..='Z').chain('a'..='z').chain('0'..='9').collect();
        let ids = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, CharId(i)))
            .collect();

        Self { ids, chars }
    }

    /// Resolves the class id of a glyph.
    ///
    /// # Arguments
    /// * `c` - The glyph to resolve.
    ///
    /// # Returns
    /// The id of `c` or `InvalidCharacter` if it isn't supported.
    pub fn id_of(&self, c: char) -> Result<CharId> {
        self.ids
            .get(&c)
            .copied()
            .ok_or(ModelErr::InvalidCharacter(c))
    }

    /// Resolves the class id of the first character of `s`.
    ///
    /// # Arguments
    /// * `s` - A string whose first character is the requested glyph.
    ///
    /// # Returns
    /// The id of the glyph, `EmptyCharacter` if `s` is empty or
    /// `InvalidCharacter` if the glyph isn't supported.
    pub fn id_of_str(&self, s: &str) -> Result<CharId> {
        let c = s.chars().next().ok_or(ModelErr::EmptyCharacter)?;
        self.id_of(c)
    }

    /// Inverse lookup of `id_of`.
    pub fn char_of(&self, id: CharId) -> Option<char> {
        self.chars.get(id.0).copied()
    }

    /// Iterates every supported glyph in id order.
    pub fn iter(&self) -> impl Iterator<Item = (char, CharId)> + '_ {
        self.chars.iter().enumerate().map(|(i, &c)| (c, CharId(i)))
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for CharIndex {
    fn default() -> Self {
        Self::new()
    }
}
