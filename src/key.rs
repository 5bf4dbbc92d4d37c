use std::fmt;

/// Identity of a glyph request in the cache.
///
/// The embedding is kept as the bit patterns of its values, so two requests
/// share a key only when their embeddings are bitwise identical (`0.0` and
/// `-0.0` are different keys, equal `NaN` payloads are the same key).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    id: u64,
    embedding: Box<[u32]>,
    character: char,
}

impl RequestKey {
    pub fn new(id: u64, embedding: &[f32], character: char) -> Self {
        Self {
            id,
            embedding: embedding.iter().map(|v| v.to_bits()).collect(),
            character,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn character(&self) -> char {
        self.character
    }

    /// The embedding values this key was built from.
    pub fn embedding(&self) -> impl Iterator<Item = f32> + '_ {
        self.embedding.iter().map(|&bits| f32::from_bits(bits))
    }
}

impl fmt::Debug for RequestKey {
    // Printing forty floats per log line helps nobody.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {:?} ({}-d embedding)",
            self.id,
            self.character,
            self.embedding.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn same_content_same_key() {
        let a = RequestKey::new(1, &[0.1, 0.2], 'A');
        let b = RequestKey::new(1, &[0.1, 0.2][..], 'A');

        assert_eq!(a, b);
        assert_eq!(HashSet::from([a, b]).len(), 1);
    }

    #[test]
    fn every_field_takes_part() {
        let base = RequestKey::new(1, &[0.1, 0.2], 'A');

        assert_ne!(base, RequestKey::new(2, &[0.1, 0.2], 'A'));
        assert_ne!(base, RequestKey::new(1, &[0.1, 0.3], 'A'));
        assert_ne!(base, RequestKey::new(1, &[0.1, 0.2], 'a'));
    }

    #[test]
    fn keys_compare_bit_patterns() {
        assert_ne!(RequestKey::new(0, &[0.0], 'x'), RequestKey::new(0, &[-0.0], 'x'));
        assert_eq!(
            RequestKey::new(0, &[f32::NAN], 'x'),
            RequestKey::new(0, &[f32::NAN], 'x')
        );
    }

    #[test]
    fn embedding_is_recovered() {
        let key = RequestKey::new(3, &[0.25, -1.5], 'q');
        assert_eq!(key.embedding().collect::<Vec<_>>(), vec![0.25, -1.5]);
        assert_eq!(format!("{key:?}"), "#3 'q' (2-d embedding)");
    }
}
