//! The [`MoleculeSet`] bitset.
//!
//! Reactions declare the molecules they read and write as sets of
//! [`MoleculeId`]s. The dependency graph decides whether one reaction
//! can invalidate another by intersecting a write set with a read set,
//! so the representation is a dense bitset: intersection tests are a
//! handful of word ANDs regardless of set size.

use crate::id::MoleculeId;

/// A set of molecule IDs implemented as a dynamically-sized bitset.
#[derive(Clone, Debug, Default)]
pub struct MoleculeSet {
    words: Vec<u64>,
}

const WORD_BITS: usize = 64;

impl MoleculeSet {
    /// Create an empty set.
    pub fn empty() -> Self {
        Self { words: Vec::new() }
    }

    /// Insert a molecule ID.
    pub fn insert(&mut self, molecule: MoleculeId) {
        let word = molecule.0 as usize / WORD_BITS;
        let bit = molecule.0 as usize % WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    /// Whether the set contains a molecule ID.
    pub fn contains(&self, molecule: MoleculeId) -> bool {
        let word = molecule.0 as usize / WORD_BITS;
        let bit = molecule.0 as usize % WORD_BITS;
        word < self.words.len() && (self.words[word] & (1u64 << bit)) != 0
    }

    /// Whether the two sets share at least one molecule.
    ///
    /// This is the dependency graph's hot path; it short-circuits on
    /// the first overlapping word.
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    /// The union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        let longest = self.words.len().max(other.words.len());
        let words = (0..longest)
            .map(|i| {
                self.words.get(i).copied().unwrap_or(0)
                    | other.words.get(i).copied().unwrap_or(0)
            })
            .collect();
        Self { words }
    }

    /// Whether the set contains no molecules.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of molecules in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the molecule IDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = MoleculeId> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            (0..WORD_BITS).filter_map(move |bit| {
                if word & (1u64 << bit) != 0 {
                    Some(MoleculeId((wi * WORD_BITS + bit) as u32))
                } else {
                    None
                }
            })
        })
    }
}

impl PartialEq for MoleculeSet {
    fn eq(&self, other: &Self) -> bool {
        let longest = self.words.len().max(other.words.len());
        (0..longest).all(|i| {
            self.words.get(i).copied().unwrap_or(0) == other.words.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for MoleculeSet {}

impl FromIterator<MoleculeId> for MoleculeSet {
    fn from_iter<I: IntoIterator<Item = MoleculeId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for molecule in iter {
            set.insert(molecule);
        }
        set
    }
}
