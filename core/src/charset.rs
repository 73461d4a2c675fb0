//! `CharSet`: the literal member set behind [`one_of`](crate::rules::one_of)
//!
//! A plain set of `char`s. There is no class syntax (`a-z`, negation, escapes):
//! `"a-z"` is the three chars `a`, `-` and `z`.

use std::fmt;
use std::sync::Arc;

/// An immutable set of code points.
///
/// Stored sorted and deduplicated so membership is a binary search, and
/// shared behind an `Arc` so cloning a rule that holds one is cheap.
///
/// # Example
///
/// ```
/// use cpsmatch::CharSet;
///
/// let vowels = CharSet::from("aeiou");
/// assert!(vowels.contains('e'));
/// assert!(!vowels.contains('x'));
/// assert_eq!(vowels.len(), 5);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub struct CharSet {
    members: Arc<[char]>,
}

impl CharSet {
    /// Build a set from any collection of chars. Duplicates are dropped.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut members: Vec<char> = chars.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self {
            members: members.into(),
        }
    }

    /// Returns `true` if `c` is a member.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        self.members.binary_search(&c).is_ok()
    }

    /// Number of distinct members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the set has no members. `one_of` over it never matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending code point order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.members.iter().copied()
    }
}

impl From<&str> for CharSet {
    fn from(set: &str) -> Self {
        Self::new(set.chars())
    }
}

impl From<String> for CharSet {
    fn from(set: String) -> Self {
        Self::new(set.chars())
    }
}

impl From<&[char]> for CharSet {
    fn from(set: &[char]) -> Self {
        Self::new(set.iter().copied())
    }
}

impl<const N: usize> From<[char; N]> for CharSet {
    fn from(set: [char; N]) -> Self {
        Self::new(set)
    }
}

impl From<CharSet> for String {
    fn from(set: CharSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<char> for CharSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: String = self.iter().collect();
        write!(f, "{members:?}")
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: String = self.iter().collect();
        f.debug_tuple("CharSet").field(&members).finish()
    }
}
