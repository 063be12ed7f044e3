//! [`Unit`] code generation.
//!
//! Generation never touches the store: callers supply the full set of
//! already-used codes, so it stays deterministic and testable in isolation.

use std::{collections::HashSet, str::FromStr};

use derive_more::{AsRef, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::unit::{Floor, Stack, Tower};
#[cfg(doc)]
use crate::domain::{Incorporation, Unit};

/// Tower key used in generated [`Code`]s of [`Unit`]s without a [`Tower`].
const NO_TOWER_KEY: &str = "T";

/// Maximum `-{n}` suffix tried before giving up on collision resolution.
const MAX_SUFFIX: u32 = 999;

/// Code of a [`Unit`], unique within its [`Incorporation`]
/// case-insensitively.
///
/// Stored upper-cased, so derived equality is already case-insensitive.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Code(String);

impl Code {
    /// Creates a new [`Code`] if the given `code` is valid, upper-casing it.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then(|| Self(code.to_ascii_uppercase()))
    }

    /// Creates a new [`Code`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `code` must be upper-cased and match the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the string view of this [`Code`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        !code.is_empty()
            && code.len() <= 64
            && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }

    /// Generates a collision-free [`Code`] for the provided position.
    ///
    /// The base form is `{tower key}{floor:02}{stack}`, upper-cased. On
    /// collision with the `used` set, `-1`, `-2`, … suffixes are tried.
    ///
    /// # Errors
    ///
    /// [`GenerationError`] when no unique code is found within
    /// [`MAX_SUFFIX`] attempts.
    pub fn generate(
        tower: Option<&Tower>,
        floor: Floor,
        stack: &Stack,
        used: &CodeSet,
    ) -> Result<Self, GenerationError> {
        let base = format!("{}{floor:02}{stack}", tower_key(tower))
            .to_ascii_uppercase();
        if !used.contains(&base) {
            return Ok(Self(base));
        }

        (1..=MAX_SUFFIX)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !used.contains(candidate))
            .map(Self)
            .ok_or(GenerationError { base })
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// Error of generating a unique [`Code`].
#[derive(Clone, Debug, Display, Error)]
#[display("no unique code derivable from `{base}` within bounds")]
pub struct GenerationError {
    /// Base form all attempted candidates were derived from.
    pub base: String,
}

/// Case-insensitive set of [`Code`]s already used within an
/// [`Incorporation`].
#[derive(Clone, Debug, Default)]
pub struct CodeSet(HashSet<String>);

impl CodeSet {
    /// Creates a new empty [`CodeSet`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates whether the set contains the given `code`,
    /// case-insensitively.
    #[must_use]
    pub fn contains(&self, code: impl AsRef<str>) -> bool {
        self.0.contains(&code.as_ref().to_ascii_uppercase())
    }

    /// Inserts the given `code` into the set.
    ///
    /// Returns whether the code was newly inserted.
    pub fn insert(&mut self, code: impl AsRef<str>) -> bool {
        self.0.insert(code.as_ref().to_ascii_uppercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for CodeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|c| c.as_ref().to_ascii_uppercase())
                .collect(),
        )
    }
}

/// Maps a 0-based block index onto a spreadsheet-style label:
/// `A`, `B`, …, `Z`, `AA`, `AB`, … (bijective base-26, no zero digit).
#[must_use]
pub fn block_label(index: u32) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        label.push(b'A' + u8::try_from(n % 26).expect("remainder below 26"));
        n /= 26;
    }
    label.reverse();
    String::from_utf8(label).expect("ASCII letters only")
}

/// Maps a 1-based stack index onto a column label: zero-padded to 2 digits
/// up to 99, a `U`-prefixed wider form beyond.
#[must_use]
pub fn stack_code(index: u32) -> String {
    if index <= 99 {
        format!("{index:02}")
    } else {
        format!("U{index}")
    }
}

/// Derives the short tower key of a [`Code`]: the tower label stripped to
/// alphanumerics and upper-cased, or [`NO_TOWER_KEY`] when there is no tower
/// (or nothing remains after stripping).
#[must_use]
pub fn tower_key(tower: Option<&Tower>) -> String {
    let key = tower
        .map(|t| {
            t.as_str()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_uppercase()
        })
        .unwrap_or_default();
    if key.is_empty() {
        NO_TOWER_KEY.to_owned()
    } else {
        key
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::unit::{Stack, Tower};

    use super::{block_label, stack_code, tower_key, Code, CodeSet};

    #[test]
    fn block_labels_are_bijective_base_26() {
        assert_eq!(block_label(0), "A");
        assert_eq!(block_label(1), "B");
        assert_eq!(block_label(25), "Z");
        assert_eq!(block_label(26), "AA");
        assert_eq!(block_label(27), "AB");
        assert_eq!(block_label(51), "AZ");
        assert_eq!(block_label(52), "BA");
        assert_eq!(block_label(701), "ZZ");
        assert_eq!(block_label(702), "AAA");
    }

    #[test]
    fn stack_codes_pad_to_two_digits() {
        assert_eq!(stack_code(1), "01");
        assert_eq!(stack_code(9), "09");
        assert_eq!(stack_code(10), "10");
        assert_eq!(stack_code(99), "99");
        assert_eq!(stack_code(100), "U100");
    }

    #[test]
    fn tower_keys_strip_to_alphanumerics() {
        let tower = |s: &str| Tower::new(s).unwrap();

        assert_eq!(tower_key(None), "T");
        assert_eq!(tower_key(Some(&tower("A"))), "A");
        assert_eq!(tower_key(Some(&tower("Torre B"))), "TORREB");
        assert_eq!(tower_key(Some(&tower("--"))), "T");
    }

    #[test]
    fn generates_position_codes() {
        let tower = Tower::new("A").unwrap();
        let stack = Stack::new("01").unwrap();
        let used = CodeSet::new();

        let code = Code::generate(Some(&tower), 5, &stack, &used).unwrap();
        assert_eq!(code.as_str(), "A0501");

        let code = Code::generate(None, 12, &stack, &used).unwrap();
        assert_eq!(code.as_str(), "T1201");
    }

    #[test]
    fn suffixes_on_collision() {
        let tower = Tower::new("A").unwrap();
        let stack = Stack::new("01").unwrap();
        let mut used: CodeSet = ["A0501"].into_iter().collect();

        let code = Code::generate(Some(&tower), 5, &stack, &used).unwrap();
        assert_eq!(code.as_str(), "A0501-1");

        assert!(used.insert(&code));
        let code = Code::generate(Some(&tower), 5, &stack, &used).unwrap();
        assert_eq!(code.as_str(), "A0501-2");
    }

    #[test]
    fn collisions_are_case_insensitive() {
        let tower = Tower::new("a").unwrap();
        let stack = Stack::new("01").unwrap();
        let used: CodeSet = ["a0501"].into_iter().collect();

        let code = Code::generate(Some(&tower), 5, &stack, &used).unwrap();
        assert_eq!(code.as_str(), "A0501-1");
        assert!(used.contains("A0501"));
    }

    #[test]
    fn never_returns_a_used_code() {
        let stack = Stack::new("02").unwrap();
        let mut used = CodeSet::new();

        for _ in 0..50 {
            let code = Code::generate(None, 1, &stack, &used).unwrap();
            assert!(!used.contains(&code));
            assert!(used.insert(&code));
        }
    }
}
