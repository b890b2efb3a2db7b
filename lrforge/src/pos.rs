//! Source positions.
//!
//! A [`Pos`] is an inclusive `[start, end]` range of character offsets into
//! the scanned text. Tokens carry one, and the parser joins the positions of
//! a reduction's children into the position handed to the tree builder.

use std::fmt;

/// An inclusive range of 0-based character offsets: `[start, end]`.
///
/// A single character at offset `n` is `Pos { start: n, end: n }`. The
/// end-of-input token sits one past the last character.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub start: usize,
    pub end: usize,
}

impl Pos {
    /// Creates a new `Pos`.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A position covering exactly one offset.
    #[inline]
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Bounding union of two positions.
    pub fn join(&self, other: &Pos) -> Pos {
        Pos {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Number of characters covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Returns the covered slice of `chars`, clamped to its length.
    pub fn slice<'a>(&self, chars: &'a [char]) -> &'a [char] {
        let end = (self.end + 1).min(chars.len());
        let start = self.start.min(end);
        &chars[start..end]
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "offset {}", self.start)
        } else {
            write!(f, "offsets {}..={}", self.start, self.end)
        }
    }
}

/// Build a [`Pos`] inline from inclusive start/end offsets.
///
/// ```rust
/// # use lrforge::pos;
/// let p = pos!(2, 5);
/// assert_eq!(p.len(), 4);
/// ```
#[macro_export]
macro_rules! pos {
    ($start:expr, $end:expr) => {
        $crate::Pos {
            start: $start,
            end: $end,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_bounding_union() {
        let a = Pos::new(3, 5);
        let b = Pos::new(8, 9);
        assert_eq!(a.join(&b), Pos::new(3, 9));
        assert_eq!(b.join(&a), Pos::new(3, 9));
        assert_eq!(a.join(&Pos::at(4)), a);
    }

    #[test]
    fn single_offset_has_len_one() {
        assert_eq!(Pos::at(7).len(), 1);
        assert_eq!(pos!(0, 2).len(), 3);
    }

    #[test]
    fn slice_clamps_to_input() {
        let chars: Vec<char> = "abc".chars().collect();
        assert_eq!(Pos::new(1, 2).slice(&chars), &['b', 'c']);
        assert_eq!(Pos::at(3).slice(&chars), &[] as &[char]);
    }

    #[test]
    fn display_mentions_offsets() {
        assert_eq!(Pos::at(4).to_string(), "offset 4");
        assert_eq!(Pos::new(1, 3).to_string(), "offsets 1..=3");
    }
}
