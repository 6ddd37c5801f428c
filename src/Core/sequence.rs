use std::fmt;

/// Logical position in a ring buffer.
///
/// The slot a sequence lands in is `value & (capacity - 1)`; the value itself
/// keeps growing across wraps. `-1` is reserved as the invalid sentinel, which
/// is what claims and fetches hand back when they cannot produce a position.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sequence(i64);

impl Sequence {
    /// The sentinel returned by failed claims and empty fetches.
    pub const INVALID: Sequence = Sequence(-1);

    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }

    #[inline]
    pub const fn is_invalid(self) -> bool {
        !self.is_valid()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<i64> for Sequence {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            f.debug_tuple("Sequence").field(&self.0).finish()
        } else {
            f.write_str("Sequence(INVALID)")
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#invalid")
        }
    }
}
