//! Bounded cursor over a case's ordered image slices.
//!
//! Moves past either end are silently clamped. A case without slices yields a
//! navigator that reports "no images" and ignores every move.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceNavigator {
    len: usize,
    index: usize,
}

impl SliceNavigator {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    /// Current position, or `None` when the case has no images.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        if self.len == 0 { None } else { Some(self.index) }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn has_images(&self) -> bool {
        self.len > 0
    }

    pub const fn next(&mut self) {
        if self.index + 1 < self.len {
            self.index += 1;
        }
    }

    pub const fn prev(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    pub const fn first(&mut self) {
        self.index = 0;
    }

    pub const fn last(&mut self) {
        self.index = self.len.saturating_sub(1);
    }

    /// Rewind to the first slice of a (possibly different) case.
    pub const fn reset(&mut self, len: usize) {
        self.len = len;
        self.index = 0;
    }

    /// The slice under the cursor.
    #[must_use]
    pub fn current<'a, T>(&self, slices: &'a [T]) -> Option<&'a T> {
        self.index().and_then(|i| slices.get(i))
    }

    /// `"Slice 2 of 5"`, or `None` when there are no images.
    #[must_use]
    pub fn caption(&self) -> Option<String> {
        self.index()
            .map(|i| format!("Slice {} of {}", i + 1, self.len))
    }
}
