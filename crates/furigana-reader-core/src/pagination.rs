//! Page navigation state.
//!
//! The current page is always within `1..=page_count`. The page-number input
//! is tracked separately so it can hold half-typed text until it is committed.

use std::num::IntErrorKind;

/// Navigation state for one mounted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current: u32,
    page_count: u32,
    input: String,
}

impl Paginator {
    /// Start at `initial_page` when it is a valid page, otherwise at page 1.
    ///
    /// A `page_count` of zero is treated as a single page.
    pub fn new(page_count: u32, initial_page: Option<u32>) -> Self {
        let page_count = page_count.max(1);
        let current = initial_page
            .filter(|p| (1..=page_count).contains(p))
            .unwrap_or(1);
        Self {
            current,
            page_count,
            input: current.to_string(),
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Text currently shown in the page-number control
    pub fn input(&self) -> &str {
        &self.input
    }

    pub const fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub const fn has_next(&self) -> bool {
        self.current < self.page_count
    }

    /// Clamp target into range and make it current. Returns the new page.
    pub fn navigate(&mut self, target: i64) -> u32 {
        let clamped = target.clamp(1, i64::from(self.page_count));
        // clamp keeps the value within 1..=u32::MAX
        self.current = u32::try_from(clamped).unwrap_or(self.page_count);
        self.input = self.current.to_string();
        self.current
    }

    /// Step back one page; `None` when already on the first page.
    pub fn previous(&mut self) -> Option<u32> {
        self.has_previous()
            .then(|| self.navigate(i64::from(self.current) - 1))
    }

    /// Step forward one page; `None` when already on the last page.
    pub fn next(&mut self) -> Option<u32> {
        self.has_next()
            .then(|| self.navigate(i64::from(self.current) + 1))
    }

    /// Replace the raw input buffer without validating it.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Commit the input buffer.
    ///
    /// Unparseable text restores the buffer to the current page and returns
    /// `None`; anything numeric navigates (clamped) and returns the new page.
    /// Digit strings too large for `i64` clamp like any other out-of-range
    /// number.
    pub fn commit_input(&mut self) -> Option<u32> {
        match self.input.trim().parse::<i64>() {
            Ok(target) => Some(self.navigate(target)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(self.navigate(i64::MAX)),
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => Some(self.navigate(i64::MIN)),
            Err(_) => {
                self.input = self.current.to_string();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_page() {
        assert_eq!(Paginator::new(3, None).current(), 1);
        assert_eq!(Paginator::new(3, Some(2)).current(), 2);
        assert_eq!(Paginator::new(3, Some(0)).current(), 1);
        assert_eq!(Paginator::new(3, Some(9)).current(), 1);
        assert_eq!(Paginator::new(3, Some(2)).input(), "2");
    }

    #[test]
    fn test_commit_overflowing_number_clamps() {
        let mut p = Paginator::new(3, Some(2));
        p.set_input("99999999999999999999");
        assert_eq!(p.commit_input(), Some(3));
        assert_eq!(p.input(), "3");

        p.set_input("-99999999999999999999");
        assert_eq!(p.commit_input(), Some(1));

        p.set_input("3a");
        assert_eq!(p.commit_input(), None);
        assert_eq!(p.input(), "1");
    }

    #[test]
    fn test_zero_page_count_is_single_page() {
        let mut p = Paginator::new(0, None);
        assert_eq!(p.page_count(), 1);
        assert_eq!(p.navigate(5), 1);
    }

    #[test]
    fn test_navigate_clamps() {
        let mut p = Paginator::new(3, None);
        assert_eq!(p.navigate(0), 1);
        assert_eq!(p.navigate(5), 3);
        assert_eq!(p.navigate(-20), 1);
        assert_eq!(p.navigate(2), 2);
        assert_eq!(p.input(), "2");
    }

    #[test]
    fn test_clamp_holds_for_all_targets() {
        for n in 1..=6_u32 {
            let mut p = Paginator::new(n, None);
            for target in -3..=10_i64 {
                let expected = target.clamp(1, i64::from(n));
                assert_eq!(i64::from(p.navigate(target)), expected);
            }
        }
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut p = Paginator::new(2, None);
        assert!(!p.has_previous());
        assert_eq!(p.previous(), None);
        assert_eq!(p.current(), 1);

        assert_eq!(p.next(), Some(2));
        assert!(!p.has_next());
        assert_eq!(p.next(), None);
        assert_eq!(p.current(), 2);

        assert_eq!(p.previous(), Some(1));
    }

    #[test]
    fn test_commit_input() {
        let mut p = Paginator::new(5, None);
        p.set_input("3");
        assert_eq!(p.commit_input(), Some(3));
        assert_eq!(p.current(), 3);

        p.set_input(" 999 ");
        assert_eq!(p.commit_input(), Some(5));
        assert_eq!(p.input(), "5");

        p.set_input("0");
        assert_eq!(p.commit_input(), Some(1));
        assert_eq!(p.input(), "1");
    }

    #[test]
    fn test_commit_garbage_reverts() {
        let mut p = Paginator::new(5, Some(4));
        p.set_input("abc");
        assert_eq!(p.input(), "abc");
        assert_eq!(p.commit_input(), None);
        assert_eq!(p.current(), 4);
        assert_eq!(p.input(), "4");

        p.set_input("");
        assert_eq!(p.commit_input(), None);
        assert_eq!(p.input(), "4");
    }
}
