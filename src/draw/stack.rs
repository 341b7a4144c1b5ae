//! Ordered stack of annotation filters.

use super::filters::Filter;

/// Annotations in compositing order (first = bottom layer, last = top layer).
///
/// Append-only apart from [`FilterStack::undo`], which removes exactly the most recent
/// filter.
#[derive(Debug, Clone, Default)]
pub struct FilterStack {
    filters: Vec<Filter>,
    /// Maximum number of filters; 0 means unlimited.
    max: usize,
}

impl FilterStack {
    pub fn new(max: usize) -> Self {
        Self {
            filters: Vec::new(),
            max,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Adds a filter on top, enforcing the limit when `max` > 0.
    ///
    /// Hands the filter back when the stack is full.
    pub fn try_push(&mut self, filter: Filter) -> Result<(), Filter> {
        if self.max == 0 || self.filters.len() < self.max {
            self.filters.push(filter);
            Ok(())
        } else {
            Err(filter)
        }
    }

    /// Removes and returns the most recently added filter, if any.
    pub fn undo(&mut self) -> Option<Filter> {
        self.filters.pop()
    }

    /// Topmost filter, which is the one being shaped during a drag.
    pub fn last_mut(&mut self) -> Option<&mut Filter> {
        self.filters.last_mut()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }
}

impl<'a> IntoIterator for &'a FilterStack {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLACK, RED};
    use crate::draw::filters::{ShieldBlock, StraightLine};
    use crate::geometry::Point;

    fn shield() -> Filter {
        Filter::ShieldBlock(ShieldBlock::new(Point::new(0, 0), Point::new(1, 1), BLACK))
    }

    #[test]
    fn try_push_respects_limit() {
        let mut stack = FilterStack::new(1);
        assert!(stack.try_push(shield()).is_ok());
        let rejected = stack.try_push(Filter::StraightLine(StraightLine::new(
            Point::new(0, 0),
            Point::new(5, 5),
            RED,
            2.0,
        )));
        assert!(matches!(rejected, Err(Filter::StraightLine(_))));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn undo_pops_most_recent_and_tolerates_empty() {
        let mut stack = FilterStack::new(0);
        stack.try_push(shield()).unwrap();
        stack
            .try_push(Filter::StraightLine(StraightLine::new(
                Point::new(0, 0),
                Point::new(5, 5),
                RED,
                2.0,
            )))
            .unwrap();
        assert!(matches!(stack.undo(), Some(Filter::StraightLine(_))));
        assert!(matches!(stack.undo(), Some(Filter::ShieldBlock(_))));
        assert!(stack.undo().is_none());
        assert!(stack.is_empty());
    }
}
