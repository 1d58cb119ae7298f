//! Sequential case streams
//!
//! A [`CaseReader`] hands out cases one at a time. It is consumed by value:
//! whoever holds it owns the stream, and dropping it releases whatever backs
//! it, so every exit path of a test (including an early abort) destroys the
//! stream without extra bookkeeping.

use crate::dictionary::{Case, Variable};
use crate::missing::ExclusionClass;
use std::iter::Peekable;

/// A one-pass stream of cases with single-case lookahead
pub struct CaseReader<'a> {
    inner: Peekable<Box<dyn Iterator<Item = Case> + 'a>>,
    /// Cases handed out by `read` so far
    consumed: usize,
}

impl<'a> CaseReader<'a> {
    /// Wrap any case iterator
    pub fn new<I>(cases: I) -> Self
    where
        I: Iterator<Item = Case> + 'a,
    {
        let boxed: Box<dyn Iterator<Item = Case> + 'a> = Box::new(cases);
        Self {
            inner: boxed.peekable(),
            consumed: 0,
        }
    }

    /// Reader over an owned vector of cases
    pub fn from_cases(cases: Vec<Case>) -> CaseReader<'static> {
        CaseReader::new(cases.into_iter())
    }

    /// Next case, or `None` at end of stream
    pub fn read(&mut self) -> Option<Case> {
        let case = self.inner.next();
        if case.is_some() {
            self.consumed += 1;
        }
        case
    }

    /// Look at the next case without consuming it
    pub fn peek(&mut self) -> Option<&Case> {
        self.inner.peek()
    }

    /// Number of cases read so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Drop cases in which any of `vars` is missing under `exclude`
    ///
    /// This is listwise deletion: the filter applies to the whole stream, not
    /// to one analysis.
    pub fn filter_missing(self, vars: Vec<Variable>, exclude: ExclusionClass) -> CaseReader<'a> {
        CaseReader::new(self.inner.filter(move |case| {
            vars.iter()
                .all(|var| !exclude.excludes(var.missing_class(case.num(var))))
        }))
    }
}

impl Iterator for CaseReader<'_> {
    type Item = Case;

    fn next(&mut self) -> Option<Case> {
        self.read()
    }
}

impl std::fmt::Debug for CaseReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseReader")
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}
