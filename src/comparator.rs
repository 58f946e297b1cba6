//! The comparator capability shared by all three tree families.
//!
//! The original C library passes a raw `int(*)(const void*, const void*)` function
//! pointer into each tree constructor. This crate represents the same capability as
//! a cloneable `Rc<dyn Fn(&T, &T) -> Ordering>`, so a set operation's result can cheaply
//! inherit its left operand's ordering without re-deriving or re-validating it.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A total-order comparator over `T`, captured once at tree construction.
#[derive(Clone)]
pub struct Cmp<T>(Rc<dyn Fn(&T, &T) -> Ordering>);

impl<T> Cmp<T> {
    /// Wraps a comparison closure as a cloneable capability.
    pub fn new(f: impl Fn(&T, &T) -> Ordering + 'static) -> Self {
        Cmp(Rc::new(f))
    }

    /// Compares two elements under this capability.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

impl<T: Ord> Cmp<T> {
    /// Builds a capability from `T`'s natural ordering.
    pub fn natural() -> Self {
        Cmp::new(|a, b| a.cmp(b))
    }
}

impl<T> fmt::Debug for Cmp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cmp(..)")
    }
}
