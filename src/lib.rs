//! Ordered-associative containers over an externally supplied comparator.
//!
//! Three tree families share the same operation surface — insert, search, ordered
//! navigation, deletion, bulk teardown, and set algebra (union/intersection/diff/
//! sym_diff) — but differ in their balancing discipline:
//!
//! - [`bst::BstTree`] never rebalances itself; call [`bst::BstTree::rebalance`]
//!   explicitly after building up a pathological shape.
//! - [`rbt::RbTree`] keeps worst-case `O(log n)` height through every mutation.
//! - [`spt::SpTree`] has no fixed shape at all; every access splays, giving
//!   amortized `O(log n)` operations with strong working-set locality.
//!
//! Elements are never owned uniquely by a tree: they are passed and returned as
//! `Rc<T>`, so the same element can be referenced by more than one container at
//! once (most visibly right after a set operation, whose result shares element
//! handles with its operands).

pub mod bst;
pub mod comparator;
pub mod diagnostics;
pub mod error;
pub mod rbt;
pub mod spt;
pub mod traversal;

pub use bst::BstTree;
pub use comparator::Cmp;
pub use error::{Result, TreeError};
pub use rbt::RbTree;
pub use spt::SpTree;
