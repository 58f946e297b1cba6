//! Splay tree: a self-adjusting BST that moves every accessed node to the root.
//!
//! Reuses [`BstNode`] directly — the source defines `sp_tree`/`sp_node` as plain
//! aliases of `bs_tree`/`bs_node`, so there is no shape difference to express here,
//! only a different access discipline (every operation splays).
//!
//! Because splaying reshapes the tree on every access, every method here —
//! including reads — takes `&mut self`. There is deliberately no read-only method
//! on `SpTree<T>`.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::bst::BstNode;
use crate::comparator::Cmp;
use crate::error::{Result, TreeError};
use crate::traversal::{merge_into, OrderedSink, SetOp, VecCursor};

/// Top-down simple splay (Sleator-Tarjan): walks toward `key`, folding each
/// zig-zig pair into a single rotation as it goes, and partitions everything it
/// passes into a "less than key" chain and a "greater than key" chain. Both
/// chains are relinked onto the node the walk stops at, which becomes the new
/// root. No parent pointers, no second pass.
fn splay<T>(mut t: Box<BstNode<T>>, key: &T, cmp: &Cmp<T>) -> Box<BstNode<T>> {
    let mut lesser_chain: Vec<Box<BstNode<T>>> = Vec::new();
    let mut greater_chain: Vec<Box<BstNode<T>>> = Vec::new();

    loop {
        match cmp.compare(key, &t.element) {
            Ordering::Less => {
                if t.left.is_none() {
                    break;
                }
                if cmp.compare(key, &t.left.as_ref().unwrap().element) == Ordering::Less {
                    let mut y = t.left.take().unwrap();
                    t.left = y.right.take();
                    y.right = Some(t);
                    t = y;
                    if t.left.is_none() {
                        break;
                    }
                }
                let mut next = t.left.take().unwrap();
                std::mem::swap(&mut t, &mut next);
                greater_chain.push(next);
            }
            Ordering::Greater => {
                if t.right.is_none() {
                    break;
                }
                if cmp.compare(key, &t.right.as_ref().unwrap().element) == Ordering::Greater {
                    let mut y = t.right.take().unwrap();
                    t.right = y.left.take();
                    y.left = Some(t);
                    t = y;
                    if t.right.is_none() {
                        break;
                    }
                }
                let mut next = t.right.take().unwrap();
                std::mem::swap(&mut t, &mut next);
                lesser_chain.push(next);
            }
            Ordering::Equal => break,
        }
    }

    let mut right_tree = t.right.take();
    for mut node in greater_chain.into_iter().rev() {
        node.left = right_tree;
        right_tree = Some(node);
    }
    let mut left_tree = t.left.take();
    for mut node in lesser_chain.into_iter().rev() {
        node.right = left_tree;
        left_tree = Some(node);
    }
    t.left = left_tree;
    t.right = right_tree;
    t
}

/// Specialization of [`splay`] that always descends left, bringing the minimum to
/// the root without any comparisons.
fn splay_min<T>(mut t: Box<BstNode<T>>) -> Box<BstNode<T>> {
    let mut greater_chain: Vec<Box<BstNode<T>>> = Vec::new();
    loop {
        if t.left.is_none() {
            break;
        }
        let mut y = t.left.take().unwrap();
        t.left = y.right.take();
        y.right = Some(t);
        t = y;
        if t.left.is_none() {
            break;
        }
        let mut next = t.left.take().unwrap();
        std::mem::swap(&mut t, &mut next);
        greater_chain.push(next);
    }
    let mut right_tree = t.right.take();
    for mut node in greater_chain.into_iter().rev() {
        node.left = right_tree;
        right_tree = Some(node);
    }
    t.right = right_tree;
    t
}

/// Specialization of [`splay`] that always descends right, bringing the maximum to
/// the root without any comparisons.
fn splay_max<T>(mut t: Box<BstNode<T>>) -> Box<BstNode<T>> {
    let mut lesser_chain: Vec<Box<BstNode<T>>> = Vec::new();
    loop {
        if t.right.is_none() {
            break;
        }
        let mut y = t.right.take().unwrap();
        t.right = y.left.take();
        y.left = Some(t);
        t = y;
        if t.right.is_none() {
            break;
        }
        let mut next = t.right.take().unwrap();
        std::mem::swap(&mut t, &mut next);
        lesser_chain.push(next);
    }
    let mut left_tree = t.left.take();
    for mut node in lesser_chain.into_iter().rev() {
        node.right = left_tree;
        left_tree = Some(node);
    }
    t.left = left_tree;
    t
}

/// A self-adjusting binary search tree.
pub struct SpTree<T> {
    pub(crate) root: Option<Box<BstNode<T>>>,
    pub(crate) cmp: Cmp<T>,
}

impl<T> SpTree<T> {
    pub fn new(cmp: Cmp<T>) -> Self {
        SpTree { root: None, cmp }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn search(&mut self, key: &T) -> Option<Rc<T>> {
        log::trace!("spt: search");
        let root = self.root.take()?;
        let splayed = splay(root, key, &self.cmp);
        let found = if self.cmp.compare(key, &splayed.element) == Ordering::Equal {
            Some(splayed.element.clone())
        } else {
            None
        };
        self.root = Some(splayed);
        found
    }

    pub fn min(&mut self) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let splayed = splay_min(root);
        let result = splayed.element.clone();
        self.root = Some(splayed);
        Some(result)
    }

    pub fn max(&mut self) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let splayed = splay_max(root);
        let result = splayed.element.clone();
        self.root = Some(splayed);
        Some(result)
    }

    pub fn prev(&mut self, key: &T) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let mut splayed = splay(root, key, &self.cmp);
        if self.cmp.compare(&splayed.element, key) == Ordering::Less {
            let result = splayed.element.clone();
            self.root = Some(splayed);
            return Some(result);
        }
        let result = match splayed.left.take() {
            None => None,
            Some(left) => {
                let splayed_left = splay_max(left);
                let result = splayed_left.element.clone();
                splayed.left = Some(splayed_left);
                Some(result)
            }
        };
        self.root = Some(splayed);
        result
    }

    pub fn next(&mut self, key: &T) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let mut splayed = splay(root, key, &self.cmp);
        if self.cmp.compare(&splayed.element, key) == Ordering::Greater {
            let result = splayed.element.clone();
            self.root = Some(splayed);
            return Some(result);
        }
        let result = match splayed.right.take() {
            None => None,
            Some(right) => {
                let splayed_right = splay_min(right);
                let result = splayed_right.element.clone();
                splayed.right = Some(splayed_right);
                Some(result)
            }
        };
        self.root = Some(splayed);
        result
    }

    pub fn insert(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        log::trace!("spt: insert");
        match self.root.take() {
            None => {
                self.root = Some(BstNode::leaf(element));
                None
            }
            Some(root) => {
                let mut splayed = splay(root, &element, &self.cmp);
                match self.cmp.compare(&element, &splayed.element) {
                    Ordering::Equal => {
                        let old = std::mem::replace(&mut splayed.element, element);
                        self.root = Some(splayed);
                        Some(old)
                    }
                    Ordering::Less => {
                        let left = splayed.left.take();
                        let new_root = Box::new(BstNode {
                            element,
                            left,
                            right: Some(splayed),
                        });
                        self.root = Some(new_root);
                        None
                    }
                    Ordering::Greater => {
                        let right = splayed.right.take();
                        let new_root = Box::new(BstNode {
                            element,
                            left: Some(splayed),
                            right,
                        });
                        self.root = Some(new_root);
                        None
                    }
                }
            }
        }
    }

    /// Precondition: `element` is less than or equal to every existing element.
    pub fn insert_min(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        match self.root.take() {
            None => {
                self.root = Some(BstNode::leaf(element));
                None
            }
            Some(root) => {
                let mut splayed = splay_min(root);
                debug_assert!(
                    self.cmp.compare(&element, &splayed.element) != Ordering::Greater,
                    "insert_min precondition violated"
                );
                if self.cmp.compare(&element, &splayed.element) == Ordering::Equal {
                    let old = std::mem::replace(&mut splayed.element, element);
                    self.root = Some(splayed);
                    return Some(old);
                }
                self.root = Some(Box::new(BstNode {
                    element,
                    left: None,
                    right: Some(splayed),
                }));
                None
            }
        }
    }

    pub fn try_insert_min(&mut self, element: Rc<T>) -> Result<Option<Rc<T>>> {
        if let Some(m) = self.min() {
            if self.cmp.compare(&element, &m) == Ordering::Greater {
                return Err(TreeError::NotMinimal);
            }
        }
        Ok(self.insert_min(element))
    }

    /// Precondition: `element` is greater than or equal to every existing element.
    pub fn insert_max(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        match self.root.take() {
            None => {
                self.root = Some(BstNode::leaf(element));
                None
            }
            Some(root) => {
                let mut splayed = splay_max(root);
                debug_assert!(
                    self.cmp.compare(&element, &splayed.element) != Ordering::Less,
                    "insert_max precondition violated"
                );
                if self.cmp.compare(&element, &splayed.element) == Ordering::Equal {
                    let old = std::mem::replace(&mut splayed.element, element);
                    self.root = Some(splayed);
                    return Some(old);
                }
                self.root = Some(Box::new(BstNode {
                    element,
                    left: Some(splayed),
                    right: None,
                }));
                None
            }
        }
    }

    pub fn try_insert_max(&mut self, element: Rc<T>) -> Result<Option<Rc<T>>> {
        if let Some(m) = self.max() {
            if self.cmp.compare(&element, &m) == Ordering::Less {
                return Err(TreeError::NotMaximal);
            }
        }
        Ok(self.insert_max(element))
    }

    pub fn remove(&mut self, key: &T) -> Option<Rc<T>> {
        log::trace!("spt: remove");
        let root = self.root.take()?;
        let splayed = splay(root, key, &self.cmp);
        if self.cmp.compare(key, &splayed.element) != Ordering::Equal {
            self.root = Some(splayed);
            return None;
        }
        let BstNode { element, left, right } = *splayed;
        self.root = match left {
            None => right,
            Some(l) => {
                let mut new_root = splay_max(l);
                new_root.right = right;
                Some(new_root)
            }
        };
        Some(element)
    }

    pub fn remove_min(&mut self) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let splayed = splay_min(root);
        let BstNode { element, left: _, right } = *splayed;
        self.root = right;
        Some(element)
    }

    pub fn remove_max(&mut self) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let splayed = splay_max(root);
        let BstNode { element, left, right: _ } = *splayed;
        self.root = left;
        Some(element)
    }

    /// Same iterative right-rotation teardown the BST uses; splay trees share the
    /// node shape so the same O(1)-space vine collapse applies unchanged.
    pub fn remove_all<F: FnMut(Rc<T>)>(&mut self, mut destructor: Option<F>) {
        log::debug!("spt: remove_all");
        let mut root = self.root.take();
        while let Some(mut node) = root {
            if node.left.is_some() {
                let mut left = node.left.take().unwrap();
                node.left = left.right.take();
                left.right = Some(node);
                root = Some(left);
            } else {
                let right = node.right.take();
                if let Some(d) = destructor.as_mut() {
                    d(node.element.clone());
                }
                drop(node);
                root = right;
            }
        }
    }

    /// Walks the tree in ascending order via repeated `min`/`next` splays. Legal
    /// because splaying reshapes but never changes the stored set; this is the
    /// splay tree's substitute for the borrowed `InorderCursor` the other two
    /// families use (a splay tree cannot hand out a read-only walker, since even
    /// reading reshapes it).
    fn ascending_elements(&mut self) -> Vec<Rc<T>> {
        let mut out = Vec::new();
        let mut current = self.min();
        while let Some(e) = current {
            let next = self.next(&e);
            out.push(e);
            current = next;
        }
        out
    }

    pub fn copy(&mut self) -> Self {
        log::trace!("spt: copy");
        let elements = self.ascending_elements();
        let mut out = SpTree::new(self.cmp.clone());
        for e in elements {
            out.insert_max(e);
        }
        out
    }

    fn set_op(&mut self, other: &mut Self, op: SetOp) -> Self {
        let left = VecCursor::new(self.ascending_elements());
        let right = VecCursor::new(other.ascending_elements());
        let mut out = SpTree::new(self.cmp.clone());
        merge_into(left, right, &self.cmp, op, &mut out);
        out
    }

    pub fn union(&mut self, other: &mut Self) -> Self {
        log::trace!("spt: union");
        self.set_op(other, SetOp::Union)
    }

    pub fn intersection(&mut self, other: &mut Self) -> Self {
        log::trace!("spt: intersection");
        self.set_op(other, SetOp::Intersection)
    }

    pub fn diff(&mut self, other: &mut Self) -> Self {
        log::trace!("spt: diff");
        self.set_op(other, SetOp::Diff)
    }

    pub fn sym_diff(&mut self, other: &mut Self) -> Self {
        log::trace!("spt: sym_diff");
        self.set_op(other, SetOp::SymDiff)
    }
}

impl<T> OrderedSink<T> for SpTree<T> {
    fn push_max(&mut self, element: Rc<T>) {
        self.insert_max(element);
    }
}

impl<T> Drop for SpTree<T> {
    fn drop(&mut self) {
        self.remove_all::<fn(Rc<T>)>(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SpTree<i32> {
        SpTree::new(Cmp::natural())
    }

    #[test]
    fn insert_then_search_splays_to_root() {
        let mut t = tree();
        for v in [5, 3, 8, 1, 9] {
            t.insert(Rc::new(v));
        }
        assert_eq!(t.search(&3), Some(Rc::new(3)));
        assert_eq!(t.root.as_ref().unwrap().element, Rc::new(3));
    }

    #[test]
    fn min_max_prev_next() {
        let mut t = tree();
        for v in [5, 3, 8, 1, 9, 4] {
            t.insert(Rc::new(v));
        }
        assert_eq!(t.min(), Some(Rc::new(1)));
        assert_eq!(t.max(), Some(Rc::new(9)));
        assert_eq!(t.prev(&5), Some(Rc::new(4)));
        assert_eq!(t.next(&5), Some(Rc::new(8)));
    }

    #[test]
    fn remove_preserves_remaining_elements() {
        let mut t = tree();
        for v in 0..30 {
            t.insert(Rc::new(v));
        }
        for v in (0..30).step_by(3) {
            assert_eq!(t.remove(&v), Some(Rc::new(v)));
        }
        for v in 0..30 {
            if v % 3 == 0 {
                assert_eq!(t.search(&v), None);
            } else {
                assert_eq!(t.search(&v), Some(Rc::new(v)));
            }
        }
    }

    #[test]
    fn set_operations() {
        let mut odd = tree();
        let mut even = tree();
        for v in 0..20 {
            if v % 2 == 0 {
                even.insert(Rc::new(v));
            } else {
                odd.insert(Rc::new(v));
            }
        }
        let mut union = odd.union(&mut even);
        let all = union.ascending_elements();
        assert_eq!(all, (0..20).map(Rc::new).collect::<Vec<_>>());
    }

    #[test]
    fn remove_all_on_large_tree_does_not_overflow_stack() {
        let mut t = tree();
        for v in 0..100_000 {
            t.insert_max(Rc::new(v));
        }
        t.remove_all::<fn(Rc<i32>)>(None);
        assert!(t.is_empty());
    }
}
