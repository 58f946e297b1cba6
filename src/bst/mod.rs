//! Unbalanced binary search tree.
//!
//! No operation here rebalances the tree on its own; callers who build up a
//! pathological shape (e.g. by inserting an already-sorted run) call [`BstTree::rebalance`]
//! explicitly. This mirrors the source library's division of labor between the BST
//! (which only provides the shape primitives) and its self-balancing siblings.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::comparator::Cmp;
use crate::error::{Result, TreeError};
use crate::traversal::{merge_into, InorderCursor, OrderedSink, SetOp, TreeNode};

/// A BST node. `pub(crate)` fields let the splay tree module reuse this exact shape,
/// since the source defines `sp_node` as a type alias for `bs_node`.
pub struct BstNode<T> {
    pub(crate) element: Rc<T>,
    pub(crate) left: Option<Box<BstNode<T>>>,
    pub(crate) right: Option<Box<BstNode<T>>>,
}

impl<T> BstNode<T> {
    pub(crate) fn leaf(element: Rc<T>) -> Box<Self> {
        Box::new(BstNode {
            element,
            left: None,
            right: None,
        })
    }
}

impl<T> TreeNode<T> for BstNode<T> {
    fn left(&self) -> &Option<Box<Self>> {
        &self.left
    }
    fn right(&self) -> &Option<Box<Self>> {
        &self.right
    }
    fn element(&self) -> &Rc<T> {
        &self.element
    }
}

/// An unbalanced binary search tree over an external comparator.
pub struct BstTree<T> {
    pub(crate) root: Option<Box<BstNode<T>>>,
    pub(crate) cmp: Cmp<T>,
}

impl<T> BstTree<T> {
    pub fn new(cmp: Cmp<T>) -> Self {
        BstTree { root: None, cmp: cmp }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn search(&self, key: &T) -> Option<Rc<T>> {
        let mut node = &self.root;
        while let Some(n) = node {
            match self.cmp.compare(key, &n.element) {
                Ordering::Equal => return Some(n.element.clone()),
                Ordering::Less => node = &n.left,
                Ordering::Greater => node = &n.right,
            }
        }
        None
    }

    pub fn min(&self) -> Option<Rc<T>> {
        let mut node = self.root.as_ref()?;
        while let Some(n) = &node.left {
            node = n;
        }
        Some(node.element.clone())
    }

    pub fn max(&self) -> Option<Rc<T>> {
        let mut node = self.root.as_ref()?;
        while let Some(n) = &node.right {
            node = n;
        }
        Some(node.element.clone())
    }

    pub fn prev(&self, key: &T) -> Option<Rc<T>> {
        let mut node = &self.root;
        let mut candidate: Option<&Rc<T>> = None;
        while let Some(n) = node {
            if self.cmp.compare(key, &n.element) == Ordering::Greater {
                candidate = Some(&n.element);
                node = &n.right;
            } else {
                node = &n.left;
            }
        }
        candidate.cloned()
    }

    pub fn next(&self, key: &T) -> Option<Rc<T>> {
        let mut node = &self.root;
        let mut candidate: Option<&Rc<T>> = None;
        while let Some(n) = node {
            if self.cmp.compare(key, &n.element) == Ordering::Less {
                candidate = Some(&n.element);
                node = &n.left;
            } else {
                node = &n.right;
            }
        }
        candidate.cloned()
    }

    pub fn insert(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        log::trace!("bst: insert");
        let mut cursor = &mut self.root;
        loop {
            match cursor {
                None => {
                    *cursor = Some(BstNode::leaf(element));
                    return None;
                }
                Some(node) => match self.cmp.compare(&element, &node.element) {
                    Ordering::Equal => {
                        return Some(std::mem::replace(&mut node.element, element));
                    }
                    Ordering::Less => cursor = &mut cursor.as_mut().unwrap().left,
                    Ordering::Greater => cursor = &mut cursor.as_mut().unwrap().right,
                },
            }
        }
    }

    /// Attaches `element` as the new minimum. Precondition: `element` is less than
    /// or equal to every element already in the tree; violating it only
    /// `debug_assert!`s here (see [`BstTree::try_insert_min`] for a checked variant).
    pub fn insert_min(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        debug_assert!(
            self.min()
                .map_or(true, |m| self.cmp.compare(&element, &m) != Ordering::Greater),
            "insert_min precondition violated: element exceeds current minimum"
        );
        let mut cursor = &mut self.root;
        loop {
            match cursor {
                None => {
                    *cursor = Some(BstNode::leaf(element));
                    return None;
                }
                Some(node) if node.left.is_none() => {
                    if self.cmp.compare(&element, &node.element) == Ordering::Equal {
                        return Some(std::mem::replace(&mut node.element, element));
                    }
                    node.left = Some(BstNode::leaf(element));
                    return None;
                }
                Some(_) => cursor = &mut cursor.as_mut().unwrap().left,
            }
        }
    }

    /// Checked variant of [`BstTree::insert_min`].
    pub fn try_insert_min(&mut self, element: Rc<T>) -> Result<Option<Rc<T>>> {
        if let Some(m) = self.min() {
            if self.cmp.compare(&element, &m) == Ordering::Greater {
                return Err(TreeError::NotMinimal);
            }
        }
        Ok(self.insert_min(element))
    }

    /// Attaches `element` as the new maximum. Precondition: symmetric to
    /// [`BstTree::insert_min`].
    pub fn insert_max(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        debug_assert!(
            self.max()
                .map_or(true, |m| self.cmp.compare(&element, &m) != Ordering::Less),
            "insert_max precondition violated: element precedes current maximum"
        );
        let mut cursor = &mut self.root;
        loop {
            match cursor {
                None => {
                    *cursor = Some(BstNode::leaf(element));
                    return None;
                }
                Some(node) if node.right.is_none() => {
                    if self.cmp.compare(&element, &node.element) == Ordering::Equal {
                        return Some(std::mem::replace(&mut node.element, element));
                    }
                    node.right = Some(BstNode::leaf(element));
                    return None;
                }
                Some(_) => cursor = &mut cursor.as_mut().unwrap().right,
            }
        }
    }

    /// Checked variant of [`BstTree::insert_max`].
    pub fn try_insert_max(&mut self, element: Rc<T>) -> Result<Option<Rc<T>>> {
        if let Some(m) = self.max() {
            if self.cmp.compare(&element, &m) == Ordering::Less {
                return Err(TreeError::NotMaximal);
            }
        }
        Ok(self.insert_max(element))
    }

    pub fn remove(&mut self, key: &T) -> Option<Rc<T>> {
        log::trace!("bst: remove");
        let mut cursor = &mut self.root;
        loop {
            let ord = match cursor {
                None => return None,
                Some(node) => self.cmp.compare(key, &node.element),
            };
            match ord {
                Ordering::Equal => break,
                Ordering::Less => cursor = &mut cursor.as_mut().unwrap().left,
                Ordering::Greater => cursor = &mut cursor.as_mut().unwrap().right,
            }
        }

        let has_two_children = {
            let node = cursor.as_ref().unwrap();
            node.left.is_some() && node.right.is_some()
        };

        if !has_two_children {
            let node = cursor.take().unwrap();
            let BstNode { element, left, right } = *node;
            *cursor = left.or(right);
            return Some(element);
        }

        // Splice in the in-order successor (leftmost of the right subtree), which
        // has at most one child.
        let mut succ_cursor = &mut cursor.as_mut().unwrap().right;
        loop {
            let descend = succ_cursor.as_ref().unwrap().left.is_some();
            if !descend {
                break;
            }
            succ_cursor = &mut succ_cursor.as_mut().unwrap().left;
        }
        let succ_node = succ_cursor.take().unwrap();
        let BstNode {
            element: succ_element,
            left: _,
            right: succ_right,
        } = *succ_node;
        *succ_cursor = succ_right;

        let node = cursor.as_mut().unwrap();
        let removed = std::mem::replace(&mut node.element, succ_element);
        Some(removed)
    }

    pub fn remove_min(&mut self) -> Option<Rc<T>> {
        let mut cursor = &mut self.root;
        loop {
            let has_left = cursor.as_ref()?.left.is_some();
            if !has_left {
                break;
            }
            cursor = &mut cursor.as_mut().unwrap().left;
        }
        let node = cursor.take()?;
        let BstNode { element, left: _, right } = *node;
        *cursor = right;
        Some(element)
    }

    pub fn remove_max(&mut self) -> Option<Rc<T>> {
        let mut cursor = &mut self.root;
        loop {
            let has_right = cursor.as_ref()?.right.is_some();
            if !has_right {
                break;
            }
            cursor = &mut cursor.as_mut().unwrap().right;
        }
        let node = cursor.take()?;
        let BstNode { element, left, right: _ } = *node;
        *cursor = left;
        Some(element)
    }

    /// Tears the tree down in linear time and constant auxiliary space by repeated
    /// right rotation: whenever the current root has a left child, rotate it up;
    /// otherwise consume the (now leftmost) root and move to its right child. No
    /// recursion, so a right-degenerate tree of any size cannot overflow the stack.
    pub fn remove_all<F: FnMut(Rc<T>)>(&mut self, mut destructor: Option<F>) {
        log::debug!("bst: remove_all");
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

    pub fn copy(&self) -> Self {
        log::trace!("bst: copy");
        let elements: Vec<Rc<T>> = InorderCursor::new(&self.root).collect();
        BstTree {
            root: vine_from_sorted(elements),
            cmp: self.cmp.clone(),
        }
    }

    fn set_op(&self, other: &Self, op: SetOp) -> Self {
        let left = InorderCursor::new(&self.root);
        let right = InorderCursor::new(&other.root);
        let mut buffer: Vec<Rc<T>> = Vec::new();
        merge_into(left, right, &self.cmp, op, &mut buffer);
        BstTree {
            root: vine_from_sorted(buffer),
            cmp: self.cmp.clone(),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        log::trace!("bst: union");
        self.set_op(other, SetOp::Union)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        log::trace!("bst: intersection");
        self.set_op(other, SetOp::Intersection)
    }

    pub fn diff(&self, other: &Self) -> Self {
        log::trace!("bst: diff");
        self.set_op(other, SetOp::Diff)
    }

    pub fn sym_diff(&self, other: &Self) -> Self {
        log::trace!("bst: sym_diff");
        self.set_op(other, SetOp::SymDiff)
    }

    /// Linearizes the tree in place into a right-going vine rooted at the minimum.
    pub fn to_list(&mut self) {
        let elements: Vec<Rc<T>> = InorderCursor::new(&self.root).collect();
        self.root = vine_from_sorted(elements);
    }

    /// Linearizes the tree in place into a left-going vine rooted at the maximum.
    pub fn to_reversed_list(&mut self) {
        let mut elements: Vec<Rc<T>> = InorderCursor::new(&self.root).collect();
        elements.reverse();
        self.root = reversed_vine_from_sorted_desc(elements);
    }

    /// Day-Stout-Warren rebalance: linearize to a vine, then collapse it to height
    /// `ceil(log2(n+1))` with one pass computing the perfect-tree deficit followed
    /// by repeated halving sweeps. The node count is taken once, while flattening;
    /// every compress sweep after that is a single linear pass, so the whole
    /// operation is O(n).
    pub fn rebalance(&mut self) {
        log::debug!("bst: rebalance");
        let n = {
            let mut count = 0usize;
            let mut node = self.root.as_deref();
            while let Some(nd) = node {
                count += 1;
                node = nd.right.as_deref();
            }
            count
        };
        if n < 2 {
            return;
        }
        self.to_list();

        // m = 2^floor(log2(n+1)) - 1: the largest perfect-tree node count <= n.
        let bits = usize::BITS - (n + 1).leading_zeros();
        let p = 1usize << (bits - 1);
        let m = p - 1;

        left_rotate_sweep(&mut self.root, n - m);
        let mut remaining = m;
        while remaining > 1 {
            remaining /= 2;
            left_rotate_sweep(&mut self.root, remaining);
        }
    }
}

/// Builds a right-degenerate vine from elements already in ascending order, in one
/// linear pass and with no repeated descents.
fn vine_from_sorted<T>(elements: Vec<Rc<T>>) -> Option<Box<BstNode<T>>> {
    let mut acc = None;
    for element in elements.into_iter().rev() {
        acc = Some(Box::new(BstNode {
            element,
            left: None,
            right: acc,
        }));
    }
    acc
}

/// Builds a left-degenerate vine from elements already in descending order.
fn reversed_vine_from_sorted_desc<T>(elements: Vec<Rc<T>>) -> Option<Box<BstNode<T>>> {
    let mut acc = None;
    for element in elements.into_iter().rev() {
        acc = Some(Box::new(BstNode {
            element,
            left: acc,
            right: None,
        }));
    }
    acc
}

/// Performs `count` left rotations along the right spine starting at `root`,
/// halving the spine's effective length by lifting every other node up a level.
fn left_rotate_sweep<T>(root: &mut Option<Box<BstNode<T>>>, count: usize) {
    let mut cursor = root;
    for _ in 0..count {
        let mut node = cursor.take().unwrap();
        let mut right = node.right.take().unwrap();
        node.right = right.left.take();
        right.left = Some(node);
        *cursor = Some(right);
        cursor = &mut cursor.as_mut().unwrap().right;
    }
}

impl<T> OrderedSink<T> for BstTree<T> {
    fn push_max(&mut self, element: Rc<T>) {
        self.insert_max(element);
    }
}

impl<T> Drop for BstTree<T> {
    fn drop(&mut self) {
        self.remove_all::<fn(Rc<T>)>(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> BstTree<i32> {
        BstTree::new(Cmp::natural())
    }

    #[test]
    fn insert_and_search() {
        let mut t = tree();
        assert_eq!(t.insert(Rc::new(5)), None);
        assert_eq!(t.insert(Rc::new(3)), None);
        assert_eq!(t.insert(Rc::new(7)), None);
        assert_eq!(t.search(&3), Some(Rc::new(3)));
        assert_eq!(t.search(&42), None);
    }

    #[test]
    fn insert_overwrites_equal_element() {
        let mut t = tree();
        t.insert(Rc::new(5));
        let displaced = t.insert(Rc::new(5));
        assert_eq!(displaced, Some(Rc::new(5)));
    }

    #[test]
    fn min_max_prev_next() {
        let mut t = tree();
        for v in [5, 3, 7, 1, 9, 4] {
            t.insert(Rc::new(v));
        }
        assert_eq!(t.min(), Some(Rc::new(1)));
        assert_eq!(t.max(), Some(Rc::new(9)));
        assert_eq!(t.prev(&5), Some(Rc::new(4)));
        assert_eq!(t.next(&5), Some(Rc::new(7)));
        assert_eq!(t.prev(&1), None);
        assert_eq!(t.next(&9), None);
    }

    #[test]
    fn remove_leaf_one_child_two_children() {
        let mut t = tree();
        for v in [5, 3, 7, 1, 4, 6, 8] {
            t.insert(Rc::new(v));
        }
        assert_eq!(t.remove(&1), Some(Rc::new(1))); // leaf
        assert_eq!(t.remove(&3), Some(Rc::new(3))); // one child (4)
        assert_eq!(t.remove(&5), Some(Rc::new(5))); // two children
        let remaining: Vec<i32> = InorderCursor::new(&t.root).map(|r| *r).collect();
        assert_eq!(remaining, vec![4, 6, 7, 8]);
    }

    #[test]
    fn remove_all_empties_tree() {
        let mut t = tree();
        for v in 0..100 {
            t.insert(Rc::new(v));
        }
        let mut seen = Vec::new();
        t.remove_all(Some(|e: Rc<i32>| seen.push(*e)));
        assert!(t.is_empty());
        assert_eq!(seen.len(), 100);
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
        let union = odd.union(&even);
        let all: Vec<i32> = InorderCursor::new(&union.root).map(|r| *r).collect();
        assert_eq!(all, (0..20).collect::<Vec<_>>());

        let inter = odd.intersection(&even);
        assert!(inter.is_empty());

        let diff = union.diff(&odd);
        let diff_vals: Vec<i32> = InorderCursor::new(&diff.root).map(|r| *r).collect();
        assert_eq!(diff_vals, (0..20).step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn rebalance_shrinks_degenerate_height() {
        let mut t = tree();
        for v in 0..255 {
            t.insert_max(Rc::new(v));
        }
        fn height<T>(node: &Option<Box<BstNode<T>>>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + height(&n.left).max(height(&n.right)),
            }
        }
        assert_eq!(height(&t.root), 255);
        t.rebalance();
        let after = height(&t.root);
        assert!(after <= 10, "expected near-log height, got {}", after);
        let values: Vec<i32> = InorderCursor::new(&t.root).map(|r| *r).collect();
        assert_eq!(values, (0..255).collect::<Vec<_>>());
    }

    #[test]
    fn remove_all_on_large_degenerate_tree_does_not_overflow_stack() {
        let mut t = tree();
        for v in 0..200_000 {
            t.insert_max(Rc::new(v));
        }
        t.remove_all::<fn(Rc<i32>)>(None);
        assert!(t.is_empty());
    }
}
