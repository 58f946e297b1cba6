//! Red-black tree with worst-case logarithmic height.
//!
//! Insert and delete walk down from the root onto an explicit `Vec`-backed stack —
//! the same sanctioned alternative the shared traversal engine uses in place of
//! recursion — detaching each node from its parent as the descent passes through
//! it, then unwind that stack applying rotations and color-flips on the way back
//! up using only the current node and its immediate children. The node shape
//! carries no parent link (matching the source library's node layout); the
//! explicit stack supplies the ancestor bookkeeping a parent pointer would
//! otherwise give, without ever growing the call stack.
//!
//! The rotation/color-flip vocabulary follows the left-leaning formulation
//! (Sedgewick): red links lean left, and a node never keeps two red children
//! standing after its own fix-up step runs. A left-leaning red-black tree is
//! still a red-black tree under the classical invariants (root black, no red node
//! with a red child, constant black-height on every root-to-nil path) — those are
//! exactly what `diagnostics::is_rb_tree` checks.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::comparator::Cmp;
use crate::error::{Result, TreeError};
use crate::traversal::{merge_into, InorderCursor, OrderedSink, SetOp, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    fn flipped(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

pub struct RbNode<T> {
    pub(crate) element: Rc<T>,
    pub(crate) color: Color,
    pub(crate) left: Option<Box<RbNode<T>>>,
    pub(crate) right: Option<Box<RbNode<T>>>,
}

impl<T> RbNode<T> {
    fn leaf(element: Rc<T>) -> Box<Self> {
        Box::new(RbNode {
            element,
            color: Color::Red,
            left: None,
            right: None,
        })
    }
}

impl<T> TreeNode<T> for RbNode<T> {
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

fn is_red<T>(node: &Option<Box<RbNode<T>>>) -> bool {
    node.as_ref().map_or(false, |n| n.color == Color::Red)
}

fn rotate_left<T>(mut h: Box<RbNode<T>>) -> Box<RbNode<T>> {
    let mut x = h.right.take().expect("rotate_left requires a right child");
    h.right = x.left.take();
    x.color = h.color;
    h.color = Color::Red;
    x.left = Some(h);
    x
}

fn rotate_right<T>(mut h: Box<RbNode<T>>) -> Box<RbNode<T>> {
    let mut x = h.left.take().expect("rotate_right requires a left child");
    h.left = x.right.take();
    x.color = h.color;
    h.color = Color::Red;
    x.right = Some(h);
    x
}

fn flip_colors<T>(h: &mut RbNode<T>) {
    h.color = h.color.flipped();
    if let Some(l) = h.left.as_mut() {
        l.color = l.color.flipped();
    }
    if let Some(r) = h.right.as_mut() {
        r.color = r.color.flipped();
    }
}

/// Restores the local invariant at `h` using only `h` and its immediate children:
/// lean a right-leaning red left, split a false 4-node (red-red on the left spine)
/// with a right rotation, then push a complete 4-node (both children red) up by
/// flipping colors. Called once per level as the explicit stack unwinds, so by the
/// time a level is reattached to its parent, the subtree rooted at `h` is locally
/// valid.
fn fix_up<T>(mut h: Box<RbNode<T>>) -> Box<RbNode<T>> {
    if is_red(&h.right) && !is_red(&h.left) {
        h = rotate_left(h);
    }
    if is_red(&h.left) && is_red(&h.left.as_ref().unwrap().left) {
        h = rotate_right(h);
    }
    if is_red(&h.left) && is_red(&h.right) {
        flip_colors(&mut h);
    }
    h
}

/// Which child slot a stacked ancestor's descended-into subtree came from, so the
/// unwind phase knows where to reattach the fixed-up result.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Iterative top-down insert: descend onto an explicit stack of detached
/// ancestors (mirroring what a recursive call stack would hold), then unwind the
/// stack applying `fix_up` at each level as it is reattached.
fn insert_iter<T>(root: Option<Box<RbNode<T>>>, element: Rc<T>, cmp: &Cmp<T>) -> (Box<RbNode<T>>, Option<Rc<T>>) {
    let mut stack: Vec<(Box<RbNode<T>>, Side)> = Vec::new();
    let mut current = root;
    let displaced;
    loop {
        match current {
            None => {
                current = Some(RbNode::leaf(element));
                displaced = None;
                break;
            }
            Some(mut h) => match cmp.compare(&element, &h.element) {
                Ordering::Equal => {
                    displaced = Some(std::mem::replace(&mut h.element, element));
                    current = Some(h);
                    break;
                }
                Ordering::Less => {
                    let left = h.left.take();
                    stack.push((h, Side::Left));
                    current = left;
                }
                Ordering::Greater => {
                    let right = h.right.take();
                    stack.push((h, Side::Right));
                    current = right;
                }
            },
        }
    }
    while let Some((mut parent, side)) = stack.pop() {
        match side {
            Side::Left => parent.left = current,
            Side::Right => parent.right = current,
        }
        current = Some(fix_up(parent));
    }
    (current.unwrap(), displaced)
}

/// Iterative always-maximum attach: descends the right spine only, with no key
/// comparison until the bottom (where it must still distinguish "append" from
/// "overwrite the current maximum"), then unwinds applying the same `fix_up`
/// vocabulary as [`insert_iter`]. Used by `insert_max`, and so by every set
/// operation and `copy`, which build their result by feeding elements in
/// strictly ascending order through this path rather than the general,
/// comparison-driven descent.
fn attach_max_iter<T>(root: Option<Box<RbNode<T>>>, element: Rc<T>, cmp: &Cmp<T>) -> (Box<RbNode<T>>, Option<Rc<T>>) {
    let mut stack: Vec<Box<RbNode<T>>> = Vec::new();
    let mut current = root;
    let displaced;
    loop {
        match current {
            None => {
                current = Some(RbNode::leaf(element));
                displaced = None;
                break;
            }
            Some(mut h) if h.right.is_none() => {
                if cmp.compare(&element, &h.element) == Ordering::Equal {
                    displaced = Some(std::mem::replace(&mut h.element, element));
                } else {
                    h.right = Some(RbNode::leaf(element));
                    displaced = None;
                }
                current = Some(h);
                break;
            }
            Some(mut h) => {
                let right = h.right.take();
                stack.push(h);
                current = right;
            }
        }
    }
    while let Some(mut parent) = stack.pop() {
        parent.right = current;
        current = Some(fix_up(parent));
    }
    (current.unwrap(), displaced)
}

fn move_red_left<T>(mut h: Box<RbNode<T>>) -> Box<RbNode<T>> {
    flip_colors(&mut h);
    if is_red(&h.right.as_ref().unwrap().left) {
        let right = h.right.take().unwrap();
        h.right = Some(rotate_right(right));
        h = rotate_left(h);
        flip_colors(&mut h);
    }
    h
}

fn move_red_right<T>(mut h: Box<RbNode<T>>) -> Box<RbNode<T>> {
    flip_colors(&mut h);
    if is_red(&h.left.as_ref().unwrap().left) {
        h = rotate_right(h);
        flip_colors(&mut h);
    }
    h
}

/// Iterative deleteMin: descend onto an explicit stack, pushing `move_red_left`'d
/// ancestors, until reaching the leftmost node (which the left-leaning invariant
/// guarantees has no right child either); unwind applying `fix_up`.
fn delete_min_iter<T>(root: Box<RbNode<T>>) -> (Option<Box<RbNode<T>>>, Rc<T>) {
    let mut stack: Vec<Box<RbNode<T>>> = Vec::new();
    let mut h = root;
    loop {
        if h.left.is_none() {
            break;
        }
        if !is_red(&h.left) && !is_red(&h.left.as_ref().unwrap().left) {
            h = move_red_left(h);
        }
        let left = h.left.take().unwrap();
        stack.push(h);
        h = left;
    }
    let elem = h.element;
    let mut current: Option<Box<RbNode<T>>> = None;
    while let Some(mut parent) = stack.pop() {
        parent.left = current;
        current = Some(fix_up(parent));
    }
    (current, elem)
}

/// Iterative deleteMax: the mirror image of [`delete_min_iter`].
fn delete_max_iter<T>(root: Box<RbNode<T>>) -> (Option<Box<RbNode<T>>>, Rc<T>) {
    let mut stack: Vec<Box<RbNode<T>>> = Vec::new();
    let mut h = root;
    loop {
        if is_red(&h.left) {
            h = rotate_right(h);
        }
        if h.right.is_none() {
            break;
        }
        if !is_red(&h.right) && !is_red(&h.right.as_ref().unwrap().left) {
            h = move_red_right(h);
        }
        let right = h.right.take().unwrap();
        stack.push(h);
        h = right;
    }
    let elem = h.element;
    let mut current: Option<Box<RbNode<T>>> = None;
    while let Some(mut parent) = stack.pop() {
        parent.right = current;
        current = Some(fix_up(parent));
    }
    (current, elem)
}

/// Iterative delete-by-key: descends onto an explicit stack exactly as
/// [`insert_iter`] does, with one twist — deleting a node with two children
/// splices in its in-order successor by calling [`delete_min_iter`] on the
/// already-detached right subtree, itself iterative, not a recursive call back
/// into this function. Unwinds the stack applying `fix_up` at every level,
/// whether or not anything was ultimately removed (an unsuccessful search can
/// still have rotated/color-flipped ancestors on the way down).
fn delete_iter<T>(root: Box<RbNode<T>>, key: &T, cmp: &Cmp<T>) -> (Option<Box<RbNode<T>>>, Option<Rc<T>>) {
    let mut stack: Vec<(Box<RbNode<T>>, Side)> = Vec::new();
    let mut h = root;
    let removed: Option<Rc<T>>;
    let mut current: Option<Box<RbNode<T>>>;

    loop {
        if cmp.compare(key, &h.element) == Ordering::Less {
            if h.left.is_none() {
                current = Some(h);
                removed = None;
                break;
            }
            if !is_red(&h.left) && !is_red(&h.left.as_ref().unwrap().left) {
                h = move_red_left(h);
            }
            let left = h.left.take().unwrap();
            stack.push((h, Side::Left));
            h = left;
        } else {
            if is_red(&h.left) {
                h = rotate_right(h);
            }
            if cmp.compare(key, &h.element) == Ordering::Equal && h.right.is_none() {
                removed = Some(h.element);
                current = None;
                break;
            }
            if h.right.is_none() {
                current = Some(h);
                removed = None;
                break;
            }
            if !is_red(&h.right) && !is_red(&h.right.as_ref().unwrap().left) {
                h = move_red_right(h);
            }
            if cmp.compare(key, &h.element) == Ordering::Equal {
                let right = h.right.take().unwrap();
                let (new_right, min_elem) = delete_min_iter(right);
                let old = std::mem::replace(&mut h.element, min_elem);
                h.right = new_right;
                current = Some(h);
                removed = Some(old);
                break;
            } else {
                let right = h.right.take().unwrap();
                stack.push((h, Side::Right));
                h = right;
            }
        }
    }

    while let Some((mut parent, side)) = stack.pop() {
        match side {
            Side::Left => parent.left = current,
            Side::Right => parent.right = current,
        }
        current = Some(fix_up(parent));
    }
    (current, removed)
}

/// A self-balancing ordered container with worst-case `O(log n)` height.
pub struct RbTree<T> {
    pub(crate) root: Option<Box<RbNode<T>>>,
    pub(crate) cmp: Cmp<T>,
}

impl<T> RbTree<T> {
    pub fn new(cmp: Cmp<T>) -> Self {
        RbTree { root: None, cmp }
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
        log::trace!("rbt: insert");
        let root = self.root.take();
        let (mut new_root, displaced) = insert_iter(root, element, &self.cmp);
        new_root.color = Color::Black;
        self.root = Some(new_root);
        displaced
    }

    /// Attaches `element` as the new minimum via the general insert path.
    /// Precondition: `element` is less than or equal to every existing element.
    pub fn insert_min(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        debug_assert!(
            self.min()
                .map_or(true, |m| self.cmp.compare(&element, &m) != Ordering::Greater),
            "insert_min precondition violated"
        );
        self.insert(element)
    }

    pub fn try_insert_min(&mut self, element: Rc<T>) -> Result<Option<Rc<T>>> {
        if let Some(m) = self.min() {
            if self.cmp.compare(&element, &m) == Ordering::Greater {
                return Err(TreeError::NotMinimal);
            }
        }
        Ok(self.insert_min(element))
    }

    /// Attaches `element` as the new maximum via the specialized always-maximum
    /// path: descends the right spine only, with no key comparison along the way,
    /// then runs the same `fix_up` vocabulary as [`RbTree::insert`] on the unwind.
    /// Precondition: `element` is greater than or equal to every existing element.
    pub fn insert_max(&mut self, element: Rc<T>) -> Option<Rc<T>> {
        log::trace!("rbt: insert_max");
        debug_assert!(
            self.max()
                .map_or(true, |m| self.cmp.compare(&element, &m) != Ordering::Less),
            "insert_max precondition violated"
        );
        let root = self.root.take();
        let (mut new_root, displaced) = attach_max_iter(root, element, &self.cmp);
        new_root.color = Color::Black;
        self.root = Some(new_root);
        displaced
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
        log::trace!("rbt: remove");
        let root = self.root.take()?;
        let (new_root, removed) = delete_iter(root, key, &self.cmp);
        self.root = new_root.map(|mut n| {
            n.color = Color::Black;
            n
        });
        removed
    }

    pub fn remove_min(&mut self) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let (new_root, elem) = delete_min_iter(root);
        self.root = new_root.map(|mut n| {
            n.color = Color::Black;
            n
        });
        Some(elem)
    }

    pub fn remove_max(&mut self) -> Option<Rc<T>> {
        let root = self.root.take()?;
        let (new_root, elem) = delete_max_iter(root);
        self.root = new_root.map(|mut n| {
            n.color = Color::Black;
            n
        });
        Some(elem)
    }

    /// Same iterative right-rotation teardown as the BST: walk the tree as a
    /// collapsing vine so a degenerate or adversarial shape cannot recurse the
    /// stack away. Color bits are irrelevant once nodes are being freed.
    pub fn remove_all<F: FnMut(Rc<T>)>(&mut self, mut destructor: Option<F>) {
        log::debug!("rbt: remove_all");
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
        log::trace!("rbt: copy");
        let mut out = RbTree::new(self.cmp.clone());
        for element in InorderCursor::new(&self.root) {
            out.insert_max(element);
        }
        out
    }

    fn set_op(&self, other: &Self, op: SetOp) -> Self {
        let left = InorderCursor::new(&self.root);
        let right = InorderCursor::new(&other.root);
        let mut out = RbTree::new(self.cmp.clone());
        merge_into(left, right, &self.cmp, op, &mut out);
        out
    }

    pub fn union(&self, other: &Self) -> Self {
        log::trace!("rbt: union");
        self.set_op(other, SetOp::Union)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        log::trace!("rbt: intersection");
        self.set_op(other, SetOp::Intersection)
    }

    pub fn diff(&self, other: &Self) -> Self {
        log::trace!("rbt: diff");
        self.set_op(other, SetOp::Diff)
    }

    pub fn sym_diff(&self, other: &Self) -> Self {
        log::trace!("rbt: sym_diff");
        self.set_op(other, SetOp::SymDiff)
    }

    /// Height of the tree, for tests and diagnostics; not part of the algebraic
    /// contract.
    pub fn height(&self) -> usize {
        fn go<T>(node: &Option<Box<RbNode<T>>>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + go(&n.left).max(go(&n.right)),
            }
        }
        go(&self.root)
    }
}

impl<T> OrderedSink<T> for RbTree<T> {
    fn push_max(&mut self, element: Rc<T>) {
        self.insert_max(element);
    }
}

impl<T> Drop for RbTree<T> {
    fn drop(&mut self) {
        self.remove_all::<fn(Rc<T>)>(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::is_rb_tree;

    fn tree() -> RbTree<i32> {
        RbTree::new(Cmp::natural())
    }

    #[test]
    fn insert_search_and_invariants_hold() {
        let mut t = tree();
        for v in [5, 3, 7, 1, 9, 4, 6, 8, 2, 0] {
            t.insert(Rc::new(v));
            assert!(is_rb_tree(&t), "invariant violated after inserting {v}");
        }
        for v in 0..10 {
            assert_eq!(t.search(&v), Some(Rc::new(v)));
        }
    }

    #[test]
    fn ascending_insert_stays_balanced() {
        let mut t = tree();
        for v in 0..1000 {
            t.insert(Rc::new(v));
        }
        assert!(is_rb_tree(&t));
        assert_eq!(t.min(), Some(Rc::new(0)));
        assert_eq!(t.max(), Some(Rc::new(999)));
        assert!(t.height() <= 2 * (1000f64).log2().ceil() as usize + 2);
    }

    #[test]
    fn remove_preserves_invariants() {
        let mut t = tree();
        for v in 0..200 {
            t.insert(Rc::new(v));
        }
        for v in (0..200).step_by(2) {
            assert_eq!(t.remove(&v), Some(Rc::new(v)));
            assert!(is_rb_tree(&t), "invariant violated after removing {v}");
        }
        for v in (0..200).step_by(2) {
            assert_eq!(t.search(&v), None);
        }
        for v in (1..200).step_by(2) {
            assert_eq!(t.search(&v), Some(Rc::new(v)));
        }
    }

    #[test]
    fn remove_min_and_max() {
        let mut t = tree();
        for v in 0..50 {
            t.insert(Rc::new(v));
        }
        assert_eq!(t.remove_min(), Some(Rc::new(0)));
        assert_eq!(t.remove_max(), Some(Rc::new(49)));
        assert!(is_rb_tree(&t));
    }

    #[test]
    fn set_operations() {
        let mut odd = tree();
        let mut even = tree();
        for v in 0..40 {
            if v % 2 == 0 {
                even.insert(Rc::new(v));
            } else {
                odd.insert(Rc::new(v));
            }
        }
        let u = odd.union(&even);
        assert!(is_rb_tree(&u));
        for v in 0..40 {
            assert_eq!(u.search(&v), Some(Rc::new(v)));
        }
        let i = odd.intersection(&even);
        assert!(i.is_empty());
    }
}
