//! Invariant checkers and ASCII pretty-printers.
//!
//! Every mutation path in `bst`, `rbt`, and `spt` is iterative — insert, remove,
//! and the red-black fix-up walk all use an explicit stack rather than the call
//! stack. The routines here, plus a handful of other debug/test-only helpers
//! (e.g. `RbTree::height`), are recursive instead: they are diagnostic/testing
//! aids rather than the hot path, and the recursion depth they incur is bounded
//! by the tree's own height — unbounded for an adversarial BST, but that is a
//! cost callers opt into only when asking "is this tree still valid", not
//! something that happens during ordinary use.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::bst::{BstNode, BstTree};
use crate::rbt::{Color, RbNode, RbTree};
use crate::spt::SpTree;

fn is_bs_subtree<T>(node: &Option<Box<BstNode<T>>>, cmp: &crate::comparator::Cmp<T>) -> bool {
    fn go<T>(
        node: &Option<Box<BstNode<T>>>,
        cmp: &crate::comparator::Cmp<T>,
        lower: Option<&Rc<T>>,
        upper: Option<&Rc<T>>,
    ) -> bool {
        match node {
            None => true,
            Some(n) => {
                if let Some(lo) = lower {
                    if cmp.compare(&n.element, lo) != Ordering::Greater {
                        return false;
                    }
                }
                if let Some(hi) = upper {
                    if cmp.compare(&n.element, hi) != Ordering::Less {
                        return false;
                    }
                }
                go(&n.left, cmp, lower, Some(&n.element)) && go(&n.right, cmp, Some(&n.element), upper)
            }
        }
    }
    go(node, cmp, None, None)
}

/// Verifies symmetric order holds for a BST.
pub fn is_bs_tree<T>(tree: &BstTree<T>) -> bool {
    is_bs_subtree(&tree.root, &tree.cmp)
}

/// Verifies symmetric order holds for a splay tree (using its current, possibly
/// just-reshaped, root).
pub fn is_sp_tree<T>(tree: &SpTree<T>) -> bool {
    is_bs_subtree(&tree.root, &tree.cmp)
}

fn rb_black_height<T>(node: &Option<Box<RbNode<T>>>) -> Option<usize> {
    match node {
        None => Some(0),
        Some(n) => {
            if n.color == Color::Red {
                let left_is_red = n.left.as_ref().map_or(false, |l| l.color == Color::Red);
                let right_is_red = n.right.as_ref().map_or(false, |r| r.color == Color::Red);
                if left_is_red || right_is_red {
                    return None;
                }
            }
            let left_bh = rb_black_height(&n.left)?;
            let right_bh = rb_black_height(&n.right)?;
            if left_bh != right_bh {
                return None;
            }
            let own = if n.color == Color::Black { 1 } else { 0 };
            Some(left_bh + own)
        }
    }
}

/// Verifies the full red-black invariant: symmetric order, root black, no red
/// node with a red child, constant black-height on every root-to-nil path.
pub fn is_rb_tree<T>(tree: &RbTree<T>) -> bool {
    if let Some(root) = tree.root.as_ref() {
        if root.color != Color::Black {
            return false;
        }
    }
    is_bs_subtree_rb(&tree.root, &tree.cmp) && rb_black_height(&tree.root).is_some()
}

fn is_bs_subtree_rb<T>(node: &Option<Box<RbNode<T>>>, cmp: &crate::comparator::Cmp<T>) -> bool {
    fn go<T>(
        node: &Option<Box<RbNode<T>>>,
        cmp: &crate::comparator::Cmp<T>,
        lower: Option<&Rc<T>>,
        upper: Option<&Rc<T>>,
    ) -> bool {
        match node {
            None => true,
            Some(n) => {
                if let Some(lo) = lower {
                    if cmp.compare(&n.element, lo) != Ordering::Greater {
                        return false;
                    }
                }
                if let Some(hi) = upper {
                    if cmp.compare(&n.element, hi) != Ordering::Less {
                        return false;
                    }
                }
                go(&n.left, cmp, lower, Some(&n.element)) && go(&n.right, cmp, Some(&n.element), upper)
            }
        }
    }
    go(node, cmp, None, None)
}

/// Renders a BST as an indented ASCII tree, deepest branches first.
pub fn print_bs_tree<T>(tree: &BstTree<T>, show: impl Fn(&T) -> String) -> String {
    let mut out = String::new();
    fn go<T>(node: &Option<Box<BstNode<T>>>, depth: usize, out: &mut String, show: &impl Fn(&T) -> String) {
        if let Some(n) = node {
            go(&n.right, depth + 1, out, show);
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), show(&n.element));
            go(&n.left, depth + 1, out, show);
        }
    }
    go(&tree.root, 0, &mut out, &show);
    out
}

/// Renders a red-black tree, marking red nodes with a leading `*`.
pub fn print_rb_tree<T>(tree: &RbTree<T>, show: impl Fn(&T) -> String) -> String {
    let mut out = String::new();
    fn go<T>(node: &Option<Box<RbNode<T>>>, depth: usize, out: &mut String, show: &impl Fn(&T) -> String) {
        if let Some(n) = node {
            go(&n.right, depth + 1, out, show);
            let marker = if n.color == Color::Red { "*" } else { " " };
            let _ = writeln!(out, "{}{}{}", "  ".repeat(depth), marker, show(&n.element));
            go(&n.left, depth + 1, out, show);
        }
    }
    go(&tree.root, 0, &mut out, &show);
    out
}

/// Renders a splay tree using its current shape.
pub fn print_sp_tree<T>(tree: &SpTree<T>, show: impl Fn(&T) -> String) -> String {
    let mut out = String::new();
    fn go<T>(node: &Option<Box<BstNode<T>>>, depth: usize, out: &mut String, show: &impl Fn(&T) -> String) {
        if let Some(n) = node {
            go(&n.right, depth + 1, out, show);
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), show(&n.element));
            go(&n.left, depth + 1, out, show);
        }
    }
    go(&tree.root, 0, &mut out, &show);
    out
}
