//! End-to-end scenarios and cross-cutting property tests for the three tree
//! families, covering the testable properties and concrete scenarios (S1-S6).

use std::collections::HashSet;
use std::rc::Rc;

use ordered_trees::bst::BstTree;
use ordered_trees::comparator::Cmp;
use ordered_trees::diagnostics::{is_bs_tree, is_rb_tree};
use ordered_trees::rbt::RbTree;
use ordered_trees::spt::SpTree;
use proptest::prelude::*;

// S1: ascending insert into an RBT stays within the height bound and keeps the
// red-black invariants at every step.
#[test]
fn s1_ascending_insert_into_rbt() {
    let mut t: RbTree<i32> = RbTree::new(Cmp::natural());
    for v in 0..1000 {
        t.insert(Rc::new(v));
        assert!(is_rb_tree(&t), "red-black invariant broke at {v}");
    }
    assert_eq!(t.min(), Some(Rc::new(0)));
    assert_eq!(t.max(), Some(Rc::new(999)));
    assert!(t.height() <= 20, "height {} exceeds bound", t.height());
}

// S2: ascending insert into a BST degenerates to a vine; rebalance collapses it.
#[test]
fn s2_bst_rebalance_after_ascending_insert() {
    let mut t: BstTree<i32> = BstTree::new(Cmp::natural());
    for v in 0..1000 {
        t.insert(Rc::new(v));
    }
    assert_eq!(collect(&t).len(), 1000);
    t.rebalance();
    assert!(is_bs_tree(&t));
    assert_eq!(t.min(), Some(Rc::new(0)));
    assert_eq!(t.max(), Some(Rc::new(999)));
    assert_eq!(collect(&t), (0..1000).collect::<Vec<_>>());
}

// S3: splaying a found key brings it to the root.
#[test]
fn s3_splay_tree_search_moves_key_to_root() {
    let mut t: SpTree<i32> = SpTree::new(Cmp::natural());
    for v in [5, 3, 8, 1, 9] {
        t.insert(Rc::new(v));
    }
    assert_eq!(t.search(&3), Some(Rc::new(3)));
    let mut values = Vec::new();
    let mut cur = t.min();
    while let Some(v) = cur {
        let nxt = t.next(&v);
        values.push(*v);
        cur = nxt;
    }
    assert_eq!(values, vec![1, 3, 5, 8, 9]);
}

// S4: set algebra laws over odd/even/all partitions of 0..1000.
#[test]
fn s4_set_algebra_over_odd_even_all() {
    let mut odd: BstTree<i32> = BstTree::new(Cmp::natural());
    let mut even: BstTree<i32> = BstTree::new(Cmp::natural());
    let mut all: BstTree<i32> = BstTree::new(Cmp::natural());
    for v in 0..1000 {
        all.insert(Rc::new(v));
        if v % 2 == 0 {
            even.insert(Rc::new(v));
        } else {
            odd.insert(Rc::new(v));
        }
    }

    let union = odd.union(&even);
    assert_eq!(collect(&union), collect(&all));

    let inter = odd.intersection(&even);
    assert!(inter.is_empty());

    let sym = odd.sym_diff(&even);
    assert_eq!(collect(&sym), collect(&all));

    let diff = all.diff(&odd);
    assert_eq!(collect(&diff), collect(&even));
}

fn collect(tree: &BstTree<i32>) -> Vec<i32> {
    let mut out = Vec::new();
    let mut cur = tree.min();
    while let Some(v) = cur {
        cur = tree.next(&v);
        out.push(*v);
    }
    out
}

// S5: a large seeded randomized stress run holds every universal invariant.
#[test]
fn s5_randomized_stress_on_all_three_families() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut bst: BstTree<i64> = BstTree::new(Cmp::natural());
    let mut rbt: RbTree<i64> = RbTree::new(Cmp::natural());
    let mut reference: HashSet<i64> = HashSet::new();

    for _ in 0..10_000 {
        let v: i64 = rng.gen_range(-5000..5000);
        if reference.contains(&v) {
            reference.remove(&v);
            bst.remove(&v);
            rbt.remove(&v);
        } else {
            reference.insert(v);
            bst.insert(Rc::new(v));
            rbt.insert(Rc::new(v));
        }
        assert!(is_bs_tree(&bst));
        assert!(is_rb_tree(&rbt));
    }

    for v in &reference {
        assert_eq!(bst.search(v), Some(Rc::new(*v)));
        assert_eq!(rbt.search(v), Some(Rc::new(*v)));
    }
}

// S6: a set operation never disturbs either operand.
#[test]
fn s6_set_operation_leaves_operands_valid() {
    let mut t: BstTree<i32> = BstTree::new(Cmp::natural());
    for v in 0..1000 {
        t.insert_max(Rc::new(v));
    }
    let copy = t.copy();
    let _ = t.intersection(&copy);
    assert!(is_bs_tree(&t));
    assert!(is_bs_tree(&copy));
    assert_eq!(collect(&t), collect(&copy));
}

proptest! {
    // Universal property: symmetric order holds after any sequence of inserts
    // and removes, for both the BST and the RBT.
    #[test]
    fn symmetric_order_holds_after_random_ops(ops in prop::collection::vec((any::<bool>(), -200i32..200), 0..300)) {
        let mut bst: BstTree<i32> = BstTree::new(Cmp::natural());
        let mut rbt: RbTree<i32> = RbTree::new(Cmp::natural());
        for (insert, v) in ops {
            if insert {
                bst.insert(Rc::new(v));
                rbt.insert(Rc::new(v));
            } else {
                bst.remove(&v);
                rbt.remove(&v);
            }
            prop_assert!(is_bs_tree(&bst));
            prop_assert!(is_rb_tree(&rbt));
        }
    }

    // Set-algebra law: union/intersection of two random i32 sets agree with the
    // equivalent HashSet operations.
    #[test]
    fn union_and_intersection_match_hash_set(
        a in prop::collection::hash_set(-50i32..50, 0..60),
        b in prop::collection::hash_set(-50i32..50, 0..60),
    ) {
        let mut ta: BstTree<i32> = BstTree::new(Cmp::natural());
        let mut tb: BstTree<i32> = BstTree::new(Cmp::natural());
        for &v in &a { ta.insert(Rc::new(v)); }
        for &v in &b { tb.insert(Rc::new(v)); }

        let union_expected: HashSet<i32> = a.union(&b).copied().collect();
        let inter_expected: HashSet<i32> = a.intersection(&b).copied().collect();

        let union_actual: HashSet<i32> = collect(&ta.union(&tb)).into_iter().collect();
        let inter_actual: HashSet<i32> = collect(&ta.intersection(&tb)).into_iter().collect();

        prop_assert_eq!(union_actual, union_expected);
        prop_assert_eq!(inter_actual, inter_expected);
    }
}
