//! Ordered set of distinct integers on a left-leaning red-black tree.
//!
//! Every node is owned by exactly one link: the tree's root or a parent's
//! `left`/`right`. Rotations move boxes between links, never share them, so
//! a node is freed exactly once, either on removal or during teardown.
//!
//! The balancing follows the 2-3 variant of the left-leaning tree: red links
//! lean left, no node has two red links, and every root-to-leaf path crosses
//! the same number of black links. Height stays within `2 * log2(n + 1)`.

use std::cmp::Ordering;

use thiserror::Error;

use crate::error::{BenchError, Result};

#[derive(Debug)]
struct Node {
    value: i32,
    black: bool,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new_red(value: i32) -> Box<Node> {
        Box::new(Node {
            value,
            black: false,
            left: None,
            right: None,
        })
    }
}

/// Broken structural invariant, reported by [`RbTree::validate`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvariantError {
    #[error("root node must be black")]
    RedRoot,

    #[error("value {value} out of order")]
    Order { value: i32 },

    #[error("right-leaning red link under {value}")]
    RightRed { value: i32 },

    #[error("consecutive red links at {value}")]
    DoubleRed { value: i32 },

    #[error("black height mismatch: {left} != {right}")]
    BlackImbalance { left: usize, right: usize },

    #[error("node count {counted} != {recorded}")]
    CountMismatch { counted: usize, recorded: usize },
}

/// Balanced binary search tree over `i32`.
#[derive(Debug, Default)]
pub struct RbTree {
    root: Option<Box<Node>>,
    len: usize,
}

impl RbTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert `value`, rejecting duplicates.
    ///
    /// A rejected value leaves every node and color exactly as it was.
    pub fn insert(&mut self, value: i32) -> Result<()> {
        let (mut root, inserted) = insert_node(self.root.take(), value);
        root.black = true;
        self.root = Some(root);

        if !inserted {
            return Err(BenchError::DuplicateKey { value });
        }
        self.len += 1;
        Ok(())
    }

    /// Find the stored value equal to `value`.
    pub fn search(&self, value: i32) -> Option<&i32> {
        let mut link = &self.root;
        while let Some(node) = link {
            match value.cmp(&node.value) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    pub fn contains(&self, value: i32) -> bool {
        self.search(value).is_some()
    }

    /// Detach and free the node holding `value`. Returns whether it was present.
    pub fn remove(&mut self, value: i32) -> bool {
        if !self.contains(value) {
            return false;
        }

        if let Some(root) = self.root.as_mut() {
            if !is_red(&root.left) && !is_red(&root.right) {
                root.black = false;
            }
        }
        self.root = self.root.take().and_then(|root| remove_node(root, value));
        if let Some(root) = self.root.as_mut() {
            root.black = true;
        }

        self.len -= 1;
        true
    }

    /// Ascending iteration.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }

    /// Free every node children-first, handing each value to `visit` as its
    /// node is released. Leaves the tree empty and returns how many nodes
    /// were freed.
    pub fn drain_postorder(&mut self, mut visit: impl FnMut(i32)) -> usize {
        let mut stack: Vec<(Box<Node>, bool)> = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push((root, false));
        }

        let mut freed = 0;
        while let Some((mut node, expanded)) = stack.pop() {
            if expanded {
                visit(node.value);
                freed += 1;
                continue;
            }
            let left = node.left.take();
            let right = node.right.take();
            stack.push((node, true));
            if let Some(right) = right {
                stack.push((right, false));
            }
            if let Some(left) = left {
                stack.push((left, false));
            }
        }

        self.len = 0;
        freed
    }

    pub fn clear(&mut self) {
        self.drain_postorder(|_| {});
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        fn walk(link: &Option<Box<Node>>) -> usize {
            link.as_ref()
                .map_or(0, |node| 1 + walk(&node.left).max(walk(&node.right)))
        }
        walk(&self.root)
    }

    /// Check ordering, coloring, black balance and the recorded length.
    pub fn validate(&self) -> std::result::Result<(), InvariantError> {
        if is_red(&self.root) {
            return Err(InvariantError::RedRoot);
        }
        let mut counted = 0;
        validate_node(&self.root, None, None, &mut counted)?;
        if counted != self.len {
            return Err(InvariantError::CountMismatch {
                counted,
                recorded: self.len,
            });
        }
        Ok(())
    }
}

impl Drop for RbTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a> IntoIterator for &'a RbTree {
    type Item = i32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`RbTree`].
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut link: &'a Option<Box<Node>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some(node.value)
    }
}

#[inline]
fn is_red(link: &Option<Box<Node>>) -> bool {
    link.as_ref().map_or(false, |node| !node.black)
}

#[inline]
fn left_is_red(link: &Option<Box<Node>>) -> bool {
    link.as_ref().map_or(false, |node| is_red(&node.left))
}

// Returns the subtree root and whether a node was linked in. On a duplicate
// the path is handed back untouched, without rebalancing.
fn insert_node(link: Option<Box<Node>>, value: i32) -> (Box<Node>, bool) {
    let mut node = match link {
        Some(node) => node,
        None => return (Node::new_red(value), true),
    };

    let inserted = match value.cmp(&node.value) {
        Ordering::Less => {
            let (left, inserted) = insert_node(node.left.take(), value);
            node.left = Some(left);
            inserted
        }
        Ordering::Greater => {
            let (right, inserted) = insert_node(node.right.take(), value);
            node.right = Some(right);
            inserted
        }
        Ordering::Equal => false,
    };

    if inserted {
        (balance(node), true)
    } else {
        (node, false)
    }
}

// `value` must be present in the subtree.
fn remove_node(mut node: Box<Node>, value: i32) -> Option<Box<Node>> {
    if value < node.value {
        if !is_red(&node.left) && !left_is_red(&node.left) {
            node = move_red_left(node);
        }
        node.left = node.left.take().and_then(|left| remove_node(left, value));
    } else {
        if is_red(&node.left) {
            node = rotate_right(node);
        }
        if value == node.value && node.right.is_none() {
            return node.left.take();
        }
        if !is_red(&node.right) && !left_is_red(&node.right) {
            node = move_red_right(node);
        }
        if value == node.value {
            // promote the in-order successor, freeing its node
            if let Some(right) = node.right.take() {
                let (right, successor) = remove_min(right);
                node.value = successor;
                node.right = right;
            }
        } else {
            node.right = node.right.take().and_then(|right| remove_node(right, value));
        }
    }
    Some(balance(node))
}

fn remove_min(mut node: Box<Node>) -> (Option<Box<Node>>, i32) {
    if node.left.is_none() {
        return (node.right.take(), node.value);
    }
    if !is_red(&node.left) && !left_is_red(&node.left) {
        node = move_red_left(node);
    }
    let (left, min) = match node.left.take() {
        Some(left) => remove_min(left),
        None => return (node.right.take(), node.value),
    };
    node.left = left;
    (Some(balance(node)), min)
}

//              (i)                       (i)
//               |                         |
//              node                     right
//              /  \                      / \
//             /    (r)                 (r)  \
//            /       \                 /     \
//          left     right           node     r-r
//                    / \            /  \
//                 r-l  r-r       left  r-l
//
fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    match node.right.take() {
        Some(mut right) => {
            node.right = right.left.take();
            right.black = node.black;
            node.black = false;
            right.left = Some(node);
            right
        }
        None => node,
    }
}

//              (i)                       (i)
//               |                         |
//              node                      left
//              /  \                      / \
//            (r)   \                   (r)  \
//           /       \                 /      \
//         left     right            l-l      node
//         / \                                / \
//      l-l  l-r                            l-r  right
//
fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    match node.left.take() {
        Some(mut left) => {
            node.left = left.right.take();
            left.black = node.black;
            node.black = false;
            left.right = Some(node);
            left
        }
        None => node,
    }
}

fn flip(node: &mut Node) {
    node.black = !node.black;
    if let Some(left) = node.left.as_mut() {
        left.black = !left.black;
    }
    if let Some(right) = node.right.as_mut() {
        right.black = !right.black;
    }
}

fn balance(mut node: Box<Node>) -> Box<Node> {
    if is_red(&node.right) && !is_red(&node.left) {
        node = rotate_left(node);
    }
    if is_red(&node.left) && left_is_red(&node.left) {
        node = rotate_right(node);
    }
    if is_red(&node.left) && is_red(&node.right) {
        flip(&mut node);
    }
    node
}

fn move_red_left(mut node: Box<Node>) -> Box<Node> {
    flip(&mut node);
    if left_is_red(&node.right) {
        node.right = node.right.take().map(rotate_right);
        node = rotate_left(node);
        flip(&mut node);
    }
    node
}

fn move_red_right(mut node: Box<Node>) -> Box<Node> {
    flip(&mut node);
    if left_is_red(&node.left) {
        node = rotate_right(node);
        flip(&mut node);
    }
    node
}

// Returns the black height of the subtree.
fn validate_node(
    link: &Option<Box<Node>>,
    low: Option<i32>,
    high: Option<i32>,
    counted: &mut usize,
) -> std::result::Result<usize, InvariantError> {
    let node = match link {
        Some(node) => node,
        None => return Ok(1),
    };
    *counted += 1;

    if low.map_or(false, |low| node.value <= low) || high.map_or(false, |high| node.value >= high) {
        return Err(InvariantError::Order { value: node.value });
    }
    if is_red(&node.right) {
        return Err(InvariantError::RightRed { value: node.value });
    }
    if !node.black && is_red(&node.left) {
        return Err(InvariantError::DoubleRed { value: node.value });
    }

    let left = validate_node(&node.left, low, Some(node.value), counted)?;
    let right = validate_node(&node.right, Some(node.value), high, counted)?;
    if left != right {
        return Err(InvariantError::BlackImbalance { left, right });
    }
    Ok(left + usize::from(node.black))
}
