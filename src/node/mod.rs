mod iter;


use compare::Compare;
use std::cmp::Ordering::*;
use std::cmp::max;
use std::fmt;
use std::mem::{replace, swap};

pub use self::iter::Iter;

pub type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Clone)]
pub struct Node<K, V> {
    left: Link<K, V>,
    right: Link<K, V>,
    height: usize,
    key: K,
    value: V,
}

fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Node { left: None, right: None, height: 1, key, value }
    }

    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    // Rotates the subtree rooted at `node` to the right, making its left
    // child the new subtree root. Heights are recomputed child-first.
    fn rotate_right(node: &mut Box<Self>) {
        let mut save = match node.left.take() {
            Some(left) => left,
            None => return,
        };

        swap(&mut node.left, &mut save.right); // save.right now None
        node.update_height();
        swap(node, &mut save);
        node.right = Some(save);
        node.update_height();
    }

    // Rotates the subtree rooted at `node` to the left, making its right
    // child the new subtree root.
    fn rotate_left(node: &mut Box<Self>) {
        let mut save = match node.right.take() {
            Some(right) => right,
            None => return,
        };

        swap(&mut node.right, &mut save.left); // save.left now None
        node.update_height();
        swap(node, &mut save);
        node.left = Some(save);
        node.update_height();
    }

    // Restores the AVL invariant at `node` after an insertion or removal
    // changed the height of one of its subtrees. On an already balanced
    // node this only refreshes the cached height.
    fn rebalance(node: &mut Box<Self>) {
        node.update_height();

        let factor = node.balance_factor();

        if factor > 1 {
            if node.left.as_ref().map_or(false, |left| left.balance_factor() < 0) {
                if let Some(ref mut left) = node.left { Self::rotate_left(left); }
            }
            Self::rotate_right(node);
        } else if factor < -1 {
            if node.right.as_ref().map_or(false, |right| right.balance_factor() > 0) {
                if let Some(ref mut right) = node.right { Self::rotate_right(right); }
            }
            Self::rotate_left(node);
        }
    }
}

pub fn insert<K, V, C>(link: &mut Link<K, V>, cmp: &C, key: K, value: V) -> Option<V>
    where C: Compare<K>
{
    match *link {
        None => {
            *link = Some(Box::new(Node::new(key, value)));
            None
        }
        Some(ref mut node) => {
            let old_value = match cmp.compare(&key, &node.key) {
                Equal => return Some(replace(&mut node.value, value)),
                Less => insert(&mut node.left, cmp, key, value),
                Greater => insert(&mut node.right, cmp, key, value),
            };

            Node::rebalance(node);
            old_value
        }
    }
}

pub fn merge<K, V, C, F>(link: &mut Link<K, V>, cmp: &C, key: K, value: V, on_conflict: F)
    -> bool where C: Compare<K>, F: FnOnce(&mut V, V)
{
    match *link {
        None => {
            *link = Some(Box::new(Node::new(key, value)));
            true
        }
        Some(ref mut node) => {
            let inserted = match cmp.compare(&key, &node.key) {
                Equal => {
                    on_conflict(&mut node.value, value);
                    return false;
                }
                Less => merge(&mut node.left, cmp, key, value, on_conflict),
                Greater => merge(&mut node.right, cmp, key, value, on_conflict),
            };

            Node::rebalance(node);
            inserted
        }
    }
}

// Detaches the minimum node of the subtree and returns its entry,
// rebalancing the descent path on the way back up.
fn detach_min<K, V>(link: &mut Link<K, V>) -> Option<(K, V)> {
    match *link {
        Some(ref mut node) if node.left.is_some() => {
            let key_value = detach_min(&mut node.left);
            Node::rebalance(node);
            key_value
        }
        _ => link.take().map(|node| {
            let mut node = *node;
            *link = node.right.take();
            (node.key, node.value)
        }),
    }
}

pub fn remove<K, V, C, Q: ?Sized>(link: &mut Link<K, V>, cmp: &C, key: &Q)
    -> Option<(K, V)> where C: Compare<Q, K>
{
    match *link {
        None => return None,
        Some(ref mut node) => match cmp.compare(key, &node.key) {
            Less => {
                let key_value = remove(&mut node.left, cmp, key);
                if key_value.is_some() { Node::rebalance(node); }
                return key_value;
            }
            Greater => {
                let key_value = remove(&mut node.right, cmp, key);
                if key_value.is_some() { Node::rebalance(node); }
                return key_value;
            }
            Equal => {
                // Promote the in-order successor into this node; detaching
                // it rebalances the right spine.
                if let Some((succ_key, succ_value)) = detach_min(&mut node.right) {
                    let key_value = (replace(&mut node.key, succ_key),
                                     replace(&mut node.value, succ_value));
                    Node::rebalance(node);
                    return Some(key_value);
                }
            }
        },
    }

    // The matched node has no right subtree, so it can be spliced out in
    // favor of its left child.
    link.take().map(|node| {
        let mut node = *node;
        *link = node.left.take();
        (node.key, node.value)
    })
}

pub fn get<'a, K, V, C, Q: ?Sized>(link: &'a Link<K, V>, cmp: &C, key: &Q)
    -> Option<&'a V> where C: Compare<Q, K>
{
    match *link {
        None => None,
        Some(ref node) => match cmp.compare(key, &node.key) {
            Less => get(&node.left, cmp, key),
            Greater => get(&node.right, cmp, key),
            Equal => Some(&node.value),
        },
    }
}

pub fn get_mut<'a, K, V, C, Q: ?Sized>(link: &'a mut Link<K, V>, cmp: &C, key: &Q)
    -> Option<&'a mut V> where C: Compare<Q, K>
{
    match *link {
        None => None,
        Some(ref mut node) => match cmp.compare(key, &node.key) {
            Less => get_mut(&mut node.left, cmp, key),
            Greater => get_mut(&mut node.right, cmp, key),
            Equal => Some(&mut node.value),
        },
    }
}

pub fn first<K, V>(link: &Link<K, V>) -> Option<(&K, &V)> {
    link.as_ref().map(|node| {
        let mut node = node;
        while let Some(ref left) = node.left { node = left; }
        (&node.key, &node.value)
    })
}

pub fn last<K, V>(link: &Link<K, V>) -> Option<(&K, &V)> {
    link.as_ref().map(|node| {
        let mut node = node;
        while let Some(ref right) = node.right { node = right; }
        (&node.key, &node.value)
    })
}

pub fn for_each<K, V, F>(link: &Link<K, V>, f: &mut F) where F: FnMut(&K, &V) {
    if let Some(ref node) = *link {
        for_each(&node.left, f);
        f(&node.key, &node.value);
        for_each(&node.right, f);
    }
}

pub fn for_each_mut<K, V, F>(link: &mut Link<K, V>, f: &mut F) where F: FnMut(&K, &mut V) {
    if let Some(ref mut node) = *link {
        for_each_mut(&mut node.left, f);
        f(&node.key, &mut node.value);
        for_each_mut(&mut node.right, f);
    }
}

// Returns the subtree height if the AVL and height-cache invariants hold
// everywhere below `link`.
fn checked_height<K, V>(link: &Link<K, V>) -> Option<usize> {
    match *link {
        None => Some(0),
        Some(ref node) => {
            let left = checked_height(&node.left)?;
            let right = checked_height(&node.right)?;
            let difference = if left < right { right - left } else { left - right };

            if difference <= 1 && node.height == 1 + max(left, right) {
                Some(node.height)
            } else {
                None
            }
        }
    }
}

pub fn is_balanced<K, V>(link: &Link<K, V>) -> bool {
    checked_height(link).is_some()
}

// Renders the subtree rotated 90 degrees: right subtree above the node,
// left subtree below, six columns of indentation per level.
pub fn render<K, V>(link: &Link<K, V>, indent: usize, f: &mut fmt::Formatter<'_>)
    -> fmt::Result where K: fmt::Display, V: fmt::Display
{
    if let Some(ref node) = *link {
        render(&node.right, indent + 6, f)?;
        writeln!(f, "{:>width$}{}:{}", ' ', node.key, node.value, width = indent)?;
        render(&node.left, indent + 6, f)?;
    }

    Ok(())
}
