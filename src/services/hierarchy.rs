//! Parent/child arrangement of flat rows that reference their parent by code.
//!
//! The forest is built without recursion: one pass indexes rows by code, a
//! breadth-first walk from the roots fixes each row's depth, and nodes are then
//! assembled bottom-up in reverse walk order.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

/// Deepest level a row may sit at; anything below is detached.
pub const MAX_MENU_DEPTH: usize = 8;

pub trait HierarchyItem {
    fn code(&self) -> &str;
    fn parent_code(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub item: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forest<T> {
    pub roots: Vec<TreeNode<T>>,
    /// Rows unreachable from a root: missing parent, cycles, or too deep.
    pub detached: Vec<T>,
}

/// Arranges `items` into trees, keeping sibling order as given.
///
/// A node survives when `keep` accepts it or when any of its descendants
/// survives.
pub fn build_forest<T, F>(items: Vec<T>, keep: F) -> Forest<T>
where
    T: HierarchyItem,
    F: Fn(&T) -> bool,
{
    let n = items.len();

    let mut index: HashMap<String, usize> = HashMap::with_capacity(n);
    for (i, item) in items.iter().enumerate() {
        index.entry(item.code().to_string()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match item.parent_code() {
            None => roots.push(i),
            Some(parent) => {
                if let Some(&p) = index.get(parent) {
                    if p != i {
                        children[p].push(i);
                    }
                }
            }
        }
    }

    let mut reached = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut queue: VecDeque<(usize, usize)> = roots.iter().map(|&r| (r, 1)).collect();
    while let Some((i, depth)) = queue.pop_front() {
        if reached[i] || depth > MAX_MENU_DEPTH {
            continue;
        }
        reached[i] = true;
        order.push(i);
        queue.extend(children[i].iter().map(|&c| (c, depth + 1)));
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut built: Vec<Option<TreeNode<T>>> = (0..n).map(|_| None).collect();
    for &i in order.iter().rev() {
        let kids: Vec<TreeNode<T>> = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        let Some(item) = slots[i].take() else {
            continue;
        };
        if kids.is_empty() && !keep(&item) {
            continue;
        }
        built[i] = Some(TreeNode {
            item,
            children: kids,
        });
    }

    let roots = roots.iter().filter_map(|&r| built[r].take()).collect();
    let detached = slots
        .into_iter()
        .zip(reached)
        .filter(|(_, reached)| !reached)
        .filter_map(|(slot, _)| slot)
        .collect();

    Forest { roots, detached }
}
