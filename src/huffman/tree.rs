use std::cmp::{Eq, Ord, Ordering, PartialEq, PartialOrd, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::fmt;

use super::{frequency::FrequencyTable, Symbol};
use crate::{error::Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind<S> {
    Leaf { symbol: S },
    Inner { left: usize, right: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node<S> {
    pub weight: u64,
    pub kind: NodeKind<S>,
}

impl<S> Node<S> {
    pub fn leaf(symbol: S, weight: u64) -> Self {
        Self {
            weight,
            kind: NodeKind::Leaf { symbol },
        }
    }

    pub fn inner(weight: u64, left: usize, right: usize) -> Self {
        Self {
            weight,
            kind: NodeKind::Inner { left, right },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Heap entry; equal weights leave the heap in insertion order
#[derive(Clone, Copy)]
struct QueuedNode {
    weight: u64,
    sequence: usize,
    index: usize,
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

/// Huffman tree stored as an arena; leaves come first in canonical symbol
/// order, inner nodes follow in merge order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTree<S: Symbol> {
    nodes: Vec<Node<S>>,
    root_index: usize,
}

impl<S: Symbol> HuffmanTree<S> {
    /// Merges the two lightest nodes until one remains. The node popped
    /// first becomes the left child.
    pub fn build(table: &FrequencyTable<S>) -> Result<Self> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut heap = BinaryHeap::with_capacity(table.len());
        let mut nodes: Vec<Node<S>> = Vec::with_capacity(2 * table.len() - 1);
        let mut sequence = 0;

        for sf in table.to_symbol_frequencies() {
            let index = nodes.len();
            nodes.push(Node::leaf(sf.symbol, sf.frequency));
            heap.push(Reverse(QueuedNode {
                weight: sf.frequency,
                sequence,
                index,
            }));
            sequence += 1;
        }

        let root_index = loop {
            let Reverse(first) = heap.pop().ok_or(Error::EmptyInput)?;
            let Some(Reverse(second)) = heap.pop() else {
                break first.index;
            };
            let index = nodes.len();
            let weight = first.weight + second.weight;
            nodes.push(Node::inner(weight, first.index, second.index));
            heap.push(Reverse(QueuedNode {
                weight,
                sequence,
                index,
            }));
            sequence += 1;
        };

        let tree = HuffmanTree { nodes, root_index };
        log::debug!(
            "Built Huffman tree with {} leaves, depth {} and weight {}",
            tree.leaf_count(),
            tree.depth(),
            tree.weight()
        );
        log::trace!("Huffman tree\n{}", tree);
        Ok(tree)
    }

    /// Accepts an arena built elsewhere after checking that it forms a
    /// strict binary tree rooted at `root_index`.
    pub fn from_nodes(nodes: Vec<Node<S>>, root_index: usize) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::EmptyTree);
        }
        if root_index >= nodes.len() {
            return Err(Error::MalformedTree("root index out of range"));
        }
        let mut referenced = vec![false; nodes.len()];
        let mut symbols = HashSet::new();
        let mut visited = 0;
        let mut node_index_stack = vec![root_index];
        referenced[root_index] = true;

        while let Some(index) = node_index_stack.pop() {
            visited += 1;
            let node = nodes[index];
            match node.kind {
                NodeKind::Leaf { symbol } => {
                    if !symbols.insert(symbol) {
                        return Err(Error::MalformedTree("symbol appears in more than one leaf"));
                    }
                }
                NodeKind::Inner { left, right } => {
                    for child in [left, right] {
                        if child >= nodes.len() {
                            return Err(Error::MalformedTree("child index out of range"));
                        }
                        if referenced[child] {
                            return Err(Error::MalformedTree("node referenced more than once"));
                        }
                        referenced[child] = true;
                        node_index_stack.push(child);
                    }
                    if nodes[left].weight.checked_add(nodes[right].weight) != Some(node.weight) {
                        return Err(Error::MalformedTree(
                            "inner weight differs from the sum of its children",
                        ));
                    }
                }
            }
        }

        if visited != nodes.len() {
            return Err(Error::MalformedTree("arena contains unreachable nodes"));
        }
        Ok(HuffmanTree { nodes, root_index })
    }

    pub fn root(&self) -> usize {
        self.root_index
    }

    pub fn node(&self, index: usize) -> Option<&Node<S>> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[Node<S>] {
        &self.nodes
    }

    /// weight of the root, the length of the input the tree was built from
    pub fn weight(&self) -> u64 {
        self.nodes[self.root_index].weight
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut node_index_stack = vec![(self.root_index, 0)];
        while let Some((index, depth)) = node_index_stack.pop() {
            match self.nodes[index].kind {
                NodeKind::Leaf { .. } => max_depth = max_depth.max(depth),
                NodeKind::Inner { left, right } => {
                    node_index_stack.push((left, depth + 1));
                    node_index_stack.push((right, depth + 1));
                }
            }
        }
        max_depth
    }
}

const INDENT: &str = "  ";

// Tree visualization, one node per line, left child first
impl<S: Symbol> fmt::Display for HuffmanTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut node_stack = vec![(self.root_index, 0, "")];
        while let Some((index, depth, edge)) = node_stack.pop() {
            let node = self.nodes[index];
            let indent = INDENT.repeat(depth);
            match node.kind {
                NodeKind::Leaf { symbol } => {
                    writeln!(f, "{}{}(s:{:?},w:{})", indent, edge, symbol, node.weight)?
                }
                NodeKind::Inner { left, right } => {
                    writeln!(f, "{}{}•(w:{})", indent, edge, node.weight)?;
                    node_stack.push((right, depth + 1, "1:"));
                    node_stack.push((left, depth + 1, "0:"));
                }
            }
        }
        Ok(())
    }
}
