//! Huffman tree construction.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use kraft_core::Result;

use crate::types::{CodeList, HuffmanCode, HuffmanNode, NodeIndex};
use crate::{MAX_SYMBOLS, MAX_TREE_NODES};

/// Priority queue entry. Derived ordering compares frequency first, then the
/// tie-break order, so equal frequencies resolve the same way everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    frequency: u64,
    /// Symbol value for leaves, `MAX_SYMBOLS + n` for the n-th junction.
    order: u16,
    index: NodeIndex,
}

/// A Huffman tree built over a fixed node arena.
///
/// The arena and the priority queue are reused from chunk to chunk.
pub struct HuffmanTree {
    nodes: Box<[HuffmanNode; MAX_TREE_NODES]>,
    len: usize,
    root: Option<NodeIndex>,
    queue: BinaryHeap<Reverse<QueueEntry>>,
    stack: Vec<(NodeIndex, u8)>,
}

impl HuffmanTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Box::new([HuffmanNode::default(); MAX_TREE_NODES]),
            len: 0,
            root: None,
            queue: BinaryHeap::with_capacity(MAX_SYMBOLS),
            stack: Vec::with_capacity(MAX_SYMBOLS),
        }
    }

    /// Build the tree for a frequency table. Symbols with zero frequency are
    /// left out; an all-zero table gives an empty tree.
    pub fn build(&mut self, frequencies: &[u64; MAX_SYMBOLS]) {
        self.len = 0;
        self.root = None;
        self.queue.clear();

        for (symbol, &frequency) in frequencies.iter().enumerate() {
            if frequency > 0 {
                let index = self.insert(HuffmanNode::Leaf {
                    symbol: symbol as u8,
                    frequency,
                });
                self.queue.push(Reverse(QueueEntry {
                    frequency,
                    order: symbol as u16,
                    index,
                }));
            }
        }

        let mut junctions = 0;
        while self.queue.len() > 1 {
            let (Some(Reverse(left)), Some(Reverse(right))) = (self.queue.pop(), self.queue.pop())
            else {
                break;
            };

            let frequency = left.frequency + right.frequency;
            let index = self.insert(HuffmanNode::Junction {
                left: left.index,
                right: right.index,
                frequency,
            });
            self.queue.push(Reverse(QueueEntry {
                frequency,
                order: (MAX_SYMBOLS + junctions) as u16,
                index,
            }));
            junctions += 1;
        }

        self.root = self.queue.pop().map(|Reverse(entry)| entry.index);
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The root node, if the tree is not empty.
    pub fn root(&self) -> Option<&HuffmanNode> {
        self.root.map(|index| &self.nodes[usize::from(index)])
    }

    /// Append one code per leaf to `codes`, with its depth as the code length.
    ///
    /// Code values are left at zero; they are assigned once the list is in
    /// canonical order. A tree holding a single leaf yields a 1-bit code.
    pub fn collect_lengths(&mut self, codes: &mut CodeList) -> Result<()> {
        let Some(root) = self.root else {
            return Ok(());
        };

        self.stack.clear();
        self.stack.push((root, 0));

        while let Some((index, depth)) = self.stack.pop() {
            match self.nodes[usize::from(index)] {
                HuffmanNode::Leaf { symbol, .. } => {
                    codes.push(HuffmanCode::new(symbol, 0, depth.max(1)))?;
                }
                HuffmanNode::Junction { left, right, .. } => {
                    self.stack.push((right, depth + 1));
                    self.stack.push((left, depth + 1));
                }
            }
        }

        Ok(())
    }

    fn insert(&mut self, node: HuffmanNode) -> NodeIndex {
        let index = self.len;
        self.nodes[index] = node;
        self.len += 1;
        index as NodeIndex
    }
}

impl Default for HuffmanTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HuffmanTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuffmanTree")
            .field("nodes", &&self.nodes[..self.len])
            .field("root", &self.root)
            .finish()
    }
}
