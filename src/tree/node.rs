//! # Shape-preserving descriptor tree.
//!
//! [`Node`] is the tagged variant every combinator walks:
//!
//! ```text
//! Node<L> = Leaf(L)
//!         | Ordered(Vec<Node<L>>)
//!         | Keyed(IndexMap<String, Node<L>>)
//! ```
//!
//! The same type carries effects ([`Descriptor`](crate::Descriptor)), handles
//! ([`HandleTree`](crate::HandleTree)) and resolved values. Transformations never
//! flatten: a sequence of sequences stays a sequence of sequences, and keyed entries
//! keep their insertion order.
//!
//! ## Example
//! ```rust
//! use taskweave::Node;
//!
//! let tree = Node::keyed([
//!     ("a", Node::ordered([Node::leaf(1), Node::leaf(2)])),
//!     ("b", Node::leaf(3)),
//! ]);
//! let doubled = tree.map(|n| n * 2);
//!
//! assert!(doubled.same_shape(&Node::keyed([
//!     ("a", Node::ordered([Node::leaf(0), Node::leaf(0)])),
//!     ("b", Node::leaf(0)),
//! ])));
//! assert_eq!(doubled.leaves(), vec![&2, &4, &6]);
//! ```

use indexmap::IndexMap;

use super::key::Key;

/// A leaf, an ordered sequence of nodes, or a key-ordered mapping of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<L> {
    /// A single item (effect, handle or value).
    Leaf(L),
    /// Ordered sequence; positions are [`Key::Index`].
    Ordered(Vec<Node<L>>),
    /// Mapping with unique keys in insertion order; keys are [`Key::Name`].
    Keyed(IndexMap<String, Node<L>>),
}

impl<L> Node<L> {
    /// Wraps a single item.
    pub fn leaf(item: L) -> Self {
        Node::Leaf(item)
    }

    /// Builds an ordered node from its children.
    pub fn ordered(children: impl IntoIterator<Item = Node<L>>) -> Self {
        Node::Ordered(children.into_iter().collect())
    }

    /// Builds a keyed node; a repeated key keeps its first position and the last value.
    pub fn keyed<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node<L>)>) -> Self {
        Node::Keyed(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns `true` for [`Node::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Borrows the item of a leaf.
    pub fn as_leaf(&self) -> Option<&L> {
        match self {
            Node::Leaf(item) => Some(item),
            _ => None,
        }
    }

    /// Takes the item out of a leaf.
    pub fn into_leaf(self) -> Option<L> {
        match self {
            Node::Leaf(item) => Some(item),
            _ => None,
        }
    }

    /// Number of direct children (1 for a leaf).
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Ordered(items) => items.len(),
            Node::Keyed(entries) => entries.len(),
        }
    }

    /// True for an empty sequence or mapping.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Leaf(_) => false,
            Node::Ordered(items) => items.is_empty(),
            Node::Keyed(entries) => entries.is_empty(),
        }
    }

    /// Direct child at `key`; `Index` only addresses sequences, `Name` only mappings.
    pub fn get(&self, key: &Key) -> Option<&Node<L>> {
        match (self, key) {
            (Node::Ordered(items), Key::Index(i)) => items.get(*i),
            (Node::Keyed(entries), Key::Name(name)) => entries.get(name.as_str()),
            _ => None,
        }
    }

    /// Keys of the direct children, in order. A leaf has none.
    pub fn keys(&self) -> Vec<Key> {
        match self {
            Node::Leaf(_) => Vec::new(),
            Node::Ordered(items) => (0..items.len()).map(Key::Index).collect(),
            Node::Keyed(entries) => entries.keys().cloned().map(Key::Name).collect(),
        }
    }

    /// Replaces every leaf with `f(leaf)`, depth-first, left to right.
    pub fn map<M, F>(self, mut f: F) -> Node<M>
    where
        F: FnMut(L) -> M,
    {
        self.map_with(&mut f)
    }

    fn map_with<M, F>(self, f: &mut F) -> Node<M>
    where
        F: FnMut(L) -> M,
    {
        match self {
            Node::Leaf(item) => Node::Leaf(f(item)),
            Node::Ordered(items) => Node::Ordered(items.into_iter().map(|n| n.map_with(f)).collect()),
            Node::Keyed(entries) => Node::Keyed(
                entries
                    .into_iter()
                    .map(|(k, n)| (k, n.map_with(f)))
                    .collect(),
            ),
        }
    }

    /// Borrowing view with the same shape.
    pub fn as_ref(&self) -> Node<&L> {
        match self {
            Node::Leaf(item) => Node::Leaf(item),
            Node::Ordered(items) => Node::Ordered(items.iter().map(Node::as_ref).collect()),
            Node::Keyed(entries) => {
                Node::Keyed(entries.iter().map(|(k, n)| (k.clone(), n.as_ref())).collect())
            }
        }
    }

    /// All leaves, depth-first, left to right.
    pub fn leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a L>) {
        match self {
            Node::Leaf(item) => out.push(item),
            Node::Ordered(items) => items.iter().for_each(|n| n.collect_leaves(out)),
            Node::Keyed(entries) => entries.values().for_each(|n| n.collect_leaves(out)),
        }
    }

    /// True when both trees have the same sequence lengths and mapping keys (in order)
    /// at every level. Leaf contents are not compared.
    pub fn same_shape<M>(&self, other: &Node<M>) -> bool {
        match (self, other) {
            (Node::Leaf(_), Node::Leaf(_)) => true,
            (Node::Ordered(a), Node::Ordered(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (Node::Keyed(a), Node::Keyed(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, x), (kb, y))| ka == kb && x.same_shape(y))
            }
            _ => false,
        }
    }
}

impl<L> From<Vec<Node<L>>> for Node<L> {
    fn from(items: Vec<Node<L>>) -> Self {
        Node::Ordered(items)
    }
}

impl<L> From<IndexMap<String, Node<L>>> for Node<L> {
    fn from(entries: IndexMap<String, Node<L>>) -> Self {
        Node::Keyed(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Node<u32> {
        Node::keyed([
            ("z", Node::ordered([Node::leaf(1), Node::ordered([Node::leaf(2)])])),
            ("a", Node::leaf(3)),
        ])
    }

    #[test]
    fn map_preserves_shape_and_order() {
        let tree = nested();
        let mapped = tree.clone().map(|n| format!("v{n}"));
        assert!(tree.same_shape(&mapped));
        assert_eq!(mapped.leaves(), vec!["v1", "v2", "v3"]);
        assert_eq!(
            mapped.keys(),
            vec![Key::Name("z".into()), Key::Name("a".into())]
        );
    }

    #[test]
    fn nested_sequences_are_not_flattened() {
        let tree: Node<u32> = Node::ordered([Node::ordered([Node::leaf(1), Node::leaf(2)])]);
        let mapped = tree.map(|n| n + 1);
        match mapped {
            Node::Ordered(outer) => {
                assert_eq!(outer.len(), 1);
                assert_eq!(outer[0], Node::ordered([Node::leaf(2), Node::leaf(3)]));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_detected() {
        let a: Node<u32> = Node::ordered([Node::leaf(1), Node::leaf(2)]);
        let b: Node<u32> = Node::ordered([Node::leaf(1)]);
        let c: Node<u32> = Node::keyed([("0", Node::leaf(1)), ("1", Node::leaf(2))]);
        assert!(!a.same_shape(&b));
        assert!(!a.same_shape(&c));

        let reordered: Node<u32> = Node::keyed([("a", Node::leaf(3)), ("z", Node::leaf(1))]);
        assert!(!reordered.same_shape(&Node::keyed([("z", Node::leaf(0)), ("a", Node::leaf(0))])));
    }

    #[test]
    fn get_addresses_children_by_key_kind() {
        let tree = nested();
        assert_eq!(tree.get(&Key::from("a")), Some(&Node::leaf(3)));
        assert_eq!(tree.get(&Key::Index(0)), None);

        let seq: Node<u32> = Node::ordered([Node::leaf(5)]);
        assert_eq!(seq.get(&Key::Index(0)).and_then(Node::as_leaf), Some(&5));
    }

    #[test]
    fn only_leaves_unwrap_to_items() {
        let leaf = Node::leaf(4u32);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.into_leaf(), Some(4));

        let tree = nested();
        assert!(!tree.is_leaf());
        assert_eq!(tree.into_leaf(), None);
        assert_eq!(Node::<u32>::ordered([]).into_leaf(), None);
    }

    #[test]
    fn keyed_keeps_first_position_for_duplicate_keys() {
        let tree: Node<u32> = Node::keyed([("a", Node::leaf(1)), ("b", Node::leaf(2)), ("a", Node::leaf(9))]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.leaves(), vec![&9, &2]);
    }
}
