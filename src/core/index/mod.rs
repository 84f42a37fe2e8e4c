//! # Index Module
//!
//! A BK-tree over 64-bit perceptual hashes, keyed by Hamming distance.
//!
//! Answers "find all hashes within distance D of hash H" without comparing
//! against every stored hash: the triangle inequality of the Hamming metric
//! lets the search skip whole subtrees whose edge distance falls outside
//! `[d - max, d + max]`.

use crate::core::hasher::Phash;
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

struct Node {
    hash: Phash,
    // Edge label is the Hamming distance between this node and the child.
    children: HashMap<u32, Node>,
}

impl Node {
    fn new(hash: Phash) -> Self {
        Self {
            hash,
            children: HashMap::new(),
        }
    }
}

/// Metric tree enabling threshold-distance search over perceptual hashes.
#[derive(Default)]
pub struct SimilarityIndex {
    root: Option<Node>,
    len: usize,
}

impl SimilarityIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of hashes stored (duplicates are stored once)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a hash. Inserting a hash that is already present is a no-op.
    pub fn insert(&mut self, hash: Phash) {
        let Some(root) = self.root.as_mut() else {
            self.root = Some(Node::new(hash));
            self.len = 1;
            return;
        };

        let mut node = root;
        loop {
            let distance = node.hash.distance(&hash);
            if distance == 0 {
                return;
            }
            match node.children.entry(distance) {
                Entry::Occupied(child) => node = child.into_mut(),
                Entry::Vacant(slot) => {
                    slot.insert(Node::new(hash));
                    self.len += 1;
                    return;
                }
            }
        }
    }

    /// All stored hashes within `max_distance` of `query`, inclusive.
    pub fn search_within(&self, query: Phash, max_distance: u32) -> Vec<Phash> {
        let mut results = Vec::new();
        let mut stack: Vec<&Node> = self.root.iter().collect();

        while let Some(node) = stack.pop() {
            let distance = node.hash.distance(&query);
            if distance <= max_distance {
                results.push(node.hash);
            }

            let low = distance.saturating_sub(max_distance);
            let high = distance + max_distance;
            for (edge, child) in &node.children {
                if *edge >= low && *edge <= high {
                    stack.push(child);
                }
            }
        }

        results
    }
}

/// A pair of images considered similar, with their hash distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarPair {
    pub first: PathBuf,
    pub second: PathBuf,
    pub distance: u32,
}

/// Find all pairs of entries whose hashes are within `max_distance`.
///
/// Builds one index over the entries, then queries it for every entry in
/// parallel. Each pair is reported once, ordered by path within the pair.
pub fn similar_pairs(entries: &[(PathBuf, Phash)], max_distance: u32) -> Vec<SimilarPair> {
    let mut index = SimilarityIndex::new();
    let mut paths_by_hash: HashMap<Phash, Vec<&PathBuf>> = HashMap::new();
    for (path, hash) in entries {
        index.insert(*hash);
        paths_by_hash.entry(*hash).or_default().push(path);
    }

    let mut pairs: Vec<SimilarPair> = entries
        .par_iter()
        .map(|(path, hash)| {
            let mut found = Vec::new();
            for candidate in index.search_within(*hash, max_distance) {
                let Some(paths) = paths_by_hash.get(&candidate) else {
                    continue;
                };
                for other in paths {
                    // Order within the pair so each pair is emitted once.
                    if *other > path {
                        found.push(SimilarPair {
                            first: path.clone(),
                            second: (*other).clone(),
                            distance: hash.distance(&candidate),
                        });
                    }
                }
            }
            found
        })
        .flatten()
        .collect();

    pairs.sort_by(|a, b| (a.distance, &a.first, &a.second).cmp(&(b.distance, &b.first, &b.second)));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_returns_nothing() {
        let index = SimilarityIndex::new();
        assert!(index.is_empty());
        assert!(index.search_within(Phash(0), 64).is_empty());
    }

    #[test]
    fn exact_match_found_at_distance_zero() {
        let mut index = SimilarityIndex::new();
        for value in 0..11u64 {
            index.insert(Phash(value));
        }

        let results = index.search_within(Phash(2), 0);
        assert_eq!(results, vec![Phash(2)]);
    }

    #[test]
    fn duplicate_inserts_are_stored_once() {
        let mut index = SimilarityIndex::new();
        index.insert(Phash(7));
        index.insert(Phash(7));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn radius_search_matches_linear_scan() {
        let hashes: Vec<Phash> = (0..200u64).map(|v| Phash(v.wrapping_mul(0x9E37_79B9_7F4A_7C15))).collect();
        let mut index = SimilarityIndex::new();
        for hash in &hashes {
            index.insert(*hash);
        }

        let query = Phash(0x1234_5678_9ABC_DEF0);
        for max_distance in [0, 5, 20, 64] {
            let mut expected: Vec<Phash> = hashes
                .iter()
                .copied()
                .filter(|h| h.distance(&query) <= max_distance)
                .collect();
            let mut actual = index.search_within(query, max_distance);
            expected.sort();
            actual.sort();
            assert_eq!(actual, expected, "max_distance={max_distance}");
        }
    }

    #[test]
    fn similar_pairs_reports_each_pair_once() {
        let entries = vec![
            (PathBuf::from("/a.jpg"), Phash(0b0000)),
            (PathBuf::from("/b.jpg"), Phash(0b0001)),
            (PathBuf::from("/c.jpg"), Phash(u64::MAX)),
        ];

        let pairs = similar_pairs(&entries, 2);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].first, PathBuf::from("/a.jpg"));
        assert_eq!(pairs[0].second, PathBuf::from("/b.jpg"));
        assert_eq!(pairs[0].distance, 1);
    }

    #[test]
    fn identical_hashes_on_different_paths_still_pair() {
        let entries = vec![
            (PathBuf::from("/a.jpg"), Phash(99)),
            (PathBuf::from("/b.jpg"), Phash(99)),
        ];

        let pairs = similar_pairs(&entries, 0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].distance, 0);
    }
}
