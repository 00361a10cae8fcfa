// --- File: src/core/trie.rs
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct TrieNode {
    children: HashMap<char, usize>,
    end_of_word: bool,
}

impl TrieNode {
    fn new() -> Self {
        Self { children: HashMap::new(), end_of_word: false }
    }
}

/// A character-keyed prefix trie over lowercased words.
///
/// Nodes live in a flat arena; index 0 is the root and stands for the empty
/// prefix. Nodes are only ever appended, so a child index stays valid for the
/// lifetime of the trie.
#[derive(Clone, Debug)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    word_count: usize,
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new()], word_count: 0 }
    }

    /// Number of distinct words inserted.
    pub fn len(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Inserts `word` in lowercase. Re-inserting the same word is a no-op.
    /// O(k) complexity where k is word length.
    pub fn insert(&mut self, word: &str) {
        let mut node_idx = 0;
        for ch in word.to_lowercase().chars() {
            node_idx = if let Some(&id) = self.nodes[node_idx].children.get(&ch) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::new());
                self.nodes[node_idx].children.insert(ch, new_node_id);
                new_node_id
            };
        }

        let node = &mut self.nodes[node_idx];
        if !node.end_of_word {
            node.end_of_word = true;
            self.word_count += 1;
        }
    }

    /// True only when `word` itself was inserted, not merely a longer word
    /// starting with it.
    pub fn search(&self, word: &str) -> bool {
        self.find_node(&word.to_lowercase())
            .is_some_and(|idx| self.nodes[idx].end_of_word)
    }

    /// Every inserted word beginning with `prefix`, in traversal order.
    ///
    /// The order is not alphabetical; callers that need a stable order must
    /// sort, and callers that need a bound must truncate.
    pub fn autocomplete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        let Some(start) = self.find_node(&prefix) else {
            return vec![];
        };

        let mut results = Vec::new();
        // Explicit stack so very long shared prefixes can't blow the call stack.
        let mut stack = vec![(start, prefix)];
        while let Some((node_idx, word)) = stack.pop() {
            let node = &self.nodes[node_idx];
            if node.end_of_word {
                results.push(word.clone());
            }
            for (&ch, &child_idx) in &node.children {
                let mut next = word.clone();
                next.push(ch);
                stack.push((child_idx, next));
            }
        }
        results
    }

    fn find_node(&self, key: &str) -> Option<usize> {
        let mut node_idx = 0;
        for ch in key.chars() {
            node_idx = *self.nodes[node_idx].children.get(&ch)?;
        }
        Some(node_idx)
    }
}
