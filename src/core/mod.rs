// src/core/mod.rs

pub mod engine;
pub mod heap;
pub mod tokenizer;
pub mod trie;
pub mod types;
