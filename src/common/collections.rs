pub use std::collections::{BTreeMap, hash_map};

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
