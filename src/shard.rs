//! Deterministic shard keys via BLAKE3
//!
//! Every sharded resource for a given (build, package) uses the same
//! derivation, so a qualified name always lands in the same shard across
//! catalog, lookup, and changelog structures.

/// Hex characters of the hash that form a shard key (256 shards)
pub const SHARD_KEY_LEN: usize = 2;

/// Shard key for a qualified symbol name
///
/// # Examples
/// ```
/// use refstore::shard::shard_key;
///
/// let key = shard_key("langchain_core.language_models.BaseChatModel");
/// assert_eq!(key.len(), 2);
/// assert_eq!(key, shard_key("langchain_core.language_models.BaseChatModel"));
/// ```
pub fn shard_key(qualified_name: &str) -> String {
    hex_prefix(qualified_name)
}

/// Shard directory for an individual symbol object
///
/// Derived from the symbol id, not the qualified name - the two schemes
/// are independent.
pub fn symbol_shard(symbol_id: &str) -> String {
    hex_prefix(symbol_id)
}

/// Stable file name for a persistent cache entry (keys contain '/')
pub fn cache_file_name(key: &str) -> String {
    blake3::hash(key.as_bytes()).to_hex().to_string()
}

fn hex_prefix(input: &str) -> String {
    let hash = blake3::hash(input.as_bytes());
    hash.to_hex()[..SHARD_KEY_LEN].to_string()
}
