//! Lua scripts for atomic lock operations.
//!
//! Lock release must only delete the key when the stored token matches
//! the holder's token; GET followed by DEL would race with expiry and
//! delete a lock another instance has since acquired.

/// Lua script for compare-and-delete lock release.
///
/// Arguments:
/// - KEYS[1]: Lock key
/// - ARGV[1]: Holder token
///
/// Returns:
/// - 1: Released (token matched)
/// - 0: Not released (lock missing or held by someone else)
pub const RELEASE_LOCK: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#;
