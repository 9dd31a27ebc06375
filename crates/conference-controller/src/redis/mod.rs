//! Redis-backed coordination primitives.

pub mod lock;
pub mod lua_scripts;

pub use lock::{LockGuard, RedisLockClient};
