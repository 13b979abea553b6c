mod keyed_lock;
mod read_through;

pub use keyed_lock::{KeyedLock, KeyedLockGuard};
pub use read_through::{CacheLoader, CacheReadType, TimedCache};
