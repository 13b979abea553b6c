mod ensure_backend_pool_deleted;
mod ensure_hosts_in_pool;

pub use ensure_backend_pool_deleted::EnsureBackendPoolDeletedUseCase;
pub use ensure_hosts_in_pool::EnsureHostsInPoolUseCase;
