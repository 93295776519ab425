/// Settings for a [`Binder`](crate::Binder).
///
/// # Examples
///
/// ```
/// use request_binder::BinderConfig;
///
/// let config = BinderConfig::default().with_permission_claim_type("permission");
/// assert_eq!(config.permission_claim_type.as_deref(), Some("permission"));
/// assert_eq!(config.pool_size, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderConfig {
    /// Claim type under which permissions are granted.
    ///
    /// When neither this nor the request supplies one, permission-bound
    /// properties are left untouched.
    pub permission_claim_type: Option<String>,
    /// Maximum number of idle failure buffers kept for reuse.
    pub pool_size: usize,
    /// Buffers that grew beyond this capacity are freed instead of pooled.
    pub max_pooled_capacity: usize,
}

impl BinderConfig {
    /// Default for [`pool_size`](Self::pool_size).
    pub const DEFAULT_POOL_SIZE: usize = 32;

    /// Default for [`max_pooled_capacity`](Self::max_pooled_capacity).
    pub const DEFAULT_MAX_POOLED_CAPACITY: usize = 128;

    /// Sets the permission claim type.
    pub fn with_permission_claim_type(mut self, claim_type: impl Into<String>) -> Self {
        self.permission_claim_type = Some(claim_type.into());
        self
    }

    /// Sets the failure buffer pool size.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Sets the largest buffer capacity that is returned to the pool.
    pub fn with_max_pooled_capacity(mut self, capacity: usize) -> Self {
        self.max_pooled_capacity = capacity;
        self
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            permission_claim_type: None,
            pool_size: Self::DEFAULT_POOL_SIZE,
            max_pooled_capacity: Self::DEFAULT_MAX_POOLED_CAPACITY,
        }
    }
}
