//! Environment trait

/// Read access to a set of environment variables
pub trait Environment: Send + Sync {
    /// Value of a single variable, `None` when it isn't set
    fn var(&self, name: &str) -> Option<String>;

    /// Every variable currently set
    fn vars(&self) -> Vec<(String, String)>;
}
