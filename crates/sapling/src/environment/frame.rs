//! RAII scope guard for automatic frame cleanup

use super::Environment;
use crate::error::Result;

/// RAII guard that pops its frame when dropped.
///
/// # Example
///
/// ```
/// use sapling::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.push().unwrap();
/// env.insert("x", Value::integer(1)).unwrap();
///
/// {
///     let guard = env.scope_guard().unwrap();
///     guard.insert("y", Value::integer(2)).unwrap();
///     assert!(guard.exists("y"));
/// }
/// // guard dropped, frame popped, y is gone
/// assert!(!env.exists("y"));
/// assert!(env.exists("x"));
/// ```
pub struct ScopeGuard<'a> {
    env: &'a mut Environment,
}

impl Environment {
    /// Push a frame now and pop it when the returned guard drops.
    pub fn scope_guard(&mut self) -> Result<ScopeGuard<'_>> {
        self.push()?;
        Ok(ScopeGuard { env: self })
    }
}

impl<'a> Drop for ScopeGuard<'a> {
    fn drop(&mut self) {
        self.env.pop();
    }
}

impl<'a> std::ops::Deref for ScopeGuard<'a> {
    type Target = Environment;

    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl<'a> std::ops::DerefMut for ScopeGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}
