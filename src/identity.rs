use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Inner {
    name: Option<Arc<str>>,
    namespace: Option<Arc<str>>,
}

/// Name and namespace of an event, shared by every handle that refers to it.
///
/// Cloning an `Identity` doesn't copy the values: all clones observe the same
/// cell. A duplex event and both of its sides hold one identity, which is how
/// the pair can never disagree on name or namespace.
///
/// Writes are expected during setup only; reads are cheap `Arc<str>` clones.
#[derive(Debug, Clone, Default)]
pub struct Identity(Arc<RwLock<Inner>>);

impl Identity {
    pub fn new(name: Option<Arc<str>>, namespace: Option<Arc<str>>) -> Self {
        Self(Arc::new(RwLock::new(Inner { name, namespace })))
    }

    #[inline]
    pub fn name(&self) -> Option<Arc<str>> {
        self.0.read().name.clone()
    }

    #[inline]
    pub fn namespace(&self) -> Option<Arc<str>> {
        self.0.read().namespace.clone()
    }

    pub fn set_name(&self, name: impl Into<Arc<str>>) {
        self.0.write().name = Some(name.into());
    }

    pub fn set_namespace(&self, namespace: impl Into<Arc<str>>) {
        self.0.write().namespace = Some(namespace.into());
    }

    /// Whether both handles refer to the same cell.
    pub fn is_shared_with(&self, other: &Identity) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
