use crate::error::Result;
use crate::storage::KeyValueTable;

/// Prefix <-> namespace bindings, kept in two tables so both directions are point lookups.
#[derive(Debug)]
pub struct NamespaceBindings<T: KeyValueTable> {
    /// prefix -> namespace
    namespace: T,
    /// namespace -> prefix
    prefix: T,
}

impl<T: KeyValueTable> NamespaceBindings<T> {
    pub fn new(namespace: T, prefix: T) -> Self {
        Self { namespace, prefix }
    }

    /// Binds `prefix` to `namespace`, replacing any earlier binding of either side.
    pub fn bind(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        if let Some(old_prefix) = self.prefix.get(namespace)? {
            self.namespace.delete(&old_prefix)?;
        }
        if let Some(old_namespace) = self.namespace.get(prefix)? {
            self.prefix.delete(&old_namespace)?;
        }
        self.prefix.set(namespace, prefix)?;
        self.namespace.set(prefix, namespace)
    }

    pub fn namespace(&self, prefix: &str) -> Result<Option<String>> {
        self.namespace.get(prefix)
    }

    pub fn prefix(&self, namespace: &str) -> Result<Option<String>> {
        self.prefix.get(namespace)
    }

    /// All (prefix, namespace) pairs, ascending by prefix.
    pub fn namespaces(&self) -> Result<Vec<(String, String)>> {
        self.namespace.entries()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.namespace.flush()?;
        self.prefix.flush()
    }
}
