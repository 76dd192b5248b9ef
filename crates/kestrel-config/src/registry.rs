//! Registry: the name → variable directory.
//!
//! [`Registry::global`] is the process-wide instance, created on first use
//! and never torn down. Tests and embedders that need isolation build their
//! own with [`Registry::new`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::codec::ConfigValue;
use crate::document::{self, DocumentFormat, DocumentNode};
use crate::error::RegistryError;
use crate::var::{ConfigVar, ConfigVarBase};

/// Directory of config variables keyed by lowercase dotted name.
#[derive(Default)]
pub struct Registry {
    vars: RwLock<BTreeMap<String, Arc<dyn ConfigVarBase>>>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Return the variable called `name`, creating it with `default_value`
    /// when absent.
    ///
    /// An existing variable keeps its value and description. Names are
    /// matched case-insensitively.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidName`] when `name` is empty or has characters
    /// outside `[A-Za-z0-9._]`; [`RegistryError::TypeMismatch`] when the name
    /// is taken by a variable of another type.
    pub fn lookup_or_create<T: ConfigValue>(
        &self,
        name: &str,
        default_value: T,
        description: &str,
    ) -> Result<Arc<ConfigVar<T>>, RegistryError> {
        let key = name.to_ascii_lowercase();
        if let Some(existing) = self.typed_entry::<T>(&key)? {
            tracing::debug!(name = %key, "config variable exists");
            return Ok(existing);
        }

        if key.is_empty() || !document::is_valid_name(&key) {
            tracing::error!(name = %name, "invalid config variable name");
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let mut vars = self.vars.write();
        // Another caller may have inserted between the read and write locks.
        if let Some(raced) = vars.get(&key) {
            return downcast::<T>(&key, Arc::clone(raced));
        }
        let var = Arc::new(ConfigVar::new(key.clone(), default_value, description));
        vars.insert(key, Arc::clone(&var) as Arc<dyn ConfigVarBase>);
        Ok(var)
    }

    /// Typed lookup without creation. `None` when absent or of another type.
    pub fn lookup<T: ConfigValue>(&self, name: &str) -> Option<Arc<ConfigVar<T>>> {
        self.typed_entry::<T>(&name.to_ascii_lowercase()).ok().flatten()
    }

    /// Untyped lookup.
    pub fn lookup_base(&self, name: &str) -> Option<Arc<dyn ConfigVarBase>> {
        self.vars.read().get(&name.to_ascii_lowercase()).cloned()
    }

    /// Visit every variable in name order.
    pub fn visit(&self, mut f: impl FnMut(&dyn ConfigVarBase)) {
        let vars: Vec<_> = self.vars.read().values().cloned().collect();
        for var in vars {
            f(var.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.vars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.read().is_empty()
    }

    /// Apply every value in `root` whose lowercased dotted path names a
    /// registered variable. Unregistered paths and null nodes are ignored;
    /// values that fail to decode are logged and leave the variable as is.
    pub fn load_from_document<N: DocumentNode>(&self, root: &N) {
        let mut members = Vec::new();
        document::list_all_members("", root, &mut members);

        for (path, node) in members {
            if path.is_empty() {
                continue;
            }
            let key = path.to_ascii_lowercase();
            let Some(var) = self.lookup_base(&key) else {
                continue;
            };
            if node.is_null() {
                tracing::debug!(name = %key, "null config node ignored");
                continue;
            }
            let text = match node.scalar_text() {
                Some(text) => text,
                None => node.to_canonical_text(),
            };
            var.from_string(&text);
        }
    }

    /// Parse `text` and [`load_from_document`](Self::load_from_document) it.
    pub fn load_from_str(&self, text: &str, format: DocumentFormat) -> Result<(), RegistryError> {
        let root: Value = document::parse_document(text, format)?;
        self.load_from_document(&root);
        Ok(())
    }

    /// Read `path` (format from its extension) and load it.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let root = document::read_document(path)?;
        tracing::info!(path = %path.display(), "loading config document");
        self.load_from_document(&root);
        Ok(())
    }

    fn typed_entry<T: ConfigValue>(
        &self,
        key: &str,
    ) -> Result<Option<Arc<ConfigVar<T>>>, RegistryError> {
        let entry = self.vars.read().get(key).cloned();
        entry.map(|var| downcast::<T>(key, var)).transpose()
    }
}

fn downcast<T: ConfigValue>(
    key: &str,
    var: Arc<dyn ConfigVarBase>,
) -> Result<Arc<ConfigVar<T>>, RegistryError> {
    let stored = var.type_name();
    let erased = Arc::clone(&var);
    var.as_any().downcast::<ConfigVar<T>>().map_err(|_| {
        let value = erased.to_string();
        tracing::error!(
            name = %key,
            stored,
            requested = T::type_name(),
            value = %value,
            "config variable type mismatch"
        );
        RegistryError::TypeMismatch {
            name: key.to_string(),
            stored,
            requested: T::type_name(),
            value,
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn creates_once_and_keeps_first_default() {
        let reg = Registry::new();
        let first = reg.lookup_or_create("system.port", 8080, "system port").unwrap();
        let second = reg.lookup_or_create("system.port", 1, "other").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get_value(), 8080);
        assert_eq!(second.description(), "system port");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn type_mismatch_is_reported_and_harmless() {
        let reg = Registry::new();
        let int_var = reg.lookup_or_create("x", 5i32, "").unwrap();
        let err = reg.lookup_or_create("x", String::new(), "").unwrap_err();
        assert_eq!(
            err,
            RegistryError::TypeMismatch {
                name: "x".into(),
                stored: "i32",
                requested: "String",
                value: "5".into(),
            }
        );
        assert!(reg.lookup::<String>("x").is_none());
        assert_eq!(int_var.get_value(), 5);
    }

    #[test]
    fn concurrent_creation_yields_one_variable() {
        let reg = Registry::new();
        let handles: Vec<Arc<ConfigVar<i32>>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|i| {
                    let reg = &reg;
                    scope.spawn(move || reg.lookup_or_create("shared.value", i, "").unwrap())
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(reg.len(), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert!((0..8).contains(&handles[0].get_value()));
    }

    static ENCODES: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Clone, PartialEq)]
    struct Counted(i32);

    impl ConfigValue for Counted {
        fn to_node(&self) -> Result<Value, CodecError> {
            ENCODES.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from(self.0))
        }

        fn from_node(node: &Value) -> Result<Self, CodecError> {
            i32::from_node(node).map(Counted)
        }
    }

    #[test]
    fn typed_lookup_does_not_encode_the_value() {
        let reg = Registry::new();
        reg.lookup_or_create("counted", Counted(1), "").unwrap();
        ENCODES.store(0, Ordering::SeqCst);

        assert!(reg.lookup::<Counted>("counted").is_some());
        reg.lookup_or_create("counted", Counted(2), "").unwrap();
        assert_eq!(ENCODES.load(Ordering::SeqCst), 0);

        assert!(reg.lookup::<i32>("counted").is_none());
        assert_eq!(ENCODES.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let reg = Registry::new();
        assert_eq!(
            reg.lookup_or_create("bad name!", 0, "").unwrap_err(),
            RegistryError::InvalidName("bad name!".into())
        );
        assert!(matches!(reg.lookup_or_create("", 0, ""), Err(RegistryError::InvalidName(_))));
        assert!(reg.lookup_or_create("a.b.c", 0, "").is_ok());
        assert!(reg.lookup_base("bad name!").is_none());
    }

    #[test]
    fn names_fold_to_lowercase() {
        let reg = Registry::new();
        let var = reg.lookup_or_create("System.Port", 1, "").unwrap();
        assert_eq!(var.name(), "system.port");
        assert!(reg.lookup::<i32>("SYSTEM.PORT").is_some());
    }

    #[test]
    fn load_sets_registered_paths_only() {
        let reg = Registry::new();
        let ab = reg.lookup_or_create("a.b", 0, "").unwrap();
        let list = reg.lookup_or_create("a.list", Vec::<i32>::new(), "").unwrap();

        reg.load_from_document(&json!({"A": {"B": 10, "list": [1, 2], "unknown": true}}));

        assert_eq!(ab.get_value(), 10);
        assert_eq!(list.get_value(), vec![1, 2]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn undecodable_value_keeps_previous() {
        let reg = Registry::new();
        let port = reg.lookup_or_create("port", 8080, "").unwrap();
        reg.load_from_document(&json!({"port": "eighty"}));
        assert_eq!(port.get_value(), 8080);
        reg.load_from_document(&json!({"port": null}));
        assert_eq!(port.get_value(), 8080);
    }

    #[test]
    fn visit_is_name_ordered() {
        let reg = Registry::new();
        reg.lookup_or_create("b", 1, "").unwrap();
        reg.lookup_or_create("a", "x".to_string(), "").unwrap();
        let mut seen = Vec::new();
        reg.visit(|var| seen.push(format!("{}={}", var.name(), var.to_string())));
        assert_eq!(seen, vec!["a=x", "b=1"]);
    }

    #[test]
    fn global_is_a_single_instance() {
        assert!(std::ptr::eq(Registry::global(), Registry::global()));
    }
}
