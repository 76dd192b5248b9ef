//! kestrel-config: typed, name-addressed configuration variables.
//!
//! ```text
//! document text ──► DocumentNode tree ──► flatten ──► Registry ──► ConfigVar<T>
//!                                                                     │
//!                                                          listeners ◄┘
//! ```
//!
//! Values are converted by the [`ConfigValue`] codec, which composes through
//! nested containers. Variables are stored type-erased and handed back as
//! typed [`ConfigVar`] handles after a checked downcast.

pub mod codec;
pub mod document;
pub mod error;
pub mod registry;
pub mod var;

pub use codec::{serde_from_node, serde_to_node, ConfigValue};
pub use document::{is_valid_name, list_all_members, DocumentFormat, DocumentNode};
pub use error::{CodecError, RegistryError};
pub use registry::Registry;
pub use var::{ConfigVar, ConfigVarBase, Listener};

/// Re-exported so record codecs can name the node type without a direct
/// `serde_json` dependency.
pub use serde_json::Value as Node;
