//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warrant_rights::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use warrant_rights::prelude::*;
//!
//! let rules = RuleSet::parse(
//!     "<prelude>",
//!     "[public]\nuser = .*\ncollection = public(/.*)?\npermissions = r\n",
//! )
//! .unwrap();
//!
//! let backend = StaticRules::new(rules);
//! let granted = backend
//!     .authorized(None, "public/events", &Permissions::parse("rw"))
//!     .unwrap();
//! assert_eq!(granted, Permissions::parse("r"));
//! ```

// Errors
pub use crate::{PatternError, RightsError, RightsResult};

// Rules and permissions
pub use crate::{Permissions, Rule, RuleSet};

// Evaluation
pub use crate::{authorize, strip_path};

// Backends
pub use crate::{Authorizer, CachedRulesFile, ReloadPolicy, RulesFile, StaticRules, open_backend};
