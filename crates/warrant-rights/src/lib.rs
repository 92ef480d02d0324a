//! Warrant Rights - Regex rule-file authorization.
//!
//! This crate provides:
//! - A loader for sectioned rule files (`[name]` sections with `user`,
//!   `collection` and `permissions` keys)
//! - Two-phase pattern templates: `%(login)s` / `%(path)s` interpolation of
//!   the regex-escaped request, then `{0}`, `{1}`, ... capture-group
//!   substitution from the identity match
//! - A first-match-wins evaluator returning the granted permission subset
//! - Backends that re-read, cache, or pin a rule set
//!
//! # Security Model
//!
//! Every value taken from the request (the login, the path, and text captured
//! from the login) is passed through [`regex::escape`] before it reaches a
//! pattern, so a caller can never widen a rule by sending regex syntax.
//! Patterns must match the *entire* login or path. A rule that fails to
//! compile aborts the decision instead of being skipped. When nothing
//! matches, nothing is granted.
//!
//! # Example
//!
//! ```
//! use warrant_rights::{Permissions, RuleSet, authorize};
//!
//! let rules = RuleSet::parse(
//!     "<example>",
//!     "[owner]\nuser = (.+)\ncollection = {0}(/.*)?\npermissions = rw\n",
//! )
//! .unwrap();
//!
//! let requested = Permissions::parse("rw");
//! let granted = authorize(Some("alice"), "/alice/calendar/", &requested, &rules).unwrap();
//! assert_eq!(granted.to_string(), "rw");
//!
//! let denied = authorize(Some("alice"), "/bob/calendar/", &requested, &rules).unwrap();
//! assert!(denied.is_empty());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod backend;
mod error;
mod evaluator;
mod parser;
mod path;
mod permissions;
mod rule;
mod template;

pub use backend::{Authorizer, CachedRulesFile, ReloadPolicy, RulesFile, StaticRules, open_backend};
pub use error::{PatternError, RightsError, RightsResult};
pub use evaluator::authorize;
pub use path::{SEPARATOR, strip_path};
pub use permissions::{Permissions, intersect_permissions};
pub use rule::{INLINE_ORIGIN, Rule, RuleSet};
pub use template::Interpolation;
