//! Rules and ordered rule sets.

use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::error::{PatternError, RightsError, RightsResult};
use crate::permissions::Permissions;
use crate::template::{Interpolation, Template};

/// Origin label for rules built in code rather than read from a source.
pub const INLINE_ORIGIN: &str = "<inline>";

/// Key holding the identity pattern.
pub(crate) const USER_KEY: &str = "user";
/// Key holding the resource pattern template.
pub(crate) const COLLECTION_KEY: &str = "collection";
/// Key holding the permission symbols.
pub(crate) const PERMISSIONS_KEY: &str = "permissions";

/// One named rule: identity pattern, resource pattern, permissions.
///
/// The name is a label for diagnostics and is never matched.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    user: Template,
    collection: Template,
    permissions: Template,
}

impl Rule {
    /// Build a rule from its authored values.
    ///
    /// Only `%(login)s` and `%(path)s` are available for interpolation.
    ///
    /// # Errors
    ///
    /// Returns [`RightsError::Interpolation`] if a value has a malformed
    /// `%(name)s` reference. Malformed `{N}` placeholders are reported when
    /// a request reaches the rule.
    pub fn new(
        name: impl Into<String>,
        user: &str,
        collection: &str,
        permissions: &str,
    ) -> RightsResult<Self> {
        let name = name.into();
        let no_keys = |_: &str| -> Option<&'static str> { None };
        Self::from_values(INLINE_ORIGIN, name, user, collection, permissions, &no_keys)
    }

    /// Build a rule, expanding `%(name)s` references through `lookup`.
    pub(crate) fn from_values<'a, F>(
        origin: &str,
        name: String,
        user: &str,
        collection: &str,
        permissions: &str,
        lookup: &F,
    ) -> RightsResult<Self>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let template = |key: &str, raw: &str, placeholders: bool| {
            Template::parse(raw, lookup, placeholders).map_err(|message| {
                RightsError::Interpolation {
                    origin: origin.to_owned(),
                    section: name.clone(),
                    key: key.to_owned(),
                    message,
                }
            })
        };

        let user = template(USER_KEY, user, false)?;
        let collection = template(COLLECTION_KEY, collection, true)?;
        let permissions = template(PERMISSIONS_KEY, permissions, false)?;

        Ok(Self {
            name,
            user,
            collection,
            permissions,
        })
    }

    /// The rule's label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The identity pattern as authored.
    #[must_use]
    pub fn user_pattern(&self) -> &str {
        self.user.source()
    }

    /// The resource pattern template as authored.
    #[must_use]
    pub fn collection_pattern(&self) -> &str {
        self.collection.source()
    }

    /// The permission string as authored.
    #[must_use]
    pub fn permissions(&self) -> &str {
        self.permissions.source()
    }

    /// Test this rule against one request.
    ///
    /// Returns the rule's permission set if both the identity and the
    /// resource pattern match in full, `None` if either does not.
    pub(crate) fn evaluate(
        &self,
        user: &str,
        path: &str,
        vars: &Interpolation,
    ) -> Result<Option<Permissions>, PatternError> {
        let user_pattern = self.user.render(vars, &[])?;
        let user_regex = compile_full(&user_pattern)?;
        let Some(captures) = user_regex.captures(user) else {
            return Ok(None);
        };

        let groups: Vec<Option<&str>> = captures
            .iter()
            .skip(1)
            .map(|group| group.map(|m| m.as_str()))
            .collect();

        let collection_pattern = self.collection.render(vars, &groups)?;
        let collection_regex = compile_full(&collection_pattern)?;
        if !collection_regex.is_match(path) {
            return Ok(None);
        }

        let granted = self.permissions.render(vars, &[])?;
        Ok(Some(Permissions::parse(&granted)))
    }

    /// Check the rule without a request.
    ///
    /// Request values are always escaped, so an empty identity and path are
    /// representative. Every identity group is assumed to participate.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] that a request reaching this rule's
    /// resource pattern would raise.
    pub fn check(&self) -> Result<(), PatternError> {
        let vars = Interpolation::new("", "");
        let user_regex = compile_full(&self.user.render(&vars, &[])?)?;
        let groups = vec![Some(""); user_regex.captures_len().saturating_sub(1)];
        compile_full(&self.collection.render(&vars, &groups)?)?;
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] user={:?} collection={:?} permissions={:?}",
            self.name,
            self.user.source(),
            self.collection.source(),
            self.permissions.source()
        )
    }
}

/// Compile `pattern` so that it only matches a whole haystack.
///
/// The bare pattern is checked on its own first: a pattern like `a)|(b`
/// must not be able to escape the anchoring group.
fn compile_full(pattern: &str) -> Result<Regex, PatternError> {
    let regex_err = |source| PatternError::Regex {
        pattern: pattern.to_owned(),
        source,
    };
    Regex::new(pattern).map_err(regex_err)?;
    Regex::new(&format!(r"\A(?:{pattern})\z")).map_err(regex_err)
}

/// An ordered list of rules. Position is priority: the first rule that
/// matches decides.
#[derive(Debug, Clone)]
pub struct RuleSet {
    origin: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Wrap already-built rules, keeping their order.
    #[must_use]
    pub fn new(origin: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            origin: origin.into(),
            rules,
        }
    }

    /// Parse rules from sectioned text. `origin` labels the source in errors.
    ///
    /// # Errors
    ///
    /// Returns a rule-definition error ([`RightsError::Syntax`],
    /// [`RightsError::MissingKey`] or [`RightsError::Interpolation`]) if the
    /// text is malformed.
    pub fn parse(origin: impl Into<String>, text: &str) -> RightsResult<Self> {
        let origin = origin.into();
        let rules = crate::parser::parse_rules(&origin, text)?;
        Ok(Self { origin, rules })
    }

    /// Read and parse a rule file.
    ///
    /// # Errors
    ///
    /// Returns [`RightsError::Load`] if the file cannot be read, or a
    /// rule-definition error if its content is malformed.
    pub fn load(path: impl AsRef<Path>) -> RightsResult<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| RightsError::Load {
            origin: origin.clone(),
            source,
        })?;
        let rule_set = Self::parse(origin, &text)?;
        tracing::debug!(
            origin = %rule_set.origin,
            rules = rule_set.len(),
            "loaded rights file"
        );
        Ok(rule_set)
    }

    /// Label of the source the rules came from.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterate the rules in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules (and so denies everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// [`Rule::check`] every rule, collecting all failures in rule order.
    #[must_use]
    pub fn check(&self) -> Vec<RightsError> {
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.check().err().map(|source| RightsError::Evaluation {
                    origin: self.origin.clone(),
                    section: rule.name.clone(),
                    source,
                })
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
