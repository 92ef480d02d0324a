//! Sectioned rule-file parser.
//!
//! The format:
//!
//! ```text
//! # Comments start with '#' or ';' on their own line.
//! [DEFAULT]
//! permissions = r
//!
//! [owner]
//! user = (.+)
//! collection = {0}(/.*)?
//! permissions = rw
//! ```
//!
//! - `[name]` starts a rule; names are labels and may repeat.
//! - `[DEFAULT]` holds fallback values for every rule; it is not a rule.
//! - `key = value` or `key: value`; keys are case-insensitive.
//! - An indented line continues the previous value on a new line.
//! - Every rule needs `user`, `collection` and `permissions`, either itself
//!   or through `[DEFAULT]`.

use tracing::{debug, warn};

use crate::error::{RightsError, RightsResult};
use crate::rule::{COLLECTION_KEY, PERMISSIONS_KEY, Rule, USER_KEY};

/// Section whose keys act as fallbacks for every rule.
const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Default)]
struct Entries(Vec<(String, String)>);

impl Entries {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[derive(Debug)]
struct Section {
    name: String,
    entries: Entries,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    None,
    Defaults,
    Section(usize),
}

/// Parse `text` into rules, in the order they are written.
pub(crate) fn parse_rules(origin: &str, text: &str) -> RightsResult<Vec<Rule>> {
    let mut defaults = Entries::default();
    let mut sections: Vec<Section> = Vec::new();
    let mut target = Target::None;
    let mut continuable = false;

    let syntax = |line: usize, message: String| RightsError::Syntax {
        origin: origin.to_owned(),
        line,
        message,
    };

    for (idx, raw_line) in text.lines().enumerate() {
        let line = idx.saturating_add(1);
        let trimmed = raw_line.trim();

        if trimmed.is_empty() {
            continuable = false;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if continuable && raw_line.starts_with(char::is_whitespace) {
            let entries = match target {
                Target::Defaults => Some(&mut defaults),
                Target::Section(i) => sections.get_mut(i).map(|s| &mut s.entries),
                Target::None => None,
            };
            if let Some((_, value)) = entries.and_then(|e| e.0.last_mut()) {
                value.push('\n');
                value.push_str(trimmed);
            }
            continue;
        }

        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let name = name.trim();
            if name.is_empty() {
                return Err(syntax(line, "empty section name".to_owned()));
            }
            continuable = false;
            if name == DEFAULT_SECTION {
                target = Target::Defaults;
                continue;
            }
            if sections.iter().any(|s| s.name == name) {
                warn!(
                    origin,
                    section = name,
                    line,
                    "duplicate section name in rights file; both rules are kept"
                );
            }
            target = Target::Section(sections.len());
            sections.push(Section {
                name: name.to_owned(),
                entries: Entries::default(),
            });
            continue;
        }

        let Some(pos) = trimmed.find(['=', ':']) else {
            return Err(syntax(
                line,
                format!("expected a [section] header or `key = value`, found {trimmed:?}"),
            ));
        };
        let (key, rest) = trimmed.split_at(pos);
        let key = key.trim().to_lowercase();
        let value = rest[1..].trim().to_owned();
        if key.is_empty() {
            return Err(syntax(line, "empty key".to_owned()));
        }

        let (entries, section_name) = match target {
            Target::None => {
                return Err(syntax(
                    line,
                    "key/value pair before the first [section] header".to_owned(),
                ));
            },
            Target::Defaults => (&mut defaults, DEFAULT_SECTION),
            Target::Section(i) => {
                let section = &mut sections[i];
                (&mut section.entries, section.name.as_str())
            },
        };
        if entries.contains(&key) {
            return Err(syntax(
                line,
                format!("duplicate key {key:?} in section {section_name:?}"),
            ));
        }
        entries.0.push((key, value));
        continuable = true;
    }

    let mut rules = Vec::with_capacity(sections.len());
    for section in sections {
        let lookup = |key: &str| section.entries.get(key).or_else(|| defaults.get(key));
        let required = |key: &str| {
            lookup(key).ok_or_else(|| RightsError::MissingKey {
                origin: origin.to_owned(),
                section: section.name.clone(),
                key: key.to_owned(),
            })
        };

        let user = required(USER_KEY)?;
        let collection = required(COLLECTION_KEY)?;
        let permissions = required(PERMISSIONS_KEY)?;

        rules.push(Rule::from_values(
            origin,
            section.name.clone(),
            user,
            collection,
            permissions,
            &lookup,
        )?);
    }

    debug!(origin, rules = rules.len(), "parsed rights rules");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[Rule]) -> Vec<&str> {
        rules.iter().map(Rule::name).collect()
    }

    #[test]
    fn test_parse_basic() {
        let text = "\
# Rights file
[owner]
user = (.+)
collection = {0}(/.*)?
permissions = rw

; anyone may read public calendars
[public]
user: .*
collection: public/.*
permissions: r
";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(names(&rules), ["owner", "public"]);
        assert_eq!(rules[0].user_pattern(), "(.+)");
        assert_eq!(rules[0].collection_pattern(), "{0}(/.*)?");
        assert_eq!(rules[1].permissions(), "r");
    }

    #[test]
    fn test_order_is_preserved() {
        let text = "[z]\nuser=.*\ncollection=.*\npermissions=r\n\
                    [a]\nuser=.*\ncollection=.*\npermissions=w\n\
                    [m]\nuser=.*\ncollection=.*\npermissions=i\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(names(&rules), ["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_section_names_are_kept() {
        let text = "[same]\nuser=a\ncollection=.*\npermissions=r\n\
                    [same]\nuser=b\ncollection=.*\npermissions=w\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].user_pattern(), "a");
        assert_eq!(rules[1].user_pattern(), "b");
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let text = "[r]\nUser = x\nCOLLECTION = y\nPermissions = r\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(rules[0].user_pattern(), "x");
    }

    #[test]
    fn test_missing_key() {
        let text = "[broken]\nuser = .*\npermissions = r\n";
        let err = parse_rules("rights.ini", text).unwrap_err();
        match err {
            RightsError::MissingKey {
                origin,
                section,
                key,
            } => {
                assert_eq!(origin, "rights.ini");
                assert_eq!(section, "broken");
                assert_eq!(key, "collection");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let text = "[DEFAULT]\npermissions = r\n\n[reader]\nuser = .*\ncollection = .*\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(names(&rules), ["reader"]);
        assert_eq!(rules[0].permissions(), "r");
    }

    #[test]
    fn test_section_overrides_defaults() {
        let text = "[DEFAULT]\npermissions = r\n[writer]\nuser=.*\ncollection=.*\npermissions=rw\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(rules[0].permissions(), "rw");
    }

    #[test]
    fn test_continuation_lines() {
        let text = "[r]\nuser = alice|\n  bob\ncollection = .*\npermissions = r\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(rules[0].user_pattern(), "alice|\nbob");
    }

    #[test]
    fn test_value_may_contain_delimiters() {
        let text = "[r]\nuser = a=b\ncollection = x:y\npermissions = r\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(rules[0].user_pattern(), "a=b");
        assert_eq!(rules[0].collection_pattern(), "x:y");
    }

    #[test]
    fn test_key_before_section_is_syntax_error() {
        let err = parse_rules("<test>", "user = .*\n").unwrap_err();
        assert!(matches!(err, RightsError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_line_without_delimiter_is_syntax_error() {
        let err = parse_rules("<test>", "[r]\nuser .*\n").unwrap_err();
        assert!(matches!(err, RightsError::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_key_is_syntax_error() {
        let text = "[r]\nuser = a\nuser = b\ncollection = .*\npermissions = r\n";
        let err = parse_rules("<test>", text).unwrap_err();
        assert!(matches!(err, RightsError::Syntax { line: 3, .. }));
        assert!(err.is_rule_definition());
    }

    #[test]
    fn test_interpolation_of_sibling_keys() {
        let text = "[DEFAULT]\nroot = calendars\n\n\
                    [owner]\nuser = .+\ncollection = %(root)s/%(login)s(/.*)?\npermissions = rw\n";
        let rules = parse_rules("<test>", text).unwrap();
        assert_eq!(
            rules[0].collection_pattern(),
            "%(root)s/%(login)s(/.*)?"
        );
    }

    #[test]
    fn test_unknown_interpolation_is_definition_error() {
        let text = "[r]\nuser = %(who)s\ncollection = .*\npermissions = r\n";
        let err = parse_rules("<test>", text).unwrap_err();
        match err {
            RightsError::Interpolation { section, key, .. } => {
                assert_eq!(section, "r");
                assert_eq!(key, "user");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_source_has_no_rules() {
        assert!(parse_rules("<test>", "").unwrap().is_empty());
        assert!(parse_rules("<test>", "# only comments\n").unwrap().is_empty());
    }

    #[test]
    fn test_default_only_is_not_a_rule() {
        let rules = parse_rules("<test>", "[DEFAULT]\nuser = .*\n").unwrap();
        assert!(rules.is_empty());
    }
}
