//! Two-phase pattern templates.
//!
//! A rule value is turned into a [`Template`] once, when the rule is loaded:
//!
//! 1. `%(name)s` references are resolved. `login` and `path` stay symbolic
//!    and are filled per request with regex-escaped text; any other name is
//!    expanded from the same section (or `[DEFAULT]`). `%%` is a literal `%`.
//! 2. For resource patterns only, `{N}` / `{}` placeholders are located in
//!    the authored text. `{{` and `}}` are literal braces. Malformed brace
//!    syntax is kept in the template and only reported when the value is
//!    rendered, i.e. when a request reaches the rule.
//!
//! Because placeholders are found before any request text is inserted, an
//! escaped login such as `\{0\}` can never be mistaken for a placeholder.

use crate::error::PatternError;

/// Deepest chain of `%(name)s` references that will be followed.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// Interpolation variable holding the escaped identity.
const LOGIN_VAR: &str = "login";

/// Interpolation variable holding the escaped normalized path.
const PATH_VAR: &str = "path";

/// Request values available to templates, already regex-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    login: String,
    path: String,
}

impl Interpolation {
    /// Escape `identity` and the normalized `path` for use inside patterns.
    #[must_use]
    pub fn new(identity: &str, path: &str) -> Self {
        Self {
            login: regex::escape(identity),
            path: regex::escape(path),
        }
    }

    /// The escaped identity substituted for `%(login)s`.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// The escaped path substituted for `%(path)s`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Login,
    Path,
    Group(usize),
    Invalid(String),
}

/// A parsed rule value.
#[derive(Debug, Clone)]
pub(crate) struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `raw`, resolving non-request `%(name)s` references through
    /// `lookup`. Capture-group placeholders are recognised only when
    /// `placeholders` is set.
    pub(crate) fn parse<'a, F>(raw: &str, lookup: &F, placeholders: bool) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut segments = Vec::new();
        expand(raw, lookup, 0, &mut segments)?;
        if placeholders {
            segments = locate_placeholders(segments)
                .unwrap_or_else(|message| vec![Segment::Invalid(message)]);
        }
        Ok(Self {
            source: raw.to_owned(),
            segments,
        })
    }

    /// The value as authored.
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Produce the concrete pattern for one request.
    ///
    /// `groups[i]` is the text captured by identity group `i + 1`, or `None`
    /// if that group did not participate in the match. Captured text is
    /// escaped before insertion.
    pub(crate) fn render(
        &self,
        vars: &Interpolation,
        groups: &[Option<&str>],
    ) -> Result<String, PatternError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Login => out.push_str(vars.login()),
                Segment::Path => out.push_str(vars.path()),
                Segment::Invalid(message) => {
                    return Err(PatternError::Placeholder {
                        template: self.source.clone(),
                        message: message.clone(),
                    });
                },
                Segment::Group(index) => match groups.get(*index) {
                    Some(Some(text)) => out.push_str(&regex::escape(text)),
                    Some(None) => return Err(PatternError::UnmatchedGroup { index: *index }),
                    None => {
                        return Err(PatternError::MissingGroup {
                            index: *index,
                            available: groups.len(),
                        });
                    },
                },
            }
        }
        Ok(out)
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_owned()));
    }
}

fn expand<'a, F>(
    raw: &str,
    lookup: &F,
    depth: usize,
    segments: &mut Vec<Segment>,
) -> Result<(), String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(format!(
            "interpolation nested deeper than {MAX_INTERPOLATION_DEPTH} levels"
        ));
    }

    let mut rest = raw;
    while let Some(pos) = rest.find('%') {
        push_text(segments, &rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("%%") {
            push_text(segments, "%");
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%(") {
            let (name, after) = after
                .split_once(')')
                .ok_or_else(|| format!("bad interpolation variable reference {tail:?}"))?;
            let after = after
                .strip_prefix('s')
                .ok_or_else(|| format!("bad interpolation variable reference {tail:?}"))?;
            let name = name.to_lowercase();
            match name.as_str() {
                LOGIN_VAR => segments.push(Segment::Login),
                PATH_VAR => segments.push(Segment::Path),
                other => {
                    let value = lookup(other)
                        .ok_or_else(|| format!("unknown interpolation variable {other:?}"))?;
                    expand(value, lookup, depth.saturating_add(1), segments)?;
                },
            }
            rest = after;
        } else {
            return Err(format!(
                "'%' must be followed by '%' or '(', found {tail:?}"
            ));
        }
    }
    push_text(segments, rest);
    Ok(())
}

fn locate_placeholders(segments: Vec<Segment>) -> Result<Vec<Segment>, String> {
    let mut out = Vec::with_capacity(segments.len());
    let mut next_auto: usize = 0;
    let mut numbering: Option<bool> = None;

    for segment in segments {
        let Segment::Text(text) = segment else {
            out.push(segment);
            continue;
        };

        let mut literal = String::new();
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                },
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        field.push(c);
                    }
                    if !closed {
                        return Err(format!("unterminated placeholder {{{field}"));
                    }

                    let automatic = field.is_empty();
                    match numbering {
                        Some(previous) if previous != automatic => {
                            return Err(
                                "cannot mix automatic {} and numbered {N} placeholders".to_owned()
                            );
                        },
                        _ => numbering = Some(automatic),
                    }

                    let index = if automatic {
                        let index = next_auto;
                        next_auto = next_auto.saturating_add(1);
                        index
                    } else if field.chars().all(|c| c.is_ascii_digit()) {
                        field
                            .parse::<usize>()
                            .map_err(|e| format!("invalid placeholder {{{field}}}: {e}"))?
                    } else {
                        return Err(format!(
                            "invalid placeholder {{{field}}}; write literal braces as {{{{ and }}}}"
                        ));
                    };

                    push_text(&mut out, &literal);
                    literal.clear();
                    out.push(Segment::Group(index));
                },
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                },
                '}' => {
                    return Err("single '}' encountered; write a literal brace as }}".to_owned());
                },
                _ => literal.push(ch),
            }
        }
        push_text(&mut out, &literal);
    }
    Ok(out)
}
