//! First-match-wins authorization.

use tracing::{debug, info};

use crate::error::{RightsError, RightsResult};
use crate::path::strip_path;
use crate::permissions::Permissions;
use crate::rule::RuleSet;
use crate::template::Interpolation;

/// Decide which of the `requested` permissions `identity` holds on `path`.
///
/// `None` and `""` both mean an anonymous caller. The path is compared with
/// its leading and trailing separators removed. Rules are tried in order;
/// the first whose identity pattern and (capture-substituted) resource
/// pattern both match in full decides, and the result is `requested`
/// intersected with that rule's permissions. If no rule matches, the empty
/// set is returned.
///
/// # Errors
///
/// Returns [`RightsError::Evaluation`] as soon as a rule that is reached
/// has a pattern that does not compile, or a placeholder without a matching
/// capture group. Later rules are not consulted.
pub fn authorize(
    identity: Option<&str>,
    path: &str,
    requested: &Permissions,
    rules: &RuleSet,
) -> RightsResult<Permissions> {
    let user = identity.unwrap_or_default();
    let sane_path = strip_path(path);
    let vars = Interpolation::new(user, sane_path);

    for rule in rules {
        let outcome = rule
            .evaluate(user, sane_path, &vars)
            .map_err(|source| RightsError::Evaluation {
                origin: rules.origin().to_owned(),
                section: rule.name().to_owned(),
                source,
            })?;

        if let Some(granted) = outcome {
            debug!(
                user,
                path = sane_path,
                user_pattern = rule.user_pattern(),
                collection_pattern = rule.collection_pattern(),
                section = rule.name(),
                "rule matches"
            );
            return Ok(requested.intersect(&granted));
        }

        debug!(
            user,
            path = sane_path,
            user_pattern = rule.user_pattern(),
            collection_pattern = rule.collection_pattern(),
            section = rule.name(),
            "rule doesn't match"
        );
    }

    info!(
        user,
        path = sane_path,
        origin = rules.origin(),
        "no rule matches"
    );
    Ok(Permissions::empty())
}
