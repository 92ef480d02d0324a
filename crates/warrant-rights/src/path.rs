//! Resource path normalization.

/// Separator between resource path components.
pub const SEPARATOR: char = '/';

/// Strip every leading and trailing [`SEPARATOR`] from `path`.
///
/// No other normalization happens: case is kept, `.` and `..` are not
/// resolved and repeated inner separators stay as they are. The result is
/// what rule resource patterns are matched against.
#[must_use]
pub fn strip_path(path: &str) -> &str {
    path.trim_matches(SEPARATOR)
}
