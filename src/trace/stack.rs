use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a frame descriptor line of a rendered `std::backtrace::Backtrace`.
///
/// Captures the module path as `package` and the last path segment as
/// `function`, ignoring generic arguments and any `{{closure}}` segments.
/// Symbol hashes are stripped before matching.
const DEFAULT_PATTERN: &str = r"^\s*\d+:\s+(?:(?P<package>[^\s(<]+)::)?(?P<function>[^\s:(<{]+)(?:(?:::)?<.*>)?(?:::\{\{closure\}\})*\s*$";

static DEFAULT_REGEX: Lazy<Regex> = Lazy::new(|| match Regex::new(DEFAULT_PATTERN) {
    Ok(regex) => regex,
    Err(err) => unreachable!("default frame pattern is valid: {}", err),
});

/// Locates the anchor frame of a captured trace.
///
/// The anchor is the first frame whose function (and package, if set)
/// matches. Frames above it are hidden when the trace is printed, the
/// anchor itself is kept, and `level` further frames after it are skipped.
///
/// An empty `function_name` matches any frame. An empty `package_name`
/// matches any package. A non-empty `package_name` matches either the full
/// module path of the frame or its crate segment.
///
/// # Example
///
/// ```
/// use rescue::StackInfo;
///
/// let anchor = StackInfo::new("rescue::signal", "raise").level(1);
///
/// assert!(anchor.is_anchor("  4: rescue::signal::raise"));
/// assert!(anchor.is_anchor("  4: rescue::signal::raise::h0123456789abcdef"));
/// assert!(!anchor.is_anchor("  5: app::main"));
/// ```
#[derive(Clone)]
pub struct StackInfo {
    package_name: String,
    function_name: String,
    level: usize,
    pattern: Regex,
}

impl StackInfo {
    /// Create a `StackInfo` matching `function_name` in `package_name`.
    pub fn new(package_name: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            function_name: function_name.into(),
            level: 0,
            pattern: DEFAULT_REGEX.clone(),
        }
    }

    /// A `StackInfo` that anchors on the first frame.
    pub fn any() -> Self {
        Self::new("", "")
    }

    /// The anchor used for traces captured by [`raise()`](crate::raise).
    pub fn raised() -> Self {
        Self::new("rescue::signal", "raise")
    }

    /// The anchor used for traces captured when a panic begins.
    pub fn panicked() -> Self {
        Self::new("", "panic_fmt")
    }

    /// Set the number of frames to skip after the anchor.
    #[must_use]
    pub fn level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Replace the descriptor line pattern.
    ///
    /// The pattern must define a `function` capture group and may define a
    /// `package` capture group.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = pattern;
        self
    }

    /// The package the anchor frame must belong to.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// The function name of the anchor frame.
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// The number of frames skipped after the anchor.
    pub fn skip(&self) -> usize {
        self.level
    }

    /// Returns `true` if a descriptor line is the anchor frame.
    pub fn is_anchor(&self, line: &str) -> bool {
        if self.function_name.is_empty() && self.package_name.is_empty() {
            return true;
        }
        let captures = match self.pattern.captures(strip_hash(line.trim_end())) {
            Some(captures) => captures,
            None => return false,
        };
        if !self.function_name.is_empty() {
            match captures.name("function") {
                Some(function) if function.as_str() == self.function_name => {}
                _ => return false,
            }
        }
        if self.package_name.is_empty() {
            return true;
        }
        let package = captures.name("package").map_or("", |m| m.as_str());
        package == self.package_name
            || package.split("::").next() == Some(self.package_name.as_str())
    }
}

/// Strips a trailing `::h<16 hex digits>` symbol hash.
fn strip_hash(line: &str) -> &str {
    const HASH_LEN: usize = 2 + 1 + 16;
    if line.len() < HASH_LEN || !line.is_char_boundary(line.len() - HASH_LEN) {
        return line;
    }
    let (head, tail) = line.split_at(line.len() - HASH_LEN);
    if tail.starts_with("::h") && tail[3..].bytes().all(|b| b.is_ascii_hexdigit()) {
        head
    } else {
        line
    }
}

impl Default for StackInfo {
    fn default() -> Self {
        Self::raised()
    }
}

impl fmt::Debug for StackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackInfo")
            .field("package_name", &self.package_name)
            .field("function_name", &self.function_name)
            .field("level", &self.level)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_frames_match_function() {
        let info = StackInfo::new("app", "copy");
        assert!(info.is_anchor("  12: app::files::copy::{{closure}}"));
        assert!(info.is_anchor("  12: app::copy"));
        assert!(!info.is_anchor("  12: app::copy_all"));
    }

    #[test]
    fn test_package_full_path_or_crate() {
        let info = StackInfo::new("rescue::signal", "raise");
        assert!(info.is_anchor("   3: rescue::signal::raise"));
        assert!(!info.is_anchor("   3: other::signal::raise"));

        let info = StackInfo::new("rescue", "raise");
        assert!(info.is_anchor("   3: rescue::signal::raise"));
    }

    #[test]
    fn test_location_lines_never_match() {
        let info = StackInfo::new("", "raise");
        assert!(!info.is_anchor("             at ./src/signal.rs:40:5"));
    }

    #[test]
    fn test_strip_hash() {
        assert_eq!(strip_hash("a::b::h0123456789abcdef"), "a::b");
        assert_eq!(strip_hash("a::b::hello"), "a::b::hello");
        assert_eq!(strip_hash("b"), "b");
    }

    #[test]
    fn test_empty_matches_anything() {
        assert!(StackInfo::any().is_anchor("whatever"));
    }
}
