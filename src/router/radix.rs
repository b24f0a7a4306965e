//! Segment trie used for per-method route matching
//!
//! Every registered pattern is split on `/` into non-empty segments and stored
//! one segment per level. Three kinds of segment exist:
//!
//! - literal segments (`users`) match exactly
//! - named parameters (`:id`) match any single segment
//! - catch-alls (`*filepath`) match the whole remaining suffix and must come last
//!
//! A node whose `path` is non-empty terminates a registered route; every other
//! node only passes traffic through to its children.
//!
//! ## Precedence
//!
//! Children are kept in insertion order and tried in that order, and a wildcard
//! child is shared by every later insertion at the same depth. Overlapping
//! literal and wildcard siblings therefore resolve by declaration order, not by
//! specificity:
//!
//! ```text
//! GET /user/:id      registered first
//! GET /user/profile  lands on the `:id` node and takes over its terminal
//! ```

use std::fmt;

use tracing::warn;

use crate::error::RouteError;

/// Split a pattern (or request path) into its non-empty segments.
///
/// Scanning stops after the first segment starting with `*`, so anything after
/// a catch-all is ignored.
pub(crate) fn parse_pattern(path: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for item in path.split('/').filter(|s| !s.is_empty()) {
        parts.push(item);
        if item.starts_with('*') {
            break;
        }
    }
    parts
}

/// Check a pattern before it reaches the trie and return its segments.
pub(crate) fn validate_pattern(pattern: &str) -> Result<Vec<&str>, RouteError> {
    if pattern.is_empty() {
        return Err(RouteError::EmptyPattern);
    }
    if !pattern.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let mut catch_all: Option<&str> = None;
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        if let Some(previous) = catch_all {
            return Err(RouteError::CatchAllNotLast {
                pattern: pattern.to_string(),
                catch_all: previous.to_string(),
            });
        }
        if segment == ":" {
            return Err(RouteError::EmptyParamName {
                pattern: pattern.to_string(),
            });
        }
        if segment.starts_with('*') {
            catch_all = Some(segment);
        }
    }

    Ok(parse_pattern(pattern))
}

/// Node in the per-method segment trie.
#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    /// Full registered pattern when this node terminates a route, empty otherwise
    path: String,
    /// This node's own segment (`user`, `:id`, `*filepath`)
    part: String,
    /// Children in insertion order
    children: Vec<TrieNode>,
    /// `part` starts with `:` or `*`
    is_wild: bool,
}

impl TrieNode {
    /// Create an empty root node.
    pub(crate) fn root() -> Self {
        Self::default()
    }

    fn new(part: &str) -> Self {
        Self {
            path: String::new(),
            part: part.to_string(),
            children: Vec::new(),
            is_wild: part.starts_with(':') || part.starts_with('*'),
        }
    }

    /// The registered pattern this node terminates (empty for pass-through nodes).
    pub fn pattern(&self) -> &str {
        &self.path
    }

    /// Whether a route ends at this node.
    pub fn is_terminal(&self) -> bool {
        !self.path.is_empty()
    }

    /// Insert `pattern`, descending one segment of `parts` per call.
    pub(crate) fn insert(&mut self, pattern: &str, parts: &[&str], height: usize) {
        if parts.len() == height {
            if self.is_terminal() && self.path != pattern {
                warn!(
                    existing = %self.path,
                    replacement = %pattern,
                    "Route pattern overwrites an existing route at the same trie node"
                );
            }
            self.path = pattern.to_string();
            return;
        }

        let part = parts[height];
        let idx = match self.match_child(part) {
            Some(idx) => idx,
            None => {
                self.children.push(TrieNode::new(part));
                self.children.len() - 1
            }
        };
        self.children[idx].insert(pattern, parts, height + 1);
    }

    /// Find the first terminal node matching `parts`, depth-first.
    pub(crate) fn search(&self, parts: &[&str], height: usize) -> Option<&TrieNode> {
        if parts.len() == height || self.part.starts_with('*') {
            return self.is_terminal().then_some(self);
        }

        let part = parts[height];
        self.match_children(part)
            .find_map(|child| child.search(parts, height + 1))
    }

    /// Collect every terminal node below (and including) this one.
    pub(crate) fn travel<'a>(&'a self, list: &mut Vec<&'a TrieNode>) {
        if self.is_terminal() {
            list.push(self);
        }
        for child in &self.children {
            child.travel(list);
        }
    }

    /// Index of the first child usable for inserting `part`.
    fn match_child(&self, part: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.part == part || child.is_wild)
    }

    /// Children that may match `part` during search, in insertion order.
    fn match_children<'a, 'p>(&'a self, part: &'p str) -> impl Iterator<Item = &'a TrieNode> + use<'a, 'p> {
        self.children
            .iter()
            .filter(move |child| child.part == part || child.is_wild)
    }
}

impl fmt::Display for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node{{path={}, part={}, is_wild={}}}",
            self.path, self.part, self.is_wild
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(patterns: &[&str]) -> TrieNode {
        let mut root = TrieNode::root();
        for pattern in patterns {
            let parts = parse_pattern(pattern);
            root.insert(pattern, &parts, 0);
        }
        root
    }

    fn find<'a>(root: &'a TrieNode, path: &str) -> Option<&'a str> {
        let parts = parse_pattern(path);
        root.search(&parts, 0).map(TrieNode::pattern)
    }

    #[test]
    fn test_parse_pattern_skips_empty_segments() {
        assert_eq!(parse_pattern("/a//b/"), vec!["a", "b"]);
        assert!(parse_pattern("/").is_empty());
    }

    #[test]
    fn test_parse_pattern_stops_after_catch_all() {
        assert_eq!(parse_pattern("/static/*file/extra"), vec!["static", "*file"]);
    }

    #[test]
    fn test_validate_rejects_malformed_patterns() {
        assert_eq!(validate_pattern(""), Err(RouteError::EmptyPattern));
        assert!(matches!(
            validate_pattern("user"),
            Err(RouteError::MissingLeadingSlash { .. })
        ));
        assert!(matches!(
            validate_pattern("/a/*rest/b"),
            Err(RouteError::CatchAllNotLast { .. })
        ));
        assert!(matches!(
            validate_pattern("/a/:/b"),
            Err(RouteError::EmptyParamName { .. })
        ));
        assert_eq!(validate_pattern("/a/*").unwrap(), vec!["a", "*"]);
    }

    #[test]
    fn test_literal_and_param_routes() {
        let root = trie(&["/", "/hello", "/hello/:name", "/hello/b/c"]);
        assert_eq!(find(&root, "/"), Some("/"));
        assert_eq!(find(&root, "/hello"), Some("/hello"));
        assert_eq!(find(&root, "/hello/geektutu"), Some("/hello/:name"));
        assert_eq!(find(&root, "/hello/b/c"), Some("/hello/b/c"));
        assert_eq!(find(&root, "/hello/x/y"), None);
    }

    #[test]
    fn test_pass_through_nodes_never_match() {
        let root = trie(&["/a/b/c"]);
        assert_eq!(find(&root, "/a"), None);
        assert_eq!(find(&root, "/a/b"), None);
    }

    #[test]
    fn test_catch_all_requires_a_segment() {
        let root = trie(&["/assets/*filepath"]);
        assert_eq!(find(&root, "/assets/css/a.css"), Some("/assets/*filepath"));
        assert_eq!(find(&root, "/assets/x"), Some("/assets/*filepath"));
        assert_eq!(find(&root, "/assets"), None);
    }

    #[test]
    fn test_wildcard_child_is_shared_by_later_insertions() {
        let root = trie(&["/user/:id", "/user/profile"]);
        // Both patterns end on the `:id` node; the second registration owns it now.
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(find(&root, "/user/42"), Some("/user/profile"));
    }

    #[test]
    fn test_literal_sibling_declared_first_wins() {
        let root = trie(&["/user/profile", "/user/:id"]);
        assert_eq!(find(&root, "/user/profile"), Some("/user/profile"));
        assert_eq!(find(&root, "/user/7"), Some("/user/:id"));
    }

    #[test]
    fn test_search_backtracks_across_siblings() {
        let root = trie(&["/a/b/c", "/a/:x/d"]);
        assert_eq!(find(&root, "/a/b/d"), Some("/a/:x/d"));
    }

    #[test]
    fn test_travel_lists_terminal_nodes_depth_first() {
        let root = trie(&["/a", "/a/b", "/c/:d"]);
        let mut nodes = Vec::new();
        root.travel(&mut nodes);
        let patterns: Vec<&str> = nodes.iter().map(|n| n.pattern()).collect();
        assert_eq!(patterns, vec!["/a", "/a/b", "/c/:d"]);
    }

    #[test]
    fn test_display() {
        let node = TrieNode::new(":id");
        assert_eq!(node.to_string(), "node{path=, part=:id, is_wild=true}");
    }
}
