//! Partial binding for `{var}`-style URI templates.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("placeholder pattern is valid"));

/// A URI that may contain `{name}` placeholders.
///
/// Binding is partial and monotonic: each [`bind`](TemplatedUri::bind) call
/// replaces whichever placeholders it has values for and returns a fresh
/// instance re-parsed from the result. A variable that has been resolved no
/// longer exists in the string, so binding it again is a silent no-op.
///
/// # Examples
///
/// ```
/// use sirena::TemplatedUri;
/// use std::collections::HashMap;
///
/// let uri = TemplatedUri::parse("/orders/{id}/items/{item}");
/// assert_eq!(uri.unbound_variables(), &["id", "item"]);
///
/// let partial = uri.bind(&HashMap::from([("id".to_owned(), "7".to_owned())]));
/// assert_eq!(partial.as_str(), "/orders/7/items/{item}");
/// assert_eq!(partial.unbound_variables(), &["item"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedUri {
    base: String,
    variables: Vec<String>,
}

impl TemplatedUri {
    /// Scans `base` for placeholders, recording each distinct name in order
    /// of first occurrence. A string with no placeholders parses to an
    /// instance with no variables.
    pub fn parse(base: impl Into<String>) -> Self {
        let base = base.into();
        let mut variables: Vec<String> = Vec::new();
        for found in PLACEHOLDER.find_iter(&base) {
            let name = &base[found.start() + 1..found.end() - 1];
            if !variables.iter().any(|known| known == name) {
                variables.push(name.to_owned());
            }
        }
        Self { base, variables }
    }

    /// Replaces every occurrence of each assigned variable's token with the
    /// supplied value. Keys that are not unbound variables are ignored.
    pub fn bind(&self, assignments: &HashMap<String, String>) -> Self {
        let mut bound = self.base.clone();
        for (name, value) in assignments {
            if self.variables.iter().any(|known| known == name) {
                bound = bound.replace(&format!("{{{name}}}"), value);
            }
        }
        Self::parse(bound)
    }

    /// Names still awaiting a value, in order of first occurrence.
    pub fn unbound_variables(&self) -> &[String] {
        &self.variables
    }

    /// Whether any placeholder is still unresolved.
    pub fn has_unbound_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    /// The current literal value.
    pub fn as_str(&self) -> &str {
        &self.base
    }
}

impl std::fmt::Display for TemplatedUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignments(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_records_distinct_variables_in_order() {
        let uri = TemplatedUri::parse("/a/{x}/{y}/{x}");
        assert_eq!(uri.unbound_variables().to_vec(), ["x", "y"]);
        assert!(uri.has_unbound_variables());
    }

    #[test]
    fn plain_uri_has_no_variables() {
        let uri = TemplatedUri::parse("/plain");
        assert!(!uri.has_unbound_variables());
        assert_eq!(uri.as_str(), "/plain");
    }

    #[test]
    fn partial_binding_leaves_the_rest() {
        let uri = TemplatedUri::parse("/a/{x}/{y}").bind(&assignments(&[("x", "1")]));
        assert_eq!(uri.unbound_variables().to_vec(), ["y"]);
        assert_eq!(uri.as_str(), "/a/1/{y}");

        let full = uri.bind(&assignments(&[("y", "2")]));
        assert_eq!(full.as_str(), "/a/1/2");
        assert!(!full.has_unbound_variables());
    }

    #[test]
    fn rebinding_a_resolved_variable_is_a_no_op() {
        let uri = TemplatedUri::parse("/a/{x}").bind(&assignments(&[("x", "1")]));
        let again = uri.bind(&assignments(&[("x", "2")]));
        assert_eq!(again.as_str(), "/a/1");
        assert!(!again.has_unbound_variables());
    }

    #[test]
    fn binding_replaces_every_occurrence() {
        let uri =
            TemplatedUri::parse("http://host.com/{id}/{id}").bind(&assignments(&[("id", "3")]));
        assert_eq!(uri.as_str(), "http://host.com/3/3");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let uri = TemplatedUri::parse("/a/{x}").bind(&assignments(&[("nope", "1")]));
        assert_eq!(uri.as_str(), "/a/{x}");
        assert_eq!(uri.unbound_variables().to_vec(), ["x"]);
    }
}
