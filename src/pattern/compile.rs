//! Code generation from a parsed template to a compiled matcher.

use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::ast::{self, Node};

/// A compiled phrase matcher: an anchored, case-insensitive pattern plus
/// the parameter names in the order their capture groups appear.
///
/// Compiling is a pure function of the template; compiling the same
/// template twice yields equivalent matchers.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    params: Vec<String>,
}

impl Matcher {
    /// Compile a phrase template. Never fails: malformed templates compile
    /// to best-effort matchers (availability over strictness).
    pub fn compile(template: &str) -> Self {
        let nodes = ast::parse(template);
        let mut pattern = String::from("^");
        let mut params = Vec::new();
        emit(&nodes, &mut pattern, &mut params);
        pattern.push('$');

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|err| {
                warn!(template, error = %err, "generated pattern invalid, matching template literally");
                exact_literal(template)
            });

        Self { regex, params }
    }

    /// Wrap a caller-supplied regex (the explicit-matcher registration
    /// override). The pattern is used as given; parameters are its capture
    /// groups in order.
    pub fn from_regex(regex: Regex) -> Self {
        let params = (1..regex.captures_len())
            .map(|i| format!("group{i}"))
            .collect();
        Self { regex, params }
    }

    /// Test a normalized hypothesis against the full pattern. On a match,
    /// returns the captured parameters in template order; a group elided by
    /// an omitted optional segment yields an empty string.
    pub fn matches(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            (1..caps.len())
                .map(|i| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    /// Parameter names in capture order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }
}

fn emit(nodes: &[Node], pattern: &mut String, params: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Literal(text) => pattern.push_str(&regex::escape(text)),
            Node::Named(name) => {
                params.push(name.clone());
                pattern.push_str(r"([^\s]+)");
            }
            Node::Splat(name) => {
                params.push(name.clone());
                // Lazy, so literal text after a splat still anchors.
                pattern.push_str("(.*?)");
            }
            Node::Optional(inner) => {
                pattern.push_str(r"\s*(?:");
                emit(inner, pattern, params);
                pattern.push_str(r")?\s*");
            }
        }
    }
}

fn exact_literal(template: &str) -> Regex {
    RegexBuilder::new(&format!("^{}$", regex::escape(template)))
        .case_insensitive(true)
        .build()
        .expect("escaped literal is always a valid pattern")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matches_exactly() {
        let m = Matcher::compile("close tab");
        assert_eq!(m.matches("close tab"), Some(vec![]));
        assert_eq!(m.matches("Close Tab"), Some(vec![]));
        assert_eq!(m.matches("close tab now"), None);
        assert_eq!(m.matches("please close tab"), None);
        assert!(m.param_names().is_empty());
    }

    #[test]
    fn test_named_parameter_captures_one_token() {
        let m = Matcher::compile("calculate :month stats");
        assert_eq!(
            m.matches("calculate october stats"),
            Some(vec!["october".to_string()])
        );
        assert_eq!(m.matches("calculate stats"), None);
        assert_eq!(m.matches("calculate last october stats"), None);
        assert_eq!(m.param_names(), ["month"]);
    }

    #[test]
    fn test_splat_captures_multiple_words() {
        let m = Matcher::compile("show me *tag");
        assert_eq!(
            m.matches("show me batman and robin"),
            Some(vec!["batman and robin".to_string()])
        );
    }

    #[test]
    fn test_splat_with_trailing_literal_still_anchors() {
        let m = Matcher::compile("play *song on repeat");
        assert_eq!(
            m.matches("play stairway to heaven on repeat"),
            Some(vec!["stairway to heaven".to_string()])
        );
        assert_eq!(m.matches("play stairway to heaven"), None);
    }

    #[test]
    fn test_optional_segment() {
        let m = Matcher::compile("say hello (to my little) friend");
        assert_eq!(m.matches("say hello friend"), Some(vec![]));
        assert_eq!(m.matches("say hello to my little friend"), Some(vec![]));
        assert_eq!(m.matches("say hello to my friend"), None);
    }

    #[test]
    fn test_optional_at_start_and_end() {
        let m = Matcher::compile("(please) close tab (now)");
        assert_eq!(m.matches("close tab"), Some(vec![]));
        assert_eq!(m.matches("please close tab"), Some(vec![]));
        assert_eq!(m.matches("close tab now"), Some(vec![]));
        assert_eq!(m.matches("please close tab now"), Some(vec![]));
    }

    #[test]
    fn test_parameter_inside_optional_segment() {
        let m = Matcher::compile("scroll down (:amount lines)");
        assert_eq!(
            m.matches("scroll down 5 lines"),
            Some(vec!["5".to_string()])
        );
        // Elided optional reports an empty parameter, keeping positions.
        assert_eq!(m.matches("scroll down"), Some(vec![String::new()]));
    }

    #[test]
    fn test_parameter_order_follows_template() {
        let m = Matcher::compile("move :what to *where");
        assert_eq!(m.param_names(), ["what", "where"]);
        assert_eq!(
            m.matches("move tab to the next window"),
            Some(vec!["tab".to_string(), "the next window".to_string()])
        );
    }

    #[test]
    fn test_metacharacters_in_template_are_literal() {
        let m = Matcher::compile("what is 2 + 2?");
        assert_eq!(m.matches("what is 2 + 2?"), Some(vec![]));
        assert_eq!(m.matches("what is 2 x 2?"), None);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = Matcher::compile("calculate :month stats");
        let b = Matcher::compile("calculate :month stats");
        assert_eq!(a.as_regex().as_str(), b.as_regex().as_str());
        assert_eq!(a.param_names(), b.param_names());
    }

    #[test]
    fn test_malformed_template_still_compiles() {
        let m = Matcher::compile("go (north");
        assert_eq!(m.matches("go"), Some(vec![]));
        assert_eq!(m.matches("go north"), Some(vec![]));

        let m = Matcher::compile("smile )");
        assert_eq!(m.matches("smile )"), Some(vec![]));
    }

    #[test]
    fn test_from_regex_override() {
        let re = regex::RegexBuilder::new("^calculate (january|april) stats$")
            .case_insensitive(true)
            .build()
            .unwrap();
        let m = Matcher::from_regex(re);
        assert_eq!(
            m.matches("calculate april stats"),
            Some(vec!["april".to_string()])
        );
        assert_eq!(m.matches("calculate october stats"), None);
    }
}
