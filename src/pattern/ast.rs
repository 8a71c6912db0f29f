//! Tokenizer for phrase templates.
//!
//! Templates are parsed into a node list instead of being rewritten with
//! chained text substitutions, so each token kind can be tested on its own
//! and optional segments nest without pattern-on-pattern surprises.

/// One element of a parsed phrase template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Verbatim text, matched literally.
    Literal(String),

    /// `:name` - captures one whitespace-delimited token.
    Named(String),

    /// `*name` - captures any remaining text, lazily.
    Splat(String),

    /// `(...)` - an omissible segment; may itself contain parameters.
    Optional(Vec<Node>),
}

/// Parse a phrase template. Never fails: a stray `)` is a literal, an
/// unclosed `(` opens an optional segment running to the end of the
/// template, and `:`/`*` not followed by a word character stay literal.
pub fn parse(template: &str) -> Vec<Node> {
    let chars: Vec<char> = template.chars().collect();
    let (nodes, _) = parse_seq(&chars, 0, false);
    nodes
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn flush(literal: &mut String, nodes: &mut Vec<Node>) {
    if !literal.is_empty() {
        nodes.push(Node::Literal(std::mem::take(literal)));
    }
}

/// Parse until end of input, or until the `)` closing this level when
/// `nested` is true. Returns the nodes and the index past the consumed text.
fn parse_seq(chars: &[char], mut i: usize, nested: bool) -> (Vec<Node>, usize) {
    let mut nodes = Vec::new();
    let mut literal = String::new();

    while i < chars.len() {
        let c = chars[i];
        match c {
            ':' | '*' if i + 1 < chars.len() && is_word(chars[i + 1]) => {
                flush(&mut literal, &mut nodes);
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_word(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                nodes.push(if c == ':' {
                    Node::Named(name)
                } else {
                    Node::Splat(name)
                });
                i = end;
            }
            '(' => {
                // The whitespace around an optional segment belongs to the
                // segment: "hello (there) friend" must also match
                // "hello friend" with single spacing.
                literal.truncate(literal.trim_end().len());
                flush(&mut literal, &mut nodes);
                let (inner, next) = parse_seq(chars, i + 1, true);
                nodes.push(Node::Optional(inner));
                i = next;
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
            }
            ')' if nested => {
                flush(&mut literal, &mut nodes);
                return (nodes, i + 1);
            }
            _ => {
                literal.push(c);
                i += 1;
            }
        }
    }

    flush(&mut literal, &mut nodes);
    (nodes, i)
}
