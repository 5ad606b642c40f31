//! Edge-List Codec
//!
//! Converts between the textual edge-list format and the structured maps
//! the engine works with.
//!
//! # Format
//!
//! Each line lists a key followed by its direct dependencies, separated by
//! the input separator (a single space by default):
//!
//! ```text
//! A B C
//! B C E
//! ```
//!
//! Decoding that yields `A -> [B, C]`, `B -> [C, E]`, `C -> []`, `E -> []`.
//! A key repeated at the head of several lines accumulates all of their
//! dependencies. Keys seen only as dependencies get an empty list when
//! first encountered. Blank lines and empty fields are ignored, and a key
//! never lists itself.

use indexmap::IndexMap;

use crate::engine::{ClosureEngine, EngineConfig};
use crate::graph::{Closure, Key};

/// Separators used to read edge lists and to write closures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeListCodec {
    input_separator: String,
    output_separator: String,
}

impl Default for EdgeListCodec {
    fn default() -> Self {
        Self::new(" ", " ")
    }
}

impl EdgeListCodec {
    /// Create a codec with the given separators.
    ///
    /// An empty input separator splits on any whitespace.
    pub fn new(input_separator: &str, output_separator: &str) -> Self {
        Self {
            input_separator: input_separator.to_owned(),
            output_separator: output_separator.to_owned(),
        }
    }

    /// Split every line into its fields.
    pub fn split_lines<I, S>(&self, lines: I) -> Vec<Vec<Key>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(|line| self.split_line(line.as_ref()))
            .filter(|fields| !fields.is_empty())
            .collect()
    }

    fn split_line(&self, line: &str) -> Vec<Key> {
        let fields: Vec<&str> = if self.input_separator.is_empty() {
            line.split_whitespace().collect()
        } else {
            line.split(self.input_separator.as_str()).collect()
        };
        fields
            .into_iter()
            .filter(|field| !field.is_empty())
            .map(Key::from)
            .collect()
    }

    /// Decode edge-list lines into direct dependency lists.
    pub fn decode<I, S>(&self, lines: I) -> IndexMap<Key, Vec<Key>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut edges: IndexMap<Key, Vec<Key>> = IndexMap::new();

        for row in self.split_lines(lines) {
            let mut fields = row.into_iter();
            let Some(head) = fields.next() else {
                continue;
            };
            edges.entry(head.clone()).or_default();

            for dep in fields {
                if dep == head {
                    continue;
                }
                if !edges.contains_key(&dep) {
                    edges.insert(dep.clone(), Vec::new());
                }
                if let Some(direct) = edges.get_mut(&head) {
                    if !direct.contains(&dep) {
                        direct.push(dep);
                    }
                }
            }
        }

        edges
    }

    /// Join every closure into a single string.
    pub fn encode(&self, closures: &IndexMap<Key, Closure>) -> IndexMap<Key, String> {
        closures
            .iter()
            .map(|(key, closure)| (key.clone(), join(closure, &self.output_separator)))
            .collect()
    }

    /// Render a map back into edge-list lines that [`decode`](Self::decode) accepts.
    pub fn to_lines(&self, closures: &IndexMap<Key, Closure>) -> Vec<String> {
        let separator = if self.input_separator.is_empty() {
            " "
        } else {
            self.input_separator.as_str()
        };

        closures
            .iter()
            .map(|(key, closure)| {
                if closure.is_empty() {
                    key.to_string()
                } else {
                    format!("{key}{separator}{}", join(closure, separator))
                }
            })
            .collect()
    }
}

fn join(closure: &[Key], separator: &str) -> String {
    closure
        .iter()
        .map(Key::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Decode `lines`, load them into a fresh engine built from `config`, and
/// encode the resulting closures.
///
/// The flag is `false` if any line was rejected as a conflict.
pub fn resolve_lines<I, S>(lines: I, config: &EngineConfig) -> (bool, IndexMap<Key, String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let codec = config.codec();
    let edges = codec.decode(lines);

    let mut engine = ClosureEngine::from_config(config);
    let accepted = engine.set_dependency_batch(edges);

    (accepted, codec.encode(&engine.all()))
}
