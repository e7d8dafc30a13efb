//! Renderable view of a crew's dependency graph.

use std::fmt::Write as _;

use serde::Serialize;

/// Vertices and directed edges of a crew, by agent name.
///
/// Edges point from producer to consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrewGraph {
    pub name: String,
    pub vertices: Vec<String>,
    pub edges: Vec<(String, String)>,
}

impl CrewGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Graphviz DOT text.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {} {{", quote(&self.name));
        for vertex in &self.vertices {
            let _ = writeln!(out, "    {};", quote(vertex));
        }
        for (from, to) in &self.edges {
            let _ = writeln!(out, "    {} -> {};", quote(from), quote(to));
        }
        out.push('}');
        out.push('\n');
        out
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dot() {
        let graph = CrewGraph {
            name: "news".into(),
            vertices: vec!["writer".into(), "editor".into()],
            edges: vec![("writer".into(), "editor".into())],
        };
        assert_eq!(
            graph.to_dot(),
            "digraph \"news\" {\n    \"writer\";\n    \"editor\";\n    \"writer\" -> \"editor\";\n}\n"
        );
    }

    #[test]
    fn test_to_dot_escapes_quotes() {
        let mut graph = CrewGraph::new("c");
        graph.vertices.push("say \"hi\"".into());
        assert!(graph.to_dot().contains("\"say \\\"hi\\\"\";"));
    }
}
