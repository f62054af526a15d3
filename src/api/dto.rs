use serde::{Deserialize, Serialize};
use crate::domain::scope_tree::{EdgeKind, ScopeId, ScopeTree};
use crate::ports::GraphExporter;
use std::io::{self, Write};

/// Self-describing view of a ScopeTree, used for `--print-tree` and JSON output.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ScopeDto {
    pub prefix: Option<String>,
    pub children: Vec<ScopeDto>,
    pub nodes: Vec<NodeDto>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeDto {
    pub name: String,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    pub type_: String,
}

impl ScopeDto {
    pub fn from_tree(tree: &ScopeTree) -> Self {
        Self::from_scope(tree, tree.root())
    }

    fn from_scope(tree: &ScopeTree, id: ScopeId) -> Self {
        let scope = tree.scope(id);
        let children = scope
            .children
            .values()
            .map(|child| Self::from_scope(tree, *child))
            .collect();

        let nodes = scope
            .nodes
            .iter()
            .map(|node_id| {
                let node = tree.node(*node_id);
                let edges = node
                    .edges
                    .values()
                    .map(|e| EdgeDto {
                        from: node.path.clone(),
                        to: tree.node(e.target).path.clone(),
                        type_: match e.kind {
                            EdgeKind::Explicit => "explicit".to_string(),
                            EdgeKind::Transitive => "transitive".to_string(),
                        },
                    })
                    .collect();
                NodeDto {
                    name: node.path.clone(),
                    edges,
                }
            })
            .collect();

        ScopeDto {
            prefix: scope.prefix.clone(),
            children,
            nodes,
        }
    }
}

pub struct JsonTreeExporter;

impl GraphExporter for JsonTreeExporter {
    fn export(&self, tree: &ScopeTree, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, &ScopeDto::from_tree(tree))?;
        out.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_mirrors_tree() {
        let mut tree = ScopeTree::new();
        tree.push_edge("main.cc", "a/b.h", EdgeKind::Explicit);

        let dto = ScopeDto::from_tree(&tree);
        assert_eq!(dto.prefix, None);
        assert_eq!(dto.nodes.len(), 1);
        assert_eq!(dto.nodes[0].name, "main.cc");
        assert_eq!(
            dto.nodes[0].edges,
            vec![EdgeDto {
                from: "main.cc".to_string(),
                to: "a/b.h".to_string(),
                type_: "explicit".to_string(),
            }]
        );
        assert_eq!(dto.children.len(), 1);
        assert_eq!(dto.children[0].prefix.as_deref(), Some("a"));
        assert_eq!(dto.children[0].nodes[0].name, "a/b.h");
    }

    #[test]
    fn test_json_export_round_trips() {
        let mut tree = ScopeTree::new();
        tree.push_edge("x/y.h", "x/z.h", EdgeKind::Transitive);

        let mut buf = Vec::new();
        JsonTreeExporter.export(&tree, &mut buf).unwrap();
        let parsed: ScopeDto = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, ScopeDto::from_tree(&tree));
        assert_eq!(parsed.children[0].nodes[0].edges[0].type_, "transitive");
    }
}
