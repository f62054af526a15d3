//! Scope Tree
//!
//! Arena holding every file node of an include graph, grouped into nested
//! scopes that mirror the directory structure of the canonical paths.

use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// How an include relationship was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Observed directly in the trace
    Explicit,
    /// Found by scanning file contents
    Transitive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// One source file.
#[derive(Debug, Clone)]
pub struct Node {
    pub path: String,
    pub scope: ScopeId,
    /// Outgoing edges keyed by target, in discovery order.
    pub edges: IndexMap<NodeId, Edge>,
}

/// One directory level. The root scope has no prefix.
#[derive(Debug, Clone)]
pub struct Scope {
    pub prefix: Option<String>,
    pub children: IndexMap<String, ScopeId>,
    pub nodes: Vec<NodeId>,
}

impl Scope {
    fn new(prefix: Option<String>) -> Self {
        Self {
            prefix,
            children: IndexMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Whether the renderer wraps this scope in a cluster.
    pub fn is_cluster(&self) -> bool {
        self.prefix.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    nodes: Vec<Node>,
    scope_index: HashMap<String, ScopeId>,
    node_index: HashMap<String, NodeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None)],
            nodes: Vec::new(),
            scope_index: HashMap::new(),
            node_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn find_node(&self, path: &str) -> Option<NodeId> {
        self.node_index.get(path).copied()
    }

    pub fn find_scope(&self, prefix: &str) -> Option<ScopeId> {
        self.scope_index.get(prefix).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of scopes, root included.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// All edges in node creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.nodes.iter().flat_map(|n| n.edges.values())
    }

    /// Look up or create the node for `path`, creating its scope chain on the way.
    pub fn insert(&mut self, path: &str) -> NodeId {
        if let Some(id) = self.node_index.get(path) {
            return *id;
        }

        let scope = match path.rfind('/') {
            Some(pos) => self.ensure_scope_chain(&path[..pos]),
            None => self.root(),
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            path: path.to_string(),
            scope,
            edges: IndexMap::new(),
        });
        self.scopes[scope.0].nodes.push(id);
        self.node_index.insert(path.to_string(), id);
        id
    }

    /// Add `from -> to` unless the pair already exists; the first kind wins.
    /// Returns whether a new edge was added.
    pub fn push_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> bool {
        let source = self.insert(from);
        let target = self.insert(to);
        let edges = &mut self.nodes[source.0].edges;
        if edges.contains_key(&target) {
            return false;
        }
        edges.insert(target, Edge { source, target, kind });
        true
    }

    fn ensure_scope_chain(&mut self, dir: &str) -> ScopeId {
        if let Some(id) = self.scope_index.get(dir) {
            return *id;
        }

        let mut parent = self.root();
        let mut prefix = String::new();
        for (i, segment) in dir.split('/').enumerate() {
            if i > 0 {
                prefix.push('/');
            }
            prefix.push_str(segment);

            let existing = self.scopes[parent.0].children.get(&prefix).copied();
            parent = match existing {
                Some(child) => child,
                None => {
                    let child = ScopeId(self.scopes.len());
                    self.scopes.push(Scope::new(Some(prefix.clone())));
                    self.scopes[parent.0].children.insert(prefix.clone(), child);
                    self.scope_index.insert(prefix.clone(), child);
                    child
                }
            };
        }
        parent
    }

    /// Nodes in walk order: child scopes depth-first before a scope's own nodes.
    pub fn nodes_depth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.collect_depth_first(self.root(), &mut out);
        out
    }

    fn collect_depth_first(&self, scope: ScopeId, out: &mut Vec<NodeId>) {
        let scope = self.scope(scope);
        for child in scope.children.values() {
            self.collect_depth_first(*child, out);
        }
        out.extend(scope.nodes.iter().copied());
    }
}
