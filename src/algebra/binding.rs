//! Variable bindings for one BGP evaluation.
//!
//! Bindings form a tree: each join step extends its parent with the variables
//! its pattern introduces, without copying or touching the parent. Nodes live in
//! an arena and refer to their parent by handle, so sibling branches share the
//! common prefix and can never corrupt each other.

use oxrdf::{Term, Variable};
use serde_json::{Map, Value};

use crate::codec::encode_term;

/// Handle of a binding node inside its [`BindingArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u32);

#[derive(Debug)]
struct BindingNode {
    parent: Option<BindingId>,
    values: Vec<(Variable, Term)>,
}

#[derive(Debug, Default)]
pub struct BindingArena {
    nodes: Vec<BindingNode>,
}

impl BindingArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// New binding: everything `parent` binds plus `values`.
    pub fn extend(&mut self, parent: Option<BindingId>, values: Vec<(Variable, Term)>) -> BindingId {
        let id = BindingId(self.nodes.len() as u32);
        self.nodes.push(BindingNode { parent, values });
        id
    }

    /// Value of `variable` in `binding` or any of its ancestors.
    pub fn lookup(&self, binding: Option<BindingId>, variable: &Variable) -> Option<&Term> {
        let mut current = binding;
        while let Some(BindingId(index)) = current {
            let node = self.nodes.get(index as usize)?;
            if let Some((_, term)) = node.values.iter().find(|(bound, _)| bound == variable) {
                return Some(term);
            }
            current = node.parent;
        }
        None
    }

    /// Flattens the chain ending at `binding`, oldest variables first.
    pub fn materialize(&self, binding: Option<BindingId>) -> Binding {
        let mut chain = Vec::new();
        let mut current = binding;
        while let Some(BindingId(index)) = current {
            let Some(node) = self.nodes.get(index as usize) else {
                break;
            };
            chain.push(node);
            current = node.parent;
        }
        let values = chain
            .into_iter()
            .rev()
            .flat_map(|node| node.values.iter().cloned())
            .collect();
        Binding { values }
    }
}

/// One output row: variables and their terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: Vec<(Variable, Term)>,
}

impl Binding {
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.values
            .iter()
            .find(|(bound, _)| bound == variable)
            .map(|(_, term)| term)
    }

    /// Lookup by variable name, without the `?`.
    pub fn get_by_name(&self, name: &str) -> Option<&Term> {
        self.values
            .iter()
            .find(|(bound, _)| bound.as_str() == name)
            .map(|(_, term)| term)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter().map(|(variable, term)| (variable, term))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `{"name": "<N-Triples term>", ...}`
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(variable, term)| (variable.as_str().to_string(), Value::String(encode_term(term))))
            .collect();
        Value::Object(map)
    }
}

impl IntoIterator for Binding {
    type Item = (Variable, Term);
    type IntoIter = std::vec::IntoIter<(Variable, Term)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn node(iri: &str) -> Term {
        NamedNode::new_unchecked(iri).into()
    }

    #[test]
    fn test_siblings_share_parent_without_interference() {
        let mut arena = BindingArena::new();
        let root = arena.extend(None, vec![(var("s"), node("http://x/a"))]);
        let left = arena.extend(Some(root), vec![(var("o"), node("http://x/b"))]);
        let right = arena.extend(Some(root), vec![(var("o"), node("http://x/c"))]);

        assert_eq!(arena.lookup(Some(left), &var("o")), Some(&node("http://x/b")));
        assert_eq!(arena.lookup(Some(right), &var("o")), Some(&node("http://x/c")));
        assert_eq!(arena.lookup(Some(left), &var("s")), Some(&node("http://x/a")));
        assert_eq!(arena.lookup(Some(root), &var("o")), None);
        assert_eq!(arena.lookup(None, &var("s")), None);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_materialize_orders_oldest_first() {
        let mut arena = BindingArena::new();
        let root = arena.extend(None, vec![(var("s"), node("http://x/a"))]);
        let child = arena.extend(Some(root), vec![(var("o"), node("http://x/b")), (var("z"), node("http://x/c"))]);

        let binding = arena.materialize(Some(child));
        let names: Vec<&str> = binding.iter().map(|(variable, _)| variable.as_str()).collect();
        assert_eq!(names, vec!["s", "o", "z"]);
        assert_eq!(binding.get_by_name("z"), Some(&node("http://x/c")));
        assert!(arena.materialize(None).is_empty());
    }

    #[test]
    fn test_json_rendering() {
        let mut arena = BindingArena::new();
        let id = arena.extend(None, vec![(var("s"), node("http://x/a"))]);
        assert_eq!(
            arena.materialize(Some(id)).to_json(),
            serde_json::json!({"s": "<http://x/a>"})
        );
    }
}
