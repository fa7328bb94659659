//! Advisory dependency analysis for field definitions
//!
//! Evaluation never consults this report: fields always run in declaration
//! order. The report only tells editors which references will resolve to the
//! literal `<Name>` token because the field they name comes later, and which
//! fields reference each other in a loop.

use super::FieldDefinition;
use crate::parser::variable_references;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A reference to a field that is declared at or after the referencing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardReference {
    /// Referencing field
    pub field: String,
    /// Position of the referencing field
    pub position: usize,
    /// Referenced field name
    pub reference: String,
    /// Position where the referenced field is first declared
    pub declared_at: usize,
}

/// Result of [`analyze_dependencies`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    /// References that will see the literal token
    pub forward_references: Vec<ForwardReference>,
    /// Reference loops, each listed from its first field back to itself
    pub cycles: Vec<Vec<String>>,
}

impl DependencyReport {
    /// Whether every reference points at an earlier field and no loops exist
    pub fn is_clean(&self) -> bool {
        self.forward_references.is_empty() && self.cycles.is_empty()
    }
}

impl fmt::Display for DependencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "No forward references or cycles");
        }
        for fwd in &self.forward_references {
            writeln!(
                f,
                "Field '{}' (#{}) references '{}' declared later (#{}); it will see <{}>",
                fwd.field,
                fwd.position + 1,
                fwd.reference,
                fwd.declared_at + 1,
                fwd.reference
            )?;
        }
        for cycle in &self.cycles {
            writeln!(f, "Cycle: {}", cycle.join(" -> "))?;
        }
        Ok(())
    }
}

/// Report forward references and reference cycles among `fields`.
///
/// Only references naming another field are considered; context variables
/// such as `<Date>` are ignored.
pub fn analyze_dependencies(fields: &[FieldDefinition]) -> DependencyReport {
    let mut first_declared: IndexMap<&str, usize> = IndexMap::new();
    for (position, field) in fields.iter().enumerate() {
        first_declared.entry(field.name.as_str()).or_insert(position);
    }

    let mut report = DependencyReport::default();
    let mut graph: IndexMap<&str, IndexSet<&str>> = IndexMap::new();

    for (position, field) in fields.iter().enumerate() {
        let edges = graph.entry(field.name.as_str()).or_default();
        for reference in variable_references(&field.expression) {
            let name = reference.value;
            let Some(&declared_at) = first_declared.get(name) else {
                continue;
            };
            if name != field.name || declared_at >= position {
                edges.insert(name);
            }
            if declared_at >= position {
                report.forward_references.push(ForwardReference {
                    field: field.name.clone(),
                    position,
                    reference: name.to_string(),
                    declared_at,
                });
            }
        }
    }

    report.cycles = find_cycles(&graph);
    report
}

/// Depth-first search for loops, each reported once
fn find_cycles(graph: &IndexMap<&str, IndexSet<&str>>) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut visited: HashSet<&str> = HashSet::new();

    for &start in graph.keys() {
        if visited.contains(start) {
            continue;
        }
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        visit(
            start,
            graph,
            &mut visited,
            &mut on_path,
            &mut path,
            &mut cycles,
            &mut seen,
        );
    }
    cycles
}

fn visit<'a>(
    node: &'a str,
    graph: &IndexMap<&'a str, IndexSet<&'a str>>,
    visited: &mut HashSet<&'a str>,
    on_path: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    cycles: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
) {
    visited.insert(node);
    on_path.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &next in neighbors {
            if on_path.contains(next) {
                if let Some(from) = path.iter().position(|&n| n == next) {
                    let mut cycle: Vec<String> =
                        path[from..].iter().map(|n| n.to_string()).collect();
                    if seen.insert(canonical(&cycle)) {
                        cycle.push(next.to_string());
                        cycles.push(cycle);
                    }
                }
            } else if !visited.contains(next) {
                visit(next, graph, visited, on_path, path, cycles, seen);
            }
        }
    }

    on_path.remove(node);
    path.pop();
}

/// Rotation of a loop starting at its smallest name
fn canonical(cycle: &[String]) -> Vec<String> {
    let min = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[min..].iter().chain(&cycle[..min]).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(defs: &[(&str, &str)]) -> Vec<FieldDefinition> {
        defs.iter()
            .map(|(name, expr)| FieldDefinition::new(*name, *expr))
            .collect()
    }

    #[test]
    fn test_ordered_fields_are_clean() {
        let report = analyze_dependencies(&fields(&[
            ("A", "<Date>"),
            ("B", "<A>_<FileName>"),
            ("C", "LEFT(<B>, 3)"),
        ]));
        assert!(report.is_clean());
    }

    #[test]
    fn test_forward_reference() {
        let report = analyze_dependencies(&fields(&[("B", "<A>"), ("A", "X")]));
        assert_eq!(
            report.forward_references,
            vec![ForwardReference {
                field: "B".to_string(),
                position: 0,
                reference: "A".to_string(),
                declared_at: 1,
            }]
        );
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn test_cycles() {
        let report = analyze_dependencies(&fields(&[
            ("A", "<B>"),
            ("B", "<C>"),
            ("C", "<A>"),
            ("D", "<D>"),
        ]));
        assert_eq!(
            report.cycles,
            vec![
                vec!["A".to_string(), "B".to_string(), "C".to_string(), "A".to_string()],
                vec!["D".to_string(), "D".to_string()],
            ]
        );
        // C -> A is the only backward reference
        assert_eq!(report.forward_references.len(), 3);
        assert!(report.to_string().contains("Cycle: A -> B -> C -> A"));
    }

    #[test]
    fn test_redefinition_counts_first_declaration() {
        let report = analyze_dependencies(&fields(&[("A", "1"), ("A", "<A>2")]));
        assert!(report.is_clean());
    }
}
