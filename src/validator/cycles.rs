//! Passes 4 and 5: cycle detection and chain-depth analysis
//!
//! Both passes share one dependency graph over the combined resource and
//! bundle knowledge. Nodes are prefixed ids (`"msg:{id}"`, `"term:{id}"`)
//! and dependency sets use the same prefixing, so neighbor lookups always
//! succeed. Cycles canonicalize to a rotation-invariant form that keeps
//! direction: `a→b→c` and `a→c→b` stay distinct.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::syntax::ast::{Entry, Resource};
use crate::syntax::span::Span;
use crate::validator::references::ReferenceCollector;
use crate::validator::ValidationOptions;

type Graph = BTreeMap<String, BTreeSet<String>>;

fn entry_node(entry: &Entry) -> Option<(String, Option<Span>)> {
    match entry {
        Entry::Message(message) => Some((format!("msg:{}", message.id.name), message.span)),
        Entry::Term(term) => Some((format!("term:{}", term.id.name), term.span)),
        _ => None,
    }
}

/// Human-readable form of a prefixed node
fn display_node(node: &str) -> String {
    match node.split_once(':') {
        Some(("msg", id)) => id.to_string(),
        Some(("term", id)) => format!("-{id}"),
        _ => node.to_string(),
    }
}

fn build_graph(resource: &Resource, options: &ValidationOptions) -> Graph {
    let mut graph: Graph = options
        .known_dependencies
        .iter()
        .map(|(node, deps)| (node.clone(), deps.iter().cloned().collect()))
        .collect();
    for entry in &resource.entries {
        let Some((node, _)) = entry_node(entry) else {
            continue;
        };
        let set = ReferenceCollector::collect(entry, options.chain_depth_limit());
        // Local entries override bundle knowledge (last write wins at
        // registration time too).
        graph.insert(node, set.prefixed_dependencies());
    }
    graph
}

/// Rotate a cycle so its smallest node comes first, preserving direction
fn canonicalize(cycle: &[String]) -> Vec<String> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| node.as_str())
        .map(|(index, _)| index)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(cycle.len());
    rotated.extend_from_slice(&cycle[pivot..]);
    rotated.extend_from_slice(&cycle[..pivot]);
    rotated
}

fn find_cycles(graph: &Graph) -> Vec<Vec<String>> {
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;

    let mut color: HashMap<&str, u8> = graph.keys().map(|k| (k.as_str(), WHITE)).collect();
    let mut cycles = Vec::new();
    let mut seen_keys = HashSet::new();

    for start in graph.keys() {
        if color[start.as_str()] != WHITE {
            continue;
        }
        // Iterative DFS; each frame owns its dependency list and a cursor.
        let mut stack: Vec<(&str, Vec<&str>, usize)> = vec![(
            start.as_str(),
            graph[start].iter().map(String::as_str).collect(),
            0,
        )];
        let mut path: Vec<&str> = vec![start.as_str()];
        color.insert(start.as_str(), GRAY);

        while let Some((node, deps, cursor)) = stack.last_mut() {
            if *cursor >= deps.len() {
                color.insert(*node, BLACK);
                stack.pop();
                path.pop();
                continue;
            }
            let dep = deps[*cursor];
            *cursor += 1;

            let Some(dep_key) = graph.get_key_value(dep).map(|(k, _)| k.as_str()) else {
                // Undefined target; the reference pass reports it.
                continue;
            };
            match color[dep_key] {
                WHITE => {
                    color.insert(dep_key, GRAY);
                    path.push(dep_key);
                    stack.push((
                        dep_key,
                        graph[dep_key].iter().map(String::as_str).collect(),
                        0,
                    ));
                }
                GRAY => {
                    let position = path
                        .iter()
                        .position(|candidate| *candidate == dep_key)
                        .expect("gray nodes are on the path");
                    let cycle: Vec<String> =
                        path[position..].iter().map(|s| s.to_string()).collect();
                    let canonical = canonicalize(&cycle);
                    if seen_keys.insert(canonical.join(" -> ")) {
                        cycles.push(canonical);
                    }
                }
                _ => {}
            }
        }
    }
    cycles
}

/// Passes 4 and 5 share one graph build
pub(crate) fn run(
    resource: &Resource,
    options: &ValidationOptions,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let graph = build_graph(resource, options);
    run_cycles(resource, &graph, diagnostics);
    run_chain_depth(resource, &graph, options, diagnostics);
}

fn run_cycles(resource: &Resource, graph: &Graph, diagnostics: &mut Vec<Diagnostic>) {
    let spans: HashMap<String, Option<Span>> = resource
        .entries
        .iter()
        .filter_map(entry_node)
        .map(|(node, span)| (node, span))
        .collect();

    for cycle in find_cycles(graph) {
        let mut rendered: Vec<String> = cycle.iter().map(|node| display_node(node)).collect();
        rendered.push(display_node(&cycle[0]));
        let span = cycle.iter().find_map(|node| spans.get(node)).copied().flatten();
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::CircularReference,
                format!("circular reference: {}", rendered.join(" -> ")),
            )
            .with_span(span),
        );
    }
}

/// Longest resolution chain starting at `node`, counting nodes; memoized,
/// iterative, and tolerant of cycles (back edges contribute nothing; the
/// cycle pass reports them)
fn longest_chain(start: &str, graph: &Graph, memo: &mut HashMap<String, usize>) -> usize {
    if let Some(&depth) = memo.get(start) {
        return depth;
    }
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, Vec<&str>, usize, usize)> = vec![(
        start,
        graph[start].iter().map(String::as_str).collect(),
        0,
        0,
    )];
    on_stack.insert(start);

    while let Some((node, deps, cursor, best)) = stack.last_mut() {
        if *cursor >= deps.len() {
            let depth = 1 + *best;
            memo.insert(node.to_string(), depth);
            on_stack.remove(*node);
            let node_depth = depth;
            stack.pop();
            if let Some((_, _, _, parent_best)) = stack.last_mut() {
                *parent_best = (*parent_best).max(node_depth);
            }
            continue;
        }
        let dep = deps[*cursor];
        *cursor += 1;

        if let Some(&known) = memo.get(dep) {
            *best = (*best).max(known);
            continue;
        }
        let Some(dep_key) = graph.get_key_value(dep).map(|(k, _)| k.as_str()) else {
            continue;
        };
        if on_stack.contains(dep_key) {
            continue;
        }
        on_stack.insert(dep_key);
        stack.push((
            dep_key,
            graph[dep_key].iter().map(String::as_str).collect(),
            0,
            0,
        ));
    }
    memo[start]
}

fn run_chain_depth(
    resource: &Resource,
    graph: &Graph,
    options: &ValidationOptions,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let limit = options.chain_depth_limit();
    let mut memo: HashMap<String, usize> = HashMap::new();

    for entry in &resource.entries {
        let Some((node, span)) = entry_node(entry) else {
            continue;
        };
        let depth = longest_chain(&node, graph, &mut memo);
        if depth > limit {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ChainDepthExceeded,
                    format!(
                        "\"{}\" heads a resolution chain of {} entries, limit is {}",
                        display_node(&node),
                        depth,
                        limit
                    ),
                )
                .with_span(span),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::validator::{ResourceValidator, ValidationOptions};

    fn cycle_messages(source: &str) -> Vec<String> {
        let resource = parse(source).unwrap();
        ResourceValidator::default()
            .validate(&resource, Some(source))
            .diagnostics
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::CircularReference)
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn two_message_cycle_is_detected_once() {
        let found = cycle_messages("a = { b }\nb = { a }\n");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("a -> b -> a"), "{found:?}");
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let found = cycle_messages("a = { a }\n");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn direction_distinguishes_cycles() {
        let clockwise = canonicalize(&[
            "msg:b".to_string(),
            "msg:c".to_string(),
            "msg:a".to_string(),
        ]);
        let counter = canonicalize(&[
            "msg:c".to_string(),
            "msg:b".to_string(),
            "msg:a".to_string(),
        ]);
        assert_eq!(clockwise[0], "msg:a");
        assert_eq!(counter[0], "msg:a");
        assert_ne!(clockwise, counter);
    }

    #[test]
    fn terms_participate_in_the_graph() {
        let found = cycle_messages("-a = { -b }\n-b = { -a }\n");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("-a"), "{found:?}");
    }

    #[test]
    fn chain_depth_exceeding_the_limit_is_flagged() {
        let source = "a = { b }\nb = { c }\nc = { d }\nd = end\n";
        let resource = parse(source).unwrap();
        let options = ValidationOptions {
            max_chain_depth: 3,
            ..ValidationOptions::default()
        };
        let result = ResourceValidator::new(options).validate(&resource, Some(source));
        let chains: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::ChainDepthExceeded)
            .collect();
        assert_eq!(chains.len(), 1, "{:?}", result.diagnostics);
        assert!(chains[0].message.contains("\"a\""));
    }

    #[test]
    fn chains_within_the_limit_pass() {
        let source = "a = { b }\nb = { c }\nc = end\n";
        let resource = parse(source).unwrap();
        let result = ResourceValidator::default().validate(&resource, Some(source));
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn bundle_knowledge_extends_the_graph() {
        let source = "local = { remote }\n";
        let resource = parse(source).unwrap();
        let mut options = ValidationOptions {
            max_chain_depth: 2,
            ..ValidationOptions::default()
        };
        options.known_messages.insert("remote".to_string());
        options.known_messages.insert("deeper".to_string());
        options.known_messages.insert("deepest".to_string());
        options.known_dependencies.insert(
            "msg:remote".to_string(),
            ["msg:deeper".to_string()].into_iter().collect(),
        );
        options.known_dependencies.insert(
            "msg:deeper".to_string(),
            ["msg:deepest".to_string()].into_iter().collect(),
        );
        let result = ResourceValidator::new(options).validate(&resource, Some(source));
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::ChainDepthExceeded));
    }
}

