use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use super::Build;
use super::run::shared_outputs;
use crate::config::{UnitKind, UnitSpec};
use crate::error::{ConfigError, Error, Result};

/// Problems found by [`Build::check`], in document order.
#[derive(Debug, Default)]
pub struct CheckReport {
  pub problems: Vec<Error>,
  /// Unit names with dependencies before dependents, if the graph is acyclic.
  pub order: Vec<String>,
}

impl CheckReport {
  pub fn is_ok(&self) -> bool {
    self.problems.is_empty()
  }
}

impl Build {
  /// Validate the whole graph without reading any source.
  ///
  /// Every declaration must parse, every bundle member and unit `builds`
  /// entry must exist, every variant step must name a known transformation,
  /// no two targets may share an output path, and bundles must not form a
  /// cycle.
  pub fn check(&self) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    for variant in &self.config.variants {
      for step in &variant.transforms {
        if !self.has_transform(step)? {
          report
            .problems
            .push(ConfigError::UnknownTransformation(step.clone()).into());
        }
      }
    }

    let mut specs = Vec::with_capacity(self.config.units.len());
    for entry in &self.config.units {
      match UnitSpec::parse(entry) {
        Ok(spec) => specs.push((entry.name.as_str(), spec)),
        Err(err) => report.problems.push(err.into()),
      }
    }

    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = specs
      .iter()
      .map(|(name, _)| (*name, graph.add_node(*name)))
      .collect();

    for (name, spec) in &specs {
      for variant in spec.builds.iter().flatten() {
        if self.config.variant(variant).is_none() {
          report
            .problems
            .push(ConfigError::UnknownTransformation(variant.clone()).into());
        }
      }

      if let UnitKind::Bundle { dependencies } = &spec.kind {
        for dependency in dependencies {
          match nodes.get(dependency.as_str()) {
            // Edge from dependency to dependent
            Some(&from) => {
              graph.add_edge(from, nodes[name], ());
            }
            None if self.config.unit(dependency).is_some() => {}
            None => report
              .problems
              .push(ConfigError::UnknownReference(dependency.clone()).into()),
          }
        }
      }
    }

    let targets: Vec<_> = specs
      .iter()
      .filter_map(|(name, _)| self.targets(name).ok())
      .flatten()
      .collect();
    for (path, owners) in shared_outputs(&targets) {
      report.problems.push(ConfigError::OutputCollision { path, owners }.into());
    }

    match toposort(&graph, None) {
      Ok(sorted) => {
        report.order = sorted.into_iter().map(|idx| graph[idx].to_string()).collect();
      }
      Err(cycle) => {
        let path = cycle_path(&graph, cycle.node_id());
        report.problems.push(ConfigError::Cycle(path).into());
      }
    }

    debug!(problems = report.problems.len(), "checked build graph");
    Ok(report)
  }
}

/// Names along a cycle through `start`, in dependency order, starting and
/// ending with the same name.
fn cycle_path(graph: &DiGraph<&str, ()>, start: NodeIndex) -> Vec<String> {
  fn walk(
    graph: &DiGraph<&str, ()>,
    node: NodeIndex,
    start: NodeIndex,
    path: &mut Vec<NodeIndex>,
    seen: &mut Vec<NodeIndex>,
  ) -> bool {
    // Edges point from dependency to dependent, so walk them backwards.
    for next in graph.neighbors_directed(node, petgraph::Direction::Incoming) {
      if next == start {
        return true;
      }
      if seen.contains(&next) {
        continue;
      }
      seen.push(next);
      path.push(next);
      if walk(graph, next, start, path, seen) {
        return true;
      }
      path.pop();
    }
    false
  }

  let mut path = vec![start];
  let mut seen = vec![start];
  if !walk(graph, start, start, &mut path, &mut seen) {
    return vec![graph[start].to_string()];
  }
  path.push(start);
  path.into_iter().map(|idx| graph[idx].to_string()).collect()
}
