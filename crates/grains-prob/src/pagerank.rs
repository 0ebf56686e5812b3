//! Random-walk PageRank with grain-coded outlink weights.

use std::collections::BTreeMap;

use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::{Grain, RngHandle};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Directed graph as node name to ordered outlinks.
pub type Graph = BTreeMap<String, Vec<String>>;

/// Grains assigned to one outlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Destination node.
    pub target: String,
    /// Grains on the link.
    pub grains: u64,
}

/// Walk parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Number of walk steps.
    #[serde(default = "default_steps")]
    pub steps: u64,
    /// Grains out of `damping_total` that follow an outlink.
    #[serde(default = "default_damping_grains")]
    pub damping_grains: u64,
    /// Grains in the damping decision.
    #[serde(default = "default_damping_total")]
    pub damping_total: u64,
    /// Grains spread over each node's outlinks.
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

fn default_steps() -> u64 {
    2_000
}

fn default_damping_grains() -> u64 {
    85
}

fn default_damping_total() -> u64 {
    100
}

fn default_capacity() -> u64 {
    10
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            damping_grains: default_damping_grains(),
            damping_total: default_damping_total(),
            capacity: default_capacity(),
        }
    }
}

impl PageRankConfig {
    /// Checks the step count, damping fraction and capacity.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.steps == 0 {
            return Err(GrainsError::config("steps", "walk needs at least one step"));
        }
        if self.damping_total == 0 || self.damping_grains > self.damping_total {
            return Err(GrainsError::config(
                "damping_grains",
                "damping must be a fraction of a positive total",
            ));
        }
        if self.capacity == 0 {
            return Err(GrainsError::config("capacity", "outlink capacity must be positive"));
        }
        Ok(())
    }
}

/// Visit counts and exact ranks of a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRankReport {
    /// Steps walked.
    pub steps: u64,
    /// Visits per node.
    pub visits: BTreeMap<String, u64>,
    /// Visits divided by the number of steps.
    pub ranks: BTreeMap<String, Grain>,
}

/// Spreads `capacity` grains over each node's outlinks.
///
/// Every outlink receives `max(1, capacity / out_degree)` grains and the
/// first outlink takes whatever is left. A node without outlinks keeps all
/// grains on a self-loop. A repeated outlink still counts towards the
/// out-degree but is assigned only once, so its node spreads fewer than
/// `capacity` grains.
pub fn build_transitions(
    graph: &Graph,
    capacity: u64,
) -> Result<BTreeMap<String, Vec<Transition>>, GrainsError> {
    let mut transitions = BTreeMap::new();
    for (node, outlinks) in graph {
        let mut links: Vec<Transition> = Vec::with_capacity(outlinks.len().max(1));
        if outlinks.is_empty() {
            links.push(Transition {
                target: node.clone(),
                grains: capacity,
            });
        } else {
            let degree = outlinks.len() as u64;
            let each = (capacity / degree).max(1);
            let leftover = capacity.saturating_sub(each * degree);
            for target in outlinks {
                if !graph.contains_key(target) {
                    return Err(GrainsError::Probability(
                        ErrorInfo::new("unknown-node", "outlink points to a node missing from the graph")
                            .with_context("source", node.clone())
                            .with_context("target", target.clone()),
                    ));
                }
                if !links.iter().any(|link| &link.target == target) {
                    links.push(Transition {
                        target: target.clone(),
                        grains: each,
                    });
                }
            }
            if let Some(first) = links.first_mut() {
                first.grains += leftover;
            }
        }
        transitions.insert(node.clone(), links);
    }
    Ok(transitions)
}

fn draw_link<'a>(links: &'a [Transition], rng: &mut RngHandle) -> Option<&'a str> {
    let total: u64 = links.iter().map(|link| link.grains).sum();
    let draw = rng.draw_below(total)?;
    let mut running = 0;
    for link in links {
        running += link.grains;
        if draw < running {
            return Some(&link.target);
        }
    }
    None
}

/// Estimates PageRank by a damped random walk.
///
/// Each step records a visit, then follows a grain-weighted outlink with
/// probability `damping_grains / damping_total` or teleports to a uniformly
/// chosen node.
pub fn pagerank(
    graph: &Graph,
    config: &PageRankConfig,
    rng: &mut RngHandle,
) -> Result<PageRankReport, GrainsError> {
    config.validate()?;
    if graph.is_empty() {
        return Err(GrainsError::config("graph", "graph must contain at least one node"));
    }
    let transitions = build_transitions(graph, config.capacity)?;
    let nodes: Vec<&String> = graph.keys().collect();
    let teleport = |rng: &mut RngHandle| {
        rng.draw_below(nodes.len() as u64)
            .and_then(|index| nodes.get(index as usize).copied())
    };

    let mut visits: BTreeMap<String, u64> = nodes.iter().map(|node| ((*node).clone(), 0)).collect();
    let mut current: &str = teleport(rng).map_or(nodes[0].as_str(), String::as_str);
    for _ in 0..config.steps {
        if let Some(count) = visits.get_mut(current) {
            *count += 1;
        }
        let follow = rng
            .draw_below(config.damping_total)
            .map_or(false, |draw| draw < config.damping_grains);
        let next = if follow {
            transitions
                .get(current)
                .and_then(|links| draw_link(links, rng))
        } else {
            teleport(rng).map(String::as_str)
        };
        if let Some(next) = next {
            current = next;
        }
    }
    debug!("pagerank visits {visits:?}");

    let ranks = visits
        .iter()
        .map(|(node, count)| Ok((node.clone(), Grain::new(*count, config.steps)?)))
        .collect::<Result<BTreeMap<_, _>, GrainsError>>()?;
    info!("pagerank: {} nodes, {} steps", nodes.len(), config.steps);
    Ok(PageRankReport {
        steps: config.steps,
        visits,
        ranks,
    })
}
