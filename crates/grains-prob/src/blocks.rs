//! Quadtree of probability blocks with adaptive splitting, merging and flow.

use grains_core::errors::{ErrorInfo, GrainsError};
use grains_core::Grain;
use log::{debug, info};
use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// Inclusive integer rectangle `[x_min, x_max] × [y_min, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRect")]
pub struct BlockRect {
    /// Leftmost column.
    pub x_min: u32,
    /// Rightmost column.
    pub x_max: u32,
    /// Bottom row.
    pub y_min: u32,
    /// Top row.
    pub y_max: u32,
}

#[derive(Deserialize)]
struct RawRect {
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
}

impl TryFrom<RawRect> for BlockRect {
    type Error = GrainsError;

    fn try_from(raw: RawRect) -> Result<Self, Self::Error> {
        BlockRect::new(raw.x_min, raw.x_max, raw.y_min, raw.y_max)
    }
}

impl BlockRect {
    /// Builds a rectangle, rejecting inverted bounds.
    pub fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Result<Self, GrainsError> {
        if x_min > x_max || y_min > y_max {
            return Err(GrainsError::Config(
                ErrorInfo::new("invalid-rect", "block bounds are inverted")
                    .with_context("x", format!("{x_min}..={x_max}"))
                    .with_context("y", format!("{y_min}..={y_max}")),
            ));
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Columns covered.
    pub fn width(&self) -> u64 {
        u64::from(self.x_max - self.x_min) + 1
    }

    /// Rows covered.
    pub fn height(&self) -> u64 {
        u64::from(self.y_max - self.y_min) + 1
    }

    /// Cells covered.
    pub fn area(&self) -> u64 {
        self.width() * self.height()
    }

    /// `true` when the rectangles share an edge segment.
    pub fn touches(&self, other: &BlockRect) -> bool {
        let abut = |a_max: u32, b_min: u32| a_max.checked_add(1) == Some(b_min);
        let horizontal = abut(self.x_max, other.x_min) || abut(other.x_max, self.x_min);
        let y_overlap = !(self.y_max < other.y_min || other.y_max < self.y_min);
        if horizontal && y_overlap {
            return true;
        }
        let vertical = abut(self.y_max, other.y_min) || abut(other.y_max, self.y_min);
        let x_overlap = !(self.x_max < other.x_min || other.x_max < self.x_min);
        vertical && x_overlap
    }

    /// Quadrants in bottom-left, bottom-right, top-left, top-right order, empty ones skipped.
    fn quadrants(&self) -> Vec<BlockRect> {
        let x_mid = self.x_min + (self.x_max - self.x_min) / 2;
        let y_mid = self.y_min + (self.y_max - self.y_min) / 2;
        let x_next = x_mid.checked_add(1);
        let y_next = y_mid.checked_add(1);
        let candidates = [
            (Some(self.x_min), x_mid, Some(self.y_min), y_mid),
            (x_next, self.x_max, Some(self.y_min), y_mid),
            (Some(self.x_min), x_mid, y_next, self.y_max),
            (x_next, self.x_max, y_next, self.y_max),
        ];
        candidates
            .into_iter()
            .filter_map(|(x0, x1, y0, y1)| BlockRect::new(x0?, x1, y0?, y1).ok())
            .collect()
    }
}

mod vantage_string {
    use num_bigint::BigInt;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A block of the tree. Leaves have no children and carry the probability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    /// Covered cells.
    pub rect: BlockRect,
    /// Probability held by a leaf; zero on internal nodes.
    pub probability: Grain,
    /// Largest denominator the block resolves.
    #[serde(with = "vantage_string")]
    pub vantage: BigInt,
    /// Sub-blocks, empty for a leaf.
    #[serde(default)]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// Creates a leaf.
    pub fn leaf(rect: BlockRect, probability: Grain, vantage: BigInt) -> Self {
        Self {
            rect,
            probability,
            vantage,
            children: Vec::new(),
        }
    }

    /// `true` when the block has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Sum of leaf probabilities below this block.
    pub fn total(&self) -> Grain {
        if self.is_leaf() {
            self.probability.clone()
        } else {
            self.children.iter().map(BlockNode::total).sum()
        }
    }

    /// Sets the probability and grows the vantage if it can no longer resolve it.
    pub fn set_probability(&mut self, probability: Grain) {
        self.probability = probability;
        self.refine_vantage();
    }

    /// Raises the vantage to `max(⌈1/p⌉, vantage + 1)` when `0 < p < 1/vantage`.
    pub fn refine_vantage(&mut self) {
        let p = &self.probability;
        if p.is_zero() || *p == Grain::one() {
            return;
        }
        let resolution = Grain::from_integer(self.vantage.clone());
        if p * &resolution >= Grain::one() {
            return;
        }
        let Ok(inverse) = p.recip() else {
            return;
        };
        let grown = &self.vantage + BigInt::one();
        let refined = inverse.ceil_integer().max(grown);
        debug!(
            "vantage of block ({},{})-({},{}) raised {} -> {refined}",
            self.rect.x_min, self.rect.y_min, self.rect.x_max, self.rect.y_max, self.vantage
        );
        self.vantage = refined;
    }

    fn scale(&mut self, factor: &Grain) {
        if self.is_leaf() {
            let scaled = &self.probability * factor;
            self.set_probability(scaled);
        } else {
            for child in &mut self.children {
                child.scale(factor);
            }
        }
    }

    /// Splits a leaf into quadrants sharing its probability equally.
    ///
    /// Leaves of area one stay whole. Returns `true` when a split happened.
    pub fn split(&mut self) -> bool {
        if !self.is_leaf() || self.rect.area() <= 1 {
            return false;
        }
        let quadrants = self.rect.quadrants();
        if quadrants.len() < 2 {
            return false;
        }
        let share = &self.probability * Grain::ratio(1, 4);
        self.children = quadrants
            .into_iter()
            .map(|rect| BlockNode::leaf(rect, share.clone(), self.vantage.clone()))
            .collect();
        self.probability = Grain::zero();
        true
    }

    /// Collapses the subtree into a leaf holding its total.
    pub fn merge(&mut self) -> bool {
        if self.is_leaf() {
            return false;
        }
        self.probability = self.total();
        self.children.clear();
        true
    }

    fn split_merge(
        &mut self,
        split_threshold: &Grain,
        merge_threshold: &Grain,
        counts: &mut SplitMergeCounts,
    ) {
        if self.is_leaf() {
            if self.rect.area() > 1 && self.probability >= *split_threshold && self.split() {
                counts.splits += 1;
            }
            return;
        }
        for child in &mut self.children {
            child.split_merge(split_threshold, merge_threshold, counts);
        }
        if self.total() < *merge_threshold && self.merge() {
            counts.merges += 1;
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a BlockNode>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    fn collect_leaves_mut<'a>(&'a mut self, out: &mut Vec<&'a mut BlockNode>) {
        if self.children.is_empty() {
            out.push(self);
        } else {
            for child in &mut self.children {
                child.collect_leaves_mut(out);
            }
        }
    }
}

/// What happens to the outflow of a leaf without neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// The outflow leaves the domain.
    Open,
    /// The outflow stays in the leaf.
    Closed,
}

/// Splits and merges performed by one adaptive pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMergeCounts {
    /// Leaves split into quadrants.
    pub splits: usize,
    /// Subtrees merged into leaves.
    pub merges: usize,
}

/// Quadtree of probability blocks over a rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTree {
    root: BlockNode,
}

impl BlockTree {
    /// Creates a single-leaf tree.
    pub fn new(rect: BlockRect, probability: Grain, vantage: BigInt) -> Result<Self, GrainsError> {
        if vantage < BigInt::one() {
            return Err(GrainsError::config("vantage", "vantage must be at least one"));
        }
        let mut root = BlockNode::leaf(rect, Grain::zero(), vantage);
        root.set_probability(probability);
        Ok(Self { root })
    }

    /// Root block.
    pub fn root(&self) -> &BlockNode {
        &self.root
    }

    /// Mutable root block.
    pub fn root_mut(&mut self) -> &mut BlockNode {
        &mut self.root
    }

    /// Sum of all leaf probabilities.
    pub fn total(&self) -> Grain {
        self.root.total()
    }

    /// Multiplies every leaf probability by `factor`.
    pub fn scale(&mut self, factor: &Grain) {
        self.root.scale(factor);
    }

    /// Rescales so the leaves sum to one. A zero or unit total is left alone.
    pub fn normalize(&mut self) -> Result<(), GrainsError> {
        let total = self.total();
        if total.is_zero() || total == Grain::one() {
            return Ok(());
        }
        let factor = total.recip()?;
        self.scale(&factor);
        Ok(())
    }

    /// Splits leaves at or above `split_threshold` and merges subtrees below `merge_threshold`.
    pub fn adaptive_split_merge(
        &mut self,
        split_threshold: &Grain,
        merge_threshold: &Grain,
    ) -> SplitMergeCounts {
        let mut counts = SplitMergeCounts::default();
        self.root.split_merge(split_threshold, merge_threshold, &mut counts);
        counts
    }

    /// Leaves in depth-first quadrant order.
    pub fn leaves(&self) -> Vec<&BlockNode> {
        let mut out = Vec::new();
        self.root.collect_leaves(&mut out);
        out
    }

    /// Indices of edge-sharing leaves, aligned with [`Self::leaves`].
    pub fn neighbours(&self) -> Vec<Vec<usize>> {
        neighbour_map(&self.leaves())
    }

    /// Moves `alpha` of every leaf's probability equally onto its neighbours.
    pub fn flow_step(&mut self, alpha: &Grain, boundary: Boundary) -> Result<(), GrainsError> {
        let (old, neighbours) = {
            let leaves = self.leaves();
            let old: Vec<Grain> = leaves.iter().map(|leaf| leaf.probability.clone()).collect();
            (old, neighbour_map(&leaves))
        };
        let mut next = vec![Grain::zero(); old.len()];
        for (i, p) in old.iter().enumerate() {
            let outflow = p * alpha;
            next[i] = &next[i] + (p - &outflow);
            if neighbours[i].is_empty() {
                if boundary == Boundary::Closed {
                    next[i] = &next[i] + &outflow;
                }
                continue;
            }
            let portion = outflow.checked_div(&Grain::from_integer(neighbours[i].len()))?;
            for &j in &neighbours[i] {
                next[j] = &next[j] + &portion;
            }
        }
        let mut leaves = Vec::new();
        self.root.collect_leaves_mut(&mut leaves);
        for (leaf, probability) in leaves.into_iter().zip(next) {
            leaf.set_probability(probability);
        }
        Ok(())
    }

    /// Runs `flow → normalize → split/merge` for the configured number of steps.
    pub fn run(config: &BlockFlowConfig) -> Result<BlockFlowReport, GrainsError> {
        config.validate()?;
        let rect = BlockRect::new(0, config.width - 1, 0, config.height - 1)?;
        let mut tree = BlockTree::new(rect, Grain::one(), BigInt::from(config.vantage))?;
        let mut steps = Vec::with_capacity(config.steps as usize);
        for step in 1..=config.steps {
            tree.flow_step(&config.alpha, config.boundary)?;
            tree.normalize()?;
            let counts = tree.adaptive_split_merge(&config.split_threshold, &config.merge_threshold);
            let summary = StepSummary {
                step,
                leaves: tree.leaves().len(),
                splits: counts.splits,
                merges: counts.merges,
                total: tree.total(),
            };
            debug!(
                "block step {step}: {} leaves, {} splits, {} merges",
                summary.leaves, summary.splits, summary.merges
            );
            steps.push(summary);
        }
        let total = tree.total();
        info!("block flow finished: {} leaves, total {total}", tree.leaves().len());
        Ok(BlockFlowReport {
            total,
            steps,
            tree,
        })
    }

    /// Encodes the tree with `bincode`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GrainsError> {
        bincode::serialize(self)
            .map_err(|err| GrainsError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
    }

    /// Decodes a tree written by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GrainsError> {
        bincode::deserialize(bytes)
            .map_err(|err| GrainsError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))
    }
}

fn neighbour_map(leaves: &[&BlockNode]) -> Vec<Vec<usize>> {
    let mut map = vec![Vec::new(); leaves.len()];
    for i in 0..leaves.len() {
        for j in (i + 1)..leaves.len() {
            if leaves[i].rect.touches(&leaves[j].rect) {
                map[i].push(j);
                map[j].push(i);
            }
        }
    }
    map
}

/// Parameters of a block flow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFlowConfig {
    /// Domain width in cells.
    #[serde(default = "default_side")]
    pub width: u32,
    /// Domain height in cells.
    #[serde(default = "default_side")]
    pub height: u32,
    /// Initial vantage of the root block.
    #[serde(default = "default_vantage")]
    pub vantage: u64,
    /// Fraction of each leaf pushed to its neighbours per step.
    #[serde(default = "default_alpha")]
    pub alpha: Grain,
    /// Leaves at or above this probability split.
    #[serde(default = "default_split_threshold")]
    pub split_threshold: Grain,
    /// Subtrees below this total merge.
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: Grain,
    /// Number of steps.
    #[serde(default = "default_block_steps")]
    pub steps: u32,
    /// Boundary handling.
    #[serde(default = "default_boundary")]
    pub boundary: Boundary,
}

fn default_side() -> u32 {
    16
}

fn default_vantage() -> u64 {
    50
}

fn default_alpha() -> Grain {
    Grain::ratio(1, 10)
}

fn default_split_threshold() -> Grain {
    Grain::ratio(1, 5)
}

fn default_merge_threshold() -> Grain {
    Grain::ratio(1, 300)
}

fn default_block_steps() -> u32 {
    10
}

fn default_boundary() -> Boundary {
    Boundary::Open
}

impl Default for BlockFlowConfig {
    fn default() -> Self {
        Self {
            width: default_side(),
            height: default_side(),
            vantage: default_vantage(),
            alpha: default_alpha(),
            split_threshold: default_split_threshold(),
            merge_threshold: default_merge_threshold(),
            steps: default_block_steps(),
            boundary: default_boundary(),
        }
    }
}

impl BlockFlowConfig {
    /// Checks the domain, vantage and fractions.
    pub fn validate(&self) -> Result<(), GrainsError> {
        if self.width == 0 || self.height == 0 {
            return Err(GrainsError::config("width", "domain must cover at least one cell"));
        }
        if self.vantage == 0 {
            return Err(GrainsError::config("vantage", "vantage must be at least one"));
        }
        if self.alpha.is_negative() || self.alpha > Grain::one() {
            return Err(GrainsError::config("alpha", "alpha must lie in [0, 1]"));
        }
        if self.split_threshold.is_negative() || self.merge_threshold.is_negative() {
            return Err(GrainsError::config(
                "split_threshold",
                "thresholds must be non-negative",
            ));
        }
        Ok(())
    }
}

/// State after one step of a block flow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    /// Step number, starting at one.
    pub step: u32,
    /// Leaves after the step.
    pub leaves: usize,
    /// Splits performed.
    pub splits: usize,
    /// Merges performed.
    pub merges: usize,
    /// Total probability after the step.
    pub total: Grain,
}

/// Result of [`BlockTree::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFlowReport {
    /// Final total probability.
    pub total: Grain,
    /// Per-step summaries.
    pub steps: Vec<StepSummary>,
    /// Final tree.
    pub tree: BlockTree,
}
