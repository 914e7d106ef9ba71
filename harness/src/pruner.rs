//! `CraftingPruner`: the pruning hook for recipe domains.
//!
//! Rules, checked in order:
//!
//! 1. Tools are made once. Producing a tool is pruned when the same
//!    `produce` task is already on the call stack or the agent already
//!    owns the tool.
//! 2. Depth ceiling: dispatches deeper than the ceiling are pruned.
//! 3. Repetition: a task identical to each of the newest N call-stack
//!    entries is pruned.
//! 4. Tool worthiness: producing `tool` is pruned while the outstanding
//!    `have_enough` demand for the resource it speeds up is positive but
//!    no more than the configured threshold.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;
use trellis_search::prune::{DepthCeiling, PruneContext, PruneDecision, PruneHook, RepeatWindow};

use crate::config::PrunerSettings;
use crate::recipe::RecipeBook;
use crate::stock::{demand_of, PRODUCE};

/// A tool is only worth making for more than `max_demand` of `resource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolThreshold {
    pub tool: String,
    pub resource: String,
    pub max_demand: u64,
}

/// Which rule pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneRule {
    ToolInProgress,
    ToolOwned,
    DepthCeiling,
    Repetition,
    ToolNotWorthIt,
}

#[derive(Debug, Clone)]
pub struct CraftingPruner {
    tools: BTreeSet<String>,
    depth: DepthCeiling,
    repeat: RepeatWindow,
    thresholds: Vec<ToolThreshold>,
}

impl CraftingPruner {
    pub const DEFAULT_DEPTH_CEILING: usize = 900;
    pub const DEFAULT_REPEAT_WINDOW: usize = 10;

    /// Default ceiling and window, no thresholds.
    #[must_use]
    pub fn new<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tools: tools.into_iter().map(Into::into).collect(),
            depth: DepthCeiling {
                limit: Self::DEFAULT_DEPTH_CEILING,
            },
            repeat: RepeatWindow {
                window: Self::DEFAULT_REPEAT_WINDOW,
            },
            thresholds: Vec::new(),
        }
    }

    /// A pruner for `book`'s tools configured by `settings`.
    #[must_use]
    pub fn from_settings(book: &RecipeBook, settings: &PrunerSettings) -> Self {
        let mut pruner = Self::new(book.tools.iter().cloned())
            .with_depth_ceiling(settings.depth_ceiling)
            .with_repeat_window(settings.repeat_window);
        for threshold in &settings.thresholds {
            pruner = pruner.with_threshold(threshold.clone());
        }
        pruner
    }

    #[must_use]
    pub fn with_depth_ceiling(mut self, limit: usize) -> Self {
        self.depth = DepthCeiling { limit };
        self
    }

    #[must_use]
    pub fn with_repeat_window(mut self, window: usize) -> Self {
        self.repeat = RepeatWindow { window };
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: ToolThreshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    /// The first rule that prunes at `ctx`, if any.
    #[must_use]
    pub fn verdict(&self, ctx: &PruneContext<'_>) -> Option<PruneRule> {
        let tool = self.tool_being_produced(ctx);

        if let Some(tool) = tool {
            if ctx.call_stack.contains(ctx.task) {
                return Some(PruneRule::ToolInProgress);
            }
            if ctx.state.count(tool, ctx.task.agent()) > 0 {
                return Some(PruneRule::ToolOwned);
            }
        }
        if self.depth.check(ctx).is_prune() {
            return Some(PruneRule::DepthCeiling);
        }
        if self.repeat.check(ctx).is_prune() {
            return Some(PruneRule::Repetition);
        }
        if let Some(tool) = tool {
            for threshold in self.thresholds.iter().filter(|t| t.tool == tool) {
                let demand = outstanding_demand(ctx, &threshold.resource);
                if demand > 0 && demand <= threshold.max_demand {
                    return Some(PruneRule::ToolNotWorthIt);
                }
            }
        }
        None
    }

    fn tool_being_produced<'c>(&self, ctx: &PruneContext<'c>) -> Option<&'c str> {
        if ctx.task.name() != PRODUCE {
            return None;
        }
        ctx.task
            .symbol_arg(0)
            .filter(|item| self.tools.contains(*item))
    }
}

/// Sum of `have_enough(resource)` quantities still on the agenda.
fn outstanding_demand(ctx: &PruneContext<'_>, resource: &str) -> u64 {
    ctx.agenda
        .iter()
        .filter_map(demand_of)
        .filter(|(item, _)| *item == resource)
        .fold(0u64, |acc, (_, n)| acc.saturating_add(n))
}

impl PruneHook for CraftingPruner {
    fn check(&self, ctx: &PruneContext<'_>) -> PruneDecision {
        match self.verdict(ctx) {
            Some(rule) => {
                trace!(task = %ctx.task, depth = ctx.depth, ?rule, "pruned");
                PruneDecision::Prune
            }
            None => PruneDecision::Continue,
        }
    }
}
