use std::collections::BTreeSet;
use std::fmt;

use crate::action::Action;
use crate::error::{GrowError, GrowResult};
use crate::pattern::PatternSet;

/// Separator between list items in the one-line rule form.
pub const LIST_SEPARATOR: char = '`';

/// A set of patterns paired with the actions to run when one matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    patterns: PatternSet,
    actions: Vec<Action>,
}

impl Rule {
    /// Create a rule from patterns and actions.
    pub fn new(patterns: PatternSet, actions: Vec<Action>) -> Self {
        Self { patterns, actions }
    }

    /// The patterns this rule matches on.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// The actions, in execution order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Whether this rule fires for `input`. A rule without actions never fires.
    pub fn matches(&self, input: &str) -> bool {
        !self.actions.is_empty() && self.patterns.matches(input)
    }

    // -----------------------------------------------------------------------
    // Patterns
    // -----------------------------------------------------------------------

    /// Add a pattern. Empty patterns are ignored.
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        self.patterns.insert(pattern);
    }

    /// Remove patterns by their zero-based position in iteration order.
    pub fn remove_patterns(&mut self, indices: &[usize]) -> GrowResult<()> {
        let doomed = checked_indices(indices, self.patterns.len())?;
        let keep: PatternSet = self
            .patterns
            .iter()
            .enumerate()
            .filter(|(i, _)| !doomed.contains(i))
            .map(|(_, p)| p.to_string())
            .collect();
        self.patterns = keep;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Append an action.
    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Remove actions by zero-based index.
    pub fn remove_actions(&mut self, indices: &[usize]) -> GrowResult<()> {
        let doomed = checked_indices(indices, self.actions.len())?;
        let mut i = 0;
        self.actions.retain(|_| {
            let keep = !doomed.contains(&i);
            i += 1;
            keep
        });
        Ok(())
    }

    /// Reorder actions. `order[k]` is the old index of the action that ends up at `k`.
    pub fn reorder_actions(&mut self, order: &[usize]) -> GrowResult<()> {
        self.actions = permute(&self.actions, order)?;
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = LIST_SEPARATOR.to_string();
        let patterns: Vec<&str> = self.patterns.iter().collect();
        let actions: Vec<String> = self.actions.iter().map(Action::to_string).collect();
        write!(f, "[{}] -> [{}]", patterns.join(&sep), actions.join(&sep))
    }
}

/// Validate a set of indices against a list length.
pub(crate) fn checked_indices(indices: &[usize], len: usize) -> GrowResult<BTreeSet<usize>> {
    match indices.iter().find(|&&index| index >= len) {
        Some(&index) => Err(GrowError::InvalidIndex { index, len }),
        None => Ok(indices.iter().copied().collect()),
    }
}

/// Apply a permutation, rejecting anything that is not one.
pub(crate) fn permute<T: Clone>(items: &[T], order: &[usize]) -> GrowResult<Vec<T>> {
    if order.len() != items.len() {
        return Err(GrowError::InvalidOrder(format!(
            "expected {} positions, got {}",
            items.len(),
            order.len()
        )));
    }
    let unique = checked_indices(order, items.len())?;
    if unique.len() != order.len() {
        return Err(GrowError::InvalidOrder("positions repeat".into()));
    }
    Ok(order.iter().map(|&i| items[i].clone()).collect())
}
