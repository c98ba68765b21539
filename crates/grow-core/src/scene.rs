use crate::action::Action;
use crate::error::{GrowError, GrowResult};
use crate::rule::{Rule, permute};

/// A named location with a description and an ordered list of rules.
///
/// The name is the scene's identity inside a [`World`](crate::World) and
/// cannot change once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    name: String,
    description: String,
    rules: Vec<Rule>,
}

impl Scene {
    /// Create a scene with no rules.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rules: Vec::new(),
        }
    }

    /// Builder: append a rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The text shown on entering the scene.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// The rules in match-priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The actions of the first rule that matches `input`, if any.
    pub fn act(&self, input: &str) -> Option<&[Action]> {
        self.rules
            .iter()
            .find(|rule| rule.matches(input))
            .map(Rule::actions)
    }

    // -----------------------------------------------------------------------
    // Rule editing
    // -----------------------------------------------------------------------

    /// Append a rule at lowest priority.
    pub fn push_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Mutable access to one rule.
    pub fn rule_mut(&mut self, index: usize) -> GrowResult<&mut Rule> {
        let len = self.rules.len();
        self.rules
            .get_mut(index)
            .ok_or(GrowError::InvalidIndex { index, len })
    }

    /// Remove and return one rule.
    pub fn remove_rule(&mut self, index: usize) -> GrowResult<Rule> {
        if index >= self.rules.len() {
            return Err(GrowError::InvalidIndex {
                index,
                len: self.rules.len(),
            });
        }
        Ok(self.rules.remove(index))
    }

    /// Reorder rules. `order[k]` is the old index of the rule that ends up at `k`.
    pub fn reorder_rules(&mut self, order: &[usize]) -> GrowResult<()> {
        self.rules = permute(&self.rules, order)?;
        Ok(())
    }
}
