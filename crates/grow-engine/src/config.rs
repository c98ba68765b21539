//! Configuration for a game session.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Phrases printed when no rule matches the player's input.
pub const DEFAULT_UNKNOWN_RESPONSES: &[&str] = &[
    "I don't understand.",
    "Nothing happens.",
    "Huh?",
    "That doesn't seem to do anything here.",
    "Try something else.",
];

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RNG seed for reproducible responses and story names. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Phrases to pick from when input matches nothing.
    pub unknown_responses: Vec<String>,
    /// Character that marks a line as a built-in command.
    pub command_prefix: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            unknown_responses: DEFAULT_UNKNOWN_RESPONSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            command_prefix: ':',
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the unknown-input phrases. An empty list keeps the defaults.
    pub fn with_unknown_responses<S: Into<String>>(
        mut self,
        responses: impl IntoIterator<Item = S>,
    ) -> Self {
        let responses: Vec<String> = responses.into_iter().map(Into::into).collect();
        if !responses.is_empty() {
            self.unknown_responses = responses;
        }
        self
    }

    /// Set the built-in command marker.
    pub fn with_command_prefix(mut self, prefix: char) -> Self {
        self.command_prefix = prefix;
        self
    }

    /// Build the session RNG.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.command_prefix, ':');
        assert_eq!(cfg.unknown_responses.len(), DEFAULT_UNKNOWN_RESPONSES.len());
    }

    #[test]
    fn builder_methods() {
        let cfg = EngineConfig::default()
            .with_seed(7)
            .with_unknown_responses(["What?"])
            .with_command_prefix('/');
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.unknown_responses, vec!["What?".to_string()]);
        assert_eq!(cfg.command_prefix, '/');
    }

    #[test]
    fn empty_responses_keep_defaults() {
        let cfg = EngineConfig::default().with_unknown_responses(Vec::<String>::new());
        assert!(!cfg.unknown_responses.is_empty());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let cfg = EngineConfig::default().with_seed(99);
        let a: u32 = cfg.rng().random();
        let b: u32 = cfg.rng().random();
        assert_eq!(a, b);
    }
}
