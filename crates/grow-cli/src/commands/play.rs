//! Text-mode play on stdin and stdout.

use std::io;
use std::path::Path;

use colored::Colorize;
use tracing::debug;

use grow_engine::{Console, EngineConfig, GameSession, SaveManager};

use crate::prefs;

pub fn run(root: Option<&Path>, seed: Option<u64>, text: bool) -> Result<(), String> {
    if !text {
        debug!("no graphical front end available, playing in text mode");
    }
    let root = prefs::resolve_root(root)?;
    let storage = SaveManager::new(root.clone())
        .map_err(|e| format!("cannot use {}: {e}", root.display()))?;

    let mut config = EngineConfig::default();
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let mut session = GameSession::new(config, storage);

    println!("  {} grow in {}", "Starting".bold(), root.display());
    println!("  Type ':help' for commands, ':quit' to exit.\n");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    let mut console = Console::new(&mut input, &mut output);

    session.play(&mut console).map_err(|e| e.to_string())
}
