use std::fs;
use std::path::Path;

use grow_format::{parse_adventure, render_syntax_error};

pub fn run(file: &Path) -> Result<(), String> {
    let source =
        fs::read_to_string(file).map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let filename = file.display().to_string();

    let world = match parse_adventure(&source) {
        Ok(world) => world,
        Err(err) => {
            eprint!("{}", render_syntax_error(&source, &filename, &err));
            return Err(err.to_string());
        }
    };

    let rules: usize = world.scenes().map(|scene| scene.rules().len()).sum();
    println!("  All checks passed for '{}'.", world.name());
    println!(
        "  {} scenes, {rules} rules, starting at '{}'",
        world.scene_count(),
        world.start()
    );

    Ok(())
}
