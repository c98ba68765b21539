use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use grow_engine::SaveManager;

use crate::prefs;

pub fn run(root: Option<&Path>) -> Result<(), String> {
    let root = prefs::resolve_root(root)?;
    let storage = SaveManager::new(root.clone())
        .map_err(|e| format!("cannot use {}: {e}", root.display()))?;
    let names = storage.adventure_names().map_err(|e| e.to_string())?;

    if names.is_empty() {
        println!("  No adventures found in {}.", root.display());
        return Ok(());
    }

    let last = storage.last_adventure().map_err(|e| e.to_string())?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Scenes", "Current scene", "Score"]);

    for name in &names {
        let label = if last.as_deref() == Some(name.as_str()) {
            format!("{name} (last played)")
        } else {
            name.clone()
        };
        match storage.load(name) {
            Ok(game) => {
                let world = game.world;
                table.add_row(vec![
                    label,
                    world.scene_count().to_string(),
                    world.current_name().unwrap_or("-").to_string(),
                    world.score().to_string(),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    label,
                    "-".to_string(),
                    format!("unreadable: {e}").red().to_string(),
                    "-".to_string(),
                ]);
            }
        }
    }

    println!("{table}");
    println!();
    println!("  {} adventures", names.len());

    Ok(())
}
