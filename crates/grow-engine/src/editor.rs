//! In-game editing of the current scene.
//!
//! Each dialog collects all of its input before touching the world, so a
//! cancelled or failed dialog leaves the scene exactly as it was.

use grow_core::{Action, Rule, Scene, World};

use crate::console::Console;
use crate::error::{EditResult, EngineError, EngineResult, Interrupt};
use crate::prompt::{self, numbered_list, read_ints, read_list, rule_number};

const NO_RULES: &str = "There are no rules in this scene.";
const BAD_LIST: &str = "Bad list!";
const BAD_PATTERN: &str = "Bad pattern!";
const BAD_ACTION: &str = "Bad action!";

fn current(world: &mut World) -> EditResult<&mut Scene> {
    world
        .current_mut()
        .ok_or(Interrupt::Failed(EngineError::NotStarted))
}

fn read_patterns(console: &mut Console<'_>, prompt: &str) -> EditResult<Vec<String>> {
    read_list(console, prompt, BAD_PATTERN, |line| Some(line.to_string()))
}

fn read_actions(console: &mut Console<'_>, prompt: &str) -> EditResult<Vec<Action>> {
    read_list(console, prompt, BAD_ACTION, |line| Action::parse(line).ok())
}

fn zero_based(numbers: Vec<usize>) -> Vec<usize> {
    numbers.into_iter().map(|n| n - 1).collect()
}

/// Pick a rule of the current scene, or say there are none.
fn pick_rule(scene: &Scene, console: &mut Console<'_>, prompt: &str) -> EditResult<Option<usize>> {
    if scene.rules().is_empty() {
        console.say(NO_RULES)?;
        return Ok(None);
    }
    rule_number(console, prompt, scene).map(Some)
}

/// Add a rule to the current scene.
pub fn extend(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let patterns = read_patterns(
        console,
        "Patterns to match (case insensitive, regex supported): ",
    )?;
    let actions = read_actions(console, "Actions:")?;
    current(world)?.push_rule(Rule::new(patterns.into_iter().collect(), actions));
    console.say("Extension complete.")?;
    Ok(())
}

/// Remove one rule from the current scene.
pub fn remove_rule(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let scene = current(world)?;
    let Some(index) = pick_rule(scene, console, "What rule would you like to remove?")? else {
        return Ok(());
    };
    scene.remove_rule(index)?;
    console.say("Done.")?;
    Ok(())
}

/// Remove and add patterns of one rule.
pub fn edit_patterns(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let scene = current(world)?;
    let Some(index) = pick_rule(scene, console, "What rule would you like to edit?")? else {
        return Ok(());
    };
    let patterns = scene.rules()[index].patterns();
    console.say(
        "Which patterns would you like to remove? Enter a list of space-separated integers.",
    )?;
    console.write(&numbered_list(patterns.iter(), 0))?;
    let doomed = zero_based(read_ints(console, BAD_LIST, 1, patterns.len(), None)?);
    let added = read_patterns(console, "Patterns to add: ")?;

    let rule = scene.rule_mut(index)?;
    rule.remove_patterns(&doomed)?;
    for pattern in added {
        rule.add_pattern(pattern);
    }
    console.say("Edit complete.")?;
    Ok(())
}

/// Remove and add actions of one rule.
pub fn edit_actions(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let scene = current(world)?;
    let Some(index) = pick_rule(scene, console, "What rule would you like to edit?")? else {
        return Ok(());
    };
    let actions = scene.rules()[index].actions();
    console.say(
        "Which actions would you like to remove? Enter a list of space-separated integers.",
    )?;
    console.write(&numbered_list(actions, 0))?;
    let doomed = zero_based(read_ints(console, BAD_LIST, 1, actions.len(), None)?);
    let added = read_actions(console, "Actions to add: ")?;

    let rule = scene.rule_mut(index)?;
    rule.remove_actions(&doomed)?;
    for action in added {
        rule.push_action(action);
    }
    console.say("Edit complete.")?;
    Ok(())
}

/// Reorder the actions of one rule.
pub fn reorder_actions(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let scene = current(world)?;
    let Some(index) = pick_rule(scene, console, "What rule would you like to edit?")? else {
        return Ok(());
    };
    let actions = scene.rules()[index].actions();
    console.say("Enter the new action order as a list of space-separated integers.")?;
    console.write(&numbered_list(actions, 0))?;
    let len = actions.len();
    let order = zero_based(read_ints(console, BAD_LIST, 1, len, Some(len))?);

    scene.rule_mut(index)?.reorder_actions(&order)?;
    console.say("Edit complete.")?;
    Ok(())
}

/// Reorder the rules of the current scene.
pub fn edit_order(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let scene = current(world)?;
    if scene.rules().is_empty() {
        console.say(NO_RULES)?;
        return Ok(());
    }
    console.say("Enter the new rule order as a list of space-separated integers.")?;
    view_rules(scene, console)?;
    let len = scene.rules().len();
    let order = zero_based(read_ints(console, BAD_LIST, 1, len, Some(len))?);

    scene.reorder_rules(&order)?;
    console.say("Reorder complete.")?;
    Ok(())
}

/// Replace the description of the current scene.
pub fn set_description(world: &mut World, console: &mut Console<'_>) -> EditResult<()> {
    let scene = current(world)?;
    console.say(format!(
        "The current description for the scene \"{}\" is: {}",
        scene.name(),
        scene.description()
    ))?;
    let description = prompt::read(
        console,
        "What would you like the new description to be?",
        "Bad description",
        |line| (!line.is_empty()).then(|| line.to_string()),
    )?;
    scene.set_description(description);
    console.say("Description set.")?;
    Ok(())
}

/// List the rules of a scene in their one-line form.
pub fn view_rules(scene: &Scene, console: &mut Console<'_>) -> EngineResult<()> {
    console.say(format!("Scene: {}", scene.name()))?;
    for (i, rule) in scene.rules().iter().enumerate() {
        console.say(format!("{:<5} {rule}", i + 1))?;
    }
    Ok(())
}
