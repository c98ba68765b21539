use std::collections::HashSet;

use grow_core::rule::LIST_SEPARATOR;
use grow_core::{Action, PatternSet, Rule, Scene, World};
use tracing::debug;

use crate::error::SyntaxError;

const NAME: &str = "Name: ";
const START: &str = "Start: ";
const DESCRIPTION: &str = "Description: ";
/// Line that closes a scene block.
pub const SCENE_SEPARATOR: &str = "```";
const ARROW: &str = "->";

/// Line cursor that knows its one-based position.
struct LineReader<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().peekable(),
            line: 0,
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line += 1;
        Some(line)
    }

    fn expect(&mut self) -> Result<&'a str, SyntaxError> {
        self.next()
            .ok_or_else(|| SyntaxError::new(self.line + 1, "Expected line, but none found."))
    }

    /// Read the next line as `<prefix><value>`.
    fn field(&mut self, prefix: &str) -> Result<&'a str, SyntaxError> {
        let line = self.expect()?;
        extract(prefix, line, self.line)
    }

    fn skip_blank(&mut self) {
        while self.lines.peek().is_some_and(|l| l.trim().is_empty()) {
            self.next();
        }
    }

    fn at_end(&mut self) -> bool {
        self.lines.peek().is_none()
    }
}

fn extract<'a>(prefix: &str, line: &'a str, line_no: usize) -> Result<&'a str, SyntaxError> {
    let value = line
        .strip_prefix(prefix)
        .ok_or_else(|| SyntaxError::new(line_no, format!("Line does not start with: {prefix}")))?;
    if value.is_empty() {
        return Err(SyntaxError::new(line_no, format!("No data after: {prefix}")));
    }
    Ok(value)
}

/// Parse an adventure file into a world positioned at its start scene.
pub fn parse_adventure(source: &str) -> Result<World, SyntaxError> {
    let mut lines = LineReader::new(source);
    let name = lines.field(NAME)?;
    let start = lines.field(START)?;

    let mut scenes = Vec::new();
    let mut seen = HashSet::new();
    loop {
        lines.skip_blank();
        if lines.at_end() {
            break;
        }
        let scene_name = lines.field(NAME)?;
        if !seen.insert(scene_name) {
            return Err(SyntaxError::new(
                lines.line,
                format!("Duplicate scene: {scene_name}"),
            ));
        }
        let mut scene = Scene::new(scene_name, lines.field(DESCRIPTION)?);
        loop {
            let Some(line) = lines.next() else {
                return Err(SyntaxError::new(
                    lines.line + 1,
                    format!("Scene block is not terminated by {SCENE_SEPARATOR}"),
                ));
            };
            if line == SCENE_SEPARATOR {
                break;
            }
            scene.push_rule(parse_rule(line, lines.line)?);
        }
        scenes.push(scene);
    }

    if !seen.contains(start) {
        return Err(SyntaxError::new(2, "The start scene is not defined!"));
    }
    debug!(adventure = name, scenes = scenes.len(), "parsed adventure");
    World::from_scenes(name, start, scenes).map_err(|err| SyntaxError::new(2, err.to_string()))
}

/// Parse one rule line, e.g. ``[north`go north] -> [pYou walk.`ghall]``.
pub fn parse_rule(line: &str, line_no: usize) -> Result<Rule, SyntaxError> {
    if !line.contains(ARROW) {
        return Err(SyntaxError::new(line_no, "Rule format error. No ->"));
    }
    let (patterns, actions) = line
        .match_indices(ARROW)
        .map(|(i, _)| (line[..i].trim(), line[i + ARROW.len()..].trim()))
        .find(|(left, right)| left.ends_with(']') && right.starts_with('['))
        .ok_or_else(|| SyntaxError::new(line_no, "Rule list not enclosed by []."))?;

    let patterns: PatternSet = list_items(patterns, line_no)?.collect();
    let actions = list_items(actions, line_no)?
        .map(|item| {
            Action::parse(item)
                .map_err(|_| SyntaxError::new(line_no, format!("Action not valid: {item}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rule::new(patterns, actions))
}

/// The non-empty items of a `[a`b`c]` list.
fn list_items(list: &str, line_no: usize) -> Result<impl Iterator<Item = &str>, SyntaxError> {
    let inner = list
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| SyntaxError::new(line_no, "Rule list not enclosed by []."))?;
    Ok(inner.split(LIST_SEPARATOR).filter(|item| !item.is_empty()))
}

/// Serialize a world definition. Play state is written separately.
pub fn write_adventure(world: &World) -> String {
    let mut out = String::new();
    out.push_str(&format!("{NAME}{}\n", world.name()));
    out.push_str(&format!("{START}{}\n", world.start()));
    for scene in world.scenes() {
        out.push_str(&format!("{NAME}{}\n", scene.name()));
        out.push_str(&format!("{DESCRIPTION}{}\n", scene.description()));
        for rule in scene.rules() {
            out.push_str(&format!("{rule}\n"));
        }
        out.push_str(SCENE_SEPARATOR);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CASTLE: &str = "\
Name: castle
Start: gate
Name: gate
Description: A rusty gate.
[open`enter] -> [pIt creaks.`ghall`+5]
[leave] -> [q]
```

Name: hall
Description: A grand hall.
[back] -> [ggate]
[] -> []
```
";

    #[test]
    fn parse_full_adventure() {
        let world = parse_adventure(CASTLE).unwrap();
        assert_eq!(world.name(), "castle");
        assert_eq!(world.start(), "gate");
        assert_eq!(world.current_name(), Some("gate"));
        let gate = world.scene("gate").unwrap();
        assert_eq!(gate.description(), "A rusty gate.");
        assert_eq!(
            gate.act("ENTER please"),
            Some(
                &[
                    Action::Print("It creaks.".into()),
                    Action::Go("hall".into()),
                    Action::ScoreChange(5)
                ][..]
            )
        );
        let hall = world.scene("hall").unwrap();
        assert_eq!(hall.rules().len(), 2);
        assert!(hall.rules()[1].patterns().is_empty());
    }

    #[test]
    fn missing_start_line() {
        let source = "Name: castle\nName: gate\nDescription: A gate.\n```\n";
        assert_eq!(
            parse_adventure(source),
            Err(SyntaxError::new(2, "Line does not start with: Start: "))
        );
    }

    #[test]
    fn empty_field_value() {
        assert_eq!(
            parse_adventure("Name: \n"),
            Err(SyntaxError::new(1, "No data after: Name: "))
        );
    }

    #[test]
    fn truncated_file() {
        assert_eq!(
            parse_adventure("Name: castle\n"),
            Err(SyntaxError::new(2, "Expected line, but none found."))
        );
        assert_eq!(
            parse_adventure("Name: castle\nStart: gate\nName: gate\n"),
            Err(SyntaxError::new(4, "Expected line, but none found."))
        );
    }

    #[test]
    fn unterminated_scene_block() {
        let source = "Name: c\nStart: g\nName: g\nDescription: G.\n[a] -> [q]\n";
        assert_eq!(
            parse_adventure(source),
            Err(SyntaxError::new(6, "Scene block is not terminated by ```"))
        );
    }

    #[test]
    fn duplicate_scene_reports_its_line() {
        let source = "Name: c\nStart: g\nName: g\nDescription: G.\n```\nName: g\nDescription: H.\n```\n";
        assert_eq!(
            parse_adventure(source),
            Err(SyntaxError::new(6, "Duplicate scene: g"))
        );
    }

    #[test]
    fn undefined_start_scene() {
        let source = "Name: c\nStart: nowhere\nName: g\nDescription: G.\n```\n";
        assert_eq!(
            parse_adventure(source),
            Err(SyntaxError::new(2, "The start scene is not defined!"))
        );
    }

    #[test]
    fn bad_rule_lines() {
        assert_eq!(
            parse_rule("[a] [q]", 5),
            Err(SyntaxError::new(5, "Rule format error. No ->"))
        );
        assert_eq!(
            parse_rule("a -> q", 5),
            Err(SyntaxError::new(5, "Rule list not enclosed by []."))
        );
        assert_eq!(
            parse_rule("[a] -> [+x]", 5),
            Err(SyntaxError::new(5, "Action not valid: +x"))
        );
    }

    #[test]
    fn arrow_inside_items_is_kept() {
        let rule = parse_rule("[a->b] -> [pthis -> that]", 1).unwrap();
        assert_eq!(rule.patterns().iter().collect::<Vec<_>>(), vec!["a->b"]);
        assert_eq!(rule.actions(), &[Action::Print("this -> that".into())]);
    }

    #[test]
    fn write_adventure_layout() {
        let world = parse_adventure(CASTLE).unwrap();
        insta::assert_snapshot!(write_adventure(&world), @r"
        Name: castle
        Start: gate
        Name: gate
        Description: A rusty gate.
        [enter`open] -> [pIt creaks.`ghall`+5]
        [leave] -> [q]
        ```
        Name: hall
        Description: A grand hall.
        [back] -> [ggate]
        [] -> []
        ```
        ");
    }

    #[test]
    fn write_then_parse_preserves_world() {
        let world = parse_adventure(CASTLE).unwrap();
        let reparsed = parse_adventure(&write_adventure(&world)).unwrap();
        assert_eq!(reparsed, world);
    }

    // -----------------------------------------------------------------------
    // Generated worlds
    // -----------------------------------------------------------------------

    fn any_action(scenes: Vec<String>) -> impl Strategy<Value = Action> {
        prop_oneof![
            "[A-Za-z ,.!?]{0,16}".prop_map(Action::Print),
            prop::sample::select(scenes).prop_map(Action::Go),
            any::<i64>().prop_map(Action::ScoreChange),
            Just(Action::Quit),
            Just(Action::Restart),
            Just(Action::ViewRules),
            Just(Action::ScoreDisplay),
            Just(Action::Extend),
            Just(Action::EditPatterns),
            Just(Action::EditActions),
            Just(Action::ReorderActions),
            Just(Action::EditOrder),
            Just(Action::SetDescription),
            Just(Action::RemoveRule),
        ]
    }

    fn any_rule(scenes: Vec<String>) -> impl Strategy<Value = Rule> {
        (
            prop::collection::vec("[a-z]{1,6}( [a-z]{1,6})?", 0..4),
            prop::collection::vec(any_action(scenes), 0..5),
        )
            .prop_map(|(patterns, actions)| Rule::new(patterns.into_iter().collect(), actions))
    }

    fn any_world() -> impl Strategy<Value = World> {
        prop::collection::btree_set("[a-z][a-z_]{0,7}", 1..6)
            .prop_flat_map(|names| {
                let names: Vec<String> = names.into_iter().collect();
                let bodies = prop::collection::vec(
                    (
                        "[A-Za-z][A-Za-z ,.!]{0,30}",
                        prop::collection::vec(any_rule(names.clone()), 0..4),
                    ),
                    names.len(),
                );
                ("[a-z][a-z_]{0,9}", bodies, 0..names.len(), Just(names))
            })
            .prop_map(|(adventure, bodies, start, names)| {
                let scenes = names.iter().zip(bodies).map(|(name, (description, rules))| {
                    rules
                        .into_iter()
                        .fold(Scene::new(name.as_str(), description), Scene::with_rule)
                });
                World::from_scenes(adventure, &names[start], scenes).unwrap()
            })
    }

    proptest! {
        #[test]
        fn any_world_survives_write_and_parse(world in any_world()) {
            let text = write_adventure(&world);
            prop_assert_eq!(parse_adventure(&text), Ok(world));
        }
    }
}
