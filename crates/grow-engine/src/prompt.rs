//! Prompting helpers for interactive dialogs.
//!
//! Every reader here trims input, rejects the reserved list separator, and
//! turns the cancel command into [`Interrupt::Cancelled`].

use std::collections::HashSet;
use std::fmt::Display;

use grow_core::rule::LIST_SEPARATOR;
use grow_core::{Rule, Scene};

use crate::console::Console;
use crate::error::{EditResult, Interrupt};

/// Input that aborts the dialog in progress.
pub const CANCEL: &str = ":cancel";

/// Width of the number column in numbered lists.
const NUMBER_WIDTH: usize = 5;

/// Read lines until `convert` accepts one.
///
/// `prompt` is printed once if non-empty; `on_error` is printed after each
/// rejected line.
pub fn read<T>(
    console: &mut Console<'_>,
    prompt: &str,
    on_error: &str,
    mut convert: impl FnMut(&str) -> Option<T>,
) -> EditResult<T> {
    if !prompt.is_empty() {
        console.say(prompt)?;
    }
    loop {
        let raw = console.expect_line()?;
        let line = raw.trim();
        if line == CANCEL {
            return Err(Interrupt::Cancelled);
        }
        if line.contains(LIST_SEPARATOR) {
            console.say(format!("Your input may not contain {LIST_SEPARATOR}."))?;
            continue;
        }
        match convert(line) {
            Some(value) => return Ok(value),
            None => console.say(on_error)?,
        }
    }
}

/// Read items, one per line, until a blank line.
pub fn read_list<T>(
    console: &mut Console<'_>,
    prompt: &str,
    on_error: &str,
    mut convert: impl FnMut(&str) -> Option<T>,
) -> EditResult<Vec<T>> {
    let mut items = Vec::new();
    let mut prompt = prompt;
    loop {
        // Outer None marks the terminating blank line.
        let item = read(console, prompt, on_error, |line| {
            if line.is_empty() {
                Some(None)
            } else {
                convert(line).map(Some)
            }
        })?;
        match item {
            Some(item) => items.push(item),
            None => return Ok(items),
        }
        prompt = "";
    }
}

/// Read an integer in `min..=max`.
pub fn read_int(
    console: &mut Console<'_>,
    prompt: &str,
    on_error: &str,
    min: usize,
    max: usize,
) -> EditResult<usize> {
    read(console, prompt, on_error, |line| {
        line.parse()
            .ok()
            .filter(|n| (min..=max).contains(n))
    })
}

/// Read a line of distinct space-separated integers in `min..=max`.
///
/// With `count`, exactly that many are required. A blank line is an empty
/// list.
pub fn read_ints(
    console: &mut Console<'_>,
    on_error: &str,
    min: usize,
    max: usize,
    count: Option<usize>,
) -> EditResult<Vec<usize>> {
    read(console, "", on_error, |line| {
        let numbers: Vec<usize> = line
            .split_whitespace()
            .map(|word| word.parse().ok())
            .collect::<Option<_>>()?;
        let distinct: HashSet<_> = numbers.iter().collect();
        let valid = distinct.len() == numbers.len()
            && numbers.iter().all(|n| (min..=max).contains(n))
            && count.is_none_or(|count| numbers.len() == count);
        valid.then_some(numbers)
    })
}

/// Ask a yes/no question on its own line. Only `y` (any case) is yes.
pub fn yes_no(console: &mut Console<'_>) -> EditResult<bool> {
    Ok(console.expect_line()?.trim().eq_ignore_ascii_case("y"))
}

/// Format items as a numbered list, continuing multi-line items under the text.
pub fn numbered_list<I>(items: I, indent: usize) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        let text = item.to_string();
        let mut lines = text.lines();
        let first = lines.next().unwrap_or_default();
        let label = format!("{}.", i + 1);
        out.push_str(&format!("{:indent$}{label:<NUMBER_WIDTH$} {first}\n", ""));
        for line in lines {
            out.push_str(&format!("{:indent$}{:<NUMBER_WIDTH$} {line}\n", "", ""));
        }
    }
    out
}

/// A multi-line, human-readable rendering of a rule.
pub fn pretty_rule(rule: &Rule) -> String {
    let mut out = String::new();
    let patterns = rule.patterns();
    if patterns.len() <= 1 {
        let first = patterns.iter().next().unwrap_or("[none]");
        out.push_str(&format!("Pattern: {first}\n"));
    } else {
        out.push_str("Patterns:\n");
        out.push_str(&numbered_list(patterns.iter(), 2));
    }
    let actions = rule.actions();
    match actions {
        [] => out.push_str("Action:  [none]\n"),
        [only] => out.push_str(&format!("Action:  {only}\n")),
        _ => {
            out.push_str("Actions:\n");
            out.push_str(&numbered_list(actions, 2));
        }
    }
    out
}

/// Show the scene's rules and read a rule number. Returns a zero-based index.
pub fn rule_number(console: &mut Console<'_>, prompt: &str, scene: &Scene) -> EditResult<usize> {
    console.say(prompt)?;
    console.write(&numbered_list(scene.rules().iter().map(pretty_rule), 0))?;
    let number = read_int(
        console,
        "",
        "Not a valid rule number.",
        1,
        scene.rules().len(),
    )?;
    Ok(number - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grow_core::{Action, PatternSet};

    fn with_console<T>(input: &str, f: impl FnOnce(&mut Console<'_>) -> T) -> (T, String) {
        let mut input = input.as_bytes();
        let mut output = Vec::new();
        let result = {
            let mut console = Console::new(&mut input, &mut output);
            f(&mut console)
        };
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn read_retries_until_valid() {
        let (value, out) = with_console("abc\n`x\n  12 \n", |c| {
            read(c, "Number?", "Bad number!", |s| s.parse::<i32>().ok())
        });
        assert_eq!(value.unwrap(), 12);
        assert_eq!(
            out,
            "Number?\nBad number!\nYour input may not contain `.\n"
        );
    }

    #[test]
    fn cancel_interrupts() {
        let (value, _) = with_console(" :cancel \n", |c| read(c, "", "", |s| Some(s.to_string())));
        assert!(matches!(value, Err(Interrupt::Cancelled)));
    }

    #[test]
    fn end_of_input_is_a_failure() {
        let (value, _) = with_console("", |c| read(c, "", "", |s| Some(s.to_string())));
        assert!(matches!(value, Err(Interrupt::Failed(_))));
    }

    #[test]
    fn read_list_stops_at_blank_line() {
        let (items, out) = with_console("pHi\n\nignored\n", |c| {
            read_list(c, "Actions:", "Bad action!", |s| Action::parse(s).ok())
        });
        assert_eq!(items.unwrap(), vec![Action::Print("Hi".into())]);
        assert_eq!(out, "Actions:\n");
    }

    #[test]
    fn read_ints_validates_range_uniqueness_and_count() {
        let (numbers, out) = with_console("1 1\n0 2\nx\n1\n2 1\n", |c| {
            read_ints(c, "Bad list!", 1, 2, Some(2))
        });
        assert_eq!(numbers.unwrap(), vec![2, 1]);
        assert_eq!(out.matches("Bad list!").count(), 4);
    }

    #[test]
    fn blank_line_is_empty_int_list() {
        let (numbers, _) = with_console("\n", |c| read_ints(c, "Bad list!", 1, 3, None));
        assert!(numbers.unwrap().is_empty());
    }

    #[test]
    fn numbered_list_formatting() {
        assert_eq!(numbered_list(["a", "b"], 0), "1.    a\n2.    b\n");
        assert_eq!(numbered_list(["x\ny"], 2), "  1.    x\n        y\n");
    }

    #[test]
    fn pretty_rule_formats() {
        let single = Rule::new(PatternSet::from_iter(["look"]), vec![Action::ViewRules]);
        assert_eq!(pretty_rule(&single), "Pattern: look\nAction:  l\n");

        let empty = Rule::default();
        assert_eq!(pretty_rule(&empty), "Pattern: [none]\nAction:  [none]\n");

        let multi = Rule::new(
            PatternSet::from_iter(["a", "b"]),
            vec![Action::Quit, Action::Restart],
        );
        assert_eq!(
            pretty_rule(&multi),
            "Patterns:\n  1.    a\n  2.    b\nActions:\n  1.    q\n  2.    r\n"
        );
    }

    #[test]
    fn yes_no_accepts_only_y() {
        let (answer, _) = with_console("Y\n", yes_no);
        assert!(answer.unwrap());
        let (answer, _) = with_console("yes\n", yes_no);
        assert!(!answer.unwrap());
    }
}
