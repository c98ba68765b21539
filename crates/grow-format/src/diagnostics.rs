use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::error::SyntaxError;

/// Character span of a one-based line. Lines past the end map to an empty
/// span at the end of the source.
fn line_span(source: &str, line: usize) -> Range<usize> {
    let mut offset = 0;
    for (number, text) in source.split_inclusive('\n').enumerate() {
        let len = text.trim_end_matches(['\n', '\r']).chars().count();
        if number + 1 == line {
            return offset..offset + len;
        }
        offset += text.chars().count();
    }
    offset..offset
}

/// Render a syntax error using ariadne for pretty terminal output.
pub fn render_syntax_error(source: &str, filename: &str, error: &SyntaxError) -> String {
    let mut output = Vec::new();
    let span = line_span(source, error.line);

    Report::build(ReportKind::Error, (filename, span.clone()))
        .with_message(format!("syntax error on line {}", error.line))
        .with_label(
            Label::new((filename, span))
                .with_message(&error.reason)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut output)
        .ok();

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_spans() {
        let source = "Name: a\nStrat: b\n";
        assert_eq!(line_span(source, 1), 0..7);
        assert_eq!(line_span(source, 2), 8..16);
        assert_eq!(line_span(source, 9), 17..17);
    }

    #[test]
    fn render_produces_output() {
        let source = "Name: a\nStrat: b\n";
        let error = SyntaxError::new(2, "Line does not start with: Start: ");
        let output = render_syntax_error(source, "a_world.txt", &error);
        assert!(output.contains("syntax error on line 2"));
        assert!(output.contains("Line does not start with"));
    }
}
