//! Stage-list parser and filter factory.
//!
//! Stage list format:
//! ```text
//! # drop blank lines, keep errors, shout
//! DROPEMPTY
//! | LOCATE "ERROR"
//! | UPPER | COUNT
//! ```
//!
//! - Stages are separated by `|`, by newlines, or both
//! - Stage names are case-insensitive
//! - Lines starting with `#` are comments
//! - String arguments are delimited: the first non-blank character is the
//!   delimiter and the string runs to its next occurrence (`"x"`, `/x/`)
//!
//! Supported stages:
//! - `UPPER`, `LOWER`, `REVERSE`, `TRIM` - rewrite each record
//! - `CHANGE "old" "new"` - replace occurrences of old with new
//! - `DROPEMPTY` - drop lines with no content
//! - `LOCATE "pattern"` / `NLOCATE "pattern"` - keep / omit matching records
//! - `TAKE n` / `SKIP n` - keep / skip the first n records
//! - `DUPLICATE n` - repeat each record n times
//! - `SPLIT "delim"` - one record per delimited piece
//! - `COUNT` - emit the record count at end of stream

use crate::chain::Filter;
use crate::error::{ChainError, Result};
use crate::filters::{
    Change, Count, DropEmptyLines, Duplicate, Locate, Lower, Nlocate, Reverse, Skip, SplitOn,
    Take, Trim, Upper,
};

/// A parsed stage, before it is turned into a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum StageSpec {
    /// UPPER - convert to uppercase
    Upper,
    /// LOWER - convert to lowercase
    Lower,
    /// REVERSE - reverse characters in record
    Reverse,
    /// TRIM - strip trailing whitespace
    Trim,
    /// CHANGE "old" "new" - replace occurrences
    Change { old: String, new: String },
    /// DROPEMPTY - drop lines with no content
    DropEmpty,
    /// LOCATE "pattern" - keep records containing pattern
    Locate { pattern: String },
    /// NLOCATE "pattern" - keep records NOT containing pattern
    Nlocate { pattern: String },
    /// TAKE n - keep first n records
    Take { n: usize },
    /// SKIP n - skip first n records
    Skip { n: usize },
    /// DUPLICATE n - repeat each record n times
    Duplicate { n: usize },
    /// SPLIT "delim" - split each record on a delimiter
    Split { delimiter: String },
    /// COUNT - count records and emit the total on close
    Count,
}

impl StageSpec {
    /// Get the stage name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            StageSpec::Upper => "UPPER",
            StageSpec::Lower => "LOWER",
            StageSpec::Reverse => "REVERSE",
            StageSpec::Trim => "TRIM",
            StageSpec::Change { .. } => "CHANGE",
            StageSpec::DropEmpty => "DROPEMPTY",
            StageSpec::Locate { .. } => "LOCATE",
            StageSpec::Nlocate { .. } => "NLOCATE",
            StageSpec::Take { .. } => "TAKE",
            StageSpec::Skip { .. } => "SKIP",
            StageSpec::Duplicate { .. } => "DUPLICATE",
            StageSpec::Split { .. } => "SPLIT",
            StageSpec::Count => "COUNT",
        }
    }
}

/// Parse stage list text into stage specs, in chain order.
pub fn parse_stages(text: &str) -> Result<Vec<StageSpec>> {
    let mut stages = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_error = |message: String| ChainError::Parse {
            line: line_num + 1,
            message,
        };

        let mut rest = line;
        loop {
            let trimmed = rest.trim_start();
            rest = trimmed.strip_prefix('|').unwrap_or(trimmed).trim_start();
            if rest.is_empty() {
                break;
            }

            let (stage, after) = parse_stage(rest).map_err(parse_error)?;
            let after = after.trim_start();
            if !after.is_empty() && !after.starts_with('|') {
                return Err(parse_error(format!(
                    "Unexpected text after {}: {}",
                    stage.name(),
                    after
                )));
            }
            stages.push(stage);
            rest = after;
        }
    }

    Ok(stages)
}

/// Parse one stage at the start of `input`, returning the unparsed rest.
fn parse_stage(input: &str) -> std::result::Result<(StageSpec, &str), String> {
    let word_end = input
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    let (word, rest) = input.split_at(word_end);

    match word.to_ascii_uppercase().as_str() {
        "UPPER" => Ok((StageSpec::Upper, rest)),
        "LOWER" => Ok((StageSpec::Lower, rest)),
        "REVERSE" => Ok((StageSpec::Reverse, rest)),
        "TRIM" => Ok((StageSpec::Trim, rest)),
        "DROPEMPTY" => Ok((StageSpec::DropEmpty, rest)),
        "COUNT" => Ok((StageSpec::Count, rest)),
        "CHANGE" => {
            // Both strings use their own first character as delimiter
            let (old, rest) = parse_delimited_string(rest)
                .map_err(|e| format!("CHANGE requires two delimited strings: {e}"))?;
            let (new, rest) = parse_delimited_string(rest)
                .map_err(|e| format!("CHANGE requires two delimited strings: {e}"))?;
            Ok((StageSpec::Change { old, new }, rest))
        }
        "LOCATE" => {
            let (pattern, rest) =
                parse_delimited_string(rest).map_err(|e| format!("LOCATE requires a pattern: {e}"))?;
            Ok((StageSpec::Locate { pattern }, rest))
        }
        "NLOCATE" => {
            let (pattern, rest) = parse_delimited_string(rest)
                .map_err(|e| format!("NLOCATE requires a pattern: {e}"))?;
            Ok((StageSpec::Nlocate { pattern }, rest))
        }
        "SPLIT" => {
            let (delimiter, rest) = parse_delimited_string(rest)
                .map_err(|e| format!("SPLIT requires a delimiter: {e}"))?;
            if delimiter.is_empty() {
                return Err("SPLIT delimiter must not be empty".to_string());
            }
            Ok((StageSpec::Split { delimiter }, rest))
        }
        "TAKE" => {
            let (n, rest) = parse_number(rest, "TAKE")?;
            Ok((StageSpec::Take { n }, rest))
        }
        "SKIP" => {
            let (n, rest) = parse_number(rest, "SKIP")?;
            Ok((StageSpec::Skip { n }, rest))
        }
        "DUPLICATE" => {
            let (n, rest) = parse_number(rest, "DUPLICATE")?;
            if n == 0 {
                return Err("DUPLICATE count must be at least 1".to_string());
            }
            Ok((StageSpec::Duplicate { n }, rest))
        }
        "" => Err(format!("Expected a stage name at '{input}'")),
        _ => Err(format!("Unknown stage: {word}")),
    }
}

/// Parse a leading unsigned number, returning it and the rest.
fn parse_number<'a>(s: &'a str, stage: &str) -> std::result::Result<(usize, &'a str), String> {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let n = s[..end]
        .parse()
        .map_err(|_| format!("{stage} requires a number"))?;
    Ok((n, &s[end..]))
}

/// Parse a delimited string using CMS Pipelines convention.
/// The first non-blank character is the delimiter, and the string
/// continues until the next occurrence of that delimiter.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> std::result::Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited string".to_string());
    };
    let after_delim = &s[delim.len_utf8()..];

    match after_delim.find(delim) {
        Some(end) => {
            let extracted = after_delim[..end].to_string();
            let rest = &after_delim[end + delim.len_utf8()..];
            Ok((extracted, rest))
        }
        None => Err(format!("Unclosed delimiter '{delim}'")),
    }
}

/// Create a filter from a parsed `StageSpec`.
pub fn spec_to_filter(spec: &StageSpec) -> Box<dyn Filter> {
    match spec {
        StageSpec::Upper => Box::new(Upper),
        StageSpec::Lower => Box::new(Lower),
        StageSpec::Reverse => Box::new(Reverse),
        StageSpec::Trim => Box::new(Trim),
        StageSpec::Change { old, new } => Box::new(Change::new(old.clone(), new.clone())),
        StageSpec::DropEmpty => Box::new(DropEmptyLines),
        StageSpec::Locate { pattern } => Box::new(Locate::new(pattern.clone())),
        StageSpec::Nlocate { pattern } => Box::new(Nlocate::new(pattern.clone())),
        StageSpec::Take { n } => Box::new(Take::new(*n)),
        StageSpec::Skip { n } => Box::new(Skip::new(*n)),
        StageSpec::Duplicate { n } => Box::new(Duplicate::new(*n)),
        StageSpec::Split { delimiter } => Box::new(SplitOn::new(delimiter.clone())),
        StageSpec::Count => Box::new(Count::new()),
    }
}

/// Parse stage list text straight into filters, in chain order.
pub fn build_filters(text: &str) -> Result<Vec<Box<dyn Filter>>> {
    Ok(parse_stages(text)?.iter().map(spec_to_filter).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_line() {
        let stages = parse_stages("UPPER | DROPEMPTY | COUNT").unwrap();
        assert_eq!(
            stages,
            vec![StageSpec::Upper, StageSpec::DropEmpty, StageSpec::Count]
        );
    }

    #[test]
    fn test_parse_continuation_lines() {
        let text = "# comment\nLOCATE \"ERR\"\n| take 5\n\n| SKIP 1 | reverse\n";
        let stages = parse_stages(text).unwrap();
        assert_eq!(
            stages,
            vec![
                StageSpec::Locate {
                    pattern: "ERR".to_string()
                },
                StageSpec::Take { n: 5 },
                StageSpec::Skip { n: 1 },
                StageSpec::Reverse,
            ]
        );
    }

    #[test]
    fn test_parse_change_with_delimiters() {
        let stages = parse_stages("CHANGE /a|b/ \"c\" | LOWER").unwrap();
        assert_eq!(
            stages,
            vec![
                StageSpec::Change {
                    old: "a|b".to_string(),
                    new: "c".to_string()
                },
                StageSpec::Lower,
            ]
        );
    }

    #[test]
    fn test_parse_split_and_duplicate() {
        let stages = parse_stages("SPLIT \",\" | DUPLICATE 2 | NLOCATE /x/").unwrap();
        assert_eq!(
            stages,
            vec![
                StageSpec::Split {
                    delimiter: ",".to_string()
                },
                StageSpec::Duplicate { n: 2 },
                StageSpec::Nlocate {
                    pattern: "x".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_stages("# nothing\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_stage_reports_line() {
        let err = parse_stages("UPPER\n| FROB").unwrap_err();
        match err {
            ChainError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("FROB"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_number() {
        assert!(parse_stages("TAKE x").is_err());
        assert!(parse_stages("DUPLICATE 0").is_err());
    }

    #[test]
    fn test_unclosed_delimiter() {
        assert!(parse_stages("LOCATE \"oops").is_err());
    }

    #[test]
    fn test_trailing_garbage() {
        assert!(parse_stages("UPPER LOWER").is_err());
    }

    #[test]
    fn test_empty_split_delimiter_rejected() {
        assert!(parse_stages("SPLIT \"\"").is_err());
    }

    #[test]
    fn test_factory_names() {
        let filters = build_filters("UPPER | CHANGE /a/ /b/ | COUNT").unwrap();
        let names: Vec<&str> = filters.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["UPPER", "CHANGE", "COUNT"]);
    }

    #[test]
    fn test_spec_names_match_filters() {
        let specs = parse_stages(
            "UPPER|LOWER|REVERSE|TRIM|CHANGE /a/ /b/|DROPEMPTY|LOCATE /a/|NLOCATE /a/\n\
             TAKE 1|SKIP 1|DUPLICATE 1|SPLIT /,/|COUNT",
        )
        .unwrap();
        assert_eq!(specs.len(), 13);
        for spec in &specs {
            assert_eq!(spec_to_filter(spec).name(), spec.name());
        }
    }
}
