//! FORMATDATE(pattern) - current date and time in a custom pattern

use crate::registry::function::{EvaluationContext, ExpressionFunction, FunctionResult, arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Pattern used when the requested one cannot be rendered
const DEFAULT_PATTERN: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken {
    Year4,
    Year2,
    YearShort,
    MonthName,
    MonthAbbrev,
    Month2,
    Month,
    WeekdayName,
    WeekdayAbbrev,
    Day2,
    Day,
    Hour2,
    Hour,
    Minute2,
    Minute,
    Second2,
    Second,
    IsoWeek,
    Meridiem,
    MeridiemShort,
    MeridiemLower,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Token(DateToken),
}

/// Token widths per pattern letter, longest first
fn widths(letter: char) -> &'static [(usize, DateToken)] {
    use DateToken::*;
    match letter {
        'y' => &[(4, Year4), (2, Year2), (1, YearShort)],
        'm' => &[(4, MonthName), (3, MonthAbbrev), (2, Month2), (1, Month)],
        'd' => &[(4, WeekdayName), (3, WeekdayAbbrev), (2, Day2), (1, Day)],
        'h' => &[(2, Hour2), (1, Hour)],
        'M' => &[(2, Minute2), (1, Minute)],
        's' => &[(2, Second2), (1, Second)],
        'w' => &[(2, IsoWeek)],
        't' => &[(2, Meridiem), (1, MeridiemShort)],
        _ => &[],
    }
}

/// Split a pattern into literal text and date tokens.
///
/// Runs of one letter are consumed longest token first, so `yyy` is `yy`
/// followed by `y`. Runs of five or more `y`, `m` or `d` have no meaning and
/// make the pattern invalid.
fn parse_pattern(pattern: &str) -> Option<Vec<Piece>> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let rest: String = chars[i..chars.len().min(i + 5)].iter().collect();
        let marker = match rest.as_str() {
            "AM/PM" => Some(DateToken::Meridiem),
            "am/pm" => Some(DateToken::MeridiemLower),
            _ => None,
        };
        if let Some(token) = marker {
            flush(&mut literal, &mut pieces);
            pieces.push(Piece::Token(token));
            i += 5;
            continue;
        }

        let letter = chars[i];
        let table = widths(letter);
        if table.is_empty() {
            literal.push(letter);
            i += 1;
            continue;
        }

        let mut run = chars[i..].iter().take_while(|&&c| c == letter).count();
        i += run;
        if run >= 5 && matches!(letter, 'y' | 'm' | 'd') {
            return None;
        }
        while run > 0 {
            match table.iter().find(|(width, _)| *width <= run) {
                Some(&(width, token)) => {
                    flush(&mut literal, &mut pieces);
                    pieces.push(Piece::Token(token));
                    run -= width;
                }
                None => {
                    literal.extend(std::iter::repeat_n(letter, run));
                    run = 0;
                }
            }
        }
    }
    flush(&mut literal, &mut pieces);
    Some(pieces)
}

fn flush(literal: &mut String, pieces: &mut Vec<Piece>) {
    if !literal.is_empty() {
        pieces.push(Piece::Literal(std::mem::take(literal)));
    }
}

fn render(token: DateToken, now: &NaiveDateTime) -> String {
    use DateToken::*;
    let morning = now.hour() < 12;
    match token {
        Year4 => format!("{:04}", now.year()),
        Year2 => format!("{:02}", now.year().rem_euclid(100)),
        YearShort => now.year().rem_euclid(100).to_string(),
        MonthName => now.format("%B").to_string(),
        MonthAbbrev => now.format("%b").to_string(),
        Month2 => format!("{:02}", now.month()),
        Month => now.month().to_string(),
        WeekdayName => now.format("%A").to_string(),
        WeekdayAbbrev => now.format("%a").to_string(),
        Day2 => format!("{:02}", now.day()),
        Day => now.day().to_string(),
        Hour2 => format!("{:02}", now.hour()),
        Hour => now.hour().to_string(),
        Minute2 => format!("{:02}", now.minute()),
        Minute => now.minute().to_string(),
        Second2 => format!("{:02}", now.second()),
        Second => now.second().to_string(),
        IsoWeek => format!("{:02}", now.iso_week().week()),
        Meridiem => if morning { "AM" } else { "PM" }.to_string(),
        MeridiemShort => if morning { "A" } else { "P" }.to_string(),
        MeridiemLower => if morning { "am" } else { "pm" }.to_string(),
    }
}

/// Render `now` with a FORMATDATE pattern.
///
/// Invalid patterns render as `dd.mm.yyyy`.
pub fn format_date(pattern: &str, now: &NaiveDateTime) -> String {
    match parse_pattern(pattern) {
        Some(pieces) => pieces
            .iter()
            .map(|piece| match piece {
                Piece::Literal(text) => text.clone(),
                Piece::Token(token) => render(*token, now),
            })
            .collect(),
        None => {
            log::warn!("FORMATDATE pattern '{pattern}' is invalid, using dd.mm.yyyy");
            now.format(DEFAULT_PATTERN).to_string()
        }
    }
}

/// FORMATDATE(pattern) - the evaluation time formatted with date tokens
pub struct FormatDateFunction;

impl ExpressionFunction for FormatDateFunction {
    fn name(&self) -> &str {
        "FORMATDATE"
    }
    fn human_friendly_name(&self) -> &str {
        "Format Date"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new("FORMATDATE", vec![ParameterInfo::required("pattern")])
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Formats the current date and time. Tokens: `yyyy` `yy` `y` (year), `mmmm` `mmm` \
         `mm` `m` (month name, abbreviation, padded, plain), `dddd` `ddd` `dd` `d` \
         (weekday name, abbreviation, padded day, plain day), `hh` `h` (hour), `MM` `M` \
         (minute), `ss` `s` (second), `ww` (ISO week), `tt` `t` (AM/PM, A/P). Other \
         characters are copied."
    }
    fn evaluate(&self, args: &[String], context: &EvaluationContext<'_>) -> FunctionResult<String> {
        Ok(format_date(arg(args, 0), &context.now))
    }
}
