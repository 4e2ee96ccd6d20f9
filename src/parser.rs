//! This module provides the parser for the positional transition-table format, utilizing the
//! `pest` crate. The grammar in `grammar.pest` classifies lines; this module assigns each line
//! its positional meaning and builds a `Program`.
//!
//! A description with `S` states and `K` symbols holds `(S-1) * (K+1)` transition lines in
//! row-major order: line `i` is the transition for state `i / (K+1)` reading symbol
//! `'0' + i % (K+1)`. State `S-1` is the only accept state and has no outgoing transitions.

use crate::{
    analyzer::analyze,
    table::TransitionTable,
    types::{
        Direction, Program, StateId, Transition, TuringMachineError, DEFAULT_BLANK_SYMBOL,
        DEFAULT_PROGRAM_NAME,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// The largest symbol count: symbols are the digits `'0'..='9'`.
pub const MAX_SYMBOL_COUNT: usize = 9;

/// Derives a `PestParser` for the positional format defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct PositionalParser;

/// Parses the given input string into a `Program` struct.
///
/// The start state is `"0"`, the accept state is `S-1`, there are no reject states and the
/// blank symbol is `'0'`. The parsed program is validated before being returned.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if a line is malformed; the error points at it.
/// * `Err(TuringMachineError::ValidationError)` if lines are missing or the program fails
///   validation.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    let root = PositionalParser::parse(Rule::document, input)
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    let mut lines: Vec<Pair<Rule>> = root
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::line)
        .collect();

    // A final newline terminates the last line instead of opening an empty one.
    let trailing_newline = input.ends_with(|c: char| c == '\n' || c == '\r');
    if trailing_newline && lines.last().is_some_and(|line| line.as_str().is_empty()) {
        lines.pop();
    }

    let program = parse_program(lines)?;

    analyze(&program)?;

    tracing::debug!(
        transitions = program.rules.len(),
        input_len = program.input.len(),
        "parsed positional program"
    );

    Ok(program)
}

/// Assigns positional meaning to the classified lines.
fn parse_program(lines: Vec<Pair<Rule>>) -> Result<Program, TuringMachineError> {
    let mut lines = lines.into_iter();

    let (states, states_span) = parse_count(lines.next(), "state count")?;
    let (symbols, symbols_span) = parse_count(lines.next(), "symbol count")?;

    if states == 0 {
        return Err(parse_error("State count must be at least 1", states_span));
    }

    if symbols > MAX_SYMBOL_COUNT {
        return Err(parse_error(
            &format!("Symbol count must be at most {MAX_SYMBOL_COUNT}, found {symbols}"),
            symbols_span,
        ));
    }

    let columns = symbols + 1;
    let expected = (states - 1).checked_mul(columns).ok_or_else(|| {
        parse_error(
            &format!("State count {states} is too large for {symbols} symbols"),
            states_span,
        )
    })?;
    let rows: Vec<Pair<Rule>> = lines.by_ref().take(expected).collect();

    if rows.len() < expected {
        return Err(TuringMachineError::ValidationError(format!(
            "Not enough transition lines: expected {expected}, found {}",
            rows.len()
        )));
    }

    let mut entries = Vec::with_capacity(expected);
    for (index, row) in rows.into_iter().enumerate() {
        let state = StateId::from(index / columns);
        let symbol = alphabet_symbol(index % columns);

        if let Some(transition) = parse_transition(row, states, symbols)? {
            entries.push(((state, symbol), transition));
        }
    }

    let input = lines
        .next()
        .map(|line| line.as_str().trim().to_string())
        .unwrap_or_default();

    Ok(Program {
        name: DEFAULT_PROGRAM_NAME.to_string(),
        start_state: StateId::from(0usize),
        accept_states: HashSet::from([StateId::from(states - 1)]),
        reject_states: HashSet::new(),
        input,
        blank: DEFAULT_BLANK_SYMBOL,
        rules: entries.into_iter().collect::<TransitionTable>(),
    })
}

/// Parses a header line holding a non-negative integer.
fn parse_count<'i>(
    pair: Option<Pair<'i, Rule>>,
    what: &str,
) -> Result<(usize, Span<'i>), TuringMachineError> {
    let pair = pair
        .ok_or_else(|| TuringMachineError::ValidationError(format!("Missing {what} line")))?;
    let span = pair.as_span();
    let text = pair.as_str().trim();

    text.parse::<usize>().map(|count| (count, span)).map_err(|_| {
        parse_error(
            &format!("Invalid {what}: expected a non-negative integer, found '{text}'"),
            span,
        )
    })
}

/// Parses a transition line. An empty line yields `None`: the transition is left undefined.
fn parse_transition(
    row: Pair<Rule>,
    states: usize,
    symbols: usize,
) -> Result<Option<Transition>, TuringMachineError> {
    let span = row.as_span();

    let inner = match row.into_inner().next() {
        None => return Ok(None),
        Some(inner) if inner.as_rule() == Rule::transition => inner,
        Some(inner) => {
            return Err(parse_error(
                &format!(
                    "Invalid transition '{}': expected 'next,write,direction'",
                    inner.as_str().trim()
                ),
                span,
            ))
        }
    };

    let mut parts = inner.into_inner();
    let next = next_pair(&mut parts, span)?;
    let write = next_pair(&mut parts, span)?;
    let direction = next_pair(&mut parts, span)?;

    let next_state = match next.as_str().parse::<usize>() {
        Ok(index) if index < states => StateId::from(index),
        _ => {
            return Err(parse_error(
                &format!(
                    "Next state {} is out of range: expected 0..={}",
                    next.as_str(),
                    states - 1
                ),
                next.as_span(),
            ))
        }
    };

    let write_symbol = parse_symbol(write, symbols)?;

    let direction = Direction::from_letter(direction.as_str()).ok_or_else(|| {
        parse_error(
            &format!("Unsupported direction: {}", direction.as_str()),
            direction.as_span(),
        )
    })?;

    Ok(Some(Transition {
        next_state,
        write: write_symbol,
        direction,
    }))
}

/// Parses a write symbol, which must belong to the alphabet `'0'..='0'+K`.
fn parse_symbol(pair: Pair<Rule>, symbols: usize) -> Result<char, TuringMachineError> {
    pair.as_str()
        .chars()
        .next()
        .filter(|c| c.to_digit(10).is_some_and(|digit| digit as usize <= symbols))
        .ok_or_else(|| {
            parse_error(
                &format!(
                    "Write symbol '{}' is not in the alphabet 0..={}",
                    pair.as_str(),
                    symbols
                ),
                pair.as_span(),
            )
        })
}

/// Maps an alphabet index to its symbol: index `i` is the digit `'0' + i`.
fn alphabet_symbol(index: usize) -> char {
    char::from(b'0' + index as u8)
}

/// Takes the next inner pair of a transition.
fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, TuringMachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete transition", span))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
