//! Drop file parser
//!
//! Each file is scanned line by line through an explicit state machine:
//!
//! - `Scanning`: plain entries are emitted, comments and blanks skipped
//! - `AwaitingGroupOpen`: after `#CHILD <rate> RANDOM`, everything up to a
//!   lone `(` is ignored
//! - `InGroup`: item names are collected until a lone `)`, then the header
//!   rate is split equally over them
//!
//! A group still open at end of input is discarded.

use crate::decode::TextDecoder;
use crate::line::{classify, Line};
use crate::rate::{parse_rate, RateError};
use crate::types::MonsterRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Non-fatal problem found while parsing one file. Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseWarning {
    #[error("line {line}: {source}")]
    InvalidRate { line: usize, source: RateError },

    #[error("line {line}: rate {value} is above 1, clamped")]
    RateClamped { line: usize, value: f64 },

    #[error("line {line}: no item name in '{text}'")]
    MalformedEntry { line: usize, text: String },

    #[error("line {line}: group marker inside an open group ignored")]
    NestedGroupMarker { line: usize },

    #[error("group started at line {line} is never closed, {items} item(s) discarded")]
    UnterminatedGroup { line: usize, items: usize },
}

/// A file that could not be turned into a record
#[derive(Error, Debug)]
pub enum FileReadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot derive a monster name from {0:?}")]
    NoMonsterName(PathBuf),
}

impl FileReadError {
    pub fn path(&self) -> &Path {
        match self {
            FileReadError::Io { path, .. } => path,
            FileReadError::NoMonsterName(path) => path,
        }
    }
}

/// Output of parsing one file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub record: MonsterRecord,
    pub warnings: Vec<ParseWarning>,
}

enum State {
    Scanning,
    AwaitingGroupOpen {
        header: usize,
        rate: f64,
    },
    InGroup {
        header: usize,
        rate: f64,
        items: Vec<String>,
    },
}

/// Monster name for a drop file: the file name without its extension
pub fn monster_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Read, decode and parse one drop file
pub fn parse_file(path: &Path, decoder: &TextDecoder) -> Result<ParsedFile, FileReadError> {
    let monster = monster_name_from_path(path)
        .ok_or_else(|| FileReadError::NoMonsterName(path.to_path_buf()))?;

    let bytes = std::fs::read(path).map_err(|source| FileReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decoder.decode(&bytes);
    if decoded.lossy {
        tracing::debug!(
            "{}: undecodable bytes skipped ({})",
            path.display(),
            decoded.encoding.name()
        );
    }

    Ok(parse_str(&monster, &decoded.text))
}

/// Parse drop file contents already in memory
pub fn parse_str(monster: &str, text: &str) -> ParsedFile {
    let mut parser = Parser {
        record: MonsterRecord::new(monster),
        warnings: Vec::new(),
    };

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut state = State::Scanning;
    for (i, raw) in text.lines().enumerate() {
        state = parser.step(state, i + 1, classify(raw));
    }
    parser.finish(state);

    ParsedFile {
        record: parser.record,
        warnings: parser.warnings,
    }
}

struct Parser {
    record: MonsterRecord,
    warnings: Vec<ParseWarning>,
}

impl Parser {
    fn step(&mut self, state: State, line: usize, classified: Line<'_>) -> State {
        match state {
            State::Scanning => self.scan(line, classified),

            State::AwaitingGroupOpen { header, rate } => match classified {
                Line::GroupOpen => State::InGroup {
                    header,
                    rate,
                    items: Vec::new(),
                },
                _ => State::AwaitingGroupOpen { header, rate },
            },

            State::InGroup {
                header,
                rate,
                mut items,
            } => match classified {
                Line::Entry { name, .. } => {
                    items.push(name);
                    State::InGroup {
                        header,
                        rate,
                        items,
                    }
                }
                Line::GroupClose => {
                    self.record.add_child_group(rate, items);
                    State::Scanning
                }
                Line::ChildGroupStart { .. } | Line::GroupOpen => {
                    self.warn(ParseWarning::NestedGroupMarker { line });
                    State::InGroup {
                        header,
                        rate,
                        items,
                    }
                }
                Line::Incomplete { text } => {
                    self.warn(ParseWarning::MalformedEntry {
                        line,
                        text: text.to_string(),
                    });
                    State::InGroup {
                        header,
                        rate,
                        items,
                    }
                }
                Line::Blank | Line::CommentOnly => State::InGroup {
                    header,
                    rate,
                    items,
                },
            },
        }
    }

    fn scan(&mut self, line: usize, classified: Line<'_>) -> State {
        match classified {
            Line::Entry { rate, name } => {
                if let Some(rate) = self.rate(line, rate) {
                    self.record.add_entry(name, rate);
                }
                State::Scanning
            }
            Line::ChildGroupStart { rate } => State::AwaitingGroupOpen {
                header: line,
                // An unusable header rate still consumes its group
                rate: self.rate(line, rate).unwrap_or(0.0),
            },
            Line::Incomplete { text } => {
                self.warn(ParseWarning::MalformedEntry {
                    line,
                    text: text.to_string(),
                });
                State::Scanning
            }
            Line::Blank | Line::CommentOnly | Line::GroupOpen | Line::GroupClose => {
                State::Scanning
            }
        }
    }

    fn rate(&mut self, line: usize, token: &str) -> Option<f64> {
        match parse_rate(token) {
            Ok(value) if value > 1.0 => {
                self.warn(ParseWarning::RateClamped { line, value });
                Some(1.0)
            }
            Ok(value) => Some(value),
            Err(source) => {
                self.warn(ParseWarning::InvalidRate { line, source });
                None
            }
        }
    }

    fn finish(&mut self, state: State) {
        let unterminated = match state {
            State::Scanning => None,
            State::AwaitingGroupOpen { header, .. } => Some((header, 0)),
            State::InGroup { header, items, .. } => Some((header, items.len())),
        };

        if let Some((line, items)) = unterminated {
            let warning = ParseWarning::UnterminatedGroup { line, items };
            tracing::debug!("{}: {}", self.record.name(), warning);
            self.warnings.push(warning);
        }
    }

    fn warn(&mut self, warning: ParseWarning) {
        if matches!(warning, ParseWarning::NestedGroupMarker { .. }) {
            tracing::debug!("{}: {}", self.record.name(), warning);
        } else {
            tracing::warn!("{}: {}", self.record.name(), warning);
        }
        self.warnings.push(warning);
    }
}
