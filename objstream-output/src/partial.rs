//! Partial-JSON parsing.
//!
//! Streaming decoders hand us a buffer that is invalid JSON at almost every
//! intermediate step. [`parse_partial_json`] is a total function over such
//! buffers: complete JSON parses exactly, any plausible prefix of JSON is
//! repaired into the most complete value the prefix supports, and only text
//! that cannot be a prefix of any JSON fails.
//!
//! Repair is deterministic and order-preserving:
//!
//! - open containers are closed in nesting order,
//! - a trailing incomplete key or dangling `,`/`:` inside an object drops
//!   the unfinished member,
//! - an unterminated string *value* is closed at its last complete unit
//!   (backing off over a trailing half-escape),
//! - an in-progress number (`123.`, `-`, `1e`) or literal (`tru`) is
//!   dropped,
//! - a trailing array element is kept whenever it can be read as a
//!   meaningful partial value, and dropped otherwise.
//!
//! The parser is stateless; every call re-scans the full buffer. For model
//! output sizes the quadratic total work is irrelevant and the repair
//! semantics stay trivially consistent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the buffer parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseState {
    /// The buffer was complete, valid JSON.
    SuccessfulParse,
    /// The buffer was truncated or invalid; a best-effort prefix value was
    /// recovered.
    RepairedParse,
    /// The buffer cannot be a prefix of any JSON text.
    FailedParse,
}

/// Result of [`parse_partial_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedJson {
    /// How the buffer parsed.
    pub state: ParseState,
    /// The recovered value, when one exists.
    pub value: Option<Value>,
}

impl ParsedJson {
    /// Whether any value was recovered.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Whether the buffer failed outright.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == ParseState::FailedParse
    }
}

/// Parse a possibly-truncated JSON buffer into the most complete value the
/// prefix supports.
#[must_use]
pub fn parse_partial_json(text: &str) -> ParsedJson {
    if text.trim().is_empty() {
        return ParsedJson {
            state: ParseState::RepairedParse,
            value: None,
        };
    }

    // Leading whitespace is never meaningful. Trailing whitespace may sit
    // inside an unterminated string and must be preserved.
    let trimmed = text.trim_start();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return ParsedJson {
            state: ParseState::SuccessfulParse,
            value: Some(value),
        };
    }

    match repair_json(trimmed) {
        Some(fixed) if fixed.trim().is_empty() => ParsedJson {
            state: ParseState::RepairedParse,
            value: None,
        },
        Some(fixed) => match serde_json::from_str::<Value>(&fixed) {
            Ok(value) => ParsedJson {
                state: ParseState::RepairedParse,
                value: Some(value),
            },
            Err(_) => ParsedJson {
                state: ParseState::FailedParse,
                value: None,
            },
        },
        None => ParsedJson {
            state: ParseState::FailedParse,
            value: None,
        },
    }
}

/// What the scanner expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Value,
    ArrayValueOrEnd,
    ObjectKeyOrEnd,
    ObjectKey,
    ObjectColon,
    ObjectCommaOrEnd,
    ArrayCommaOrEnd,
    Done,
}

/// One open container on the scanner stack.
///
/// `committed` is the byte offset up to which a cut inside this container is
/// safe: just past the opener, or just past the last complete element or
/// member value.
struct Frame {
    open: char,
    start: usize,
    committed: usize,
}

enum StringScan {
    Terminated { end_byte: usize, next_pos: usize },
    Unterminated { safe_end: usize },
    Invalid,
}

enum LiteralScan {
    Complete { end_byte: usize, next_pos: usize },
    Prefix,
    Mismatch,
}

/// Repair a truncated JSON prefix into parseable text.
///
/// Returns `None` when the text is not a prefix of any JSON. An empty
/// result string means the prefix is plausible but no value is recoverable
/// yet (e.g. `"tru"`).
fn repair_json(text: &str) -> Option<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = text.len();
    let mut pos = 0usize;
    let mut stack: Vec<Frame> = Vec::new();
    let mut expect = Expect::Value;
    let mut top_committed = 0usize;

    fn complete_value(
        stack: &mut [Frame],
        expect: &mut Expect,
        top_committed: &mut usize,
        end: usize,
    ) {
        match stack.last_mut() {
            Some(frame) => {
                frame.committed = end;
                *expect = if frame.open == '{' {
                    Expect::ObjectCommaOrEnd
                } else {
                    Expect::ArrayCommaOrEnd
                };
            }
            None => {
                *expect = Expect::Done;
                *top_committed = end;
            }
        }
    }

    fn cut_point(stack: &[Frame], top_committed: usize) -> usize {
        stack.last().map(|f| f.committed).unwrap_or(top_committed)
    }

    while pos < chars.len() {
        let (i, c) = chars[pos];
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            pos += 1;
            continue;
        }

        match expect {
            Expect::Done => return None,

            Expect::ObjectColon => {
                if c != ':' {
                    return None;
                }
                expect = Expect::Value;
                pos += 1;
            }

            Expect::ObjectCommaOrEnd => match c {
                ',' => {
                    expect = Expect::ObjectKey;
                    pos += 1;
                }
                '}' => {
                    stack.pop()?;
                    complete_value(&mut stack, &mut expect, &mut top_committed, i + 1);
                    pos += 1;
                }
                _ => return None,
            },

            Expect::ArrayCommaOrEnd => match c {
                ',' => {
                    expect = Expect::Value;
                    pos += 1;
                }
                ']' => {
                    stack.pop()?;
                    complete_value(&mut stack, &mut expect, &mut top_committed, i + 1);
                    pos += 1;
                }
                _ => return None,
            },

            Expect::ObjectKeyOrEnd | Expect::ObjectKey => {
                if c == '}' && expect == Expect::ObjectKeyOrEnd {
                    stack.pop()?;
                    complete_value(&mut stack, &mut expect, &mut top_committed, i + 1);
                    pos += 1;
                } else if c == '"' {
                    match scan_string(&chars, pos + 1, i + 1, len) {
                        StringScan::Terminated { next_pos, .. } => {
                            expect = Expect::ObjectColon;
                            pos = next_pos;
                        }
                        // An unfinished key drops the whole member.
                        StringScan::Unterminated { .. } => {
                            let cut = cut_point(&stack, top_committed);
                            return Some(assemble(text, cut, false, &stack));
                        }
                        StringScan::Invalid => return None,
                    }
                } else {
                    return None;
                }
            }

            Expect::Value | Expect::ArrayValueOrEnd => {
                if c == ']' && expect == Expect::ArrayValueOrEnd {
                    stack.pop()?;
                    complete_value(&mut stack, &mut expect, &mut top_committed, i + 1);
                    pos += 1;
                    continue;
                }
                match c {
                    '{' => {
                        stack.push(Frame {
                            open: '{',
                            start: i,
                            committed: i + 1,
                        });
                        expect = Expect::ObjectKeyOrEnd;
                        pos += 1;
                    }
                    '[' => {
                        stack.push(Frame {
                            open: '[',
                            start: i,
                            committed: i + 1,
                        });
                        expect = Expect::ArrayValueOrEnd;
                        pos += 1;
                    }
                    '"' => match scan_string(&chars, pos + 1, i + 1, len) {
                        StringScan::Terminated { end_byte, next_pos } => {
                            complete_value(&mut stack, &mut expect, &mut top_committed, end_byte);
                            pos = next_pos;
                        }
                        StringScan::Unterminated { safe_end } => {
                            return Some(assemble(text, safe_end, true, &stack));
                        }
                        StringScan::Invalid => return None,
                    },
                    '-' | '0'..='9' => {
                        let (end_byte, next_pos) = scan_number(&chars, pos, len);
                        let complete =
                            serde_json::from_str::<Value>(&text[i..end_byte]).is_ok();
                        if complete {
                            complete_value(&mut stack, &mut expect, &mut top_committed, end_byte);
                            pos = next_pos;
                        } else if next_pos >= chars.len() {
                            // In-progress number at the tail: not yet a value.
                            let cut = cut_point(&stack, top_committed);
                            return Some(assemble(text, cut, false, &stack));
                        } else {
                            return None;
                        }
                    }
                    't' | 'f' | 'n' => {
                        let literal = match c {
                            't' => "true",
                            'f' => "false",
                            _ => "null",
                        };
                        match scan_literal(&chars, pos, literal, len) {
                            LiteralScan::Complete { end_byte, next_pos } => {
                                complete_value(
                                    &mut stack,
                                    &mut expect,
                                    &mut top_committed,
                                    end_byte,
                                );
                                pos = next_pos;
                            }
                            LiteralScan::Prefix => {
                                let cut = cut_point(&stack, top_committed);
                                return Some(assemble(text, cut, false, &stack));
                            }
                            LiteralScan::Mismatch => return None,
                        }
                    }
                    _ => return None,
                }
            }
        }
    }

    // End of input between tokens.
    match expect {
        Expect::Done => Some(text.to_string()),
        Expect::ObjectCommaOrEnd | Expect::ArrayCommaOrEnd => {
            Some(assemble(text, len, false, &stack))
        }
        _ => Some(assemble(
            text,
            cut_point(&stack, top_committed),
            false,
            &stack,
        )),
    }
}

/// Truncate at `cut`, optionally close an open string, then close every
/// container opened before the cut, innermost first.
fn assemble(text: &str, cut: usize, close_string: bool, stack: &[Frame]) -> String {
    let mut out = String::with_capacity(cut + stack.len() + 1);
    out.push_str(&text[..cut]);
    if close_string {
        out.push('"');
    }
    for frame in stack.iter().rev() {
        if frame.start < cut {
            out.push(if frame.open == '{' { '}' } else { ']' });
        }
    }
    out
}

/// Scan a string body starting just past the opening quote.
///
/// `safe_end` tracks the byte offset after the last complete unit (a plain
/// character or a whole escape sequence), so a trailing half-escape is never
/// kept.
fn scan_string(
    chars: &[(usize, char)],
    mut pos: usize,
    mut safe_end: usize,
    text_len: usize,
) -> StringScan {
    let byte_end = |idx: usize| {
        chars
            .get(idx + 1)
            .map(|(b, _)| *b)
            .unwrap_or(text_len)
    };

    while pos < chars.len() {
        let (b, c) = chars[pos];
        match c {
            '"' => {
                return StringScan::Terminated {
                    end_byte: b + 1,
                    next_pos: pos + 1,
                }
            }
            '\\' => {
                let Some(&(_, escaped)) = chars.get(pos + 1) else {
                    return StringScan::Unterminated { safe_end };
                };
                match escaped {
                    '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                        safe_end = byte_end(pos + 1);
                        pos += 2;
                    }
                    'u' => {
                        for k in 0..4 {
                            match chars.get(pos + 2 + k) {
                                Some((_, h)) if h.is_ascii_hexdigit() => {}
                                Some(_) => return StringScan::Invalid,
                                None => return StringScan::Unterminated { safe_end },
                            }
                        }
                        safe_end = byte_end(pos + 5);
                        pos += 6;
                    }
                    _ => return StringScan::Invalid,
                }
            }
            c if (c as u32) < 0x20 => return StringScan::Invalid,
            _ => {
                safe_end = b + c.len_utf8();
                pos += 1;
            }
        }
    }
    StringScan::Unterminated { safe_end }
}

/// Consume the number-token character set and report where it ends.
fn scan_number(chars: &[(usize, char)], mut pos: usize, text_len: usize) -> (usize, usize) {
    while pos < chars.len() {
        match chars[pos].1 {
            '0'..='9' | '-' | '+' | '.' | 'e' | 'E' => pos += 1,
            _ => break,
        }
    }
    let end_byte = chars.get(pos).map(|(b, _)| *b).unwrap_or(text_len);
    (end_byte, pos)
}

/// Match `true` / `false` / `null`, allowing a clean prefix at end of input.
fn scan_literal(
    chars: &[(usize, char)],
    pos: usize,
    literal: &str,
    text_len: usize,
) -> LiteralScan {
    for (k, expected) in literal.chars().enumerate() {
        match chars.get(pos + k) {
            Some((_, c)) if *c == expected => {}
            Some(_) => return LiteralScan::Mismatch,
            None => return LiteralScan::Prefix,
        }
    }
    let next_pos = pos + literal.len();
    let end_byte = chars.get(next_pos).map(|(b, _)| *b).unwrap_or(text_len);
    LiteralScan::Complete { end_byte, next_pos }
}
