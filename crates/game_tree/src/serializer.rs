//! PGN export
//!
//! The output re-parses to an equal tree: moves, comments, glyphs, eval
//! commands, variation order and headers all survive.

use std::fmt::Write as _;

use chess_core::Color;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::headers::Outcome;
use crate::path::Path;
use crate::tree::{GameTree, MoveNode};

/// What to include in exported movetext and how to lay it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    pub comments: bool,
    pub variations: bool,
    pub annotations: bool,
    /// Wrap movetext at this many columns; 0 keeps it on one line.
    pub line_width: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            comments: true,
            variations: true,
            annotations: true,
            line_width: 80,
        }
    }
}

impl WriterOptions {
    /// Main line only, no comments or glyphs.
    pub fn bare() -> Self {
        Self {
            comments: false,
            variations: false,
            annotations: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, PartialEq)]
enum Chunk {
    Word(String),
    Open,
    Close,
    /// `;` comment, which runs to the end of the line.
    LineComment(String),
}

/// A line being written: the next move is `parent.children[idx]`.
struct LineFrame<'t> {
    parent: &'t MoveNode,
    idx: usize,
    /// Write a move number even before a Black move.
    force: bool,
    /// Set once the move at `idx` is out and its sibling variations follow.
    next_variation: Option<usize>,
}

impl<'t> LineFrame<'t> {
    fn new(parent: &'t MoveNode, idx: usize) -> Self {
        Self {
            parent,
            idx,
            force: true,
            next_variation: None,
        }
    }
}

struct MovetextWriter<'a> {
    options: &'a WriterOptions,
    chunks: Vec<Chunk>,
}

impl<'a> MovetextWriter<'a> {
    fn new(options: &'a WriterOptions) -> Self {
        Self {
            options,
            chunks: Vec::new(),
        }
    }

    fn word(&mut self, text: impl Into<String>) {
        self.chunks.push(Chunk::Word(text.into()));
    }

    /// A brace comment, or a `;` comment when the text holds a `}`. Text
    /// with both a `}` and a line break fits neither, so its braces are
    /// written as `)`. Tree edits fold such text onto one line, so only
    /// hand-built nodes reach that branch.
    fn comment(&mut self, text: &str) {
        if !text.contains('}') {
            self.word(format!("{{{text}}}"));
        } else if !text.contains('\n') {
            self.chunks.push(Chunk::LineComment(text.to_string()));
        } else {
            self.word(format!("{{{}}}", text.replace('}', ")")));
        }
    }

    /// Comments and eval commands attached to a node. Returns true if
    /// anything was written.
    fn notes(&mut self, node: &MoveNode) -> bool {
        if !self.options.comments {
            return false;
        }
        if !node.evals.is_empty() {
            let mut text = String::new();
            for (key, value) in &node.evals {
                if !text.is_empty() {
                    text.push(' ');
                }
                if value.is_empty() {
                    let _ = write!(text, "[%{key}]");
                } else {
                    let _ = write!(text, "[%{key} {value}]");
                }
            }
            self.comment(&text);
        }
        for text in &node.comments {
            self.comment(text);
        }
        !node.evals.is_empty() || !node.comments.is_empty()
    }

    fn move_number(&mut self, parent: &MoveNode, force: bool) {
        let number = parent.position.fullmove_number;
        match parent.position.side_to_move {
            Color::White => self.word(format!("{number}.")),
            Color::Black if force => self.word(format!("{number}...")),
            Color::Black => {}
        }
    }

    /// Write `parent.children[start]` and the line that follows it. The
    /// siblings of a main-line move go in parentheses right after it, so
    /// nesting in the output mirrors nesting in the tree. Open lines are kept
    /// on an explicit stack.
    fn line(&mut self, parent: &MoveNode, start: usize) {
        let mut stack = vec![LineFrame::new(parent, start)];
        while let Some(frame) = stack.last_mut() {
            let parent = frame.parent;
            if let Some(variation) = frame.next_variation {
                if variation < parent.children.len() {
                    frame.next_variation = Some(variation + 1);
                    frame.force = true;
                    self.chunks.push(Chunk::Open);
                    stack.push(LineFrame::new(parent, variation));
                } else {
                    frame.next_variation = None;
                    frame.parent = &parent.children[frame.idx];
                    frame.idx = 0;
                }
                continue;
            }

            let Some(node) = parent.children.get(frame.idx) else {
                stack.pop();
                if !stack.is_empty() {
                    self.chunks.push(Chunk::Close);
                }
                continue;
            };
            if self.options.comments && !node.starting_comments.is_empty() {
                for text in &node.starting_comments {
                    self.comment(text);
                }
                frame.force = true;
            }
            self.move_number(parent, frame.force);
            self.word(node.san());
            if self.options.annotations {
                for nag in &node.nags {
                    self.word(nag.to_string());
                }
            }
            frame.force = self.notes(node);

            if frame.idx == 0 && self.options.variations && parent.children.len() > 1 {
                frame.next_variation = Some(1);
            } else {
                frame.parent = node;
                frame.idx = 0;
            }
        }
    }

    /// Join the chunks, wrapping at the configured width.
    fn finish(self) -> String {
        let width = self.options.line_width;
        let mut out = String::new();
        let mut line_len = 0;
        let mut glue_next = false;
        let mut break_next = false;

        for chunk in self.chunks {
            let (text, glue_prev) = match &chunk {
                Chunk::Word(w) => (w.clone(), false),
                Chunk::Open => ("(".to_string(), false),
                Chunk::Close => (")".to_string(), true),
                Chunk::LineComment(c) => (format!("; {c}"), false),
            };
            let joined = glue_next || glue_prev;
            if line_len > 0 {
                if break_next {
                    out.push('\n');
                    line_len = 0;
                } else if !joined {
                    if width > 0 && line_len + 1 + text.len() > width {
                        out.push('\n');
                        line_len = 0;
                    } else {
                        out.push(' ');
                        line_len += 1;
                    }
                }
            }
            out.push_str(&text);
            line_len += text.len();
            glue_next = chunk == Chunk::Open;
            break_next = matches!(chunk, Chunk::LineComment(_));
        }
        if break_next {
            out.push('\n');
        }
        out
    }
}

fn escape_tag_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a whole game: tag pairs, a blank line, movetext and the result.
pub fn write_pgn(tree: &GameTree, options: &WriterOptions) -> String {
    let mut out = String::new();
    for (key, value) in tree.headers.export_order() {
        let _ = writeln!(out, "[{key} \"{}\"]", escape_tag_value(value));
    }
    if !tree.headers.is_empty() {
        out.push('\n');
    }

    let mut writer = MovetextWriter::new(options);
    if options.comments {
        writer.notes(tree.root());
    }
    writer.line(tree.root(), 0);
    // A non-standard Result value stays in the header only; a token here
    // would replace it on re-import.
    match tree.headers.get("Result") {
        Some(value) => {
            if let Some(outcome) = Outcome::from_token(value) {
                writer.word(outcome.as_token());
            }
        }
        None => writer.word(Outcome::Unknown.as_token()),
    }

    out.push_str(&writer.finish());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Render the continuation below the node at `path`, without headers or a
/// result token.
pub fn write_subtree(tree: &GameTree, path: &Path, options: &WriterOptions) -> Result<String> {
    let node = tree.node(path)?;
    let mut writer = MovetextWriter::new(options);
    writer.line(node, 0);
    Ok(writer.finish())
}

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod serializer_tests;
