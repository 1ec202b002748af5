//! Line-oriented writer shared by the man, CommonMark and LaTeX formats.
//!
//! [`TextRenderer`] owns the output buffer, the line prefix used for nested
//! containers and the soft-wrap state. Format differences live in a
//! [`TextBackend`]: how a single character is escaped and what each node
//! writes on enter and exit.

use std::marker::PhantomData;

use crate::options::Options;
use crate::tree::{DocumentTree, WalkEvent};

/// Escaping context for text written through [`TextRenderer::out`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Escaping {
    /// Written verbatim.
    Literal,
    /// Running text.
    Normal,
    /// Link title.
    Title,
    /// Link destination.
    Url,
}

/// Whether the walk descends into a node's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Step {
    Continue,
    SkipChildren,
}

/// Format-specific half of a text renderer.
pub(super) trait TextBackend: Sized {
    /// Write `c`, escaped for the format. `next` is the following character
    /// of the same chunk.
    fn escape_char(renderer: &mut TextRenderer<Self>, escaping: Escaping, c: char, next: Option<char>);

    /// Write the markup for one walk event.
    fn node(renderer: &mut TextRenderer<Self>, tree: &DocumentTree, event: WalkEvent) -> Step;
}

pub(super) struct TextRenderer<B: TextBackend> {
    buffer: String,
    /// Written at the start of every output line.
    pub(super) prefix: String,
    column: usize,
    pub(super) width: usize,
    pub(super) options: Options,
    /// Pending line breaks: 1 ends the line, 2 also leaves a blank line.
    need_cr: u8,
    last_breakable: usize,
    pub(super) begin_line: bool,
    pub(super) begin_content: bool,
    pub(super) no_linebreaks: bool,
    pub(super) in_tight_list_item: bool,
    _backend: PhantomData<B>,
}

impl<B: TextBackend> TextRenderer<B> {
    pub(super) fn new(options: Options, width: usize) -> Self {
        Self {
            buffer: String::with_capacity(1024),
            prefix: String::new(),
            column: 0,
            width,
            options,
            need_cr: 0,
            last_breakable: 0,
            begin_line: true,
            begin_content: true,
            no_linebreaks: false,
            in_tight_list_item: false,
            _backend: PhantomData,
        }
    }

    /// Walk `tree` and return the output, always ending in a newline.
    pub(super) fn render(mut self, tree: &DocumentTree) -> String {
        let mut walker = tree.walk();
        while let Some(event) = walker.next() {
            if B::node(&mut self, tree, event) == Step::SkipChildren {
                walker.skip_children(event.node());
            }
        }
        if !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer
    }

    /// Whether soft wrapping is enabled for this render.
    pub(super) fn allow_wrap(&self) -> bool {
        self.width > 0 && !self.options.contains(Options::NO_BREAKS)
    }

    /// Last byte written, if any.
    pub(super) fn last_byte(&self) -> Option<u8> {
        self.buffer.as_bytes().last().copied()
    }

    /// Request a line break before the next output.
    pub(super) fn cr(&mut self) {
        self.need_cr = self.need_cr.max(1);
    }

    /// Request a blank line before the next output.
    pub(super) fn blankline(&mut self) {
        self.need_cr = self.need_cr.max(2);
    }

    /// Write `text` verbatim.
    pub(super) fn lit(&mut self, text: &str) {
        self.out(text, false, Escaping::Literal);
    }

    /// Write ASCII markup without escaping.
    pub(super) fn ascii(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.column += text.len();
    }

    /// Write one character without escaping.
    pub(super) fn code_point(&mut self, c: char) {
        self.buffer.push(c);
        self.column += 1;
    }

    pub(super) fn truncate_prefix(&mut self, width: usize) {
        self.prefix.truncate(self.prefix.len().saturating_sub(width));
    }

    /// Write `text`, flushing pending line breaks first and wrapping at
    /// spaces when `wrap` is set and the column exceeds the width.
    pub(super) fn out(&mut self, text: &str, wrap: bool, escaping: Escaping) {
        let wrap = wrap && !self.no_linebreaks;

        if self.in_tight_list_item && self.need_cr > 1 {
            self.need_cr = 1;
        }
        let mut last = self.buffer.len().checked_sub(1);
        while self.need_cr > 0 {
            match last {
                Some(index) if self.buffer.as_bytes()[index] != b'\n' => {
                    self.buffer.push('\n');
                    if self.need_cr > 1 {
                        self.buffer.push_str(&self.prefix);
                    }
                }
                _ => last = last.and_then(|index| index.checked_sub(1)),
            }
            self.column = 0;
            self.last_breakable = 0;
            self.begin_line = true;
            self.begin_content = true;
            self.need_cr -= 1;
        }

        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if self.begin_line {
                self.buffer.push_str(&self.prefix);
                self.column = self.prefix.len();
            }

            let c = chars[i];
            if c == ' ' && wrap {
                if !self.begin_line {
                    let last_nonspace = self.buffer.len();
                    self.buffer.push(' ');
                    self.column += 1;
                    self.begin_line = false;
                    self.begin_content = false;
                    while chars.get(i + 1) == Some(&' ') {
                        i += 1;
                    }
                    // a break must not leave a digit at the start of a line
                    if !chars.get(i + 1).is_some_and(char::is_ascii_digit) {
                        self.last_breakable = last_nonspace;
                    }
                }
            } else if escaping == Escaping::Literal {
                if c == '\n' {
                    self.buffer.push('\n');
                    self.column = 0;
                    self.begin_line = true;
                    self.begin_content = true;
                    self.last_breakable = 0;
                } else {
                    self.code_point(c);
                    self.begin_line = false;
                    self.begin_content = self.begin_content && c.is_ascii_digit();
                }
            } else {
                B::escape_char(self, escaping, c, chars.get(i + 1).copied());
                self.begin_line = false;
                self.begin_content = self.begin_content && c.is_ascii_digit();
            }

            if self.width > 0
                && self.column > self.width
                && !self.begin_line
                && self.last_breakable > 0
            {
                let remainder = self.buffer.split_off(self.last_breakable + 1);
                self.buffer.truncate(self.last_breakable);
                self.buffer.push('\n');
                self.buffer.push_str(&self.prefix);
                self.buffer.push_str(&remainder);
                self.column = self.prefix.len() + remainder.len();
                self.last_breakable = 0;
                self.begin_line = false;
                self.begin_content = false;
            }

            i += 1;
        }
    }
}
