//! Statement envelope scanning.
//!
//! Phase one of extraction: locate every `CREATE TABLE <name> ( <body> );`
//! block in the input without interpreting clause contents. Envelopes that
//! do not complete are skipped with a warning and scanning continues, so one
//! bad statement never hides the rest of the file.

use crate::diag::{DiagKind, Diagnostic};

/// One well-formed statement envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    /// Raw text between the outer parentheses.
    pub body: String,
    /// 1-based line of the `CREATE` keyword.
    pub line: usize,
}

pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    /// Collect every statement envelope, warning about malformed ones.
    pub fn scan(&mut self, diagnostics: &mut Vec<Diagnostic>) -> Vec<Statement> {
        let mut statements = Vec::new();

        while let Some(start) = self.find_keyword() {
            let resume = self.pos;
            let line = self.line_of(start);
            match self.scan_envelope(line) {
                Ok(stmt) => statements.push(stmt),
                Err(reason) => {
                    diagnostics.push(Diagnostic::new(
                        DiagKind::MalformedStatement,
                        format!("line {}", line),
                        format!("skipping malformed CREATE TABLE statement: {}", reason),
                    ));
                    self.pos = resume;
                }
            }
        }

        statements
    }

    /// Find the next `CREATE TABLE` keyword pair at a word boundary.
    /// Leaves `pos` just past `TABLE` and returns the offset of `CREATE`.
    fn find_keyword(&mut self) -> Option<usize> {
        loop {
            let rel = self.src[self.pos..].find("CREATE")?;
            let start = self.pos + rel;
            self.pos = start + "CREATE".len();

            if start > 0 && is_ident_byte(self.bytes[start - 1]) {
                continue;
            }
            let ws_end = self.skip_whitespace_from(self.pos);
            if ws_end == self.pos || !self.src[ws_end..].starts_with("TABLE") {
                continue;
            }
            let after = ws_end + "TABLE".len();
            if self.bytes.get(after).is_some_and(|&b| is_ident_byte(b)) {
                continue;
            }
            self.pos = after;
            return Some(start);
        }
    }

    /// Parse `<name> ( <body> );` starting just past the keyword.
    fn scan_envelope(&mut self, line: usize) -> Result<Statement, &'static str> {
        self.skip_whitespace();
        let name = self.read_identifier().ok_or("expected table name")?;
        self.skip_whitespace();
        if !self.eat(b'(') {
            return Err("expected `(` after table name");
        }

        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        let body = self.src[body_start..self.pos].to_string();
                        self.pos += 1;
                        self.skip_whitespace();
                        if !self.eat(b';') {
                            return Err("expected `;` after closing `)`");
                        }
                        return Ok(Statement { name, body, line });
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err("unterminated table body")
    }

    fn skip_whitespace(&mut self) {
        self.pos = self.skip_whitespace_from(self.pos);
    }

    fn skip_whitespace_from(&self, mut pos: usize) -> usize {
        while self.bytes.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
            pos += 1;
        }
        pos
    }

    fn read_identifier(&mut self) -> Option<String> {
        let first = *self.bytes.get(self.pos)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        while self.bytes.get(self.pos).is_some_and(|&b| is_ident_byte(b)) {
            self.pos += 1;
        }
        Some(self.src[start..self.pos].to_string())
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.bytes[..offset].iter().filter(|&&b| b == b'\n').count() + 1
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
