//! Clause-level parsing of scanned table bodies.
//!
//! Phase two of extraction: each statement body is split on
//! comma-followed-by-newline boundaries and the resulting clauses are read
//! independently. This is a clause-level split, not an expression parser;
//! clauses must not embed a literal `,` followed by a newline.

use super::scanner::{Scanner, Statement};
use crate::diag::{DiagKind, Diagnostic};
use crate::model::{ReferenceDeclaration, SchemaModel, Table};

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub model: SchemaModel,
    pub references: Vec<ReferenceDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans raw DDL text into a `SchemaModel` plus the foreign-key
/// declarations found along the way.
///
/// Carries no state between calls; each `extract` is pure in its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaExtractor;

impl SchemaExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, input: &str) -> Extraction {
        let mut diagnostics = Vec::new();
        let statements = Scanner::new(input).scan(&mut diagnostics);

        let mut model = SchemaModel::new();
        let mut references = Vec::new();

        for stmt in statements {
            if model.contains(&stmt.name) {
                // First definition wins; the duplicate contributes neither
                // columns nor references.
                diagnostics.push(Diagnostic::new(
                    DiagKind::DuplicateTable,
                    format!("line {}", stmt.line),
                    format!(
                        "table `{}` is already defined; keeping the first definition",
                        stmt.name
                    ),
                ));
                continue;
            }
            let (table, refs) = parse_body(&stmt, &mut diagnostics);
            references.extend(refs);
            model.insert(table);
        }

        Extraction {
            model,
            references,
            diagnostics,
        }
    }
}

fn parse_body(
    stmt: &Statement,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Table, Vec<ReferenceDeclaration>) {
    let mut primary_key: Option<String> = None;
    let mut columns: Vec<String> = Vec::new();
    let mut references = Vec::new();

    let body = stmt.body.replace("\r\n", "\n");
    for clause in body.split(",\n") {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        if is_foreign_key_clause(clause) {
            if let Some(decl) = parse_foreign_key(clause, &stmt.name) {
                references.push(decl);
            }
            continue;
        }

        let Some(name) = leading_identifier(clause) else {
            continue;
        };

        if primary_key.is_none() && is_integer_primary_key(clause, name) {
            primary_key = Some(name.to_string());
        }

        if columns.iter().any(|c| c == name) {
            diagnostics.push(Diagnostic::new(
                DiagKind::DuplicateColumn,
                format!("table `{}`", stmt.name),
                format!("column `{}` declared more than once; keeping the first", name),
            ));
            continue;
        }
        columns.push(name.to_string());
    }

    (
        Table {
            name: stmt.name.clone(),
            primary_key,
            columns,
        },
        references,
    )
}

/// `<ident> INTEGER PRIMARY KEY`, keyword tokens case-sensitive, trailing
/// modifiers tolerated.
fn is_integer_primary_key(clause: &str, name: &str) -> bool {
    let mut tokens = clause.split_whitespace();
    tokens.next() == Some(name)
        && tokens.next() == Some("INTEGER")
        && tokens.next() == Some("PRIMARY")
        && tokens.next() == Some("KEY")
}

fn is_foreign_key_clause(clause: &str) -> bool {
    let mut tokens = clause.split_whitespace();
    tokens.next() == Some("FOREIGN") && tokens.next().is_some_and(|t| t.starts_with("KEY"))
}

/// `FOREIGN KEY (<col>) REFERENCES <table>(<col>)`, whitespace tolerated
/// around punctuation. A clause that does not complete the shape yields
/// nothing, mirroring the column-harvest tolerance.
fn parse_foreign_key(clause: &str, source_table: &str) -> Option<ReferenceDeclaration> {
    let mut cur = Cursor::new(clause);
    cur.keyword("FOREIGN")?;
    cur.keyword("KEY")?;
    cur.punct(b'(')?;
    let source_column = cur.identifier()?;
    cur.punct(b')')?;
    cur.keyword("REFERENCES")?;
    let target_table = cur.identifier()?;
    cur.punct(b'(')?;
    let target_column = cur.identifier()?;
    cur.punct(b')')?;

    Some(ReferenceDeclaration {
        source_table: source_table.to_string(),
        source_column,
        target_table,
        target_column,
    })
}

fn leading_identifier(clause: &str) -> Option<&str> {
    let bytes = clause.as_bytes();
    if !(bytes[0].is_ascii_alphabetic() || bytes[0] == b'_') {
        return None;
    }
    let end = bytes
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'_'))
        .unwrap_or(bytes.len());
    Some(&clause[..end])
}

/// Minimal cursor over one clause.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn bytes(&self) -> &[u8] {
        self.src.as_bytes()
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes()
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn keyword(&mut self, word: &str) -> Option<()> {
        self.skip_whitespace();
        let rest = &self.src[self.pos..];
        if !rest.starts_with(word) {
            return None;
        }
        let after = rest.as_bytes().get(word.len());
        if after.is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        self.pos += word.len();
        Some(())
    }

    fn punct(&mut self, b: u8) -> Option<()> {
        self.skip_whitespace();
        if self.bytes().get(self.pos) == Some(&b) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn identifier(&mut self) -> Option<String> {
        self.skip_whitespace();
        let first = *self.bytes().get(self.pos)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        while self
            .bytes()
            .get(self.pos)
            .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        Some(self.src[start..self.pos].to_string())
    }
}
