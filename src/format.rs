//! Textual XADD format: the whitespace-insensitive S-expression-like
//! grammar for printing and re-parsing a diagram. See spec §6.
//!
//! ```text
//! node    := leaf | internal
//! leaf    := '(' '[' expr ']' ')'
//! internal:= '(' decision high low ')'
//! decision:= '[' ineq ']' | bool-ident
//! ineq    := linear-expr RELOP linear-expr   RELOP ∈ {<=, <, >=, >, ==, !=}
//! ```
//!
//! The first child after a decision is the `high`/true branch, the second is
//! `low`/false — spec.md's own worked examples (§8 S1/S2/S4) only parse
//! consistently under that reading, even though the grammar sketch in spec.md
//! §6 lists `low` before `high` textually.
//!
//! The importer constructs the diagram by recursive descent; every internal
//! node it produces goes through `make_node`, inheriting reduction.

use crate::decision::{Decision, RegisterOutcome, RelOp};
use crate::error::{MalformedDecisionError, XaddError};
use crate::expr::Expr;
use crate::node::{Node, NodeId};
use crate::reduce::make_node_checked;
use crate::store::Store;
use std::fmt::Write as _;

/// Render `id` in the textual grammar.
pub fn print_node(store: &Store, id: NodeId) -> String {
    let mut out = String::new();
    write_node(store, id, &mut out);
    out
}

fn write_node(store: &Store, id: NodeId, out: &mut String) {
    match store.nodes.get(id) {
        Node::Leaf(expr) => {
            let _ = write!(out, "([{}])", expr);
        }
        Node::Internal { decision, low, high } => {
            out.push('(');
            write_decision(store, *decision, out);
            out.push(' ');
            write_node(store, *high, out);
            out.push(' ');
            write_node(store, *low, out);
            out.push(')');
        }
    }
}

fn write_decision(store: &Store, decision: crate::decision::DecisionId, out: &mut String) {
    match store.decisions.get(decision) {
        Decision::BoolAtom(name) => {
            out.push_str(name);
        }
        Decision::Inequality(form) => {
            let _ = write!(out, "[{} <= 0]", form.to_expr());
        }
    }
}

/// Parse a diagram from the textual grammar, interning every node produced
/// along the way (and thereby reducing it).
pub fn parse_node(store: &mut Store, input: &str) -> Result<NodeId, XaddError> {
    let mut p = Parser { bytes: input.as_bytes(), pos: 0, input };
    p.skip_ws();
    let id = p.parse_node(store)?;
    p.skip_ws();
    if p.pos != p.bytes.len() {
        return Err(MalformedDecisionError::UnsupportedRelation {
            relation: format!("unexpected trailing input at byte {}", p.pos),
        }
        .into());
    }
    Ok(id)
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && (self.bytes[self.pos] as char).is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, c: u8) -> Result<(), XaddError> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.syntax_error(format!("expected '{}'", c as char)))
        }
    }

    fn syntax_error(&self, message: String) -> XaddError {
        MalformedDecisionError::UnsupportedRelation {
            relation: format!("{} at byte {} in '{}'", message, self.pos, self.input),
        }
        .into()
    }

    /// Read up to (but not past) a matching top-level `]` or `)`, honoring
    /// nested parens so an expression containing its own `(...)` grouping is
    /// captured whole.
    fn read_bracketed_text(&mut self, close: u8) -> Result<&'a str, XaddError> {
        let start = self.pos;
        let mut depth = 0i32;
        loop {
            match self.peek() {
                None => return Err(self.syntax_error(format!("unterminated, expected '{}'", close as char))),
                Some(b'(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b')') if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(c) if c == close && depth == 0 => {
                    let text = &self.input[start..self.pos];
                    self.pos += 1;
                    return Ok(text);
                }
                _ => self.pos += 1,
            }
        }
    }

    fn parse_node(&mut self, store: &mut Store) -> Result<NodeId, XaddError> {
        self.skip_ws();
        self.expect(b'(')?;
        self.skip_ws();
        if self.peek() == Some(b'[') {
            self.pos += 1;
            let text = self.read_bracketed_text(b']')?;
            let expr: Expr = text.parse()?;
            self.expect(b')')?;
            return Ok(store.nodes.intern_leaf(expr));
        }

        let (dec_id, reversed) = self.parse_decision(store)?;
        let high = self.parse_node(store)?;
        let low = self.parse_node(store)?;
        self.expect(b')')?;
        let (low, high) = if reversed { (high, low) } else { (low, high) };
        make_node_checked(&mut store.nodes, dec_id, low, high)
    }

    fn parse_decision(&mut self, store: &mut Store) -> Result<(crate::decision::DecisionId, bool), XaddError> {
        self.skip_ws();
        if self.peek() == Some(b'[') {
            self.pos += 1;
            let text = self.read_bracketed_text(b']')?;
            let (lhs_text, relop, rhs_text) = split_relation(text, self)?;
            let lhs: Expr = lhs_text.parse()?;
            let rhs: Expr = rhs_text.parse()?;
            let outcome = store.decisions.register_inequality(&lhs, relop, &rhs, true)?;
            return match outcome {
                RegisterOutcome::Registered { id, reversed } => Ok((id, reversed)),
                RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
            };
        }
        let name = self.parse_ident()?;
        match store.decisions.register_bool(name, true)? {
            RegisterOutcome::Registered { id, reversed } => Ok((id, reversed)),
            RegisterOutcome::NotPresent => unreachable!("create=true always registers"),
        }
    }

    fn parse_ident(&mut self) -> Result<&'a str, XaddError> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.syntax_error("expected a boolean identifier".to_string()));
        }
        Ok(&self.input[start..self.pos])
    }
}

/// Split `"lhs RELOP rhs"` on its top-level relation operator. The operator
/// set is closed and checked longest-match-first so `<=` is not mistaken for
/// `<` followed by a dangling `=`.
fn split_relation<'a>(text: &'a str, p: &Parser) -> Result<(&'a str, RelOp, &'a str), XaddError> {
    const OPS: &[(&str, RelOp)] = &[
        ("<=", RelOp::Le),
        (">=", RelOp::Ge),
        ("==", RelOp::Eq),
        ("!=", RelOp::Ne),
        ("<", RelOp::Lt),
        (">", RelOp::Gt),
    ];
    for (symbol, relop) in OPS {
        if let Some(at) = find_top_level(text, symbol) {
            return Ok((&text[..at], *relop, &text[at + symbol.len()..]));
        }
    }
    Err(p.syntax_error(format!("no relation operator found in '{}'", text)))
}

fn find_top_level(text: &str, needle: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let needle_bytes = needle.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i + needle_bytes.len() <= bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
        if depth == 0 && &bytes[i..i + needle_bytes.len()] == needle_bytes {
            return Some(i);
        }
        i += 1;
    }
    None
}
