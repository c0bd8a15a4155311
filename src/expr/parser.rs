//! Recursive-descent parser for the arithmetic expression syntax nested
//! inside decisions and leaves of the textual XADD format (`crate::format`).
//!
//! Grammar (precedence low to high):
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := '-' unary | power
//! power  := atom ('^' unary)?
//! atom   := NUMBER | IDENT ('(' expr ')')? | '(' expr ')'
//! ```
//! `IDENT '(' expr ')'` is a unary function call (`sin`, `log`, ...); a bare
//! `IDENT` is a variable reference.

use super::ast::{Expr, UnaryFn};
use super::error::ParseExprError;

pub fn parse_expr(input: &str) -> Result<Expr, ParseExprError> {
    let mut p = Parser::new(input);
    p.skip_ws();
    let e = p.parse_additive()?;
    p.skip_ws();
    if p.pos != p.bytes.len() {
        return Err(p.err(format!("unexpected trailing input {:?}", &input[p.pos..])));
    }
    Ok(e)
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn err(&self, message: String) -> ParseExprError {
        ParseExprError::InvalidSyntax {
            message,
            input: self.input.to_string(),
            position: Some(self.pos),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && (self.bytes[self.pos] as char).is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseExprError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    let rhs = self.parse_multiplicative()?;
                    lhs = lhs.add(&rhs);
                }
                Some(b'-') => {
                    self.pos += 1;
                    let rhs = self.parse_multiplicative()?;
                    lhs = lhs.sub(&rhs);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = lhs.mul(&rhs);
                }
                Some(b'/') => {
                    self.pos += 1;
                    let rhs = self.parse_unary()?;
                    lhs = lhs.div(&rhs);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseExprError> {
        self.skip_ws();
        if self.eat(b'-') {
            return Ok(self.parse_unary()?.neg());
        }
        if self.eat(b'+') {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ParseExprError> {
        let base = self.parse_atom()?;
        self.skip_ws();
        if self.eat(b'^') {
            let exponent = self.parse_unary()?;
            return Ok(base.pow_expr(&exponent));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseExprError> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.parse_additive()?;
                if !self.eat(b')') {
                    return Err(self.err("expected closing ')'".to_string()));
                }
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.parse_ident_or_call(),
            Some(c) => Err(self.err(format!("unexpected character '{}'", c as char))),
            None => Err(self.err("unexpected end of input".to_string())),
        }
    }

    fn parse_number(&mut self) -> Result<Expr, ParseExprError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == b'.')
        {
            self.pos += 1;
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
            }
        }
        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map(Expr::constant)
            .map_err(|e| self.err(format!("invalid number literal '{}': {}", text, e)))
    }

    fn parse_ident(&mut self) -> &'a str {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn parse_ident_or_call(&mut self) -> Result<Expr, ParseExprError> {
        let name = self.parse_ident();
        self.skip_ws();
        if self.peek() == Some(b'(') {
            let func = unary_fn_for(name)
                .ok_or_else(|| self.err(format!("unknown function '{}'", name)))?;
            self.pos += 1;
            let arg = self.parse_additive()?;
            if !self.eat(b')') {
                return Err(self.err("expected closing ')' after function argument".to_string()));
            }
            return Ok(arg.unary(func));
        }
        Ok(Expr::var(name))
    }
}

fn unary_fn_for(name: &str) -> Option<UnaryFn> {
    Some(match name {
        "sin" => UnaryFn::Sin,
        "cos" => UnaryFn::Cos,
        "tan" => UnaryFn::Tan,
        "sinh" => UnaryFn::Sinh,
        "cosh" => UnaryFn::Cosh,
        "tanh" => UnaryFn::Tanh,
        "exp" => UnaryFn::Exp,
        "log" => UnaryFn::Log,
        "log2" => UnaryFn::Log2,
        "log10" => UnaryFn::Log10,
        "log1p" => UnaryFn::Log1p,
        "floor" => UnaryFn::Floor,
        "ceil" => UnaryFn::Ceil,
        "sqrt" => UnaryFn::Sqrt,
        _ => return None,
    })
}

impl std::str::FromStr for Expr {
    type Err = ParseExprError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_expr(s)
    }
}
