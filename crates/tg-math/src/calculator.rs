//! Arithmetic expression evaluator.
//!
//! A small recursive-descent parser over
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | '+' unary | power
//! power   := primary ('^' unary)?
//! primary := number | name | name '(' expr ')' | '(' expr ')'
//! ```
//!
//! `^` is right associative and binds tighter than unary minus, so `-2^2`
//! is `-4`. Names resolve first to the caller's variables, then to the
//! constants `pi` and `e`. Nesting of parentheses, calls and signs is
//! limited to [`MAX_DEPTH`] levels.

use tg_core::{
    errors::{Error, Result},
    Real,
};

/// Deepest nesting `eval` accepts.
pub const MAX_DEPTH: usize = 200;

/// Evaluate `expr` with the given variable bindings.
///
/// # Example
/// ```
/// use tg_math::calculator::eval;
/// let v = eval("2 * i + 1", &[("i", 3.0)]).unwrap();
/// assert_eq!(v, 7.0);
/// ```
///
/// # Errors
/// `Error::Parse` on malformed input, unknown names, unknown functions or
/// nesting deeper than [`MAX_DEPTH`].
pub fn eval(expr: &str, vars: &[(&str, Real)]) -> Result<Real> {
    let mut p = Parser {
        src: expr.as_bytes(),
        pos: 0,
        depth: 0,
        vars,
    };
    let v = p.expr()?;
    p.skip_ws();
    if p.pos != p.src.len() {
        return Err(p.error("unexpected trailing input"));
    }
    Ok(v)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: usize,
    vars: &'a [(&'a str, Real)],
}

impl Parser<'_> {
    fn error(&self, what: &str) -> Error {
        Error::Parse(format!(
            "{what} at position {} in '{}'",
            self.pos,
            String::from_utf8_lossy(self.src)
        ))
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Real> {
        let mut v = self.term()?;
        loop {
            if self.eat(b'+') {
                v += self.term()?;
            } else if self.eat(b'-') {
                v -= self.term()?;
            } else {
                return Ok(v);
            }
        }
    }

    fn term(&mut self) -> Result<Real> {
        let mut v = self.unary()?;
        loop {
            if self.eat(b'*') {
                v *= self.unary()?;
            } else if self.eat(b'/') {
                v /= self.unary()?;
            } else {
                return Ok(v);
            }
        }
    }

    fn unary(&mut self) -> Result<Real> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(&format!("nesting deeper than {MAX_DEPTH} levels")));
        }
        self.depth += 1;
        let v = self.signed();
        self.depth -= 1;
        v
    }

    fn signed(&mut self) -> Result<Real> {
        if self.eat(b'-') {
            Ok(-self.unary()?)
        } else if self.eat(b'+') {
            self.unary()
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> Result<Real> {
        let base = self.primary()?;
        if self.eat(b'^') {
            let exp = self.unary()?;
            Ok(base.powf(exp))
        } else {
            Ok(base)
        }
    }

    fn primary(&mut self) -> Result<Real> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let v = self.expr()?;
                if !self.eat(b')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(v)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                let name = self.name();
                if self.eat(b'(') {
                    let arg = self.expr()?;
                    if !self.eat(b')') {
                        return Err(self.error("expected ')' after function argument"));
                    }
                    apply(&name, arg).ok_or_else(|| self.error(&format!("unknown function '{name}'")))
                } else {
                    self.lookup(&name)
                }
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn number(&mut self) -> Result<Real> {
        let start = self.pos;
        while self.pos < self.src.len()
            && (self.src[self.pos].is_ascii_digit() || self.src[self.pos] == b'.')
        {
            self.pos += 1;
        }
        if self.pos < self.src.len() && matches!(self.src[self.pos], b'e' | b'E') {
            let mark = self.pos;
            self.pos += 1;
            if self.pos < self.src.len() && matches!(self.src[self.pos], b'+' | b'-') {
                self.pos += 1;
            }
            if self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
                while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            } else {
                // no digits after the marker: not an exponent
                self.pos = mark;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;
        text.parse::<Real>()
            .map_err(|_| self.error(&format!("invalid number '{text}'")))
    }

    fn name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.src.len()
            && (self.src[self.pos].is_ascii_alphanumeric() || self.src[self.pos] == b'_')
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.src[start..self.pos]).into_owned()
    }

    fn lookup(&self, name: &str) -> Result<Real> {
        if let Some((_, v)) = self.vars.iter().find(|(n, _)| *n == name) {
            return Ok(*v);
        }
        match name {
            "pi" => Ok(std::f64::consts::PI),
            "e" => Ok(std::f64::consts::E),
            _ => Err(self.error(&format!("unknown variable '{name}'"))),
        }
    }
}

fn apply(name: &str, x: Real) -> Option<Real> {
    Some(match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "exp" => x.exp(),
        "log" | "ln" => x.ln(),
        "log10" => x.log10(),
        "sqrt" => x.sqrt(),
        "abs" => x.abs(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        _ => return None,
    })
}
