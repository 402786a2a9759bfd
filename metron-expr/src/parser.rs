//! Formula parser
//!
//! The allow-list gate runs before anything else, then a small tokenizer
//! feeds a recursive descent parser. Precedence, lowest first:
//! `+ -`, `* / %`, unary `+ -`, `^` (right associative).

use crate::ast::{BinOp, Expr, Function, UnaryOp};
use crate::ExprError;
use metron_core::Number;

const MAX_DEPTH: usize = 64;

/// Operator and punctuation characters accepted by the gate
const ALLOWED_SYMBOLS: &str = "_+-*/().,^%";

/// Reject anything outside `[0-9a-zA-Z_\s+\-*/().,^%]`
pub fn check_allowed(input: &str) -> Result<(), ExprError> {
    for (position, ch) in input.chars().enumerate() {
        let allowed = ch.is_ascii_alphanumeric()
            || ch.is_ascii_whitespace()
            || ALLOWED_SYMBOLS.contains(ch);
        if !allowed {
            return Err(ExprError::ForbiddenCharacter { ch, position });
        }
    }
    Ok(())
}

/// Parse a formula into an expression tree
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    check_allowed(input)?;

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let expr = parser.parse_additive()?;

    if let Some(token) = parser.peek() {
        return Err(ExprError::Syntax(format!("unexpected {}", token.describe())));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Ident(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number '{}'", n),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Op(c) => format!("operator '{}'", c),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_ascii_whitespace() => {
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent only when digits follow: 1e5, 2.5E-3
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                if literal.matches('.').count() > 1 || literal == "." {
                    return Err(ExprError::Syntax(format!("malformed number '{}'", literal)));
                }
                if i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '_') {
                    return Err(ExprError::Syntax(format!(
                        "unexpected '{}' after number '{}'", chars[i], literal
                    )));
                }
                tokens.push(Token::Number(literal));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            other => {
                return Err(ExprError::ForbiddenCharacter { ch: other, position: i });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(c)) if ops.contains(c) => {
                let c = *c;
                self.pos += 1;
                Some(c)
            }
            _ => None,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExprError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ExprError::Syntax(format!(
                "expected {}, found {}", expected.describe(), token.describe()
            ))),
            None => Err(ExprError::Syntax(format!(
                "expected {}, found end of formula", expected.describe()
            ))),
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(c) = self.eat_op(&['+', '-']) {
            let op = if c == '+' { BinOp::Add } else { BinOp::Sub };
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        while let Some(c) = self.eat_op(&['*', '/', '%']) {
            let op = match c {
                '*' => BinOp::Mul,
                '/' => BinOp::Div,
                _ => BinOp::Rem,
            };
            let right = self.parse_unary()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if let Some(c) = self.eat_op(&['+', '-']) {
            self.enter()?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            let op = if c == '+' { UnaryOp::Plus } else { UnaryOp::Neg };
            return Ok(Expr::UnaryOp(op, Box::new(operand)));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        if self.eat_op(&['^']).is_some() {
            self.enter()?;
            // Right side goes through unary so 2^-1 and 2^3^2 both work
            let exponent = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::BinaryOp(Box::new(base), BinOp::Pow, Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Number(literal)) => {
                let n = Number::from_str(&literal)
                    .map_err(|_| ExprError::Syntax(format!("malformed number '{}'", literal)))?;
                Ok(Expr::Number(n))
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let func = Function::from_name(&name)
                        .ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                    self.enter()?;
                    let args = self.parse_args()?;
                    self.depth -= 1;
                    check_arity(func, args.len())?;
                    return Ok(Expr::FunctionCall(func, args));
                }
                if name.eq_ignore_ascii_case("x") {
                    Ok(Expr::Variable)
                } else {
                    Err(ExprError::UnknownIdentifier(name))
                }
            }
            Some(Token::LParen) => {
                self.enter()?;
                let inner = self.parse_additive()?;
                self.depth -= 1;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(token) => Err(ExprError::Syntax(format!("unexpected {}", token.describe()))),
            None => Err(ExprError::Syntax("unexpected end of formula".to_string())),
        }
    }

    /// Arguments after the opening parenthesis, consuming the closing one
    fn parse_args(&mut self) -> Result<Vec<Expr>, ExprError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_additive()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                Some(token) => {
                    return Err(ExprError::Syntax(format!(
                        "expected ',' or ')', found {}", token.describe()
                    )))
                }
                None => return Err(ExprError::Syntax("unclosed function call".to_string())),
            }
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        Ok(())
    }
}

fn check_arity(func: Function, got: usize) -> Result<(), ExprError> {
    let (min, max) = func.arity();
    let ok = got >= min && max.map_or(true, |m| got <= m);
    if ok {
        return Ok(());
    }
    let expected = match max {
        Some(m) if m == min => min.to_string(),
        Some(m) => format!("{}-{}", min, m),
        None => format!("at least {}", min),
    };
    Err(ExprError::ArgCount { func: func.name(), expected, got })
}
