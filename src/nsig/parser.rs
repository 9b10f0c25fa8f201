//! Snippet parser for the n-token transform grammar
//!
//! The n-transform routine is a real function with locals, arithmetic,
//! branches and array mutation, not a short call table. Rather than a
//! general script evaluator, this parser admits a closed grammar of the
//! constructs observed in deployed player scripts: `var` declarations,
//! (indexed) assignment, `if`/`else`, ternaries, `for`/`while` loops,
//! the whitelisted array/string methods, and arithmetic/bitwise/comparison
//! operators. Everything else fails extraction with the offending construct
//! named — a silent approximation would produce a wrong token that still
//! looks valid downstream.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::DescrambleError;
use crate::nsig::lexer::{self, Tok, Token};
use crate::ops::{BinOp, CallKind, Expr, Op, OpSequence, Target, UnaryOp};
use crate::Result;

/// Extracted n-transform program: entry parameter, statement sequence, and
/// the constant tables the function references from the enclosing snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct NsigProgram {
    pub param: String,
    pub body: OpSequence,
    pub tables: Vec<(String, Expr)>,
}

/// Function heads by structural shape: named, assigned, or anonymous
static ENTRY_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:function\s*[a-zA-Z0-9$_]*|[a-zA-Z0-9$_]+\s*=\s*function)\s*\(\s*([a-zA-Z0-9$_]+)\s*\)\s*\{",
    )
    .expect("valid entry shape regex")
});

/// Keywords that signal a construct outside the supported grammar.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "try", "catch", "finally", "throw", "new", "function", "typeof", "delete", "void", "switch",
    "do", "in", "of", "instanceof", "null", "undefined", "true", "false", "this",
];

/// Parse an n-transform snippet into a program.
///
/// When `entry` is given the function of that name is extracted; otherwise
/// the first function whose body returns a joined string is taken.
pub fn parse(snippet: &str, entry: Option<&str>) -> Result<NsigProgram> {
    let (param, body_src) = locate_entry(snippet, entry)?;
    debug!(param = %param, body_len = body_src.len(), "located n-transform entry");

    let tokens = lexer::lex(&body_src)?;
    let mut parser = Parser::new(tokens);
    let mut ops = Vec::new();
    while !parser.at_eof() {
        parser.parse_stmt(&mut ops)?;
    }

    let mut locals: HashSet<String> = HashSet::new();
    locals.insert(param.clone());
    collect_locals(&ops, &mut locals);

    let mut free = BTreeSet::new();
    collect_free_ops(&ops, &locals, &mut free);

    let mut tables = Vec::new();
    for name in free {
        let expr = resolve_table(snippet, &name)?;
        tables.push((name, expr));
    }
    debug!(ops = ops.len(), tables = tables.len(), "parsed n-transform program");

    Ok(NsigProgram {
        param,
        body: OpSequence::new(ops),
        tables,
    })
}

/// Locate the entry function and return (parameter name, body source).
fn locate_entry(snippet: &str, entry: Option<&str>) -> Result<(String, String)> {
    let shape;
    let re = match entry {
        Some(name) => {
            shape = Regex::new(&format!(
                r"(?:function\s+{0}|(?:var\s+|let\s+|const\s+)?{0}\s*=\s*function)\s*\(\s*([a-zA-Z0-9$_]+)\s*\)\s*\{{",
                regex::escape(name)
            ))?;
            &shape
        }
        None => &*ENTRY_SHAPE,
    };

    for captures in re.captures_iter(snippet) {
        let param = captures[1].to_string();
        let brace = captures.get(0).expect("whole match").end() - 1;
        let body = function_body(snippet, brace)?;

        // Without a name to anchor on, require the structural shape of the
        // transform: it returns the rebuilt token as a joined string.
        if entry.is_some() || (body.contains("return") && body.contains(".join(")) {
            return Ok((param, body.to_string()));
        }
    }

    Err(DescrambleError::extraction(
        "entry",
        match entry {
            Some(name) => format!("function `{}` not found in snippet", name),
            None => "no single-parameter function returning a joined string found".to_string(),
        },
    ))
}

/// Slice out a brace-balanced function body starting at the opening brace.
/// String literals are skipped so braces inside them do not count.
fn function_body(snippet: &str, open_brace: usize) -> Result<&str> {
    let bytes = snippet.as_bytes();
    debug_assert_eq!(bytes[open_brace], b'{');

    let mut depth = 0usize;
    let mut i = open_brace;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&snippet[open_brace + 1..i]);
                }
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    Err(DescrambleError::extraction(
        "entry",
        "unbalanced braces in function body",
    ))
}

/// Locate `var NAME = <literal>;` in the snippet and parse its initializer.
/// Tables must be self-contained literals; a reference to anything else is a
/// construct this grammar does not support.
fn resolve_table(snippet: &str, name: &str) -> Result<Expr> {
    let decl = Regex::new(&format!(
        r"(?:var|let|const)\s+{}\s*=\s*",
        regex::escape(name)
    ))?;
    let m = decl.find(snippet).ok_or_else(|| {
        DescrambleError::extraction(
            "table",
            format!("function references `{}` but no table declaration was found", name),
        )
    })?;

    let init_src = initializer_text(&snippet[m.end()..]).ok_or_else(|| {
        DescrambleError::extraction(
            "table",
            format!("unterminated initializer for table `{}`", name),
        )
    })?;

    let tokens = lexer::lex(init_src)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;

    let mut idents = BTreeSet::new();
    collect_free_expr(&expr, &HashSet::new(), &mut idents);
    if let Some(other) = idents.into_iter().next() {
        return Err(DescrambleError::extraction(
            "table",
            format!("table `{}` is not a literal: it references `{}`", name, other),
        ));
    }

    Ok(expr)
}

/// Initializer text up to the terminating `;` at bracket depth zero.
fn initializer_text(src: &str) -> Option<&str> {
    let bytes = src.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b';' if depth == 0 => return Some(&src[..i]),
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn collect_locals(ops: &[Op], locals: &mut HashSet<String>) {
    for op in ops {
        match op {
            Op::Assign { target, .. } => {
                let (Target::Var(name) | Target::Index(name, _)) = target;
                locals.insert(name.clone());
            }
            Op::Branch { then, otherwise, .. } => {
                collect_locals(then.ops(), locals);
                if let Some(seq) = otherwise {
                    collect_locals(seq.ops(), locals);
                }
            }
            Op::Loop {
                init, step, body, ..
            } => {
                if let Some(op) = init {
                    collect_locals(std::slice::from_ref(op), locals);
                }
                if let Some(op) = step {
                    collect_locals(std::slice::from_ref(op), locals);
                }
                collect_locals(body.ops(), locals);
            }
            _ => {}
        }
    }
}

fn collect_free_ops(ops: &[Op], locals: &HashSet<String>, free: &mut BTreeSet<String>) {
    for op in ops {
        match op {
            Op::Assign { target, value } => {
                if let Target::Index(_, idx) = target {
                    collect_free_expr(idx, locals, free);
                }
                collect_free_expr(value, locals, free);
            }
            Op::Branch {
                cond,
                then,
                otherwise,
            } => {
                collect_free_expr(cond, locals, free);
                collect_free_ops(then.ops(), locals, free);
                if let Some(seq) = otherwise {
                    collect_free_ops(seq.ops(), locals, free);
                }
            }
            Op::Loop {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(op) = init {
                    collect_free_ops(std::slice::from_ref(op), locals, free);
                }
                if let Some(c) = cond {
                    collect_free_expr(c, locals, free);
                }
                if let Some(op) = step {
                    collect_free_ops(std::slice::from_ref(op), locals, free);
                }
                collect_free_ops(body.ops(), locals, free);
            }
            Op::ArraySplice { target, args }
            | Op::ArrayPush { target, args }
            | Op::ArrayUnshift { target, args } => {
                if !locals.contains(target) {
                    free.insert(target.clone());
                }
                for a in args {
                    collect_free_expr(a, locals, free);
                }
            }
            Op::Eval(e) | Op::Return(e) => collect_free_expr(e, locals, free),
            Op::Reverse | Op::RemovePrefix(_) | Op::SwapWithFirst(_) => {}
        }
    }
}

fn collect_free_expr(expr: &Expr, locals: &HashSet<String>, free: &mut BTreeSet<String>) {
    match expr {
        Expr::Ident(name) => {
            if !locals.contains(name) {
                free.insert(name.clone());
            }
        }
        Expr::Num(_) | Expr::Str(_) => {}
        Expr::Array(items) => {
            for item in items {
                collect_free_expr(item, locals, free);
            }
        }
        Expr::Unary(_, inner) | Expr::Length(inner) => collect_free_expr(inner, locals, free),
        Expr::Binary(_, lhs, rhs) => {
            collect_free_expr(lhs, locals, free);
            collect_free_expr(rhs, locals, free);
        }
        Expr::Ternary(cond, then, otherwise) => {
            collect_free_expr(cond, locals, free);
            collect_free_expr(then, locals, free);
            collect_free_expr(otherwise, locals, free);
        }
        Expr::Index(recv, idx) => {
            collect_free_expr(recv, locals, free);
            collect_free_expr(idx, locals, free);
        }
        Expr::Call { recv, args, .. } => {
            if let Some(recv) = recv {
                collect_free_expr(recv, locals, free);
            }
            for arg in args {
                collect_free_expr(arg, locals, free);
            }
        }
    }
}

/// Recursive-descent parser over the lexed token stream.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].tok
    }

    fn peek_pos(&self) -> usize {
        self.tokens[self.pos].pos
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Tok::Eof)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].tok.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn is_punct(&self, p: &str) -> bool {
        matches!(self.peek(), Tok::Punct(q) if *q == p)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.err(format!("expected `{}`, found {:?}", p, self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek() {
            Tok::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.err(format!("expected identifier, found {:?}", other))),
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.err(format!("trailing input: {:?}", self.peek())))
        }
    }

    fn err(&self, detail: String) -> DescrambleError {
        DescrambleError::extraction("grammar", format!("{} (byte {})", detail, self.peek_pos()))
    }

    /// Optional statement terminator: `;`, or implicitly a closing brace.
    fn semi(&mut self) -> Result<()> {
        if self.eat_punct(";") || self.is_punct("}") || self.at_eof() {
            Ok(())
        } else {
            Err(self.err(format!("expected `;`, found {:?}", self.peek())))
        }
    }

    // ----- statements -----

    fn parse_stmt(&mut self, out: &mut Vec<Op>) -> Result<()> {
        if let Tok::Ident(word) = self.peek() {
            match word.as_str() {
                "var" | "let" | "const" => {
                    self.advance();
                    self.parse_declarators(out)?;
                    return self.semi();
                }
                "if" => return self.parse_if(out),
                "while" => return self.parse_while(out),
                "for" => return self.parse_for(out),
                "return" => {
                    self.advance();
                    let value = self.parse_expr()?;
                    out.push(Op::Return(value));
                    return self.semi();
                }
                kw if UNSUPPORTED_KEYWORDS.contains(&kw) => {
                    return Err(self.err(format!("unsupported construct `{}`", kw)));
                }
                _ => {}
            }
        }

        // Stray semicolons are harmless
        if self.eat_punct(";") {
            return Ok(());
        }

        let op = self.parse_simple_stmt()?;
        out.push(op);
        self.semi()
    }

    /// `a = 1, b = 2, ...` after a `var`/`let`/`const` keyword.
    fn parse_declarators(&mut self, out: &mut Vec<Op>) -> Result<()> {
        loop {
            let name = self.expect_ident()?;
            self.expect_punct("=")?;
            let value = self.parse_expr()?;
            out.push(Op::Assign {
                target: Target::Var(name),
                value,
            });
            if !self.eat_punct(",") {
                return Ok(());
            }
        }
    }

    fn parse_if(&mut self, out: &mut Vec<Op>) -> Result<()> {
        self.advance(); // `if`
        self.expect_punct("(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(")")?;
        let then = self.parse_block_or_stmt()?;

        let otherwise = if matches!(self.peek(), Tok::Ident(w) if w == "else") {
            self.advance();
            Some(self.parse_block_or_stmt()?)
        } else {
            None
        };

        out.push(Op::Branch {
            cond,
            then,
            otherwise,
        });
        Ok(())
    }

    fn parse_while(&mut self, out: &mut Vec<Op>) -> Result<()> {
        self.advance(); // `while`
        self.expect_punct("(")?;
        let cond = self.parse_expr()?;
        self.expect_punct(")")?;
        let body = self.parse_block_or_stmt()?;

        out.push(Op::Loop {
            init: None,
            cond: Some(cond),
            step: None,
            body,
        });
        Ok(())
    }

    fn parse_for(&mut self, out: &mut Vec<Op>) -> Result<()> {
        self.advance(); // `for`
        self.expect_punct("(")?;

        // Multiple init declarators run once, in order, before the loop
        let init = if self.is_punct(";") {
            None
        } else {
            let mut inits = Vec::new();
            if matches!(self.peek(), Tok::Ident(w) if w == "var" || w == "let" || w == "const") {
                self.advance();
                self.parse_declarators(&mut inits)?;
            } else {
                inits.push(self.parse_simple_stmt()?);
            }
            let last = inits.pop().map(Box::new);
            out.extend(inits);
            last
        };
        self.expect_punct(";")?;

        let cond = if self.is_punct(";") {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(";")?;

        let step = if self.is_punct(")") {
            None
        } else {
            Some(Box::new(self.parse_simple_stmt()?))
        };
        self.expect_punct(")")?;

        let body = self.parse_block_or_stmt()?;
        out.push(Op::Loop {
            init,
            cond,
            step,
            body,
        });
        Ok(())
    }

    fn parse_block_or_stmt(&mut self) -> Result<OpSequence> {
        let mut ops = Vec::new();
        if self.eat_punct("{") {
            while !self.is_punct("}") {
                if self.at_eof() {
                    return Err(self.err("unterminated block".to_string()));
                }
                self.parse_stmt(&mut ops)?;
            }
            self.advance(); // `}`
        } else {
            self.parse_stmt(&mut ops)?;
        }
        Ok(OpSequence::new(ops))
    }

    /// A statement without control flow: (compound/indexed) assignment,
    /// increment/decrement, or a bare side-effecting call.
    fn parse_simple_stmt(&mut self) -> Result<Op> {
        // Prefix increment/decrement
        for (punct, op) in [("++", BinOp::Add), ("--", BinOp::Sub)] {
            if self.is_punct(punct) {
                self.advance();
                let name = self.expect_ident()?;
                return Ok(incr_op(name, op));
            }
        }

        let expr = self.parse_expr()?;

        if self.eat_punct("=") {
            let target = self.expr_to_target(expr)?;
            let value = self.parse_expr()?;
            return Ok(Op::Assign { target, value });
        }

        for (punct, op) in [("+=", BinOp::Add), ("-=", BinOp::Sub)] {
            if self.is_punct(punct) {
                self.advance();
                let target = self.expr_to_target(expr)?;
                let value = self.parse_expr()?;
                let current = target_to_expr(&target);
                return Ok(Op::Assign {
                    target,
                    value: Expr::Binary(op, Box::new(current), Box::new(value)),
                });
            }
        }

        for (punct, op) in [("++", BinOp::Add), ("--", BinOp::Sub)] {
            if self.is_punct(punct) {
                self.advance();
                match expr {
                    Expr::Ident(name) => return Ok(incr_op(name, op)),
                    other => {
                        return Err(self.err(format!(
                            "unsupported increment target {:?}",
                            other
                        )))
                    }
                }
            }
        }

        // Bare expression statement: the named mutators get their own
        // operation kinds, everything else is a generic eval.
        if let Expr::Call {
            recv: Some(recv),
            kind,
            args,
        } = &expr
        {
            if let Expr::Ident(name) = recv.as_ref() {
                let stmt = match kind {
                    CallKind::Splice => Some(Op::ArraySplice {
                        target: name.clone(),
                        args: args.clone(),
                    }),
                    CallKind::Push => Some(Op::ArrayPush {
                        target: name.clone(),
                        args: args.clone(),
                    }),
                    CallKind::Unshift => Some(Op::ArrayUnshift {
                        target: name.clone(),
                        args: args.clone(),
                    }),
                    _ => None,
                };
                if let Some(stmt) = stmt {
                    return Ok(stmt);
                }
            }
        }

        Ok(Op::Eval(expr))
    }

    fn expr_to_target(&self, expr: Expr) -> Result<Target> {
        match expr {
            Expr::Ident(name) => Ok(Target::Var(name)),
            Expr::Index(recv, idx) => match *recv {
                Expr::Ident(name) => Ok(Target::Index(name, *idx)),
                other => Err(self.err(format!("unsupported assignment target {:?}", other))),
            },
            other => Err(self.err(format!("unsupported assignment target {:?}", other))),
        }
    }

    // ----- expressions -----

    fn parse_expr(&mut self) -> Result<Expr> {
        let cond = self.parse_binary(0)?;
        if self.eat_punct("?") {
            let then = self.parse_expr()?;
            self.expect_punct(":")?;
            let otherwise = self.parse_expr()?;
            return Ok(Expr::Ternary(
                Box::new(cond),
                Box::new(then),
                Box::new(otherwise),
            ));
        }
        Ok(cond)
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;

        loop {
            let (bp, op) = match self.peek() {
                Tok::Punct(p) => match binding_power(p) {
                    Some(entry) => entry,
                    None => break,
                },
                _ => break,
            };
            if bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(bp + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        for (punct, op) in [
            ("-", UnaryOp::Neg),
            ("!", UnaryOp::Not),
            ("~", UnaryOp::BitNot),
        ] {
            if self.is_punct(punct) {
                self.advance();
                let inner = self.parse_unary()?;
                return Ok(Expr::Unary(op, Box::new(inner)));
            }
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.eat_punct(".") {
                let member = self.expect_ident()?;
                expr = self.parse_member(expr, &member)?;
            } else if self.eat_punct("[") {
                let idx = self.parse_expr()?;
                self.expect_punct("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(idx));
            } else if self.is_punct("(") {
                // Only the whitelisted methods are callable; a free function
                // call is outside the grammar.
                return Err(self.err(format!("call to unsupported function {:?}", expr)));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn parse_member(&mut self, recv: Expr, member: &str) -> Result<Expr> {
        if member == "length" {
            return Ok(Expr::Length(Box::new(recv)));
        }

        if member == "fromCharCode" {
            if !matches!(&recv, Expr::Ident(name) if name == "String") {
                return Err(self.err("fromCharCode is only supported on String".to_string()));
            }
            let args = self.parse_args()?;
            return Ok(Expr::Call {
                recv: None,
                kind: CallKind::FromCharCode,
                args,
            });
        }

        let kind = CallKind::from_method_name(member)
            .ok_or_else(|| self.err(format!("unsupported method `{}`", member)))?;
        if !self.is_punct("(") {
            return Err(self.err(format!("method `{}` used without a call", member)));
        }
        let args = self.parse_args()?;
        Ok(Expr::Call {
            recv: Some(Box::new(recv)),
            kind,
            args,
        })
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        if self.eat_punct(")") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat_punct(")") {
                return Ok(args);
            }
            self.expect_punct(",")?;
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().clone() {
            Tok::Num(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Tok::Ident(name) => {
                if UNSUPPORTED_KEYWORDS.contains(&name.as_str()) {
                    return Err(self.err(format!("unsupported construct `{}`", name)));
                }
                self.advance();
                Ok(Expr::Ident(name))
            }
            Tok::Punct("(") => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(expr)
            }
            Tok::Punct("[") => {
                self.advance();
                let mut items = Vec::new();
                if self.eat_punct("]") {
                    return Ok(Expr::Array(items));
                }
                loop {
                    items.push(self.parse_expr()?);
                    if self.eat_punct("]") {
                        return Ok(Expr::Array(items));
                    }
                    self.expect_punct(",")?;
                }
            }
            other => Err(self.err(format!("unexpected token {:?}", other))),
        }
    }
}

/// `i++` / `i--` desugared to an assignment.
fn incr_op(name: String, op: BinOp) -> Op {
    Op::Assign {
        target: Target::Var(name.clone()),
        value: Expr::Binary(op, Box::new(Expr::Ident(name)), Box::new(Expr::Num(1.0))),
    }
}

fn target_to_expr(target: &Target) -> Expr {
    match target {
        Target::Var(name) => Expr::Ident(name.clone()),
        Target::Index(name, idx) => Expr::Index(
            Box::new(Expr::Ident(name.clone())),
            Box::new(idx.clone()),
        ),
    }
}

/// Binding power and operator for infix puncts; JS precedence order.
fn binding_power(p: &str) -> Option<(u8, BinOp)> {
    Some(match p {
        "||" => (1, BinOp::Or),
        "&&" => (2, BinOp::And),
        "|" => (3, BinOp::BitOr),
        "^" => (4, BinOp::BitXor),
        "&" => (5, BinOp::BitAnd),
        "==" => (6, BinOp::Eq),
        "!=" => (6, BinOp::Ne),
        "===" => (6, BinOp::StrictEq),
        "!==" => (6, BinOp::StrictNe),
        "<" => (7, BinOp::Lt),
        ">" => (7, BinOp::Gt),
        "<=" => (7, BinOp::Le),
        ">=" => (7, BinOp::Ge),
        "<<" => (8, BinOp::Shl),
        ">>" => (8, BinOp::Shr),
        ">>>" => (8, BinOp::UShr),
        "+" => (9, BinOp::Add),
        "-" => (9, BinOp::Sub),
        "*" => (10, BinOp::Mul),
        "/" => (10, BinOp::Div),
        "%" => (10, BinOp::Mod),
        _ => return None,
    })
}
