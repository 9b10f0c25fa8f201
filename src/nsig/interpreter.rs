//! Tree-walking interpreter for extracted n-transform programs
//!
//! Evaluates the statement sequence against a scope seeded with the input
//! token and the constant tables captured at extraction time. Numeric
//! behavior mirrors the platform's script engine: `f64` arithmetic, ToInt32/
//! ToUint32 wraparound for bitwise and shift operators, string concatenation
//! for `+` when either side is a string. A hard step ceiling bounds
//! worst-case latency against a defective extraction; exceeding it is an
//! [`InterpreterFault`](crate::DescrambleError::InterpreterFault), as is any
//! runtime value the grammar cannot account for.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::DescrambleError;
use crate::nsig::parser::NsigProgram;
use crate::ops::{BinOp, CallKind, Expr, Op, OpSequence, Target, UnaryOp};
use crate::Result;

/// Evaluation steps allowed per transform. Generous for real programs
/// (observed transforms run low thousands of steps) while still bounding a
/// runaway loop to well under a second.
pub const STEP_CEILING: u64 = 1 << 20;

/// Runtime value of the restricted script model
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
    Bool(bool),
    Arr(Vec<Value>),
    Undefined,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Arr(_) => "array",
            Value::Undefined => "undefined",
        }
    }
}

/// Run a program against an input token and return the transformed token.
pub fn run(program: &NsigProgram, token: &str) -> Result<String> {
    let mut cx = Context::new();

    for (name, expr) in &program.tables {
        let value = cx.eval(expr)?;
        cx.scope.insert(name.clone(), value);
    }
    cx.scope
        .insert(program.param.clone(), Value::Str(token.to_string()));

    let result = cx.exec_seq(&program.body)?;
    debug!(steps = STEP_CEILING - cx.budget, "n-transform program finished");

    match result {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(fault(format!(
            "program returned a {}, expected a string",
            other.type_name()
        ))),
        None => Err(fault("program finished without returning a value")),
    }
}

fn fault(detail: impl Into<String>) -> DescrambleError {
    DescrambleError::InterpreterFault(detail.into())
}

struct Context {
    scope: HashMap<String, Value>,
    budget: u64,
}

impl Context {
    fn new() -> Self {
        Context {
            scope: HashMap::new(),
            budget: STEP_CEILING,
        }
    }

    fn step(&mut self) -> Result<()> {
        if self.budget == 0 {
            return Err(fault(format!(
                "step ceiling of {} exceeded",
                STEP_CEILING
            )));
        }
        self.budget -= 1;
        Ok(())
    }

    /// Execute a sequence; `Some` carries an encountered return value.
    fn exec_seq(&mut self, seq: &OpSequence) -> Result<Option<Value>> {
        for op in seq {
            if let Some(value) = self.exec(op)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn exec(&mut self, op: &Op) -> Result<Option<Value>> {
        self.step()?;
        trace!(?op, "executing op");

        match op {
            Op::Assign { target, value } => {
                let value = self.eval(value)?;
                self.store(target, value)?;
            }
            Op::Branch {
                cond,
                then,
                otherwise,
            } => {
                let taken = truthy(&self.eval(cond)?);
                if taken {
                    if let Some(v) = self.exec_seq(then)? {
                        return Ok(Some(v));
                    }
                } else if let Some(seq) = otherwise {
                    if let Some(v) = self.exec_seq(seq)? {
                        return Ok(Some(v));
                    }
                }
            }
            Op::Loop {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    if let Some(v) = self.exec(init)? {
                        return Ok(Some(v));
                    }
                }
                loop {
                    self.step()?;
                    if let Some(cond) = cond {
                        if !truthy(&self.eval(cond)?) {
                            break;
                        }
                    }
                    if let Some(v) = self.exec_seq(body)? {
                        return Ok(Some(v));
                    }
                    if let Some(step) = step {
                        if let Some(v) = self.exec(step)? {
                            return Ok(Some(v));
                        }
                    }
                }
            }
            Op::ArraySplice { target, args } => {
                let args = self.eval_args(args)?;
                self.mutate_call(target, CallKind::Splice, args)?;
            }
            Op::ArrayPush { target, args } => {
                let args = self.eval_args(args)?;
                self.mutate_call(target, CallKind::Push, args)?;
            }
            Op::ArrayUnshift { target, args } => {
                let args = self.eval_args(args)?;
                self.mutate_call(target, CallKind::Unshift, args)?;
            }
            Op::Eval(expr) => {
                self.eval(expr)?;
            }
            Op::Return(expr) => {
                let value = self.eval(expr)?;
                return Ok(Some(value));
            }
            Op::Reverse | Op::RemovePrefix(_) | Op::SwapWithFirst(_) => {
                return Err(fault(format!(
                    "signature operation {:?} inside an n-token program",
                    op
                )));
            }
        }
        Ok(None)
    }

    fn store(&mut self, target: &Target, value: Value) -> Result<()> {
        match target {
            Target::Var(name) => {
                self.scope.insert(name.clone(), value);
            }
            Target::Index(name, idx) => {
                let idx_value = self.eval(idx)?;
                let idx = index_of(&idx_value)?;
                let slot = self
                    .scope
                    .get_mut(name)
                    .ok_or_else(|| fault(format!("store into undefined variable `{}`", name)))?;
                match slot {
                    Value::Arr(items) => {
                        if idx >= items.len() {
                            items.resize(idx + 1, Value::Undefined);
                        }
                        items[idx] = value;
                    }
                    other => {
                        return Err(fault(format!(
                            "indexed store into a {} (`{}`)",
                            other.type_name(),
                            name
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>> {
        args.iter().map(|a| self.eval(a)).collect()
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        self.step()?;

        match expr {
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Ident(name) => self
                .scope
                .get(name)
                .cloned()
                .ok_or_else(|| fault(format!("undefined variable `{}`", name))),
            Expr::Array(items) => Ok(Value::Arr(self.eval_args(items)?)),
            Expr::Unary(op, inner) => {
                let value = self.eval(inner)?;
                self.unary(*op, value)
            }
            Expr::Binary(op, lhs, rhs) => self.binary(*op, lhs, rhs),
            Expr::Ternary(cond, then, otherwise) => {
                if truthy(&self.eval(cond)?) {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            Expr::Index(recv, idx) => {
                let recv = self.eval(recv)?;
                let idx_value = self.eval(idx)?;
                let idx = index_of(&idx_value)?;
                match recv {
                    Value::Arr(items) => {
                        Ok(items.get(idx).cloned().unwrap_or(Value::Undefined))
                    }
                    Value::Str(s) => Ok(s
                        .chars()
                        .nth(idx)
                        .map(|c| Value::Str(c.to_string()))
                        .unwrap_or(Value::Undefined)),
                    other => Err(fault(format!("cannot index a {}", other.type_name()))),
                }
            }
            Expr::Length(inner) => match self.eval(inner)? {
                Value::Arr(items) => Ok(Value::Num(items.len() as f64)),
                Value::Str(s) => Ok(Value::Num(s.chars().count() as f64)),
                other => Err(fault(format!(
                    "`.length` of a {}",
                    other.type_name()
                ))),
            },
            Expr::Call { recv, kind, args } => {
                let args = self.eval_args(args)?;
                match recv {
                    None => from_char_code(&args),
                    Some(recv_expr) => self.method_call(recv_expr, *kind, args),
                }
            }
        }
    }

    /// Dispatch a method call. Mutators resolve their receiver as a place in
    /// the scope; pure methods work on the evaluated value.
    fn method_call(&mut self, recv: &Expr, kind: CallKind, args: Vec<Value>) -> Result<Value> {
        match kind {
            CallKind::Splice | CallKind::Push | CallKind::Unshift | CallKind::Reverse => {
                let name = match recv {
                    Expr::Ident(name) => name.clone(),
                    other => {
                        return Err(fault(format!(
                            "mutating call on a non-variable receiver {:?}",
                            other
                        )))
                    }
                };
                self.mutate_call(&name, kind, args)
            }
            _ => {
                let value = self.eval(recv)?;
                pure_call(&value, kind, &args)
            }
        }
    }

    /// Mutating array method against a scope variable.
    fn mutate_call(&mut self, name: &str, kind: CallKind, args: Vec<Value>) -> Result<Value> {
        let slot = self
            .scope
            .get_mut(name)
            .ok_or_else(|| fault(format!("call on undefined variable `{}`", name)))?;
        let items = match slot {
            Value::Arr(items) => items,
            other => {
                return Err(fault(format!(
                    "{:?} called on a {} (`{}`)",
                    kind,
                    other.type_name(),
                    name
                )))
            }
        };

        match kind {
            CallKind::Push => {
                items.extend(args);
                Ok(Value::Num(items.len() as f64))
            }
            CallKind::Unshift => {
                for (i, arg) in args.into_iter().enumerate() {
                    items.insert(i, arg);
                }
                Ok(Value::Num(items.len() as f64))
            }
            CallKind::Reverse => {
                items.reverse();
                Ok(Value::Arr(items.clone()))
            }
            CallKind::Splice => {
                let len = items.len();
                let start = relative_index(args.first(), len, 0)?;
                let delete = match args.get(1) {
                    Some(Value::Num(n)) => (n.max(0.0) as usize).min(len - start),
                    Some(other) => {
                        return Err(fault(format!(
                            "splice delete count is a {}",
                            other.type_name()
                        )))
                    }
                    None => len - start,
                };
                let inserted: Vec<Value> = args.get(2..).unwrap_or(&[]).to_vec();
                let removed: Vec<Value> =
                    items.splice(start..start + delete, inserted).collect();
                Ok(Value::Arr(removed))
            }
            other => Err(fault(format!("{:?} is not a mutating call", other))),
        }
    }

    fn binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Value> {
        // Logical operators short-circuit and yield the operand value
        if op == BinOp::And {
            let left = self.eval(lhs)?;
            return if truthy(&left) { self.eval(rhs) } else { Ok(left) };
        }
        if op == BinOp::Or {
            let left = self.eval(lhs)?;
            return if truthy(&left) { Ok(left) } else { self.eval(rhs) };
        }

        let left = self.eval(lhs)?;
        let right = self.eval(rhs)?;

        match op {
            BinOp::Add => match (&left, &right) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                _ => Ok(Value::Str(format!(
                    "{}{}",
                    stringify(&left),
                    stringify(&right)
                ))),
            },
            BinOp::Sub => numeric(op, &left, &right, |a, b| a - b),
            BinOp::Mul => numeric(op, &left, &right, |a, b| a * b),
            BinOp::Div => numeric(op, &left, &right, |a, b| a / b),
            BinOp::Mod => numeric(op, &left, &right, |a, b| a % b),
            BinOp::BitAnd => int32(op, &left, &right, |a, b| a & b),
            BinOp::BitOr => int32(op, &left, &right, |a, b| a | b),
            BinOp::BitXor => int32(op, &left, &right, |a, b| a ^ b),
            BinOp::Shl => int32(op, &left, &right, |a, b| a << (b as u32 & 31)),
            BinOp::Shr => int32(op, &left, &right, |a, b| a >> (b as u32 & 31)),
            BinOp::UShr => {
                let a = to_uint32(num_of(op, &left)?);
                let b = to_uint32(num_of(op, &right)?) & 31;
                Ok(Value::Num((a >> b) as f64))
            }
            BinOp::Eq => Ok(Value::Bool(loose_eq(&left, &right))),
            BinOp::Ne => Ok(Value::Bool(!loose_eq(&left, &right))),
            BinOp::StrictEq => Ok(Value::Bool(strict_eq(&left, &right))),
            BinOp::StrictNe => Ok(Value::Bool(!strict_eq(&left, &right))),
            BinOp::Lt => compare(op, &left, &right, |o| o == std::cmp::Ordering::Less),
            BinOp::Gt => compare(op, &left, &right, |o| o == std::cmp::Ordering::Greater),
            BinOp::Le => compare(op, &left, &right, |o| o != std::cmp::Ordering::Greater),
            BinOp::Ge => compare(op, &left, &right, |o| o != std::cmp::Ordering::Less),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn unary(&self, op: UnaryOp, value: Value) -> Result<Value> {
        match op {
            UnaryOp::Neg => match value {
                Value::Num(n) => Ok(Value::Num(-n)),
                other => Err(fault(format!("negating a {}", other.type_name()))),
            },
            UnaryOp::Not => Ok(Value::Bool(!truthy(&value))),
            UnaryOp::BitNot => match value {
                Value::Num(n) => Ok(Value::Num(!to_int32(n) as f64)),
                other => Err(fault(format!("bitwise-not of a {}", other.type_name()))),
            },
        }
    }

}

/// Non-negative integer index, for loads and stores.
fn index_of(value: &Value) -> Result<usize> {
    match value {
        Value::Num(n) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
        other => Err(fault(format!("invalid index {:?}", other))),
    }
}

/// Receiver-immutable method dispatch.
fn pure_call(recv: &Value, kind: CallKind, args: &[Value]) -> Result<Value> {
    match (recv, kind) {
        (Value::Str(s), CallKind::Split) => {
            let sep = match args.first() {
                Some(Value::Str(sep)) => sep.clone(),
                Some(other) => {
                    return Err(fault(format!(
                        "split separator is a {}",
                        other.type_name()
                    )))
                }
                None => return Ok(Value::Arr(vec![Value::Str(s.clone())])),
            };
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::Str(c.to_string())).collect()
            } else {
                s.split(&sep as &str)
                    .map(|p| Value::Str(p.to_string()))
                    .collect()
            };
            Ok(Value::Arr(parts))
        }
        (Value::Str(s), CallKind::CharCodeAt) => {
            let idx = match args.first() {
                Some(Value::Num(n)) if *n >= 0.0 => *n as usize,
                None => 0,
                Some(other) => {
                    return Err(fault(format!("charCodeAt index {:?}", other)))
                }
            };
            s.chars()
                .nth(idx)
                .map(|c| Value::Num(c as u32 as f64))
                .ok_or_else(|| fault(format!("charCodeAt({}) out of range", idx)))
        }
        (Value::Str(s), CallKind::Slice) => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = slice_bounds(args, chars.len())?;
            Ok(Value::Str(chars[start..end].iter().collect()))
        }
        (Value::Str(s), CallKind::IndexOf) => {
            let needle = match args.first() {
                Some(Value::Str(n)) => n.clone(),
                _ => return Err(fault("indexOf needs a string argument".to_string())),
            };
            Ok(Value::Num(match s.find(&needle as &str) {
                Some(byte_pos) => s[..byte_pos].chars().count() as f64,
                None => -1.0,
            }))
        }
        (Value::Arr(items), CallKind::Join) => {
            let sep = match args.first() {
                Some(Value::Str(sep)) => sep.clone(),
                None => ",".to_string(),
                Some(other) => {
                    return Err(fault(format!(
                        "join separator is a {}",
                        other.type_name()
                    )))
                }
            };
            let parts: Vec<String> = items.iter().map(stringify).collect();
            Ok(Value::Str(parts.join(&sep)))
        }
        (Value::Arr(items), CallKind::Slice) => {
            let (start, end) = slice_bounds(args, items.len())?;
            Ok(Value::Arr(items[start..end].to_vec()))
        }
        (Value::Arr(items), CallKind::IndexOf) => {
            let needle = args
                .first()
                .ok_or_else(|| fault("indexOf needs an argument".to_string()))?;
            let pos = items
                .iter()
                .position(|item| strict_eq(item, needle))
                .map(|i| i as f64)
                .unwrap_or(-1.0);
            Ok(Value::Num(pos))
        }
        (other, kind) => Err(fault(format!(
            "{:?} called on a {}",
            kind,
            other.type_name()
        ))),
    }
}

fn from_char_code(args: &[Value]) -> Result<Value> {
    let mut out = String::with_capacity(args.len());
    for arg in args {
        let code = match arg {
            Value::Num(n) => to_uint32(*n) % 0x10000,
            other => {
                return Err(fault(format!(
                    "fromCharCode argument is a {}",
                    other.type_name()
                )))
            }
        };
        let c = char::from_u32(code)
            .ok_or_else(|| fault(format!("fromCharCode({}) is not a scalar value", code)))?;
        out.push(c);
    }
    Ok(Value::Str(out))
}

/// JS-style relative index for splice/slice starts. Anything other than a
/// number (or an omitted argument) is a fault, never index 0.
fn relative_index(arg: Option<&Value>, len: usize, default: usize) -> Result<usize> {
    match arg {
        Some(Value::Num(n)) => Ok(if *n < 0.0 {
            len.saturating_sub((-n) as usize)
        } else {
            (*n as usize).min(len)
        }),
        None => Ok(default),
        Some(other) => Err(fault(format!(
            "index argument is a {}",
            other.type_name()
        ))),
    }
}

fn slice_bounds(args: &[Value], len: usize) -> Result<(usize, usize)> {
    let start = relative_index(args.first(), len, 0)?;
    let end = relative_index(args.get(1), len, len)?;
    Ok((start, end.max(start)))
}

fn numeric(op: BinOp, left: &Value, right: &Value, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
    Ok(Value::Num(f(num_of(op, left)?, num_of(op, right)?)))
}

fn int32(op: BinOp, left: &Value, right: &Value, f: impl Fn(i32, i32) -> i32) -> Result<Value> {
    let a = to_int32(num_of(op, left)?);
    let b = to_int32(num_of(op, right)?);
    Ok(Value::Num(f(a, b) as f64))
}

fn num_of(op: BinOp, value: &Value) -> Result<f64> {
    match value {
        Value::Num(n) => Ok(*n),
        Value::Bool(b) => Ok(*b as u8 as f64),
        other => Err(fault(format!(
            "{:?} operand is a {}",
            op,
            other.type_name()
        ))),
    }
}

/// ToInt32 per the script engine's 32-bit wraparound rules.
fn to_int32(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let m = n.trunc() % 4_294_967_296.0;
    let m = if m < 0.0 { m + 4_294_967_296.0 } else { m };
    m as u32 as i32
}

fn to_uint32(n: f64) -> u32 {
    to_int32(n) as u32
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Num(n) => *n != 0.0 && !n.is_nan(),
        Value::Str(s) => !s.is_empty(),
        Value::Arr(_) => true,
        Value::Undefined => false,
    }
}

/// `==`: numeric-string and boolean coercion per the script engine.
fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        // Booleans coerce to numbers first, so `true == 1` holds
        (Value::Bool(a), other) => loose_eq(&Value::Num(*a as u8 as f64), other),
        (other, Value::Bool(b)) => loose_eq(other, &Value::Num(*b as u8 as f64)),
        (Value::Num(a), Value::Num(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Num(a), Value::Str(b)) | (Value::Str(b), Value::Num(a)) => {
            b.parse::<f64>().map(|n| n == *a).unwrap_or(false)
        }
        (Value::Undefined, Value::Undefined) => true,
        _ => false,
    }
}

/// `===`: no coercion, mismatched types are never equal.
fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Num(a), Value::Num(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Undefined, Value::Undefined) => true,
        _ => false,
    }
}

fn compare(
    op: BinOp,
    left: &Value,
    right: &Value,
    f: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value> {
    let ordering = match (left, right) {
        (Value::Num(a), Value::Num(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => {
            return Err(fault(format!(
                "{:?} between a {} and a {}",
                op,
                left.type_name(),
                right.type_name()
            )))
        }
    };
    // NaN comparisons are false, as in the script engine
    Ok(Value::Bool(ordering.map(&f).unwrap_or(false)))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::Num(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Arr(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Undefined => "undefined".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nsig::parser::parse;
    use crate::ops::OpSequence;

    fn transform(snippet: &str, token: &str) -> Result<String> {
        let program = parse(snippet, None)?;
        run(&program, token)
    }

    #[test]
    fn test_xor_round_trip_program() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split(""),c=[];"#,
            r#"for(var d=0;d<b.length;d++){c.push(String.fromCharCode(b[d].charCodeAt(0)^3))}"#,
            r#"return c.join("")};"#,
        );
        let out = transform(snippet, "abc").unwrap();
        // 'a'^3='b', 'b'^3='a', 'c'^3='`'
        assert_eq!(out, "ba`");
    }

    #[test]
    fn test_arithmetic_wraparound() {
        // First char code 250: (250 + 5) % 256 must be exactly 255
        let snippet = concat!(
            r#"var QQ=function(a){var b=[];"#,
            r#"b.push(String.fromCharCode((a.charCodeAt(0)+5)%256));"#,
            r#"return b.join("")};"#,
        );
        let out = transform(snippet, "\u{fa}xyz").unwrap();
        assert_eq!(out, "\u{ff}");
    }

    #[test]
    fn test_unsigned_shift_is_32_bit() {
        // -1 >>> 28 is 15 under ToUint32, never a negative value
        let snippet = concat!(
            r#"var QQ=function(a){var b=[];b.push(String.fromCharCode(48+((0-1)>>>28)%10));"#,
            r#"return b.join("")};"#,
        );
        // (-1 >>> 28) = 15, 15 % 10 = 5, '0'+5 = '5'
        assert_eq!(transform(snippet, "x").unwrap(), "5");
    }

    #[test]
    fn test_splice_reverse_unshift() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"b.splice(0,2);b.reverse();b.unshift("Z");b.push("z");"#,
            r#"return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcdef").unwrap(), "Zfedcz");
    }

    #[test]
    fn test_constant_table_drives_program() {
        let snippet = concat!(
            r#"var tbl=[5,3,1];"#,
            r#"var QQ=function(a){var b=a.split("");b.splice(0,tbl[1]);return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcdef").unwrap(), "def");
    }

    #[test]
    fn test_branching() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"if(b.length>4){b.splice(0,4)}else{b.reverse()}"#,
            r#"return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcdef").unwrap(), "ef");
        assert_eq!(transform(snippet, "abc").unwrap(), "cba");
    }

    #[test]
    fn test_ternary_condition() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"b.splice(0,b.length>3?2:1);return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcde").unwrap(), "cde");
        assert_eq!(transform(snippet, "ab").unwrap(), "b");
    }

    #[test]
    fn test_strict_equality_never_coerces() {
        // 1 === "1" is false; the else branch must run
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"if(1==="1"){b.splice(0,2)}else{b.reverse()}"#,
            r#"return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcd").unwrap(), "dcba");

        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"if(1!=="1"){b.splice(0,2)}else{b.reverse()}"#,
            r#"return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcd").unwrap(), "cd");
    }

    #[test]
    fn test_loose_equality_coerces() {
        // 1 == "1" via numeric-string coercion
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"if(1=="1"){b.splice(0,2)}else{b.reverse()}"#,
            r#"return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcd").unwrap(), "cd");

        // booleans coerce to numbers, so (1<2) == 1
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"if((1<2)==1){b.splice(0,2)}else{b.reverse()}"#,
            r#"return b.join("")};"#,
        );
        assert_eq!(transform(snippet, "abcd").unwrap(), "cd");
    }

    #[test]
    fn test_non_numeric_splice_start_is_a_fault() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");"#,
            r#"b.splice("x",1);return b.join("")};"#,
        );
        assert!(matches!(
            transform(snippet, "abc"),
            Err(DescrambleError::InterpreterFault(_))
        ));
    }

    #[test]
    fn test_non_numeric_slice_start_is_a_fault() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("").slice("x");"#,
            r#"return b.join("")};"#,
        );
        assert!(matches!(
            transform(snippet, "abc"),
            Err(DescrambleError::InterpreterFault(_))
        ));
    }

    #[test]
    fn test_determinism() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split(""),c=[];"#,
            r#"for(var d=b.length-1;d>=0;d--){c.push(b[d])}"#,
            r#"return c.join("")};"#,
        );
        let first = transform(snippet, "token123").unwrap();
        let second = transform(snippet, "token123").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "321nekot");
    }

    #[test]
    fn test_step_ceiling_stops_runaway_loop() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split(""),c=0;"#,
            r#"while(c<1){c=c*1}"#,
            r#"return b.join("")};"#,
        );
        let err = transform(snippet, "abc").unwrap_err();
        match err {
            DescrambleError::InterpreterFault(detail) => {
                assert!(detail.contains("step ceiling"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_injected_cyclic_program_faults() {
        use crate::ops::{Expr, Op, Target};
        // Built by hand the way a defective extraction might produce it
        let program = NsigProgram {
            param: "a".to_string(),
            body: OpSequence::new(vec![
                Op::Loop {
                    init: None,
                    cond: None,
                    step: None,
                    body: OpSequence::new(vec![Op::Assign {
                        target: Target::Var("x".to_string()),
                        value: Expr::Num(1.0),
                    }]),
                },
                Op::Return(Expr::Ident("a".to_string())),
            ]),
            tables: vec![],
        };
        assert!(matches!(
            run(&program, "abc"),
            Err(DescrambleError::InterpreterFault(_))
        ));
    }

    #[test]
    fn test_missing_return_is_a_fault() {
        let program = NsigProgram {
            param: "a".to_string(),
            body: OpSequence::new(vec![]),
            tables: vec![],
        };
        assert!(matches!(
            run(&program, "abc"),
            Err(DescrambleError::InterpreterFault(_))
        ));
    }

    #[test]
    fn test_non_string_return_is_a_fault() {
        let snippet = r#"var QQ=function(a){var b=a.split("");return b.length;return b.join("")};"#;
        let err = transform(snippet, "abc").unwrap_err();
        assert!(matches!(err, DescrambleError::InterpreterFault(_)));
    }

    #[test]
    fn test_out_of_range_char_code_is_a_fault() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=[];b.push(String.fromCharCode(a.charCodeAt(99)));"#,
            r#"return b.join("")};"#,
        );
        assert!(matches!(
            transform(snippet, "ab"),
            Err(DescrambleError::InterpreterFault(_))
        ));
    }

    #[test]
    fn test_sequence_is_not_mutated_by_interpretation() {
        let snippet = concat!(
            r#"var QQ=function(a){var b=a.split("");b.reverse();return b.join("")};"#,
        );
        let program = parse(snippet, None).unwrap();
        let before = program.clone();
        let _ = run(&program, "abc").unwrap();
        assert_eq!(program, before);
    }
}
