//! The tree-walking interpreter: evaluates an [`ast::Node`] against an
//! execution [`Context`], producing a [`Value`] or a [`Error`].

use crate::ast::{Node, NodeKind, NumberLiteral};
use crate::context::Context;
use crate::error::{Error, ErrorKind};
use crate::immutable_string::ImmutableString;
use crate::position::Position;
use crate::token::TokenKind;
use crate::value::{values_equal, BuiltinFunction, Dict, Key, NativeFn, TypeTag, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Evaluates `node` against `ctx`, writing any `print`/`打印` output to `sink`.
pub fn evaluate(node: &Node, ctx: &Rc<Context>, sink: &mut dyn FnMut(&str)) -> Result<Value, Box<Error>> {
    eval(node, ctx, sink)
}

/// Builds the global context, seeded with the built-in type objects, named
/// callables, and the constants `null`/`Inf`/`NaN`.
#[must_use]
pub fn new_global_context() -> Rc<Context> {
    let ctx = Context::new_global();
    seed_globals(&mut ctx.table.borrow_mut());
    ctx
}

fn seed_globals(table: &mut crate::scope::SymbolTable) {
    table.set("null", Value::Null);
    table.set("Inf", Value::Float(f64::INFINITY));
    table.set("NaN", Value::Float(f64::NAN));

    let types: &[(&[&str], TypeTag)] = &[
        (&["type"], TypeTag::Type),
        (&["object"], TypeTag::Object),
        (&["bool"], TypeTag::Bool),
        (&["int"], TypeTag::Int),
        (&["float"], TypeTag::Float),
        (&["str"], TypeTag::Str),
        (&["list"], TypeTag::List),
        (&["tuple"], TypeTag::Tuple),
        (&["dict"], TypeTag::Dict),
    ];
    for (names, tag) in types {
        for name in *names {
            table.set(name, Value::Type(*tag));
        }
    }

    let builtins: &[(&[&str], &'static str, NativeFn)] = &[
        (&["print", "打印"], "print", builtin_print),
        (&["getattr", "取属性"], "getattr", builtin_getattr),
        (&["abs", "绝对值"], "abs", builtin_abs),
        (&["len", "长度"], "len", builtin_len),
    ];
    for (names, canonical, func) in builtins {
        for name in *names {
            table.set(
                name,
                Value::BuiltinFunction(BuiltinFunction {
                    name: canonical,
                    func: *func,
                }),
            );
        }
    }
}

fn eval(node: &Node, ctx: &Rc<Context>, sink: &mut dyn FnMut(&str)) -> Result<Value, Box<Error>> {
    match &node.kind {
        NodeKind::Number(lit) => Ok(match lit {
            NumberLiteral::Int(n) => Value::Int(*n),
            NumberLiteral::Float(f) => Value::Float(*f),
            NumberLiteral::Bool(b) => Value::Bool(*b),
        }),
        NodeKind::String(s) => Ok(Value::String(s.clone())),
        NodeKind::Pass | NodeKind::Exit => Ok(Value::Null),

        NodeKind::UnaryOp(op, operand) => {
            let value = eval(operand, ctx, sink)?;
            unary_op(*op, &value)
                .map_err(|k| runtime_err(k, node, ctx))
        }

        NodeKind::BinaryOp(left, op, right) => eval_binary(left, *op, right, node, ctx, sink),

        NodeKind::VarAccess(name) => ctx
            .table
            .borrow()
            .get(name)
            .ok_or_else(|| runtime_err(ErrorKind::Name(format!("name '{}' is not defined", name)), node, ctx)),

        NodeKind::VarAssign(name, value) => {
            let value = eval(value, ctx, sink)?;
            ctx.table.borrow_mut().set(name, value.clone());
            Ok(value)
        }

        NodeKind::VarDelete(names) => {
            for name in names {
                if ctx.table.borrow_mut().remove(name).is_none() {
                    return Err(runtime_err(
                        ErrorKind::Name(format!("name '{}' is not defined", name)),
                        node,
                        ctx,
                    ));
                }
            }
            Ok(Value::Null)
        }

        NodeKind::Tuple(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval(item, ctx, sink)?);
            }
            Ok(Value::Tuple(Rc::new(values)))
        }

        NodeKind::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(eval(item, ctx, sink)?);
            }
            Ok(Value::List(Rc::new(RefCell::new(values))))
        }

        NodeKind::Dict(entries) => {
            let mut dict = Dict::new();
            for entry in entries {
                let key = eval(&entry.key, ctx, sink)?;
                let value = eval(&entry.value, ctx, sink)?;
                let key = key
                    .as_key()
                    .map_err(|k| runtime_err(k, &entry.key, ctx))?;
                dict.insert(key, value);
            }
            Ok(Value::Dict(Rc::new(RefCell::new(dict))))
        }

        NodeKind::Slice(start, stop, step) => {
            let part = |n: &Option<Box<Node>>, ctx: &Rc<Context>, sink: &mut dyn FnMut(&str)| -> Result<Value, Box<Error>> {
                match n {
                    Some(expr) => eval(expr, ctx, sink),
                    None => Ok(Value::Null),
                }
            };
            let start = part(start, ctx, sink)?;
            let stop = part(stop, ctx, sink)?;
            let step = part(step, ctx, sink)?;
            Ok(Value::Slice(Rc::new((start, stop, step))))
        }

        NodeKind::GetItem(object, key) => {
            let object = eval(object, ctx, sink)?;
            let key = eval(key, ctx, sink)?;
            get_item(&object, &key).map_err(|k| runtime_err(k, node, ctx))
        }

        NodeKind::SetItem(object, key, value) => {
            let object = eval(object, ctx, sink)?;
            let key = eval(key, ctx, sink)?;
            let value = eval(value, ctx, sink)?;
            set_item(&object, &key, value.clone()).map_err(|k| runtime_err(k, node, ctx))?;
            Ok(value)
        }

        NodeKind::GetAttr(object, name) => {
            let object = eval(object, ctx, sink)?;
            Err(runtime_err(
                ErrorKind::Attribute(format!(
                    "'{}' object has no attribute '{}'",
                    object.type_name(),
                    name
                )),
                node,
                ctx,
            ))
        }

        NodeKind::SetAttr(object, _name, _value) => {
            let object = eval(object, ctx, sink)?;
            Err(runtime_err(
                ErrorKind::Attribute(format!(
                    "'{}' object attributes are read-only",
                    object.type_name()
                )),
                node,
                ctx,
            ))
        }

        NodeKind::Call { callee, args, kwargs } => eval_call(callee, args, kwargs, node, ctx, sink),

        NodeKind::If { is_expression, cases, else_body } => {
            for case in cases {
                let cond = eval(&case.condition, ctx, sink)?;
                if cond.is_truthy() {
                    return eval(&case.body, ctx, sink);
                }
            }
            if let Some(else_body) = else_body {
                let value = eval(else_body, ctx, sink)?;
                return Ok(if *is_expression { value } else { Value::Null });
            }
            Ok(Value::Null)
        }

        NodeKind::Program(statements) => {
            let mut last = Value::Null;
            for stmt in statements {
                last = eval(stmt, ctx, sink)?;
            }
            Ok(last)
        }
    }
}

fn runtime_err(kind: ErrorKind, node: &Node, ctx: &Rc<Context>) -> Box<Error> {
    Box::new(Error::runtime(
        kind,
        node.pos_start.clone(),
        node.pos_end.clone(),
        ctx.traceback(),
    ))
}

fn eval_binary(
    left: &Node,
    op: TokenKind,
    right: &Node,
    node: &Node,
    ctx: &Rc<Context>,
    sink: &mut dyn FnMut(&str),
) -> Result<Value, Box<Error>> {
    // `&&`/`||` short-circuit and yield one of the operand values, uncoerced.
    if op == TokenKind::DoubleAmper {
        let l = eval(left, ctx, sink)?;
        return if !l.is_truthy() { Ok(l) } else { eval(right, ctx, sink) };
    }
    if op == TokenKind::DoubleVbar {
        let l = eval(left, ctx, sink)?;
        return if l.is_truthy() { Ok(l) } else { eval(right, ctx, sink) };
    }

    let l = eval(left, ctx, sink)?;
    let r = eval(right, ctx, sink)?;

    if op == TokenKind::EqEqual {
        return Ok(Value::Bool(values_equal(&l, &r)));
    }
    if op == TokenKind::NotEqual {
        return Ok(Value::Bool(!values_equal(&l, &r)));
    }

    binary_op(op, &l, &r).map_err(|k| runtime_err(k, node, ctx))
}

fn eval_call(
    callee: &Node,
    arg_nodes: &[Node],
    kwarg_nodes: &[crate::ast::KeywordArg],
    node: &Node,
    ctx: &Rc<Context>,
    sink: &mut dyn FnMut(&str),
) -> Result<Value, Box<Error>> {
    let callee_value = eval(callee, ctx, sink)?;

    let mut args = Vec::with_capacity(arg_nodes.len());
    for a in arg_nodes {
        args.push(eval(a, ctx, sink)?);
    }
    let mut kwargs = Dict::new();
    for kw in kwarg_nodes {
        let value = eval(&kw.value, ctx, sink)?;
        kwargs.insert(Key::Str(kw.name.clone()), value);
    }

    match callee_value {
        Value::BuiltinFunction(f) => (f.func)(&args, &kwargs, sink).map_err(|k| runtime_err(k, node, ctx)),
        Value::Type(tag) => construct(tag, &args).map_err(|k| runtime_err(k, node, ctx)),
        other => Err(runtime_err(
            ErrorKind::Type(format!("'{}' object is not callable", other.type_name())),
            node,
            ctx,
        )),
    }
}

/// Calling a `Type` value constructs (or converts to) that type, except
/// `type`, whose single-argument call instead returns the argument's own type.
fn construct(tag: TypeTag, args: &[Value]) -> Result<Value, ErrorKind> {
    if tag == TypeTag::Type {
        return match args.first() {
            Some(v) => Ok(Value::Type(v.type_tag())),
            None => Ok(Value::Type(TypeTag::Type)),
        };
    }
    let arg = match args.first() {
        Some(v) => v,
        None => {
            return Ok(match tag {
                TypeTag::Bool => Value::Bool(false),
                TypeTag::Int => Value::Int(0),
                TypeTag::Float => Value::Float(0.0),
                TypeTag::Str => Value::String("".into()),
                TypeTag::List => Value::List(Rc::new(RefCell::new(Vec::new()))),
                TypeTag::Tuple => Value::Tuple(Rc::new(Vec::new())),
                TypeTag::Dict => Value::Dict(Rc::new(RefCell::new(Dict::new()))),
                TypeTag::Object | TypeTag::NullType => Value::Null,
                _ => return Err(ErrorKind::Type(format!("cannot construct '{}'", tag.name()))),
            })
        }
    };
    Ok(match tag {
        TypeTag::Bool => Value::Bool(arg.is_truthy()),
        TypeTag::Int => match arg {
            Value::Int(n) => Value::Int(*n),
            Value::Bool(b) => Value::Int(*b as i64),
            Value::Float(f) => Value::Int(*f as i64),
            Value::String(s) => Value::Int(s.as_str().trim().parse().map_err(|_| {
                ErrorKind::Type(format!("invalid literal for int(): '{}'", s.as_str()))
            })?),
            other => return Err(ErrorKind::Type(format!("cannot convert '{}' to int", other.type_name()))),
        },
        TypeTag::Float => match arg {
            Value::Float(f) => Value::Float(*f),
            Value::Int(n) => Value::Float(*n as f64),
            Value::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => Value::Float(s.as_str().trim().parse().map_err(|_| {
                ErrorKind::Type(format!("invalid literal for float(): '{}'", s.as_str()))
            })?),
            other => return Err(ErrorKind::Type(format!("cannot convert '{}' to float", other.type_name()))),
        },
        TypeTag::Str => Value::String(arg.display_string().into()),
        TypeTag::List => match arg {
            Value::List(items) => Value::List(Rc::new(RefCell::new(items.borrow().clone()))),
            Value::Tuple(items) => Value::List(Rc::new(RefCell::new((**items).clone()))),
            Value::String(s) => Value::List(Rc::new(RefCell::new(
                s.as_str().chars().map(|c| Value::String(c.to_string().into())).collect(),
            ))),
            other => return Err(ErrorKind::Type(format!("'{}' object is not iterable", other.type_name()))),
        },
        TypeTag::Tuple => match arg {
            Value::Tuple(items) => Value::Tuple(items.clone()),
            Value::List(items) => Value::Tuple(Rc::new(items.borrow().clone())),
            Value::String(s) => Value::Tuple(Rc::new(
                s.as_str().chars().map(|c| Value::String(c.to_string().into())).collect(),
            )),
            other => return Err(ErrorKind::Type(format!("'{}' object is not iterable", other.type_name()))),
        },
        TypeTag::Dict => match arg {
            Value::Dict(d) => Value::Dict(Rc::new(RefCell::new(d.borrow().clone()))),
            other => return Err(ErrorKind::Type(format!("cannot convert '{}' to dict", other.type_name()))),
        },
        _ => return Err(ErrorKind::Type(format!("cannot construct '{}'", tag.name()))),
    })
}

// ---- subscription ----

fn resolve_index(len: usize, idx: i64) -> Result<usize, ErrorKind> {
    let normalised = if idx < 0 { idx + len as i64 } else { idx };
    if normalised < 0 || normalised >= len as i64 {
        Err(ErrorKind::Index(format!("index {} out of range", idx)))
    } else {
        Ok(normalised as usize)
    }
}

fn slice_bounds(len: usize, slice: &(Value, Value, Value)) -> Result<(usize, usize, i64), ErrorKind> {
    let step = match &slice.2 {
        Value::Null => 1,
        Value::Int(n) if *n != 0 => *n,
        Value::Int(_) => return Err(ErrorKind::Operation("slice step cannot be zero".into())),
        other => return Err(ErrorKind::Type(format!("slice step must be an int, not '{}'", other.type_name()))),
    };
    let len_i = len as i64;
    let clamp = |v: i64| v.clamp(0, len_i) as usize;
    let default_start = if step > 0 { 0 } else { len_i.saturating_sub(1).max(0) };
    let default_stop = if step > 0 { len_i } else { -1 };

    let resolve = |v: &Value, default: i64| -> Result<i64, ErrorKind> {
        match v {
            Value::Null => Ok(default),
            Value::Int(n) => Ok(if *n < 0 { n + len_i } else { *n }),
            other => Err(ErrorKind::Type(format!(
                "slice indices must be integers, not '{}'",
                other.type_name()
            ))),
        }
    };
    let start = resolve(&slice.0, default_start)?;
    let stop = resolve(&slice.1, default_stop)?;
    let start = if step > 0 { clamp(start) } else { start.clamp(-1, len_i - 1) as usize };
    let stop = if step > 0 { clamp(stop) } else { stop.max(-1) as usize };
    Ok((start, stop, step))
}

fn apply_slice<T: Clone>(items: &[T], slice: &(Value, Value, Value)) -> Result<Vec<T>, ErrorKind> {
    let (start, stop, step) = slice_bounds(items.len(), slice)?;
    let mut out = Vec::new();
    if step > 0 {
        let mut i = start;
        while i < stop.min(items.len()) {
            out.push(items[i].clone());
            i += step as usize;
        }
    } else {
        let mut i = start as i64;
        while i > stop as i64 {
            if i >= 0 && (i as usize) < items.len() {
                out.push(items[i as usize].clone());
            }
            i += step;
        }
    }
    Ok(out)
}

fn get_item(object: &Value, key: &Value) -> Result<Value, ErrorKind> {
    match object {
        Value::String(s) => {
            let chars: Vec<char> = s.as_str().chars().collect();
            match key {
                Value::Int(n) => {
                    let idx = resolve_index(chars.len(), *n)?;
                    Ok(Value::String(chars[idx].to_string().into()))
                }
                Value::Slice(slice) => {
                    let chars = apply_slice(&chars, slice)?;
                    Ok(Value::String(chars.into_iter().collect::<String>().into()))
                }
                other => Err(ErrorKind::Type(format!(
                    "string indices must be integers or slices, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Value::List(items) => {
            let items = items.borrow();
            match key {
                Value::Int(n) => Ok(items[resolve_index(items.len(), *n)?].clone()),
                Value::Slice(slice) => Ok(Value::List(Rc::new(RefCell::new(apply_slice(&items, slice)?)))),
                other => Err(ErrorKind::Type(format!(
                    "list indices must be integers or slices, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Value::Tuple(items) => match key {
            Value::Int(n) => Ok(items[resolve_index(items.len(), *n)?].clone()),
            Value::Slice(slice) => Ok(Value::Tuple(Rc::new(apply_slice(items, slice)?))),
            other => Err(ErrorKind::Type(format!(
                "tuple indices must be integers or slices, not '{}'",
                other.type_name()
            ))),
        },
        Value::Dict(dict) => {
            let key = key.as_key()?;
            dict.borrow()
                .get(&key)
                .cloned()
                .ok_or_else(|| ErrorKind::Key(key.to_string()))
        }
        other => Err(ErrorKind::Type(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn set_item(object: &Value, key: &Value, value: Value) -> Result<(), ErrorKind> {
    match object {
        Value::List(items) => {
            let mut items = items.borrow_mut();
            let idx = match key {
                Value::Int(n) => resolve_index(items.len(), *n)?,
                other => {
                    return Err(ErrorKind::Type(format!(
                        "list indices must be integers, not '{}'",
                        other.type_name()
                    )))
                }
            };
            items[idx] = value;
            Ok(())
        }
        Value::Dict(dict) => {
            let key = key.as_key()?;
            dict.borrow_mut().insert(key, value);
            Ok(())
        }
        Value::Tuple(_) | Value::String(_) => Err(ErrorKind::Type(format!(
            "'{}' object does not support item assignment",
            object.type_name()
        ))),
        other => Err(ErrorKind::Type(format!(
            "'{}' object does not support item assignment",
            other.type_name()
        ))),
    }
}

// ---- unary / binary operator dispatch ----

fn unary_op(op: TokenKind, value: &Value) -> Result<Value, ErrorKind> {
    match op {
        TokenKind::Exclamation => Ok(Value::Bool(!value.is_truthy())),
        TokenKind::Minus => match value {
            Value::Int(n) => Ok(Value::Int(-n)),
            Value::Bool(b) => Ok(Value::Int(-(*b as i64))),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(ErrorKind::Type(format!(
                "bad operand type for unary -: '{}'",
                other.type_name()
            ))),
        },
        TokenKind::Plus => match value {
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => value
                .as_f64()
                .map(|_| value.clone())
                .ok_or_else(|| unreachable_numeric()),
            other => Err(ErrorKind::Type(format!(
                "bad operand type for unary +: '{}'",
                other.type_name()
            ))),
        },
        TokenKind::Tilde => match value {
            Value::Int(n) => Ok(Value::Int(!n)),
            Value::Bool(b) => Ok(Value::Int(!(*b as i64))),
            other => Err(ErrorKind::Type(format!(
                "bad operand type for unary ~: '{}'",
                other.type_name()
            ))),
        },
        _ => unreachable!("parser only emits unary ops for !, -, +, ~"),
    }
}

fn unreachable_numeric() -> ErrorKind {
    ErrorKind::Runtime("unreachable: numeric value without f64 representation".into())
}

/// Binary operator dispatch: tries the operation as defined for `left`; if
/// `left` doesn't support this `(op, right-type)` combination at all, tries
/// the reflected form on `right`. A concrete failure (division by zero, bad
/// slice step) from either side propagates immediately — it is not retried.
/// If both sides decline the combination, a single `TypeError` naming the
/// operator and both type names is raised.
fn binary_op(op: TokenKind, left: &Value, right: &Value) -> Result<Value, ErrorKind> {
    if let Some(result) = try_binary(op, left, right)? {
        return Ok(result);
    }
    if let Some(result) = try_binary_reflected(op, left, right)? {
        return Ok(result);
    }
    Err(ErrorKind::Type(format!(
        "unsupported operand type(s) for '{}': '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    )))
}

fn try_binary(op: TokenKind, left: &Value, right: &Value) -> Result<Option<Value>, ErrorKind> {
    use TokenKind::*;

    if left.is_numeric() && right.is_numeric() {
        return numeric_binary(op, left, right);
    }

    Ok(match (op, left, right) {
        (Plus, Value::String(a), Value::String(b)) => Some(Value::String(a.clone() + b.clone())),
        (Star, Value::String(a), Value::Int(n)) => Some(Value::String(repeat_string(a.as_str(), *n))),
        (Plus, Value::List(a), Value::List(b)) => {
            let mut v = a.borrow().clone();
            v.extend(b.borrow().iter().cloned());
            Some(Value::List(Rc::new(RefCell::new(v))))
        }
        (Plus, Value::Tuple(a), Value::Tuple(b)) => {
            let mut v = (**a).clone();
            v.extend(b.iter().cloned());
            Some(Value::Tuple(Rc::new(v)))
        }
        (Less, Value::String(a), Value::String(b)) => Some(Value::Bool(a.as_str() < b.as_str())),
        (Greater, Value::String(a), Value::String(b)) => Some(Value::Bool(a.as_str() > b.as_str())),
        (LessEqual, Value::String(a), Value::String(b)) => Some(Value::Bool(a.as_str() <= b.as_str())),
        (GreaterEqual, Value::String(a), Value::String(b)) => Some(Value::Bool(a.as_str() >= b.as_str())),
        _ => None,
    })
}

fn try_binary_reflected(op: TokenKind, left: &Value, right: &Value) -> Result<Option<Value>, ErrorKind> {
    if let TokenKind::Star = op {
        if let (Value::Int(n), Value::String(s)) = (left, right) {
            return Ok(Some(Value::String(repeat_string(s.as_str(), *n))));
        }
    }
    Ok(None)
}

fn repeat_string(s: &str, n: i64) -> String {
    if n <= 0 {
        String::new()
    } else {
        s.repeat(n as usize)
    }
}

#[cfg(not(feature = "unchecked"))]
fn checked(result: Option<i64>) -> Result<i64, ErrorKind> {
    result.ok_or_else(|| ErrorKind::Operation("integer overflow".into()))
}

#[cfg(feature = "unchecked")]
fn checked(result: Option<i64>) -> Result<i64, ErrorKind> {
    Ok(result.unwrap_or(0))
}

/// Python-style floor division: the quotient rounds toward negative infinity,
/// so the result's sign follows the divisor rather than truncating toward zero.
fn floor_div_i64(a: i64, b: i64) -> Result<i64, ErrorKind> {
    let q = checked(a.checked_div(b))?;
    let r = checked(a.checked_rem(b))?;
    if r != 0 && (r < 0) != (b < 0) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Python-style floor modulo: the result takes the sign of the divisor.
fn floor_mod_i64(a: i64, b: i64) -> Result<i64, ErrorKind> {
    let r = checked(a.checked_rem(b))?;
    if r != 0 && (r < 0) != (b < 0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// Python-style floor modulo for floats: the result takes the sign of the divisor.
fn floor_mod_f64(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn as_int(v: &Value) -> i64 {
    match v {
        Value::Int(n) => *n,
        Value::Bool(b) => *b as i64,
        _ => unreachable!("caller checked both operands are int-like"),
    }
}

fn is_int_like(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::Bool(_))
}

fn numeric_binary(op: TokenKind, left: &Value, right: &Value) -> Result<Option<Value>, ErrorKind> {
    use TokenKind::*;

    match op {
        Amper | Vbar | Circumflex | LeftShift | RightShift => {
            if !is_int_like(left) || !is_int_like(right) {
                return Ok(None);
            }
            let (a, b) = (as_int(left), as_int(right));
            return Ok(Some(Value::Int(match op {
                Amper => a & b,
                Vbar => a | b,
                Circumflex => a ^ b,
                LeftShift => checked(a.checked_shl(b as u32))?,
                RightShift => checked(a.checked_shr(b as u32))?,
                _ => unreachable!(),
            })));
        }
        Less | Greater | LessEqual | GreaterEqual => {
            let (a, b) = (left.as_f64().unwrap(), right.as_f64().unwrap());
            return Ok(Some(Value::Bool(match op {
                Less => a < b,
                Greater => a > b,
                LessEqual => a <= b,
                GreaterEqual => a >= b,
                _ => unreachable!(),
            })));
        }
        _ => {}
    }

    let both_int = is_int_like(left) && is_int_like(right);

    match op {
        Plus | Minus | Star if both_int => {
            let (a, b) = (as_int(left), as_int(right));
            let n = match op {
                Plus => checked(a.checked_add(b))?,
                Minus => checked(a.checked_sub(b))?,
                Star => checked(a.checked_mul(b))?,
                _ => unreachable!(),
            };
            Ok(Some(Value::Int(n)))
        }
        Plus | Minus | Star => {
            let (a, b) = (left.as_f64().unwrap(), right.as_f64().unwrap());
            Ok(Some(Value::Float(match op {
                Plus => a + b,
                Minus => a - b,
                Star => a * b,
                _ => unreachable!(),
            })))
        }
        Slash => {
            let (a, b) = (left.as_f64().unwrap(), right.as_f64().unwrap());
            if b == 0.0 {
                return Err(ErrorKind::Operation("division by zero".into()));
            }
            Ok(Some(Value::Float(a / b)))
        }
        DoubleSlash if both_int => {
            let (a, b) = (as_int(left), as_int(right));
            if b == 0 {
                return Err(ErrorKind::Operation("division by zero".into()));
            }
            Ok(Some(Value::Int(floor_div_i64(a, b)?)))
        }
        DoubleSlash => {
            let (a, b) = (left.as_f64().unwrap(), right.as_f64().unwrap());
            if b == 0.0 {
                return Err(ErrorKind::Operation("division by zero".into()));
            }
            Ok(Some(Value::Float((a / b).floor())))
        }
        Percent if both_int => {
            let (a, b) = (as_int(left), as_int(right));
            if b == 0 {
                return Err(ErrorKind::Operation("division by zero".into()));
            }
            Ok(Some(Value::Int(floor_mod_i64(a, b)?)))
        }
        Percent => {
            let (a, b) = (left.as_f64().unwrap(), right.as_f64().unwrap());
            if b == 0.0 {
                return Err(ErrorKind::Operation("division by zero".into()));
            }
            Ok(Some(Value::Float(floor_mod_f64(a, b))))
        }
        DoubleStar if both_int && as_int(right) >= 0 => {
            let (a, b) = (as_int(left), as_int(right));
            Ok(Some(Value::Int(checked(a.checked_pow(b as u32))?)))
        }
        DoubleStar => {
            let (a, b) = (left.as_f64().unwrap(), right.as_f64().unwrap());
            Ok(Some(Value::Float(a.powf(b))))
        }
        At => Ok(None),
        _ => Ok(None),
    }
}

// ---- builtins ----

fn arity_error(name: &str, expected: &str, got: usize) -> ErrorKind {
    ErrorKind::Runtime(format!(
        "{}() takes {} argument(s) but {} were given",
        name, expected, got
    ))
}

fn builtin_print(args: &[Value], _kwargs: &Dict, sink: &mut dyn FnMut(&str)) -> Result<Value, ErrorKind> {
    let parts: Vec<String> = args.iter().map(Value::display_string).collect();
    sink(&parts.join(" "));
    sink("\n");
    Ok(Value::Null)
}

fn builtin_len(args: &[Value], _kwargs: &Dict, _sink: &mut dyn FnMut(&str)) -> Result<Value, ErrorKind> {
    let value = args.get(0).ok_or_else(|| arity_error("len", "1", args.len()))?;
    let n = match value {
        Value::String(s) => s.len(),
        Value::Tuple(t) => t.len(),
        Value::List(l) => l.borrow().len(),
        Value::Dict(d) => d.borrow().len(),
        other => {
            return Err(ErrorKind::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(n as i64))
}

fn builtin_abs(args: &[Value], _kwargs: &Dict, _sink: &mut dyn FnMut(&str)) -> Result<Value, ErrorKind> {
    let value = args.get(0).ok_or_else(|| arity_error("abs", "1", args.len()))?;
    match value {
        Value::Int(n) => Ok(Value::Int(n.abs())),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(ErrorKind::Type(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

/// `getattr(object, name, default?)`: since no user-defined attribute-bearing
/// objects exist in this core, every lookup misses; `default`, when given,
/// is returned instead of raising `AttributeError`.
fn builtin_getattr(args: &[Value], _kwargs: &Dict, _sink: &mut dyn FnMut(&str)) -> Result<Value, ErrorKind> {
    let object = args.get(0).ok_or_else(|| arity_error("getattr", "2 to 3", args.len()))?;
    let name = match args.get(1) {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(ErrorKind::Type(format!(
                "getattr(): attribute name must be string, not '{}'",
                other.type_name()
            )))
        }
        None => return Err(arity_error("getattr", "2 to 3", args.len())),
    };
    if let Some(default) = args.get(2) {
        return Ok(default.clone());
    }
    Err(ErrorKind::Attribute(format!(
        "'{}' object has no attribute '{}'",
        object.type_name(),
        name
    )))
}
