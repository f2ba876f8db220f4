use lang_c::ast::{
    BinaryOperatorExpression, CastExpression, ConditionalExpression, Expression,
    UnaryOperatorExpression,
};
use lang_c::span::Node;

use crate::ctype::{self, CType};
use crate::declarations;
use crate::env::{Entry, Env};
use crate::error::{CompileError, CompileWarning, ErrorCollector};

/**
 * An integral constant together with its C type. The value is always
 * wrapped to the width and signedness of the type, so every constructed
 * `Value` has an integral type and a value in that type's domain.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub t: CType,
    pub v: i128,
}

impl Value {
    pub fn new(t: CType, v: i128) -> Self {
        let v = wrap_value(&t, v);
        Self { t, v }
    }

    pub fn is_zero(&self) -> bool {
        self.v == 0
    }

    pub fn cast_to(self, t: CType) -> Self {
        Value::new(t, self.v)
    }

    /**
     * Integer promotion: every type narrower than int becomes int.
     */
    pub fn promote(self) -> Self {
        match self.t {
            CType::Char | CType::UChar | CType::Short | CType::UShort => {
                self.cast_to(ctype::INT_TYPE)
            }
            _ => self,
        }
    }
}

/**
 * Fold a constant expression from the subset the declaration engine
 * needs: array sizes, enumerator values and scalar initializers.
 *
 * `Ok(None)` means the expression is well formed but not a constant at
 * this level; the caller decides whether that is an error. `Err` means a
 * diagnostic has already been recorded.
 */
pub fn fold_expression(
    env: &Env,
    expr: Node<Expression>,
    ec: &mut ErrorCollector,
) -> Result<Option<Value>, ()> {
    match expr.node {
        Expression::Identifier(id) => match env.find(&id.node.name) {
            Entry::EnumConstant(t, v) => Ok(Some(Value::new(t.t, v))),
            _ => Ok(None),
        },
        Expression::Constant(c) => fold_literal(c.node),
        Expression::UnaryOperator(node) => fold_unary_operator(env, *node, ec),
        Expression::BinaryOperator(node) => fold_binary_operator(env, *node, ec),
        Expression::Conditional(node) => fold_conditional(env, *node, ec),
        Expression::Cast(node) => fold_cast(env, *node, ec),
        Expression::Comma(v) => {
            let mut last = None;
            for expr in v.into_iter() {
                match fold_expression(env, expr, ec)? {
                    Some(value) => last = Some(value),
                    None => return Ok(None),
                }
            }
            Ok(last)
        }
        Expression::SizeOfTy(node) => {
            // types defined inside an expression do not escape it
            let (_, t) = declarations::resolve_type_name(env.clone(), node.node.0, ec)?;
            Ok(Some(Value::new(ctype::UINT_TYPE, t.t.sizeof() as i128)))
        }
        Expression::SizeOfVal(node) => match fold_expression(env, *node.node.0, ec)? {
            Some(value) => Ok(Some(Value::new(
                ctype::UINT_TYPE,
                value.t.sizeof() as i128,
            ))),
            None => Ok(None),
        },
        Expression::StringLiteral(_)
        | Expression::GenericSelection(_)
        | Expression::Member(_)
        | Expression::Call(_)
        | Expression::CompoundLiteral(_)
        | Expression::AlignOf(_)
        | Expression::OffsetOf(_)
        | Expression::VaArg(_)
        | Expression::Statement(_) => Ok(None),
    }
}

fn fold_literal(c: lang_c::ast::Constant) -> Result<Option<Value>, ()> {
    use lang_c::ast::{Constant, IntegerBase};
    match c {
        Constant::Integer(i) => {
            let radix = match i.base {
                IntegerBase::Decimal => 10,
                IntegerBase::Octal => 8,
                IntegerBase::Hexadecimal => 16,
                IntegerBase::Binary => 2,
            };
            // lang_c validates the digits, not the magnitude; a literal
            // past u128 saturates before wrapping to the target width.
            let num = u128::from_str_radix(&i.number, radix).unwrap_or(u128::MAX);
            // Octal and hex literals too large for a signed int
            // become unsigned, decimal ones simply wrap.
            let t = if i.suffix.unsigned {
                ctype::UINT_TYPE
            } else if radix != 10 && num > i32::MAX as u128 && num <= u32::MAX as u128 {
                ctype::UINT_TYPE
            } else {
                ctype::INT_TYPE
            };
            Ok(Some(Value::new(t, num as i128)))
        }
        Constant::Character(s) => Ok(parse_character_constant(&s)
            .map(|v| Value::new(ctype::INT_TYPE, v))),
        Constant::Float(_) => Ok(None),
    }
}

fn fold_unary_operator(
    env: &Env,
    node: Node<UnaryOperatorExpression>,
    ec: &mut ErrorCollector,
) -> Result<Option<Value>, ()> {
    use lang_c::ast::UnaryOperator;
    let op = node.node.operator.node;
    let value = match fold_expression(env, *node.node.operand, ec)? {
        Some(value) => value,
        None => return Ok(None),
    };
    match op {
        UnaryOperator::Plus => Ok(Some(value.promote())),
        UnaryOperator::Minus => {
            let value = value.promote();
            Ok(Some(Value::new(value.t, -value.v)))
        }
        UnaryOperator::Complement => {
            let value = value.promote();
            Ok(Some(Value::new(value.t, !value.v)))
        }
        UnaryOperator::Negate => Ok(Some(Value::new(
            ctype::INT_TYPE,
            if value.is_zero() { 1 } else { 0 },
        ))),
        UnaryOperator::PostIncrement
        | UnaryOperator::PostDecrement
        | UnaryOperator::PreIncrement
        | UnaryOperator::PreDecrement
        | UnaryOperator::Address
        | UnaryOperator::Indirection => Ok(None),
    }
}

fn fold_binary_operator(
    env: &Env,
    node: Node<BinaryOperatorExpression>,
    ec: &mut ErrorCollector,
) -> Result<Option<Value>, ()> {
    use lang_c::ast::BinaryOperator;
    let op = node.node.operator.node;
    let rhs_span = node.node.rhs.span;
    match op {
        // && and || do not evaluate the short-circuited operand
        BinaryOperator::LogicalAnd => {
            let lhs = match fold_expression(env, *node.node.lhs, ec)? {
                Some(value) => value,
                None => return Ok(None),
            };
            if lhs.is_zero() {
                return Ok(Some(Value::new(ctype::INT_TYPE, 0)));
            }
            match fold_expression(env, *node.node.rhs, ec)? {
                Some(rhs) => Ok(Some(Value::new(
                    ctype::INT_TYPE,
                    if rhs.is_zero() { 0 } else { 1 },
                ))),
                None => Ok(None),
            }
        }
        BinaryOperator::LogicalOr => {
            let lhs = match fold_expression(env, *node.node.lhs, ec)? {
                Some(value) => value,
                None => return Ok(None),
            };
            if !lhs.is_zero() {
                return Ok(Some(Value::new(ctype::INT_TYPE, 1)));
            }
            match fold_expression(env, *node.node.rhs, ec)? {
                Some(rhs) => Ok(Some(Value::new(
                    ctype::INT_TYPE,
                    if rhs.is_zero() { 0 } else { 1 },
                ))),
                None => Ok(None),
            }
        }
        BinaryOperator::Index
        | BinaryOperator::Assign
        | BinaryOperator::AssignMultiply
        | BinaryOperator::AssignDivide
        | BinaryOperator::AssignModulo
        | BinaryOperator::AssignPlus
        | BinaryOperator::AssignMinus
        | BinaryOperator::AssignShiftLeft
        | BinaryOperator::AssignShiftRight
        | BinaryOperator::AssignBitwiseAnd
        | BinaryOperator::AssignBitwiseXor
        | BinaryOperator::AssignBitwiseOr => Ok(None),
        _ => {
            let lhs = match fold_expression(env, *node.node.lhs, ec)? {
                Some(value) => value,
                None => return Ok(None),
            };
            let rhs = match fold_expression(env, *node.node.rhs, ec)? {
                Some(value) => value,
                None => return Ok(None),
            };
            match op {
                BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => {
                    let lhs = lhs.promote();
                    let rhs = rhs.promote();
                    if rhs.v < 0 {
                        ec.record_warning(CompileWarning::ShiftByNegative, rhs_span)?;
                    }
                    let v = match op {
                        BinaryOperator::ShiftLeft => shift_left(&lhs.t, lhs.v, rhs.v),
                        _ => shift_right(&lhs.t, lhs.v, rhs.v),
                    };
                    Ok(Some(Value::new(lhs.t, v)))
                }
                _ => {
                    let (lhs, rhs) = usual_arithmetic_convert(lhs, rhs);
                    fold_arithmetic(op, lhs, rhs, rhs_span, ec).map(Some)
                }
            }
        }
    }
}

fn fold_arithmetic(
    op: lang_c::ast::BinaryOperator,
    lhs: Value,
    rhs: Value,
    rhs_span: lang_c::span::Span,
    ec: &mut ErrorCollector,
) -> Result<Value, ()> {
    use lang_c::ast::BinaryOperator;
    let t = lhs.t.clone();
    let v = match op {
        BinaryOperator::Plus => lhs.v + rhs.v,
        BinaryOperator::Minus => lhs.v - rhs.v,
        BinaryOperator::Multiply => lhs.v * rhs.v,
        BinaryOperator::Divide => {
            if rhs.v == 0 {
                ec.record_error(CompileError::DivisionByZero, rhs_span)?;
                unreachable!();
            }
            lhs.v / rhs.v
        }
        BinaryOperator::Modulo => {
            if rhs.v == 0 {
                ec.record_error(CompileError::DivisionByZero, rhs_span)?;
                unreachable!();
            }
            lhs.v % rhs.v
        }
        BinaryOperator::BitwiseAnd => lhs.v & rhs.v,
        BinaryOperator::BitwiseXor => lhs.v ^ rhs.v,
        BinaryOperator::BitwiseOr => lhs.v | rhs.v,
        BinaryOperator::Less => return Ok(boolean(lhs.v < rhs.v)),
        BinaryOperator::Greater => return Ok(boolean(lhs.v > rhs.v)),
        BinaryOperator::LessOrEqual => return Ok(boolean(lhs.v <= rhs.v)),
        BinaryOperator::GreaterOrEqual => return Ok(boolean(lhs.v >= rhs.v)),
        BinaryOperator::Equals => return Ok(boolean(lhs.v == rhs.v)),
        BinaryOperator::NotEquals => return Ok(boolean(lhs.v != rhs.v)),
        _ => unreachable!(),
    };
    Ok(Value::new(t, v))
}

fn fold_conditional(
    env: &Env,
    node: Node<ConditionalExpression>,
    ec: &mut ErrorCollector,
) -> Result<Option<Value>, ()> {
    let condition = match fold_expression(env, *node.node.condition, ec)? {
        Some(value) => value,
        None => return Ok(None),
    };
    // the branch that is not chosen is not evaluated
    if condition.is_zero() {
        fold_expression(env, *node.node.else_expression, ec)
    } else {
        fold_expression(env, *node.node.then_expression, ec)
    }
}

fn fold_cast(
    env: &Env,
    node: Node<CastExpression>,
    ec: &mut ErrorCollector,
) -> Result<Option<Value>, ()> {
    let (_, target) = declarations::resolve_type_name(env.clone(), node.node.type_name, ec)?;
    let value = match fold_expression(env, *node.node.expression, ec)? {
        Some(value) => value,
        None => return Ok(None),
    };
    if target.t.is_integral() {
        Ok(Some(value.cast_to(target.t)))
    } else {
        Ok(None)
    }
}

fn boolean(v: bool) -> Value {
    Value::new(ctype::INT_TYPE, if v { 1 } else { 0 })
}

/**
 * Usual arithmetic conversions for two integral operands: promote both,
 * and if either is unsigned the other becomes unsigned too.
 */
fn usual_arithmetic_convert(lhs: Value, rhs: Value) -> (Value, Value) {
    let lhs = lhs.promote();
    let rhs = rhs.promote();
    if lhs.t == ctype::UINT_TYPE || rhs.t == ctype::UINT_TYPE {
        (lhs.cast_to(ctype::UINT_TYPE), rhs.cast_to(ctype::UINT_TYPE))
    } else {
        (lhs, rhs)
    }
}

fn wrap_value(t: &CType, v: i128) -> i128 {
    use num_traits::AsPrimitive;
    match t {
        CType::Char => AsPrimitive::<i8>::as_(v) as i128,
        CType::UChar => AsPrimitive::<u8>::as_(v) as i128,
        CType::Short => AsPrimitive::<i16>::as_(v) as i128,
        CType::UShort => AsPrimitive::<u16>::as_(v) as i128,
        CType::Long => AsPrimitive::<i32>::as_(v) as i128,
        CType::ULong => AsPrimitive::<u32>::as_(v) as i128,
        _ => v,
    }
}

// The shift amount is taken modulo the type width.
fn shift_left(t: &CType, lhs: i128, rhs: i128) -> i128 {
    match t {
        CType::ULong => (lhs as u32).wrapping_shl(rhs as u32) as i128,
        _ => (lhs as i32).wrapping_shl(rhs as u32) as i128,
    }
}

fn shift_right(t: &CType, lhs: i128, rhs: i128) -> i128 {
    match t {
        CType::ULong => (lhs as u32).wrapping_shr(rhs as u32) as i128,
        _ => (lhs as i32).wrapping_shr(rhs as u32) as i128,
    }
}

/**
 * Value of a plain character constant. Wide and multi-character
 * constants are not folded.
 */
fn parse_character_constant(s: &str) -> Option<i128> {
    let body = s.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = body.chars();
    let first = chars.next()?;
    if first != '\\' {
        if chars.next().is_some() {
            return None;
        }
        return Some(first as i128);
    }
    let escape = chars.next()?;
    let rest = chars.as_str();
    match escape {
        'x' => u32::from_str_radix(rest, 16).ok().map(i128::from),
        '0'..='7' => {
            let mut value = escape.to_digit(8).unwrap();
            for c in rest.chars() {
                value = value * 8 + c.to_digit(8)?;
            }
            Some(i128::from(value))
        }
        _ => {
            if !rest.is_empty() {
                return None;
            }
            let code = match escape {
                '\'' | '"' | '\\' | '?' => escape as u32,
                'a' => 0x7,
                'b' => 0x8,
                'f' => 0xc,
                'n' => 0xa,
                'r' => 0xd,
                't' => 0x9,
                'v' => 0xb,
                _ => return None,
            };
            Some(i128::from(code))
        }
    }
}
