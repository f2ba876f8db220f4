use lang_c::ast::{ArraySize, Declarator, DeclaratorKind, DerivedDeclarator, Ellipsis};
use lang_c::span::Node;

use crate::constant;
use crate::ctype::{self, QualifiedType, Qualifiers};
use crate::declarations;
use crate::env::Env;
use crate::error::{CompileError, CompileWarning, ErrorCollector};
use crate::specifiers;

/**
 * Apply a declarator to a base type, producing the declared name, if
 * any, and the fully derived type.
 *
 * Within one declarator level the pointers are applied first, starting
 * with the one written next to the specifiers, then the array and
 * function suffixes from the innermost one outwards. A parenthesized
 * declarator is then applied on top of the result.
 *
 * Array sizes and parameter lists may define tags and reference
 * enumerators, so the environment is threaded through and returned.
 */
pub fn process_declarator(
    env: Env,
    declarator: Node<Declarator>,
    base: QualifiedType,
    ec: &mut ErrorCollector,
) -> Result<(Env, Option<String>, QualifiedType), ()> {
    let declarator = declarator.node;
    let mut pointers = Vec::new();
    let mut suffixes = Vec::new();
    for modifier in declarator.derived {
        match &modifier.node {
            DerivedDeclarator::Pointer(_) | DerivedDeclarator::Block(_) => pointers.push(modifier),
            _ => suffixes.push(modifier),
        }
    }
    let mut env = env;
    let mut t = base;
    for modifier in pointers.into_iter().chain(suffixes.into_iter().rev()) {
        let (new_env, new_t) = apply_modifier(env, modifier, t, ec)?;
        env = new_env;
        t = new_t;
    }
    match declarator.kind.node {
        DeclaratorKind::Abstract => Ok((env, None, t)),
        DeclaratorKind::Identifier(id) => Ok((env, Some(id.node.name), t)),
        DeclaratorKind::Declarator(inner) => process_declarator(env, *inner, t, ec),
    }
}

fn apply_modifier(
    env: Env,
    modifier: Node<DerivedDeclarator>,
    mut t: QualifiedType,
    ec: &mut ErrorCollector,
) -> Result<(Env, QualifiedType), ()> {
    let span = modifier.span;
    match modifier.node {
        DerivedDeclarator::Pointer(qualifiers) => {
            let mut flags = Qualifiers::empty();
            for qualifier in qualifiers {
                use lang_c::ast::PointerQualifier;
                match qualifier.node {
                    PointerQualifier::TypeQualifier(q) => {
                        flags |= specifiers::convert_qualifier_node(q, ec)?;
                    }
                    PointerQualifier::Extension(_) => (),
                }
            }
            t.wrap_pointer(flags);
            Ok((env, t))
        }
        DerivedDeclarator::Array(array) => {
            let array = array.node;
            let size = match array.size {
                ArraySize::Unknown => None,
                ArraySize::VariableUnknown => {
                    ec.record_warning(
                        CompileWarning::Unimplemented("variable length array".to_string()),
                        span,
                    )?;
                    None
                }
                ArraySize::VariableExpression(expr) | ArraySize::StaticExpression(expr) => {
                    let expr_span = expr.span;
                    match constant::fold_expression(&env, *expr, ec)? {
                        Some(value) => {
                            let count = value.cast_to(ctype::INT_TYPE).v;
                            if count < 0 {
                                ec.record_error(CompileError::NonConstantArraySize, expr_span)?;
                                unreachable!();
                            }
                            Some(count as u32)
                        }
                        None => {
                            ec.record_error(CompileError::NonConstantArraySize, expr_span)?;
                            unreachable!();
                        }
                    }
                }
            };
            t.wrap_array(size);
            Ok((env, t))
        }
        DerivedDeclarator::Function(function) => {
            let function = function.node;
            let variadic = matches!(function.ellipsis, Ellipsis::Some);
            let mut env = env;
            let mut params = Vec::new();
            for parameter in function.parameters {
                let (new_env, name, param_t) =
                    declarations::process_parameter(env, parameter, ec)?;
                env = new_env;
                params.push((name, param_t));
            }
            if is_void_parameter_list(&params) {
                params.clear();
            }
            t.wrap_function(params, variadic);
            Ok((env, t))
        }
        DerivedDeclarator::KRFunction(identifiers) => {
            // an empty identifier list stands for unspecified parameters
            if !identifiers.is_empty() {
                ec.record_warning(
                    CompileWarning::Unimplemented("identifier list".to_string()),
                    span,
                )?;
            }
            t.wrap_function(Vec::new(), false);
            Ok((env, t))
        }
        DerivedDeclarator::Block(_) => {
            ec.record_warning(
                CompileWarning::Unimplemented("block pointer".to_string()),
                span,
            )?;
            Ok((env, t))
        }
    }
}

// f(void) declares no parameters
fn is_void_parameter_list(params: &[(Option<String>, QualifiedType)]) -> bool {
    match params {
        [(None, t)] => t.t.is_void() && t.qualifiers.is_empty(),
        _ => false,
    }
}
