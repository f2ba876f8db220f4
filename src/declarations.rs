use std::fmt::Formatter;

use lang_c::ast::{
    Declaration, DeclarationSpecifier, ExternalDeclaration, Initializer, ParameterDeclaration,
    StructField, TranslationUnit, TypeName, TypeSpecifier,
};
use lang_c::span::Node;

use crate::constant::{self, Value};
use crate::ctype::QualifiedType;
use crate::declarators;
use crate::env::{EntryKind, Env};
use crate::error::{CompileError, CompileWarning, ErrorCollector};
use crate::specifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Auto,
    Extern,
    Static,
    Typedef,
}

/**
 * One declared name: what the declaration called it, how it is stored,
 * its resolved type and its folded scalar initializer, if there was one.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct DeclRecord {
    pub name: String,
    pub storage_class: StorageClass,
    pub t: QualifiedType,
    pub initializer: Option<Value>,
}

/**
 * Process one declaration: resolve the specifiers into a storage class
 * and a base type, then apply each declarator and bind the resulting
 * names.
 *
 * Every produced record is paired with the environment as it was right
 * after that name was bound, so a record's environment sees the names
 * declared before it but not after. The returned environment is the
 * final one. An error leaves the caller's original environment intact.
 */
pub fn process_declaration(
    env: Env,
    declaration: Node<Declaration>,
    ec: &mut ErrorCollector,
) -> Result<(Env, Vec<(Env, DeclRecord)>), ()> {
    let span = declaration.span;
    let declaration = declaration.node;
    let declares_tag = declaration.specifiers.iter().any(|specifier| {
        matches!(
            &specifier.node,
            DeclarationSpecifier::TypeSpecifier(ts)
                if matches!(&ts.node, TypeSpecifier::Struct(_) | TypeSpecifier::Enum(_))
        )
    });
    let (mut env, storage_class, base) =
        specifiers::resolve_declaration_specifiers(env, declaration.specifiers, span, ec)?;
    if declaration.declarators.is_empty() && !declares_tag {
        ec.record_warning(CompileWarning::EmptyDeclaration, span)?;
    }
    let mut records = Vec::new();
    for init_declarator in declaration.declarators {
        let init_span = init_declarator.span;
        let init_declarator = init_declarator.node;
        // folded in the environment as it is before this name is bound
        let initializer = match init_declarator.initializer {
            Some(initializer) => fold_initializer(&env, initializer, ec)?,
            None => None,
        };
        let (new_env, name, t) =
            declarators::process_declarator(env, init_declarator.declarator, base.clone(), ec)?;
        env = new_env;
        match name {
            Some(name) => {
                let kind = match storage_class {
                    StorageClass::Auto => {
                        if env.is_global() {
                            EntryKind::Global
                        } else {
                            EntryKind::Stack
                        }
                    }
                    StorageClass::Extern | StorageClass::Static => EntryKind::Global,
                    StorageClass::Typedef => EntryKind::Typedef,
                };
                env = env.push_entry(kind, &name, t.clone());
                records.push((
                    env.clone(),
                    DeclRecord {
                        name,
                        storage_class,
                        t,
                        initializer,
                    },
                ));
            }
            None => {
                if initializer.is_some() {
                    ec.record_error(
                        CompileError::InvalidInitializerForAbstractDeclarator,
                        init_span,
                    )?;
                    unreachable!();
                }
                ec.record_warning(CompileWarning::EmptyDeclaration, init_span)?;
            }
        }
    }
    Ok((env, records))
}

/**
 * Process every declaration of a translation unit in order, threading
 * the environment through. Function definitions and static assertions
 * are reported as unimplemented and skipped.
 *
 * A failed declaration does not stop the walk, and the ones after it
 * still see every name bound before the failure.
 */
pub fn process_translation_unit(
    env: Env,
    unit: TranslationUnit,
    ec: &mut ErrorCollector,
) -> Result<(Env, Vec<DeclRecord>), ()> {
    let mut env = env;
    let mut records = Vec::new();
    let mut has_error = false;
    for external in unit.0 {
        match external.node {
            ExternalDeclaration::Declaration(declaration) => {
                match process_declaration(env.clone(), declaration, ec) {
                    Ok((new_env, new_records)) => {
                        env = new_env;
                        records.extend(new_records.into_iter().map(|(_, record)| record));
                    }
                    Err(()) => has_error = true,
                }
            }
            ExternalDeclaration::FunctionDefinition(node) => {
                ec.record_warning(
                    CompileWarning::Unimplemented("function definition".to_string()),
                    node.span,
                )?;
            }
            ExternalDeclaration::StaticAssert(node) => {
                ec.record_warning(
                    CompileWarning::Unimplemented("static assertion".to_string()),
                    node.span,
                )?;
            }
        }
    }
    if has_error {
        Err(())
    } else {
        Ok((env, records))
    }
}

/**
 * Resolve a cast or sizeof type name into a type.
 */
pub fn resolve_type_name(
    env: Env,
    type_name: Node<TypeName>,
    ec: &mut ErrorCollector,
) -> Result<(Env, QualifiedType), ()> {
    let span = type_name.span;
    let type_name = type_name.node;
    let (env, base) = specifiers::resolve_specifier_qualifiers(env, type_name.specifiers, span, ec)?;
    match type_name.declarator {
        Some(declarator) => {
            let (env, _, t) = declarators::process_declarator(env, declarator, base, ec)?;
            Ok((env, t))
        }
        None => Ok((env, base)),
    }
}

/**
 * A parameter within a function declarator. The storage class is
 * checked for well-formedness but parameters do not keep one.
 */
pub fn process_parameter(
    env: Env,
    parameter: Node<ParameterDeclaration>,
    ec: &mut ErrorCollector,
) -> Result<(Env, Option<String>, QualifiedType), ()> {
    let span = parameter.span;
    let parameter = parameter.node;
    let (env, _, base) =
        specifiers::resolve_declaration_specifiers(env, parameter.specifiers, span, ec)?;
    match parameter.declarator {
        Some(declarator) => declarators::process_declarator(env, declarator, base, ec),
        None => Ok((env, None, base)),
    }
}

/**
 * One member declaration inside a struct or union, possibly declaring
 * several members off a shared base type.
 */
pub fn process_struct_field(
    env: Env,
    field: Node<StructField>,
    ec: &mut ErrorCollector,
) -> Result<(Env, Vec<(Option<String>, QualifiedType)>), ()> {
    let span = field.span;
    let field = field.node;
    let (mut env, base) = specifiers::resolve_specifier_qualifiers(env, field.specifiers, span, ec)?;
    let mut members = Vec::new();
    for struct_declarator in field.declarators {
        let struct_declarator = struct_declarator.node;
        if let Some(width) = &struct_declarator.bit_width {
            ec.record_warning(
                CompileWarning::Unimplemented("bit-field".to_string()),
                width.span,
            )?;
        }
        match struct_declarator.declarator {
            Some(declarator) => {
                let (new_env, name, t) =
                    declarators::process_declarator(env, declarator, base.clone(), ec)?;
                env = new_env;
                members.push((name, t));
            }
            // an anonymous bit-field does not declare a member
            None => (),
        }
    }
    Ok((env, members))
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            StorageClass::Auto => f.write_str("auto"),
            StorageClass::Extern => f.write_str("extern"),
            StorageClass::Static => f.write_str("static"),
            StorageClass::Typedef => f.write_str("typedef"),
        }
    }
}

impl std::fmt::Display for DeclRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}: {} {}", self.name, self.storage_class, self.t)?;
        if let Some(value) = &self.initializer {
            write!(f, " = {}", value.v)?;
        }
        Ok(())
    }
}

fn fold_initializer(
    env: &Env,
    initializer: Node<Initializer>,
    ec: &mut ErrorCollector,
) -> Result<Option<Value>, ()> {
    let span = initializer.span;
    match initializer.node {
        Initializer::Expression(expr) => constant::fold_expression(env, *expr, ec),
        Initializer::List(_) => {
            ec.record_warning(
                CompileWarning::Unimplemented("initializer list".to_string()),
                span,
            )?;
            Ok(None)
        }
    }
}
