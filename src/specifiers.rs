use std::collections::HashMap;
use std::rc::Rc;

use lang_c::ast::{
    DeclarationSpecifier, EnumType, Identifier, SpecifierQualifier, StructDeclaration, StructKind,
    StructType, TypeSpecifier,
};
use lang_c::span::{Node, Span};

use crate::constant;
use crate::ctype::{self, CType, QualifiedType, Qualifiers};
use crate::declarations::{self, StorageClass};
use crate::env::{enum_tag_key, struct_tag_key, union_tag_key, Entry, EntryKind, Env};
use crate::error::{CompileError, CompileWarning, ErrorCollector};
use crate::layout::{StructLayout, UnionLayout};

/**
 * Stand-in for the scalar `CType` a keyword set resolves to. The table
 * behind `lazy_static` must be `Sync`, which `CType` is not because its
 * aggregate variants hold `Rc` layouts.
 */
#[derive(Debug, Clone, Copy)]
enum BasicType {
    Void,
    Char,
    UChar,
    Short,
    UShort,
    Long,
    ULong,
    Float,
    Double,
}

impl BasicType {
    fn ctype(self) -> CType {
        match self {
            BasicType::Void => CType::Void,
            BasicType::Char => CType::Char,
            BasicType::UChar => CType::UChar,
            BasicType::Short => CType::Short,
            BasicType::UShort => CType::UShort,
            BasicType::Long => CType::Long,
            BasicType::ULong => CType::ULong,
            BasicType::Float => CType::Float,
            BasicType::Double => CType::Double,
        }
    }
}

lazy_static! {
    // Keys are sorted, deduplicated keyword sets.
    static ref BASIC_TYPES: HashMap<Vec<&'static str>, BasicType> = {
        use BasicType::*;
        let entries: &[(&[&'static str], BasicType)] = &[
            (&["void"], Void),
            (&["char"], Char),
            (&["char", "signed"], Char),
            (&["char", "unsigned"], UChar),
            (&["short"], Short),
            (&["short", "signed"], Short),
            (&["int", "short"], Short),
            (&["int", "short", "signed"], Short),
            (&["short", "unsigned"], UShort),
            (&["int", "short", "unsigned"], UShort),
            (&["int"], Long),
            (&["signed"], Long),
            (&["int", "signed"], Long),
            (&["long"], Long),
            (&["long", "signed"], Long),
            (&["int", "long"], Long),
            (&["int", "long", "signed"], Long),
            (&["unsigned"], ULong),
            (&["int", "unsigned"], ULong),
            (&["long", "unsigned"], ULong),
            (&["int", "long", "unsigned"], ULong),
            (&["float"], Float),
            (&["double"], Double),
            (&["double", "long"], Double),
        ];
        entries.iter().map(|(k, t)| (k.to_vec(), *t)).collect()
    };
}

assert_impl_all!(HashMap<Vec<&'static str>, BasicType>: Sync);

/**
 * Resolve the specifier part of a declaration into a storage class and a
 * base type. Tag definitions among the specifiers extend the
 * environment, so the updated environment is returned alongside.
 */
pub fn resolve_declaration_specifiers(
    env: Env,
    specifiers: Vec<Node<DeclarationSpecifier>>,
    span: Span,
    ec: &mut ErrorCollector,
) -> Result<(Env, StorageClass, QualifiedType), ()> {
    let mut storage_class = None;
    let mut collected = CollectedSpecifiers::new();
    for specifier in specifiers {
        let spec_span = specifier.span;
        match specifier.node {
            DeclarationSpecifier::StorageClass(sc) => {
                if storage_class.is_some() {
                    ec.record_error(CompileError::MultipleStorageClasses, sc.span)?;
                    unreachable!();
                }
                storage_class = Some(convert_storage_class(sc, ec)?);
            }
            DeclarationSpecifier::TypeSpecifier(ts) => collected.add_type_specifier(ts),
            DeclarationSpecifier::TypeQualifier(q) => {
                collected.qualifiers |= convert_qualifier_node(q, ec)?;
            }
            DeclarationSpecifier::Function(fs) => {
                use lang_c::ast::FunctionSpecifier;
                let what = match fs.node {
                    FunctionSpecifier::Inline => "inline",
                    FunctionSpecifier::Noreturn => "_Noreturn",
                };
                ec.record_warning(CompileWarning::Unimplemented(what.to_string()), fs.span)?;
            }
            DeclarationSpecifier::Alignment(_) => {
                ec.record_warning(
                    CompileWarning::Unimplemented("alignment specifier".to_string()),
                    spec_span,
                )?;
            }
            DeclarationSpecifier::Extension(_) => (),
        }
    }
    let storage_class = storage_class.unwrap_or(StorageClass::Auto);
    let (env, t) = collected.resolve(env, span, ec)?;
    Ok((env, storage_class, t))
}

/**
 * Resolve a specifier-qualifier list, as used by struct members and type
 * names. No storage class is allowed there.
 */
pub fn resolve_specifier_qualifiers(
    env: Env,
    specifiers: Vec<Node<SpecifierQualifier>>,
    span: Span,
    ec: &mut ErrorCollector,
) -> Result<(Env, QualifiedType), ()> {
    let mut collected = CollectedSpecifiers::new();
    for specifier in specifiers {
        match specifier.node {
            SpecifierQualifier::TypeSpecifier(ts) => collected.add_type_specifier(ts),
            SpecifierQualifier::TypeQualifier(q) => {
                collected.qualifiers |= convert_qualifier_node(q, ec)?;
            }
            _ => (),
        }
    }
    collected.resolve(env, span, ec)
}

pub(crate) fn convert_qualifier_node(
    q: Node<lang_c::ast::TypeQualifier>,
    ec: &mut ErrorCollector,
) -> Result<Qualifiers, ()> {
    use lang_c::ast::TypeQualifier;
    let span = q.span;
    let qual = match q.node {
        TypeQualifier::Const => Qualifiers::CONST,
        TypeQualifier::Volatile => Qualifiers::VOLATILE,
        _ => {
            ec.record_warning(
                CompileWarning::Unimplemented("unknown qualifier".to_string()),
                span,
            )?;
            Qualifiers::empty()
        }
    };
    Ok(qual)
}

fn convert_storage_class(
    sc: Node<lang_c::ast::StorageClassSpecifier>,
    ec: &mut ErrorCollector,
) -> Result<StorageClass, ()> {
    use lang_c::ast::StorageClassSpecifier;
    let span = sc.span;
    match sc.node {
        StorageClassSpecifier::Typedef => Ok(StorageClass::Typedef),
        StorageClassSpecifier::Extern => Ok(StorageClass::Extern),
        StorageClassSpecifier::Static => Ok(StorageClass::Static),
        StorageClassSpecifier::Auto | StorageClassSpecifier::Register => Ok(StorageClass::Auto),
        StorageClassSpecifier::ThreadLocal => {
            ec.record_warning(
                CompileWarning::Unimplemented("_Thread_local".to_string()),
                span,
            )?;
            Ok(StorageClass::Auto)
        }
    }
}

enum NonBasicSpecifier {
    TypedefName(Node<Identifier>),
    Aggregate(Node<StructType>),
    Enumeration(Node<EnumType>),
}

struct CollectedSpecifiers {
    keywords: Vec<&'static str>,
    specials: Vec<NonBasicSpecifier>,
    qualifiers: Qualifiers,
}

impl CollectedSpecifiers {
    fn new() -> Self {
        Self {
            keywords: Vec::new(),
            specials: Vec::new(),
            qualifiers: Qualifiers::empty(),
        }
    }

    fn add_type_specifier(&mut self, node: Node<TypeSpecifier>) {
        match node.node {
            TypeSpecifier::Void => self.keywords.push("void"),
            TypeSpecifier::Char => self.keywords.push("char"),
            TypeSpecifier::Short => self.keywords.push("short"),
            TypeSpecifier::Int => self.keywords.push("int"),
            TypeSpecifier::Long => self.keywords.push("long"),
            TypeSpecifier::Float => self.keywords.push("float"),
            TypeSpecifier::Double => self.keywords.push("double"),
            TypeSpecifier::Signed => self.keywords.push("signed"),
            TypeSpecifier::Unsigned => self.keywords.push("unsigned"),
            TypeSpecifier::Bool => self.keywords.push("_Bool"),
            TypeSpecifier::Complex => self.keywords.push("_Complex"),
            TypeSpecifier::Atomic(_) => self.keywords.push("_Atomic"),
            TypeSpecifier::TypeOf(_) => self.keywords.push("typeof"),
            TypeSpecifier::TypedefName(id) => {
                self.specials.push(NonBasicSpecifier::TypedefName(id))
            }
            TypeSpecifier::Struct(node) => self.specials.push(NonBasicSpecifier::Aggregate(node)),
            TypeSpecifier::Enum(node) => self.specials.push(NonBasicSpecifier::Enumeration(node)),
            _ => self.keywords.push("_Float"),
        }
    }

    /**
     * Turn the collected set into a type. Keyword specifiers are matched
     * as a set, so `long int signed` and `signed long` agree, and
     * duplicated keywords are allowed. A typedef name or a tag specifier
     * must stand alone.
     */
    fn resolve(
        mut self,
        env: Env,
        span: Span,
        ec: &mut ErrorCollector,
    ) -> Result<(Env, QualifiedType), ()> {
        let is_const = self.qualifiers.contains(Qualifiers::CONST);
        let is_volatile = self.qualifiers.contains(Qualifiers::VOLATILE);
        if self.specials.len() > 1 || (!self.specials.is_empty() && !self.keywords.is_empty()) {
            ec.record_error(CompileError::UnmatchedSpecifiers(self.spelling()), span)?;
            unreachable!();
        }
        let (env, t) = match self.specials.pop() {
            Some(NonBasicSpecifier::TypedefName(id)) => resolve_typedef_name(env, id, ec)?,
            Some(NonBasicSpecifier::Aggregate(node)) => resolve_struct_union(env, node, ec)?,
            Some(NonBasicSpecifier::Enumeration(node)) => resolve_enum(env, node, ec)?,
            None if self.keywords.is_empty() => {
                ec.record_warning(CompileWarning::ImplicitInt, span)?;
                (env, QualifiedType::new(ctype::INT_TYPE))
            }
            None => {
                let mut set = self.keywords.clone();
                set.sort_unstable();
                set.dedup();
                match BASIC_TYPES.get(&set) {
                    Some(t) => (env, QualifiedType::new(t.ctype())),
                    None => {
                        ec.record_error(CompileError::UnmatchedSpecifiers(self.spelling()), span)?;
                        unreachable!();
                    }
                }
            }
        };
        Ok((env, t.with_qualifiers(is_const, is_volatile)))
    }

    fn spelling(&self) -> String {
        let mut parts: Vec<&str> = self.keywords.clone();
        for special in &self.specials {
            parts.push(match special {
                NonBasicSpecifier::TypedefName(id) => &id.node.name,
                NonBasicSpecifier::Aggregate(node) => match node.node.kind.node {
                    StructKind::Struct => "struct",
                    StructKind::Union => "union",
                },
                NonBasicSpecifier::Enumeration(_) => "enum",
            });
        }
        parts.join(" ")
    }
}

fn resolve_typedef_name(
    env: Env,
    id: Node<Identifier>,
    ec: &mut ErrorCollector,
) -> Result<(Env, QualifiedType), ()> {
    let span = id.span;
    let name = id.node.name;
    match env.find(&name) {
        Entry::Typedef(t) => Ok((env, t)),
        Entry::NotFound => {
            ec.record_error(CompileError::UnknownTypedefName(name), span)?;
            unreachable!();
        }
        _ => {
            ec.record_error(CompileError::NotATypedefName(name), span)?;
            unreachable!();
        }
    }
}

/**
 * An enumeration is just an int here. Defining one binds its
 * enumerators as constants and its tag, if any, in the environment.
 */
fn resolve_enum(
    env: Env,
    node: Node<EnumType>,
    ec: &mut ErrorCollector,
) -> Result<(Env, QualifiedType), ()> {
    let enum_type = node.node;
    if enum_type.enumerators.is_empty() {
        if let Some(id) = enum_type.identifier {
            let span = id.span;
            let tag = id.node.name;
            return match env.find(&enum_tag_key(&tag)) {
                Entry::Typedef(t) => Ok((env, t)),
                Entry::NotFound => {
                    ec.record_error(CompileError::UndefinedTag(tag), span)?;
                    unreachable!();
                }
                _ => {
                    ec.record_error(CompileError::TagKindMismatch(tag), span)?;
                    unreachable!();
                }
            };
        }
        return Ok((env, QualifiedType::new(ctype::ENUM_TYPE)));
    }
    let mut env = env;
    let mut next: i128 = 0;
    for enumerator in enum_type.enumerators {
        let enumerator = enumerator.node;
        let name = enumerator.identifier.node.name;
        if let Some(expr) = enumerator.expression {
            let expr_span = expr.span;
            match constant::fold_expression(&env, *expr, ec)? {
                Some(value) => next = value.v,
                None => {
                    ec.record_error(CompileError::NonConstantEnumValue(name), expr_span)?;
                    unreachable!();
                }
            }
        }
        let value = constant::Value::new(ctype::ENUM_TYPE, next);
        env = env.push_enum(&name, QualifiedType::new(ctype::ENUM_TYPE), value.v);
        next = value.v + 1;
    }
    let env = match enum_type.identifier {
        Some(id) => env.push_entry(
            EntryKind::Typedef,
            &enum_tag_key(&id.node.name),
            QualifiedType::new(ctype::ENUM_TYPE),
        ),
        None => env,
    };
    Ok((env, QualifiedType::new(ctype::ENUM_TYPE)))
}

fn resolve_struct_union(
    env: Env,
    node: Node<StructType>,
    ec: &mut ErrorCollector,
) -> Result<(Env, QualifiedType), ()> {
    let struct_type = node.node;
    let is_union = match struct_type.kind.node {
        StructKind::Struct => false,
        StructKind::Union => true,
    };
    match (struct_type.identifier, struct_type.declarations) {
        (None, declarations) => {
            // anonymous aggregates are a fresh type at every occurrence
            let (env, t) = create_aggregate(env, is_union, declarations.unwrap_or_default(), ec)?;
            Ok((env, QualifiedType::new(t)))
        }
        (Some(id), None) => {
            let span = id.span;
            let tag = id.node.name;
            let key = tag_key(is_union, &tag);
            match env.find(&key) {
                Entry::Typedef(t) => Ok((env, t)),
                Entry::NotFound => {
                    // first mention declares the tag as an incomplete type
                    let t = incomplete_aggregate(is_union, tag);
                    let env = env.push_entry(EntryKind::Typedef, &key, QualifiedType::new(t.clone()));
                    Ok((env, QualifiedType::new(t)))
                }
                _ => {
                    ec.record_error(CompileError::TagKindMismatch(tag), span)?;
                    unreachable!();
                }
            }
        }
        (Some(id), Some(declarations)) => {
            let span = id.span;
            let tag = id.node.name;
            let key = tag_key(is_union, &tag);
            if let Entry::Typedef(t) = env.find(&key) {
                if matches!(t.t, CType::Struct(_) | CType::Union(_)) {
                    ec.record_error(CompileError::AggregateRedefinition(tag), span)?;
                    unreachable!();
                }
            }
            // the tag is visible as an incomplete type inside its own definition
            let placeholder = incomplete_aggregate(is_union, tag.clone());
            let env = env.push_entry(EntryKind::Typedef, &key, QualifiedType::new(placeholder));
            let (env, t) = create_aggregate(env, is_union, declarations, ec)?;
            let env = env.push_entry(EntryKind::Typedef, &key, QualifiedType::new(t.clone()));
            Ok((env, QualifiedType::new(t)))
        }
    }
}

fn create_aggregate(
    env: Env,
    is_union: bool,
    declarations: Vec<Node<StructDeclaration>>,
    ec: &mut ErrorCollector,
) -> Result<(Env, CType), ()> {
    let (env, members) = resolve_members(env, declarations, ec)?;
    let t = if is_union {
        CType::Union(Rc::new(UnionLayout::create(members)))
    } else {
        CType::Struct(Rc::new(StructLayout::create(members)))
    };
    Ok((env, t))
}

fn resolve_members(
    mut env: Env,
    declarations: Vec<Node<StructDeclaration>>,
    ec: &mut ErrorCollector,
) -> Result<(Env, Vec<(Option<String>, QualifiedType)>), ()> {
    let mut members = Vec::new();
    for declaration in declarations {
        match declaration.node {
            StructDeclaration::Field(field) => {
                let (new_env, mut field_members) =
                    declarations::process_struct_field(env, field, ec)?;
                env = new_env;
                members.append(&mut field_members);
            }
            StructDeclaration::StaticAssert(node) => {
                ec.record_warning(
                    CompileWarning::Unimplemented("static assertion".to_string()),
                    node.span,
                )?;
            }
        }
    }
    Ok((env, members))
}

fn tag_key(is_union: bool, tag: &str) -> String {
    if is_union {
        union_tag_key(tag)
    } else {
        struct_tag_key(tag)
    }
}

fn incomplete_aggregate(is_union: bool, tag: String) -> CType {
    if is_union {
        CType::IncompleteUnion(tag)
    } else {
        CType::IncompleteStruct(tag)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lang_c::ast::{Declaration, ExternalDeclaration};
    use lang_c::driver::{parse_preprocessed, Config, Flavor};

    fn parse_declarations(code: &str) -> Vec<Node<Declaration>> {
        let mut cfg = Config::default();
        cfg.flavor = Flavor::StdC11;
        let p = parse_preprocessed(&cfg, code.to_string()).unwrap();
        p.unit
            .0
            .into_iter()
            .map(|ed| match ed.node {
                ExternalDeclaration::Declaration(d) => d,
                _ => panic!("expected a declaration"),
            })
            .collect()
    }

    fn resolve_in(
        env: Env,
        code: &str,
    ) -> (
        Result<(Env, StorageClass, QualifiedType), ()>,
        ErrorCollector,
    ) {
        let mut ec = ErrorCollector::new();
        let decl = parse_declarations(code).remove(0);
        let r = resolve_declaration_specifiers(env, decl.node.specifiers, decl.span, &mut ec);
        (r, ec)
    }

    fn base_type(code: &str) -> QualifiedType {
        let (r, ec) = resolve_in(Env::new(), code);
        assert_eq!(ec.get_error_count(), 0);
        let (_, _, t) = r.unwrap();
        t
    }

    #[test]
    fn test_basic_types() {
        let cases: &[(&str, CType)] = &[
            ("int x;", CType::Long),
            ("signed x;", CType::Long),
            ("long x;", CType::Long),
            ("long int x;", CType::Long),
            ("signed long int x;", CType::Long),
            ("unsigned x;", CType::ULong),
            ("unsigned long x;", CType::ULong),
            ("long unsigned int x;", CType::ULong),
            ("char x;", CType::Char),
            ("signed char x;", CType::Char),
            ("unsigned char x;", CType::UChar),
            ("short x;", CType::Short),
            ("short int x;", CType::Short),
            ("signed short x;", CType::Short),
            ("unsigned short int x;", CType::UShort),
            ("float x;", CType::Float),
            ("double x;", CType::Double),
            ("long double x;", CType::Double),
            ("void *x;", CType::Void),
        ];
        for (code, expected) in cases {
            assert_eq!(base_type(code).t, *expected, "{}", code);
        }
    }

    #[test]
    fn test_keyword_order_and_duplicates() {
        assert_eq!(base_type("int long signed x;").t, CType::Long);
        assert_eq!(base_type("double long x;").t, CType::Double);
        assert_eq!(base_type("unsigned unsigned int x;").t, CType::ULong);
    }

    #[test]
    fn test_unmatched_specifiers() {
        for code in &["long char x;", "long short x;", "float int x;", "_Bool x;"] {
            let (r, ec) = resolve_in(Env::new(), code);
            assert!(r.is_err(), "{}", code);
            assert_eq!(ec.get_error_count(), 1, "{}", code);
            assert!(matches!(
                ec.get_first_error(),
                Some((CompileError::UnmatchedSpecifiers(_), _))
            ));
        }
    }

    #[test]
    fn test_implicit_int() {
        let mut ec = ErrorCollector::new();
        let r = resolve_declaration_specifiers(Env::new(), Vec::new(), Span::none(), &mut ec);
        let (_, storage_class, t) = r.unwrap();
        assert_eq!(storage_class, StorageClass::Auto);
        assert_eq!(t.t, CType::Long);
        assert_eq!(ec.get_warning_count(), 1);
        assert!(matches!(
            ec.get_first_warning(),
            Some((CompileWarning::ImplicitInt, _))
        ));
    }

    #[test]
    fn test_storage_classes() {
        let cases: &[(&str, StorageClass)] = &[
            ("int x;", StorageClass::Auto),
            ("auto int x;", StorageClass::Auto),
            ("register int x;", StorageClass::Auto),
            ("extern int x;", StorageClass::Extern),
            ("static int x;", StorageClass::Static),
            ("typedef int x;", StorageClass::Typedef),
        ];
        for (code, expected) in cases {
            let (r, ec) = resolve_in(Env::new(), code);
            assert_eq!(ec.get_error_count(), 0);
            let (_, storage_class, _) = r.unwrap();
            assert_eq!(storage_class, *expected, "{}", code);
        }
    }

    #[test]
    fn test_multiple_storage_classes() {
        let (r, ec) = resolve_in(Env::new(), "static extern int x;");
        assert!(r.is_err());
        assert_eq!(
            ec.get_first_error().unwrap().0,
            CompileError::MultipleStorageClasses
        );
    }

    #[test]
    fn test_qualifiers() {
        let t = base_type("const int x;");
        assert!(t.is_const() && !t.is_volatile());
        let t = base_type("volatile const int x;");
        assert!(t.is_const() && t.is_volatile());
    }

    #[test]
    fn test_typedef_name() {
        let decls = parse_declarations("typedef int myint; myint x;");
        let second = decls.into_iter().nth(1).unwrap();
        let mut ec = ErrorCollector::new();
        let env = Env::new().push_entry(
            EntryKind::Typedef,
            "myint",
            QualifiedType::new(CType::Short),
        );
        let r = resolve_declaration_specifiers(env, second.node.specifiers, second.span, &mut ec);
        let (_, _, t) = r.unwrap();
        assert_eq!(t.t, CType::Short);
    }

    #[test]
    fn test_unknown_typedef_name() {
        let decls = parse_declarations("typedef int myint; myint x;");
        let second = decls.into_iter().nth(1).unwrap();
        let mut ec = ErrorCollector::new();
        let r =
            resolve_declaration_specifiers(Env::new(), second.node.specifiers, second.span, &mut ec);
        assert!(r.is_err());
        assert!(matches!(
            ec.get_first_error(),
            Some((CompileError::UnknownTypedefName(_), _))
        ));
    }

    #[test]
    fn test_not_a_typedef_name() {
        let decls = parse_declarations("typedef int myint; myint x;");
        let second = decls.into_iter().nth(1).unwrap();
        let mut ec = ErrorCollector::new();
        let env = Env::new().push_entry(
            EntryKind::Global,
            "myint",
            QualifiedType::new(CType::Long),
        );
        let r = resolve_declaration_specifiers(env, second.node.specifiers, second.span, &mut ec);
        assert!(r.is_err());
        assert!(matches!(
            ec.get_first_error(),
            Some((CompileError::NotATypedefName(_), _))
        ));
    }

    #[test]
    fn test_enum_definition() {
        let (r, ec) = resolve_in(Env::new(), "enum E { A, B = 5, C } x;");
        assert_eq!(ec.get_error_count(), 0);
        let (env, _, t) = r.unwrap();
        assert_eq!(t.t, CType::Long);
        assert_eq!(
            env.find("A"),
            Entry::EnumConstant(QualifiedType::new(CType::Long), 0)
        );
        assert_eq!(
            env.find("B"),
            Entry::EnumConstant(QualifiedType::new(CType::Long), 5)
        );
        assert_eq!(
            env.find("C"),
            Entry::EnumConstant(QualifiedType::new(CType::Long), 6)
        );
        assert!(matches!(env.find(&enum_tag_key("E")), Entry::Typedef(_)));
    }

    #[test]
    fn test_enum_mention() {
        let (r, _) = resolve_in(Env::new(), "enum E { A } x;");
        let (env, _, _) = r.unwrap();
        let decl = parse_declarations("enum E { A } x; enum E y;")
            .into_iter()
            .nth(1)
            .unwrap();
        let mut ec = ErrorCollector::new();
        let r = resolve_declaration_specifiers(env, decl.node.specifiers, decl.span, &mut ec);
        let (_, _, t) = r.unwrap();
        assert_eq!(t.t, CType::Long);
    }

    #[test]
    fn test_enum_undefined() {
        let (r, ec) = resolve_in(Env::new(), "enum E x;");
        assert!(r.is_err());
        assert!(matches!(
            ec.get_first_error(),
            Some((CompileError::UndefinedTag(_), _))
        ));
    }

    #[test]
    fn test_non_constant_enum_value() {
        let (r, ec) = resolve_in(Env::new(), "enum E { A = y } x;");
        assert!(r.is_err());
        assert!(matches!(
            ec.get_first_error(),
            Some((CompileError::NonConstantEnumValue(_), _))
        ));
    }

    #[test]
    fn test_struct_definition() {
        let (r, ec) = resolve_in(Env::new(), "struct S { char c; long l; } x;");
        assert_eq!(ec.get_error_count(), 0);
        let (env, _, t) = r.unwrap();
        assert_eq!(t.t.sizeof(), 8);
        assert_eq!(t.t.alignof(), 4);
        assert!(matches!(
            env.find(&struct_tag_key("S")),
            Entry::Typedef(_)
        ));
    }

    #[test]
    fn test_struct_mention_binds_incomplete() {
        let (r, ec) = resolve_in(Env::new(), "struct S *p;");
        assert_eq!(ec.get_error_count(), 0);
        let (env, _, t) = r.unwrap();
        assert_eq!(t.t, CType::IncompleteStruct("S".to_string()));
        assert!(!env.find(&struct_tag_key("S")).is_not_found());
    }

    #[test]
    fn test_struct_self_reference() {
        let (r, ec) = resolve_in(Env::new(), "struct N { struct N *next; long v; } x;");
        assert_eq!(ec.get_error_count(), 0);
        let (_, _, t) = r.unwrap();
        assert_eq!(t.t.sizeof(), 8);
        let layout = match &t.t {
            CType::Struct(layout) => layout.clone(),
            _ => panic!("expected a struct"),
        };
        let next = layout.get_member("next").unwrap();
        assert!(next.t.t.is_pointer());
    }

    #[test]
    fn test_struct_completion() {
        let (r, _) = resolve_in(Env::new(), "struct S *p;");
        let (env, _, _) = r.unwrap();
        let decl = parse_declarations("struct S { long a; } x;").remove(0);
        let mut ec = ErrorCollector::new();
        let r = resolve_declaration_specifiers(env, decl.node.specifiers, decl.span, &mut ec);
        assert_eq!(ec.get_error_count(), 0);
        let (env, _, t) = r.unwrap();
        assert!(t.t.is_complete());
        let bound = match env.find(&struct_tag_key("S")) {
            Entry::Typedef(t) => t,
            _ => panic!("tag is not bound"),
        };
        assert!(bound.t.is_complete());
    }

    #[test]
    fn test_struct_redefinition() {
        let (r, _) = resolve_in(Env::new(), "struct S { long a; } x;");
        let (env, _, _) = r.unwrap();
        let decl = parse_declarations("struct S { long b; } y;").remove(0);
        let mut ec = ErrorCollector::new();
        let r = resolve_declaration_specifiers(env, decl.node.specifiers, decl.span, &mut ec);
        assert!(r.is_err());
        assert!(matches!(
            ec.get_first_error(),
            Some((CompileError::AggregateRedefinition(_), _))
        ));
    }

    #[test]
    fn test_tag_kind_mismatch() {
        let env = Env::new().push_entry(
            EntryKind::Global,
            &struct_tag_key("S"),
            QualifiedType::new(CType::Long),
        );
        let (r, ec) = resolve_in(env, "struct S x;");
        assert!(r.is_err());
        assert!(matches!(
            ec.get_first_error(),
            Some((CompileError::TagKindMismatch(_), _))
        ));
    }

    #[test]
    fn test_union() {
        let (r, ec) = resolve_in(Env::new(), "union U { char c[6]; long l; } x;");
        assert_eq!(ec.get_error_count(), 0);
        let (_, _, t) = r.unwrap();
        assert_eq!(t.t.sizeof(), 6);
        assert_eq!(t.t.alignof(), 6);
    }

    #[test]
    fn test_struct_and_union_tags_are_distinct() {
        let (r, _) = resolve_in(Env::new(), "struct T { long a; } x;");
        let (env, _, _) = r.unwrap();
        let decl = parse_declarations("union T { char c; } y;").remove(0);
        let mut ec = ErrorCollector::new();
        let r = resolve_declaration_specifiers(env, decl.node.specifiers, decl.span, &mut ec);
        assert_eq!(ec.get_error_count(), 0);
        let (env, _, _) = r.unwrap();
        assert!(!env.find(&struct_tag_key("T")).is_not_found());
        assert!(!env.find(&union_tag_key("T")).is_not_found());
    }

    #[test]
    fn test_anonymous_struct() {
        let (r, ec) = resolve_in(Env::new(), "struct { long a; char b; } x;");
        assert_eq!(ec.get_error_count(), 0);
        let (_, _, t) = r.unwrap();
        assert_eq!(t.t.sizeof(), 8);
        assert!(t.t.is_complete());
    }
}
