use crate::layout::{FunctionLayout, StructLayout, UnionLayout};
use crate::machine;
use bitflags::bitflags;
use replace_with::replace_with_or_abort;
use std::fmt::Formatter;
use std::rc::Rc;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub enum CType {
    Void,
    Char,
    UChar,
    Short,
    UShort,
    Long,
    ULong,
    Float,
    Double,
    Pointer(Box<QualifiedType>),
    Array(Box<QualifiedType>, u32),
    IncompleteArray(Box<QualifiedType>),
    Struct(Rc<StructLayout>),
    IncompleteStruct(String),
    Union(Rc<UnionLayout>),
    IncompleteUnion(String),
    Function(Rc<FunctionLayout>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedType {
    pub t: CType,
    pub qualifiers: Qualifiers,
}

bitflags! {
    pub struct Qualifiers: u32 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
    }
}

/**
 * The machine is a 32-bit model: C `int` is represented by `Long`.
 */
pub const INT_TYPE: CType = CType::Long;
pub const UINT_TYPE: CType = CType::ULong;

/**
 * Enums are representationally indistinguishable from `long`.
 */
pub const ENUM_TYPE: CType = CType::Long;

impl QualifiedType {
    pub fn new(t: CType) -> Self {
        Self {
            t,
            qualifiers: Qualifiers::empty(),
        }
    }

    /**
     * Return the same type with the qualifier flags replaced.
     *
     * The structural payload is shared with `self`; size and alignment are
     * unaffected.
     */
    pub fn with_qualifiers(&self, is_const: bool, is_volatile: bool) -> Self {
        let mut qualifiers = Qualifiers::empty();
        if is_const {
            qualifiers |= Qualifiers::CONST;
        }
        if is_volatile {
            qualifiers |= Qualifiers::VOLATILE;
        }
        Self {
            t: self.t.clone(),
            qualifiers,
        }
    }

    pub fn is_const(&self) -> bool {
        self.qualifiers.contains(Qualifiers::CONST)
    }

    pub fn is_volatile(&self) -> bool {
        self.qualifiers.contains(Qualifiers::VOLATILE)
    }

    /**
     * Checks whether two types may be used interchangeably in declarations.
     * Qualifiers do not participate.
     */
    pub fn equal_type(&self, other: &Self) -> bool {
        self.t.equal_type(&other.t)
    }

    pub fn wrap_pointer(&mut self, qualifiers: Qualifiers) {
        replace_with_or_abort(self, |self_| QualifiedType {
            t: CType::Pointer(Box::new(self_)),
            qualifiers,
        });
    }

    /**
     * Original type becomes the element type of the array.
     * No size makes an incomplete array.
     */
    pub fn wrap_array(&mut self, size: Option<u32>) {
        replace_with_or_abort(self, |self_| QualifiedType {
            t: match size {
                Some(n) => CType::Array(Box::new(self_), n),
                None => CType::IncompleteArray(Box::new(self_)),
            },
            qualifiers: Qualifiers::empty(),
        });
    }

    /**
     * Original type becomes the return type of the function.
     */
    pub fn wrap_function(&mut self, params: Vec<(Option<String>, QualifiedType)>, variadic: bool) {
        replace_with_or_abort(self, |self_| QualifiedType {
            t: CType::Function(Rc::new(FunctionLayout::create(self_, params, variadic))),
            qualifiers: Qualifiers::empty(),
        });
    }
}

impl CType {
    pub fn sizeof(&self) -> u32 {
        match self {
            CType::Void => 0,
            CType::Char | CType::UChar => machine::CHAR_SIZE,
            CType::Short | CType::UShort => machine::SHORT_SIZE,
            CType::Long | CType::ULong => machine::LONG_SIZE,
            CType::Float => machine::FLOAT_SIZE,
            CType::Double => machine::DOUBLE_SIZE,
            CType::Pointer(_) => machine::PTR_SIZE,
            CType::Array(t, n) => t.t.sizeof().wrapping_mul(*n),
            CType::IncompleteArray(_) => 0,
            CType::Struct(l) => l.size,
            CType::IncompleteStruct(_) => 0,
            CType::Union(l) => l.size,
            CType::IncompleteUnion(_) => 0,
            CType::Function(l) => l.size,
        }
    }

    pub fn alignof(&self) -> u32 {
        match self {
            CType::Void => 0,
            CType::Char | CType::UChar => machine::CHAR_ALIGN,
            CType::Short | CType::UShort => machine::SHORT_ALIGN,
            CType::Long | CType::ULong => machine::LONG_ALIGN,
            CType::Float => machine::FLOAT_ALIGN,
            CType::Double => machine::DOUBLE_ALIGN,
            CType::Pointer(_) => machine::PTR_ALIGN,
            CType::Array(t, _) | CType::IncompleteArray(t) => t.t.alignof(),
            CType::Struct(l) => l.alignment,
            CType::IncompleteStruct(_) => 0,
            CType::Union(l) => l.alignment(),
            CType::IncompleteUnion(_) => 0,
            CType::Function(l) => l.alignment,
        }
    }

    pub fn is_integral(&self) -> bool {
        use CType::*;
        match self {
            Char | UChar | Short | UShort | Long | ULong => true,
            _ => false,
        }
    }

    pub fn is_signed(&self) -> bool {
        use CType::*;
        match self {
            Char | Short | Long => true,
            _ => false,
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        use CType::*;
        match self {
            Float | Double => true,
            _ => self.is_integral(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.is_pointer()
    }

    pub fn is_pointer(&self) -> bool {
        if let CType::Pointer(_) = self {
            true
        } else {
            false
        }
    }

    pub fn is_array(&self) -> bool {
        match self {
            CType::Array(_, _) | CType::IncompleteArray(_) => true,
            _ => false,
        }
    }

    pub fn is_function(&self) -> bool {
        if let CType::Function(_) = self {
            true
        } else {
            false
        }
    }

    pub fn is_void(&self) -> bool {
        if let CType::Void = self {
            true
        } else {
            false
        }
    }

    /**
     * A type is complete when its size is fully known: not an incomplete
     * tag or array and, recursively, no incomplete member. Pointers to
     * incomplete types are complete.
     */
    pub fn is_complete(&self) -> bool {
        match self {
            CType::IncompleteArray(_)
            | CType::IncompleteStruct(_)
            | CType::IncompleteUnion(_) => false,
            CType::Array(t, _) => t.t.is_complete(),
            CType::Struct(l) => l.members.iter().all(|m| m.t.t.is_complete()),
            CType::Union(l) => l.members.iter().all(|(_, t)| t.t.is_complete()),
            _ => true,
        }
    }

    /**
     * Structural type equality for declaration compatibility.
     *
     * Arithmetic types and void compare by variant alone. Arrays compare by
     * element type, the element count does not participate, and complete
     * and incomplete arrays unify. Struct and union types compare by
     * identity of their resolved layout: two separately defined aggregates
     * are distinct even with identical bodies.
     */
    pub fn equal_type(&self, other: &Self) -> bool {
        use CType::*;
        match (self, other) {
            (Void, Void)
            | (Char, Char)
            | (UChar, UChar)
            | (Short, Short)
            | (UShort, UShort)
            | (Long, Long)
            | (ULong, ULong)
            | (Float, Float)
            | (Double, Double) => true,
            (Pointer(a), Pointer(b)) => a.t.equal_type(&b.t),
            (Array(a, _), Array(b, _))
            | (Array(a, _), IncompleteArray(b))
            | (IncompleteArray(a), Array(b, _))
            | (IncompleteArray(a), IncompleteArray(b)) => a.t.equal_type(&b.t),
            (Struct(a), Struct(b)) => Rc::ptr_eq(a, b),
            (Union(a), Union(b)) => Rc::ptr_eq(a, b),
            (IncompleteStruct(a), IncompleteStruct(b)) => a == b,
            (IncompleteUnion(a), IncompleteUnion(b)) => a == b,
            (Function(a), Function(b)) => {
                a.variadic == b.variadic
                    && a.return_type.equal_type(&b.return_type)
                    && a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(b.params.iter())
                        .all(|(p1, p2)| p1.t.equal_type(&p2.t))
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for CType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        use CType::*;
        match self {
            Void => f.write_str("void"),
            Char => f.write_str("char"),
            UChar => f.write_str("unsigned char"),
            Short => f.write_str("short"),
            UShort => f.write_str("unsigned short"),
            Long => f.write_str("long"),
            ULong => f.write_str("unsigned long"),
            Float => f.write_str("float"),
            Double => f.write_str("double"),
            Pointer(inner) => write!(f, "{} *", inner),
            Array(inner, n) => write!(f, "{} [{}]", inner, n),
            IncompleteArray(inner) => write!(f, "{} []", inner),
            Struct(l) => write!(f, "struct {}", l),
            IncompleteStruct(tag) => write!(f, "struct {}", tag),
            Union(l) => write!(f, "union {}", l),
            IncompleteUnion(tag) => write!(f, "union {}", tag),
            Function(l) => write!(f, "{}", l),
        }
    }
}

impl std::fmt::Display for QualifiedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}{}", self.qualifiers, self.t)
    }
}

impl std::fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        if self.contains(Qualifiers::CONST) {
            f.write_str("const ")?;
        }
        if self.contains(Qualifiers::VOLATILE) {
            f.write_str("volatile ")?;
        }
        Ok(())
    }
}
