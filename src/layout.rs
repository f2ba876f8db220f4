use crate::ctype::{CType, QualifiedType, Qualifiers};
use crate::machine;
use crate::utils;
use std::fmt::Formatter;

/**
 * A named slot inside a struct or a function parameter list.
 * Union members do not store an offset, it is always zero.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: Option<String>,
    pub t: QualifiedType,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    pub members: Vec<Member>,
    pub size: u32,
    pub alignment: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionLayout {
    pub members: Vec<(Option<String>, QualifiedType)>,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLayout {
    pub return_type: QualifiedType,
    pub params: Vec<Member>,
    pub size: u32,
    pub alignment: u32,
    pub variadic: bool,
}

impl StructLayout {
    /**
     * Lay out the members in order: round the running offset up to each
     * member's alignment, then advance by its size. The final size is the
     * end offset rounded up to the largest member alignment. Sizes and
     * offsets are 32 bit and wrap on overflow.
     */
    pub fn create(members: Vec<(Option<String>, QualifiedType)>) -> Self {
        let mut laid_out = Vec::with_capacity(members.len());
        let mut offset = 0;
        let mut alignment = 0;
        for (name, t) in members {
            let member_align = t.t.alignof();
            if member_align > alignment {
                alignment = member_align;
            }
            offset = utils::align(offset, member_align);
            let size = t.t.sizeof();
            laid_out.push(Member { name, t, offset });
            offset = offset.wrapping_add(size);
        }
        let size = utils::align(offset, alignment);
        Self {
            members: laid_out,
            size,
            alignment,
        }
    }

    pub fn get_member(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
    }
}

impl UnionLayout {
    /**
     * The union is as big as its biggest member. The model reuses that
     * size as the union's alignment.
     */
    pub fn create(members: Vec<(Option<String>, QualifiedType)>) -> Self {
        let size = members.iter().map(|(_, t)| t.t.sizeof()).max().unwrap_or(0);
        Self { members, size }
    }

    pub fn alignment(&self) -> u32 {
        self.size
    }

    pub fn get_member(&self, name: &str) -> Option<&QualifiedType> {
        self.members
            .iter()
            .find(|(member_name, _)| member_name.as_deref() == Some(name))
            .map(|(_, t)| t)
    }
}

impl FunctionLayout {
    /**
     * Parameters live above the frame base, past the saved return address
     * and frame pointer. Each parameter takes at least one word: after a
     * parameter the offset advances by its size and rounds up to
     * max(word, alignment). The layout's size is the ending offset.
     */
    pub fn create(
        return_type: QualifiedType,
        params: Vec<(Option<String>, QualifiedType)>,
        variadic: bool,
    ) -> Self {
        let mut laid_out = Vec::with_capacity(params.len());
        let mut offset = machine::PARAM_BASE_OFFSET;
        let mut alignment = machine::WORD_SIZE;
        for (name, t) in params {
            let size = t.t.sizeof();
            let param_align = std::cmp::max(machine::WORD_SIZE, t.t.alignof());
            laid_out.push(Member { name, t, offset });
            offset = utils::align(offset.wrapping_add(size), param_align);
            if param_align > alignment {
                alignment = param_align;
            }
        }
        Self {
            return_type,
            params: laid_out,
            size: offset,
            alignment,
            variadic,
        }
    }

    /**
     * The placeholder function: no parameters, returns void.
     */
    pub fn empty() -> Self {
        Self {
            return_type: QualifiedType {
                t: CType::Void,
                qualifiers: Qualifiers::empty(),
            },
            params: Vec::new(),
            size: 0,
            alignment: 0,
            variadic: false,
        }
    }

    pub fn get_param(&self, name: &str) -> Option<&Member> {
        self.params
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }
}

impl std::fmt::Display for StructLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str("{ ")?;
        for m in &self.members {
            write!(f, "{}: {}; ", m.name.as_deref().unwrap_or("<anonymous>"), m.t)?;
        }
        f.write_str("}")
    }
}

impl std::fmt::Display for UnionLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str("{ ")?;
        for (name, t) in &self.members {
            write!(f, "{}: {}; ", name.as_deref().unwrap_or("<anonymous>"), t)?;
        }
        f.write_str("}")
    }
}

impl std::fmt::Display for FunctionLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str("(fn (")?;
        for (i, p) in self.params.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p.t)?;
        }
        if self.variadic {
            f.write_str(", ...")?;
        }
        write!(f, ") -> {})", self.return_type)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctype::CType;

    fn unqualified(t: CType) -> QualifiedType {
        QualifiedType {
            t,
            qualifiers: Qualifiers::empty(),
        }
    }

    #[test]
    fn test_struct_point() {
        // struct Point { long x; long y; };
        let l = StructLayout::create(vec![
            (Some("x".to_string()), unqualified(CType::Long)),
            (Some("y".to_string()), unqualified(CType::Long)),
        ]);
        assert_eq!(l.size, 8);
        assert_eq!(l.alignment, 4);
        assert_eq!(l.get_member("x").unwrap().offset, 0);
        assert_eq!(l.get_member("y").unwrap().offset, 4);
        assert!(l.get_member("z").is_none());
    }

    #[test]
    fn test_struct_padding() {
        // struct { char c; long n; short s; };
        let l = StructLayout::create(vec![
            (Some("c".to_string()), unqualified(CType::Char)),
            (Some("n".to_string()), unqualified(CType::Long)),
            (Some("s".to_string()), unqualified(CType::Short)),
        ]);
        assert_eq!(l.get_member("c").unwrap().offset, 0);
        assert_eq!(l.get_member("n").unwrap().offset, 4);
        assert_eq!(l.get_member("s").unwrap().offset, 8);
        // trailing padding rounds 10 up to the struct alignment
        assert_eq!(l.size, 12);
        assert_eq!(l.alignment, 4);
    }

    #[test]
    fn test_struct_offsets_monotonic() {
        let l = StructLayout::create(vec![
            (Some("a".to_string()), unqualified(CType::Short)),
            (Some("b".to_string()), unqualified(CType::Double)),
            (Some("c".to_string()), unqualified(CType::Char)),
            (Some("d".to_string()), unqualified(CType::Long)),
        ]);
        let mut prev_end = 0;
        for m in &l.members {
            assert!(m.offset >= prev_end);
            assert_eq!(m.offset % m.t.t.alignof(), 0);
            prev_end = m.offset + m.t.t.sizeof();
        }
        assert_eq!(l.size % l.alignment, 0);
        assert!(l.size >= prev_end);
    }

    #[test]
    fn test_struct_offsets_wrap() {
        // three 3 GiB arrays push the running offset past 4 GiB
        let big = unqualified(CType::Array(
            Box::new(unqualified(CType::Char)),
            0xc000_0000,
        ));
        let l = StructLayout::create(vec![
            (Some("a".to_string()), big.clone()),
            (Some("b".to_string()), big.clone()),
            (Some("c".to_string()), big),
        ]);
        assert_eq!(l.get_member("a").unwrap().offset, 0);
        assert_eq!(l.get_member("b").unwrap().offset, 0xc000_0000);
        assert_eq!(l.get_member("c").unwrap().offset, 0x8000_0000);
        assert_eq!(l.size, 0x4000_0000);
    }

    #[test]
    fn test_struct_empty() {
        let l = StructLayout::create(Vec::new());
        assert_eq!(l.size, 0);
        assert_eq!(l.alignment, 0);
    }

    #[test]
    fn test_union() {
        // union { short s; long n; };
        let l = UnionLayout::create(vec![
            (Some("s".to_string()), unqualified(CType::Short)),
            (Some("n".to_string()), unqualified(CType::Long)),
        ]);
        assert_eq!(l.size, 4);
        assert_eq!(l.alignment(), 4);
        assert_eq!(l.get_member("s").unwrap().t, CType::Short);
        assert!(l.get_member("x").is_none());
    }

    #[test]
    fn test_union_empty() {
        let l = UnionLayout::create(Vec::new());
        assert_eq!(l.size, 0);
        assert_eq!(l.alignment(), 0);
    }

    #[test]
    fn test_function_params() {
        // int f(char a, long b);
        let l = FunctionLayout::create(
            unqualified(CType::Long),
            vec![
                (Some("a".to_string()), unqualified(CType::Char)),
                (Some("b".to_string()), unqualified(CType::Long)),
            ],
            false,
        );
        assert_eq!(l.get_param("a").unwrap().offset, 8);
        assert_eq!(l.get_param("b").unwrap().offset, 12);
        assert_eq!(l.size, 16);
        assert!(!l.variadic);
    }

    #[test]
    fn test_function_word_slots() {
        // chars still take a full word on the stack
        let l = FunctionLayout::create(
            unqualified(CType::Void),
            vec![
                (Some("a".to_string()), unqualified(CType::Char)),
                (Some("b".to_string()), unqualified(CType::Char)),
                (Some("d".to_string()), unqualified(CType::Double)),
            ],
            true,
        );
        assert_eq!(l.get_param("a").unwrap().offset, 8);
        assert_eq!(l.get_param("b").unwrap().offset, 12);
        assert_eq!(l.get_param("d").unwrap().offset, 16);
        assert_eq!(l.size, 24);
        assert!(l.variadic);
    }

    #[test]
    fn test_function_params_wrap() {
        // a single parameter can push the next slot past 4 GiB
        let l = FunctionLayout::create(
            unqualified(CType::Void),
            vec![(
                Some("a".to_string()),
                unqualified(CType::Array(Box::new(unqualified(CType::Char)), 0xffff_fff8)),
            )],
            false,
        );
        assert_eq!(l.get_param("a").unwrap().offset, 8);
        assert_eq!(l.size, 0);
    }

    #[test]
    fn test_empty_function() {
        let l = FunctionLayout::empty();
        assert_eq!(l.return_type.t, CType::Void);
        assert!(l.params.is_empty());
        assert_eq!(l.size, 0);
        assert_eq!(l.alignment, 0);
        assert!(!l.variadic);
    }
}
