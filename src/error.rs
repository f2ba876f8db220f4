use lang_c::span::Span;
use std::fmt::Formatter;

#[derive(Debug, PartialEq)]
pub enum CompileError {
    // Specifier errors
    UnmatchedSpecifiers(String),
    MultipleStorageClasses,
    UnknownTypedefName(String),
    NotATypedefName(String),
    // Tag errors
    UndefinedTag(String),
    TagKindMismatch(String),
    AggregateRedefinition(String),
    NonConstantEnumValue(String),
    // Declarator errors
    NonConstantArraySize,
    InvalidInitializerForAbstractDeclarator,
    // Constant expression errors
    DivisionByZero,
}

#[derive(Debug, PartialEq)]
pub enum CompileWarning {
    Unimplemented(String),
    ImplicitInt,
    EmptyDeclaration,
    ShiftByNegative,
}

pub struct ErrorCollector {
    errors: Vec<(CompileError, Span)>,
    warnings: Vec<(CompileWarning, Span)>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        ErrorCollector {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_error(&mut self, error: CompileError, span: Span) -> Result<(), ()> {
        self.errors.push((error, span));
        Err(())
    }

    pub fn record_warning(&mut self, warning: CompileWarning, span: Span) -> Result<(), ()> {
        self.warnings.push((warning, span));
        Ok(())
    }

    pub fn get_error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn get_warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn print_issues(&self) {
        for (warn, span) in &self.warnings {
            println!("{:?}: warning: {}", span, warn);
        }
        for (err, span) in &self.errors {
            println!("{:?}: error: {}", span, err);
        }
    }

    pub fn get_first_error(&self) -> Option<&(CompileError, Span)> {
        self.errors.first()
    }

    #[cfg(test)]
    pub fn get_first_warning(&self) -> Option<&(CompileWarning, Span)> {
        self.warnings.first()
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            CompileError::UnmatchedSpecifiers(s) => {
                write!(f, "can't match type specifiers `{}'", s)
            }
            CompileError::MultipleStorageClasses => {
                write!(f, "multiple storage classes in declaration specifiers")
            }
            CompileError::UnknownTypedefName(s) => write!(f, "unknown type name `{}'", s),
            CompileError::NotATypedefName(s) => write!(f, "`{}' is not a type name", s),
            CompileError::UndefinedTag(s) => write!(f, "`{}' has not been defined", s),
            CompileError::TagKindMismatch(s) => {
                write!(f, "`{}' is declared as a different kind of tag", s)
            }
            CompileError::AggregateRedefinition(s) => write!(f, "redefinition of `{}'", s),
            CompileError::NonConstantEnumValue(s) => {
                write!(f, "enumerator value for `{}' is not an integer constant", s)
            }
            CompileError::NonConstantArraySize => {
                f.write_str("size of the array is not a constant")
            }
            CompileError::InvalidInitializerForAbstractDeclarator => {
                f.write_str("initializer requires a named declarator")
            }
            CompileError::DivisionByZero => f.write_str("division by zero"),
        }
    }
}

impl std::fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            CompileWarning::Unimplemented(s) => write!(f, "unimplemented: {}", &s),
            CompileWarning::ImplicitInt => f.write_str("implicit int"),
            CompileWarning::EmptyDeclaration => {
                f.write_str("empty declaration doesn't declare anything")
            }
            CompileWarning::ShiftByNegative => f.write_str("shift by a negative value"),
        }
    }
}
