/*!
 * Semantic analysis for C declarations: specifiers and declarators are
 * resolved into types with known sizes and alignments for a 32-bit
 * word machine, and declared names are bound in a persistent scoped
 * environment.
 */

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate static_assertions;

pub mod constant;
pub mod ctype;
pub mod declarations;
pub mod declarators;
pub mod env;
pub mod error;
pub mod layout;
pub mod machine;
pub mod specifiers;
pub mod utils;
