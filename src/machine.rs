pub const CHAR_SIZE: u32 = 1;
pub const CHAR_ALIGN: u32 = 1;
pub const SHORT_SIZE: u32 = 2;
pub const SHORT_ALIGN: u32 = 2;
pub const LONG_SIZE: u32 = 4;
pub const LONG_ALIGN: u32 = 4;
pub const FLOAT_SIZE: u32 = 4;
pub const FLOAT_ALIGN: u32 = 4;
pub const DOUBLE_SIZE: u32 = 8;
pub const DOUBLE_ALIGN: u32 = 4;
pub const PTR_SIZE: u32 = 4;
pub const PTR_ALIGN: u32 = 4;

pub const WORD_SIZE: u32 = 4;

// Saved return address and frame pointer sit below the first parameter.
pub const PARAM_BASE_OFFSET: u32 = 2 * WORD_SIZE;

const_assert!(CHAR_SIZE == 1);
const_assert!(SHORT_SIZE >= 2);
const_assert!(LONG_SIZE >= 4);

const_assert!(CHAR_SIZE <= SHORT_SIZE);
const_assert!(SHORT_SIZE <= LONG_SIZE);

const_assert!(CHAR_ALIGN <= CHAR_SIZE);
const_assert!(SHORT_ALIGN <= SHORT_SIZE);
const_assert!(LONG_ALIGN <= LONG_SIZE);
const_assert!(FLOAT_ALIGN <= FLOAT_SIZE);
const_assert!(DOUBLE_ALIGN <= DOUBLE_SIZE);
const_assert!(PTR_ALIGN <= PTR_SIZE);

const_assert!(WORD_SIZE == PTR_SIZE);
const_assert!(PARAM_BASE_OFFSET % WORD_SIZE == 0);
