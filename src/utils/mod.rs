pub mod bigint;
pub mod field;
pub mod tagged;
