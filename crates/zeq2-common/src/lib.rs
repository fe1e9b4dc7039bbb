#![allow(dead_code, clippy::too_many_arguments, clippy::needless_range_loop,
         clippy::field_reassign_with_default, clippy::manual_range_contains,
         clippy::float_cmp, clippy::identity_op, clippy::excessive_precision)]

pub mod q_shared;
pub mod anorms;
pub mod bg_public;
pub mod bg_misc;
pub mod cvar;
