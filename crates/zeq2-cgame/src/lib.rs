#![allow(dead_code, clippy::too_many_arguments, clippy::needless_range_loop,
         clippy::field_reassign_with_default, clippy::manual_range_contains,
         clippy::float_cmp, clippy::identity_op, clippy::collapsible_else_if)]
// Client game -- per-frame presentation of snapshot entities
pub mod tr_types;
pub mod cg_local;
pub mod cg_syscalls;
pub mod cg_main;
pub mod cg_snapshot;
pub mod cg_ents;
pub mod cg_missile;
pub mod cg_weapongfx;
pub mod cg_localents;
pub mod cg_trails;
pub mod cg_beamtables;
pub mod cg_framehist;
pub mod cg_view;
