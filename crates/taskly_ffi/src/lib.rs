//! Flutter-facing bindings over `taskly_core`.

pub mod api;
