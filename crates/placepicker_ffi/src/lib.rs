//! Flutter-facing bindings for `placepicker_core`.

pub mod api;
