//! HTTP layer: request shaping, the transport seam, response decoding and
//! error normalization.
//!
//! Only the types re-exported from the crate root are part of the public API.

pub(crate) mod common;
pub(crate) mod dispatch;
pub(crate) mod error_helpers;
pub(crate) mod loud_wire;
pub(crate) mod transport;
