//! CSS isolation: property allow-listing, declaration filtering, selector
//! scoping and the stylesheet rule walk.

pub mod allowlist;
pub mod declarations;
pub mod owned_css;
pub mod selector;
pub mod walker;
