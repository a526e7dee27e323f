//! Per-resource-type variations
//!
//! Most differences between resource types live in their [`ResourcePolicy`]
//! entries. The modules here hold the typed entry points for those types and
//! the few rules that are not expressible as policy data.
//!
//! [`ResourcePolicy`]: crate::policy::ResourcePolicy

pub mod checks;
pub mod platforms;
pub mod sensors;
