//! Reusable line-level widgets shared by the report views.

pub mod header;
pub mod share_bar;
