//! Landing page content. Five single-row tables (always id 1) and four
//! ordered lists.

pub mod contact;
pub mod feature;
pub mod footer;
pub mod footer_link;
pub mod header;
pub mod hero;
pub mod nav_link;
pub mod showcase;
pub mod showcase_model;

/// Primary key of every single-row home table.
pub const SINGLETON_ID: i32 = 1;
