//! HTML entity table and entity escape substitution.
//!
//! The crate bundles a corpus of HTML named character references and builds
//! three lookup indices over it, by name, by code point and by literal
//! character. On top of the table it provides:
//!
//! - [`substitute_entities`]: rewrites backslash escapes (`\agrave`) to the
//!   literal character they denote
//! - [`decode_references`]: rewrites `&name;`, `&#dd;` and `&#xhh;`
//!   references to literal characters
//!
//! # Example
//!
//! ```
//! use presto_entities::EntityTable;
//!
//! let table = EntityTable::global();
//! let agrave = table.for_name("agrave").unwrap();
//! assert_eq!(agrave.code_point(), 224);
//! assert_eq!(table.for_decimal("&#224;"), Some(agrave));
//! assert_eq!(table.for_hex("&#x000E0;"), Some(agrave));
//! ```

mod entity;
mod substitute;
mod table;

pub use entity::HtmlEntity;
pub use substitute::{decode_references, substitute_entities};
pub use table::{EntityTable, Lookup};
