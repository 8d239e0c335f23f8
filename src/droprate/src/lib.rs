//! Drop-rate file parser and lookup index
//!
//! Monster drop files are line-oriented text, one file per monster:
//!
//! ```text
//! 1/100 Sword
//! #CHILD 1/10 RANDOM
//! (
//! 1/1 Gem
//! 1/1 Ring
//! )
//! ```
//!
//! A plain line is `<rate> <item name>`. A `#CHILD <rate> RANDOM` header
//! spreads its rate equally over the items of the bracketed group that
//! follows; the rates written inside the group are placeholders.
//!
//! # Example
//!
//! ```no_run
//! use droprate::{DropCatalog, LoadOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = DropCatalog::new(LoadOptions::default());
//! let stats = catalog.load("data/MonItems")?;
//! println!("{} monsters, {} drops", stats.total_monsters, stats.total_drop_entries);
//!
//! let index = catalog.snapshot();
//! for source in index.drops_for_item("Gem") {
//!     println!("{} {}", source.monster, droprate::calc::to_percent_display(source.probability));
//! }
//! # Ok(())
//! # }
//! ```

pub mod calc;
mod decode;
pub mod export;
mod index;
pub mod line;
mod parser;
pub mod query;
mod rate;
mod types;

pub use decode::{Decoded, TextDecoder, UnknownEncoding};
pub use export::{ExportError, ExportRow, ExportSink};
pub use index::{DropCatalog, DropIndex, FileWarning, LoadError, LoadOptions, Stats};
pub use line::{classify, Line};
pub use parser::{monster_name_from_path, parse_file, parse_str, FileReadError, ParseWarning, ParsedFile};
pub use rate::{parse_rate, RateError};
pub use types::{ChildGroup, DropEntry, GroupId, ItemSource, MonsterRecord};

/// File extension of monster drop files
pub const DEFAULT_EXTENSION: &str = "txt";
