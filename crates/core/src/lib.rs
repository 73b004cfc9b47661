//! Core domain types, data-file resolution, line/column extraction and
//! number formatting for populating a template slide.

pub mod config;
pub mod error;
pub mod extract;
pub mod number;
pub mod report;
pub mod resolver;
pub mod session;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use extract::{LineExtractor, TextEncoding};
pub use number::format_number;
pub use report::{BatchReport, EntryError, EntryKind};
pub use resolver::FileResolver;
pub use session::{Session, SessionEvent};
pub use store::LayoutModeStore;
pub use types::{ExtractedValue, ImageLayout, LayoutMode, TextLayout, CUSTOM_MODE};
