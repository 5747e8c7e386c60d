mod cache;
mod filter;
mod parser;
mod renderer;
mod style;

pub use cache::{
    CacheEntry, CacheStats, CacheStore, FsStore, MemoryStore, ResultCache, DEFAULT_TTL_HOURS,
};
pub use filter::filter_ignored;
pub use parser::{
    extract_file_name, parse, split_by_file, stats, DiffStats, FileChange, Hunk, Line, LineKind,
    UNKNOWN_FILE,
};
pub use renderer::{render_annotated, render_summary, render_two_column, RenderOptions};
