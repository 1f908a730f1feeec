pub mod split;
pub mod track;
pub mod window;

// re-export for cleaner imports
pub use self::split::{SPLITS, Split};
pub use self::track::{SumStat, Track, read_track_table};
pub use self::window::{Contig, Window};
