pub mod concat;
pub mod genre;
pub mod ladder;

pub use concat::{concatenate, copy_corpus};
pub use genre::{
    DEFAULT_TRAIN_PERCENT, GenreCutoffs, GenreSplit, GenreSplitReport, GenreStats,
    check_train_percent, load_cutoffs, training_cutoff,
};
pub use ladder::{CONLLX_EXTENSION, PartitionReport, SizeLadder, partition_by_ladder, partition_path};
