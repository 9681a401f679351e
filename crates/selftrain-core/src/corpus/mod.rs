pub mod family;
pub mod sentence;

pub use family::{BROWN_LADDER, CorpusFamily, CorpusRole, WSJ_LADDER};
pub use sentence::{Sentence, SentenceReader, count_sentences, read_sentences};
