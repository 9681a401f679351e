//! Per-genre train/test split of a multi-genre corpus directory.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::corpus::{SentenceReader, count_sentences};
use crate::error::{CorpusError, Result};

/// Default share of each genre's sentences that goes to training.
pub const DEFAULT_TRAIN_PERCENT: u32 = 90;

/// Per-genre training cutoffs, keyed by genre directory name.
pub type GenreCutoffs = BTreeMap<String, usize>;

/// Training sentence count for a genre: `total * percent / 100`, rounded half up.
#[must_use]
pub fn training_cutoff(total: usize, percent: u32) -> usize {
    (total * percent as usize + 50) / 100
}

/// Checks that a training share lies within `1..=100`.
pub fn check_train_percent(percent: u32) -> Result<u32> {
    if (1..=100).contains(&percent) {
        Ok(percent)
    } else {
        Err(CorpusError::InvalidPercent(percent))
    }
}

/// Loads precomputed cutoffs from a JSON object of `genre -> count`.
pub fn load_cutoffs(path: impl AsRef<Path>) -> Result<GenreCutoffs> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CorpusError::io(path, e))?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| CorpusError::Cutoffs {
        path: path.to_path_buf(),
        source,
    })
}

/// Split statistics for one genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreStats {
    pub genre: String,
    pub files: usize,
    /// Sentences in the genre, if they were counted.
    pub total: Option<usize>,
    pub cutoff: usize,
    pub training: usize,
    pub test: usize,
}

/// Outcome of a genre split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreSplitReport {
    pub genres: Vec<GenreStats>,
    pub training_path: PathBuf,
    pub test_path: PathBuf,
}

impl GenreSplitReport {
    #[must_use]
    pub fn training_sentences(&self) -> usize {
        self.genres.iter().map(|g| g.training).sum()
    }

    #[must_use]
    pub fn test_sentences(&self) -> usize {
        self.genres.iter().map(|g| g.test).sum()
    }
}

/// Splits every genre of a corpus directory into a shared training and test file.
#[derive(Debug, Clone)]
pub struct GenreSplit {
    base_dir: PathBuf,
    train_percent: u32,
    cutoffs: GenreCutoffs,
}

impl GenreSplit {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            train_percent: DEFAULT_TRAIN_PERCENT,
            cutoffs: GenreCutoffs::new(),
        }
    }

    /// Set the training share used for genres without a precomputed cutoff.
    pub fn with_train_percent(mut self, percent: u32) -> Result<Self> {
        self.train_percent = check_train_percent(percent)?;
        Ok(self)
    }

    /// Supply precomputed training cutoffs, skipping the counting pass for those genres.
    pub fn with_cutoffs(mut self, cutoffs: GenreCutoffs) -> Self {
        self.cutoffs.extend(cutoffs);
        self
    }

    /// Genre directories in name order, each with its files in name order.
    pub fn genres(&self) -> Result<Vec<(String, Vec<PathBuf>)>> {
        if !self.base_dir.is_dir() {
            return Err(CorpusError::NotADirectory(self.base_dir.clone()));
        }

        let mut genres = Vec::new();
        for dir in sorted_entries(&self.base_dir)? {
            if !dir.is_dir() {
                debug!("Skipping non-directory {}", dir.display());
                continue;
            }
            let files: Vec<PathBuf> = sorted_entries(&dir)?
                .into_iter()
                .filter(|p| p.is_file())
                .collect();
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            genres.push((name, files));
        }
        Ok(genres)
    }

    /// Writes the first `cutoff` sentences of every genre to `training_path`
    /// and the rest to `test_path`.
    pub fn run(&self, training_path: impl AsRef<Path>, test_path: impl AsRef<Path>) -> Result<GenreSplitReport> {
        let training_path = training_path.as_ref();
        let test_path = test_path.as_ref();

        let genres = self.genres()?;
        if let Some(unknown) = self
            .cutoffs
            .keys()
            .find(|name| !genres.iter().any(|(genre, _)| genre == *name))
        {
            return Err(CorpusError::MissingGenre(unknown.clone()));
        }

        let mut training = create(training_path)?;
        let mut test = create(test_path)?;
        let mut stats = Vec::new();

        for (genre, files) in genres {
            let (total, cutoff) = match self.cutoffs.get(&genre) {
                Some(&cutoff) => (None, cutoff),
                None => {
                    let mut total = 0;
                    for file in &files {
                        total += count_sentences(file)?;
                    }
                    (Some(total), training_cutoff(total, self.train_percent))
                }
            };
            info!("Genre {}: {} files, training cutoff {}", genre, files.len(), cutoff);

            let mut seen = 0;
            for file in &files {
                for sentence in SentenceReader::open(file)? {
                    let sentence = sentence.map_err(|e| CorpusError::io(file, e))?;
                    seen += 1;
                    let (out, path) = if seen <= cutoff {
                        (&mut training, training_path)
                    } else {
                        (&mut test, test_path)
                    };
                    sentence.write_to(out).map_err(|e| CorpusError::io(path, e))?;
                }
            }

            let in_training = seen.min(cutoff);
            stats.push(GenreStats {
                genre,
                files: files.len(),
                total,
                cutoff,
                training: in_training,
                test: seen - in_training,
            });
        }

        training.flush().map_err(|e| CorpusError::io(training_path, e))?;
        test.flush().map_err(|e| CorpusError::io(test_path, e))?;

        let report = GenreSplitReport {
            genres: stats,
            training_path: training_path.to_path_buf(),
            test_path: test_path.to_path_buf(),
        };
        info!(
            "Genre split wrote {} training and {} test sentences",
            report.training_sentences(),
            report.test_sentences()
        );
        Ok(report)
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| CorpusError::io(path, e))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CorpusError::io(dir, e))? {
        entries.push(entry.map_err(|e| CorpusError::io(dir, e))?.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::read_sentences;

    fn write_genre(base: &Path, genre: &str, files: &[(&str, usize)]) {
        let dir = base.join(genre);
        std::fs::create_dir_all(&dir).unwrap();
        for (name, n) in files {
            let mut text = String::new();
            for i in 0..*n {
                text.push_str(&format!("1\t{genre}-{name}-{i}\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n"));
            }
            std::fs::write(dir.join(name), text).unwrap();
        }
    }

    fn first_token(sentence: &crate::corpus::Sentence) -> String {
        sentence.lines()[0].split('\t').nth(1).unwrap().to_string()
    }

    #[test]
    fn cutoff_rounds_half_up() {
        assert_eq!(training_cutoff(10, 90), 9);
        assert_eq!(training_cutoff(15, 90), 14); // 13.5
        assert_eq!(training_cutoff(14, 90), 13); // 12.6
        assert_eq!(training_cutoff(11, 90), 10); // 9.9
        assert_eq!(training_cutoff(0, 90), 0);
        assert_eq!(training_cutoff(7, 100), 7);
    }

    #[test]
    fn splits_each_genre_ninety_ten() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("brown");
        write_genre(&base, "cf", &[("cf02.conll", 7), ("cf01.conll", 8)]);
        write_genre(&base, "ca", &[("ca01.conll", 10)]);

        let train = dir.path().join("brown_training.conllx");
        let test = dir.path().join("brown_test.conllx");
        let report = GenreSplit::new(&base).run(&train, &test).unwrap();

        assert_eq!(report.genres[0].genre, "ca");
        assert_eq!(report.genres[0].cutoff, 9);
        assert_eq!(report.genres[1].genre, "cf");
        assert_eq!(report.genres[1].total, Some(15));
        assert_eq!(report.genres[1].cutoff, 14);

        let train_sents = read_sentences(&train).unwrap();
        let test_sents = read_sentences(&test).unwrap();
        assert_eq!(train_sents.len(), 9 + 14);
        assert_eq!(test_sents.len(), 1 + 1);
        assert_eq!(report.training_sentences(), 23);
        assert_eq!(report.test_sentences(), 2);

        // Genres in name order, files in name order
        assert_eq!(first_token(&train_sents[0]), "ca-ca01.conll-0");
        assert_eq!(first_token(&train_sents[9]), "cf-cf01.conll-0");
        assert_eq!(first_token(&test_sents[0]), "ca-ca01.conll-9");
        assert_eq!(first_token(&test_sents[1]), "cf-cf02.conll-6");
    }

    #[test]
    fn boundary_sentence_is_not_split() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("brown");
        write_genre(&base, "cp", &[("cp01.conll", 10)]);

        let train = dir.path().join("train.conllx");
        let test = dir.path().join("test.conllx");
        GenreSplit::new(&base).run(&train, &test).unwrap();

        let test_text = std::fs::read_to_string(&test).unwrap();
        assert_eq!(test_text, "1\tcp-cp01.conll-9\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n");
        let train_text = std::fs::read_to_string(&train).unwrap();
        assert!(train_text.ends_with("cp-cp01.conll-8\t_\tNN\tNN\t_\t0\troot\t_\t_\n\n"));
    }

    #[test]
    fn precomputed_cutoffs_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("brown");
        write_genre(&base, "ca", &[("ca01.conll", 10)]);
        write_genre(&base, "cb", &[("cb01.conll", 4)]);

        let cutoffs = GenreCutoffs::from([("ca".to_string(), 3), ("cb".to_string(), 50)]);
        let report = GenreSplit::new(&base)
            .with_cutoffs(cutoffs)
            .run(dir.path().join("tr"), dir.path().join("te"))
            .unwrap();

        assert_eq!(report.genres[0].total, None);
        assert_eq!((report.genres[0].training, report.genres[0].test), (3, 7));
        assert_eq!((report.genres[1].training, report.genres[1].test), (4, 0));
    }

    #[test]
    fn cutoff_for_unknown_genre_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("brown");
        write_genre(&base, "ca", &[("ca01.conll", 10)]);

        let train = dir.path().join("tr");
        let err = GenreSplit::new(&base)
            .with_cutoffs(GenreCutoffs::from([("cz".to_string(), 3)]))
            .run(&train, dir.path().join("te"))
            .unwrap_err();
        assert!(matches!(err, CorpusError::MissingGenre(ref g) if g == "cz"));
        assert!(!train.exists());
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("brown");
        write_genre(&base, "cb", &[("cb02.conll", 6), ("cb01.conll", 5)]);
        write_genre(&base, "ca", &[("ca01.conll", 9)]);
        let train = dir.path().join("brown_training.conllx");
        let test = dir.path().join("brown_test.conllx");

        let split = GenreSplit::new(&base);
        let first = split.run(&train, &test).unwrap();
        let first_bytes = (std::fs::read(&train).unwrap(), std::fs::read(&test).unwrap());
        let second = split.run(&train, &test).unwrap();
        let second_bytes = (std::fs::read(&train).unwrap(), std::fs::read(&test).unwrap());

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn custom_percent() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("brown");
        write_genre(&base, "ca", &[("ca01.conll", 10)]);

        let report = GenreSplit::new(&base)
            .with_train_percent(50)
            .unwrap()
            .run(dir.path().join("tr"), dir.path().join("te"))
            .unwrap();
        assert_eq!(report.genres[0].cutoff, 5);
        assert!(matches!(
            GenreSplit::new(&base).with_train_percent(0),
            Err(CorpusError::InvalidPercent(0))
        ));
    }

    #[test]
    fn loads_cutoff_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cutoffs.json");
        std::fs::write(&path, r#"{"ca": 3960, "cb": 1427}"#).unwrap();
        let cutoffs = load_cutoffs(&path).unwrap();
        assert_eq!(cutoffs.get("cb"), Some(&1427));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_cutoffs(&path), Err(CorpusError::Cutoffs { .. })));
    }

    #[test]
    fn missing_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = GenreSplit::new(dir.path().join("absent"))
            .run(dir.path().join("tr"), dir.path().join("te"))
            .unwrap_err();
        assert!(matches!(err, CorpusError::NotADirectory(_)));
    }
}
