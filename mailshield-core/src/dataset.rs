//! Labelled email datasets: CSV loading and the train/test split.

use std::fs::File;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledEmail {
    pub text: String,
    pub label: String,
}

/// Reads `text_column` and `label_column` from a CSV file with a header row.
///
/// Rows where either value is missing or blank are dropped.
pub fn load_csv(path: &Path, text_column: &str, label_column: &str) -> Result<Vec<LabeledEmail>> {
    let file = File::open(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    };
    let text_idx = column(text_column)?;
    let label_idx = column(label_column)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        let text = record.get(text_idx).map(str::trim).unwrap_or("");
        let label = record.get(label_idx).map(str::trim).unwrap_or("");
        if text.is_empty() || label.is_empty() {
            dropped += 1;
            continue;
        }
        rows.push(LabeledEmail {
            text: text.to_string(),
            label: label.to_string(),
        });
    }

    if rows.is_empty() {
        return Err(Error::EmptyDataset);
    }
    tracing::info!(
        path = %path.display(),
        rows = rows.len(),
        dropped,
        "Loaded dataset"
    );
    Ok(rows)
}

/// Shuffles with a seeded RNG and splits off `ceil(test_fraction × n)` rows
/// as the test set. The same seed always yields the same split.
pub fn train_test_split<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total = samples.len();
    let n_test = ((total as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let test = samples.split_off(total - n_test.min(total));

    tracing::debug!(train = samples.len(), test = test.len(), seed, "Dataset split");
    (samples, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_drops_incomplete_rows() {
        let file = write_csv(
            "id,email,type\n\
             1,\"Hello, my laptop broke\",support\n\
             2,,billing\n\
             3,Refund please,\n\
             4,Invoice attached,billing\n\
             5\n",
        );
        let rows = load_csv(file.path(), "email", "type").unwrap();
        assert_eq!(
            rows,
            vec![
                LabeledEmail {
                    text: "Hello, my laptop broke".into(),
                    label: "support".into()
                },
                LabeledEmail {
                    text: "Invoice attached".into(),
                    label: "billing".into()
                },
            ]
        );
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("body,category\nhi,support\n");
        let err = load_csv(file.path(), "email", "type").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "email"));
    }

    #[test]
    fn test_only_blank_rows() {
        let file = write_csv("email,type\n,\n  ,x\n");
        assert!(matches!(
            load_csv(file.path(), "email", "type"),
            Err(Error::EmptyDataset)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_csv(Path::new("/nonexistent/data.csv"), "email", "type"),
            Err(Error::ReadFile { .. })
        ));
    }

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split((0..10).collect::<Vec<_>>(), 0.2, 42);
        assert_eq!((train.len(), test.len()), (8, 2));

        let (train, test) = train_test_split((0..11).collect::<Vec<_>>(), 0.2, 42);
        assert_eq!((train.len(), test.len()), (8, 3));
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split((0..50).collect::<Vec<_>>(), 0.2, 42);
        let b = train_test_split((0..50).collect::<Vec<_>>(), 0.2, 42);
        assert_eq!(a, b);

        let (mut train, mut test) = a;
        train.append(&mut test);
        train.sort();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }
}
