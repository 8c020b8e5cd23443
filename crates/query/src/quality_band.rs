//! `query quality`: counts canonicals by OCR-quality band.

use index::Store;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Matches the selector's own quality vocabulary: 0.9 and above
/// is high, 0.7 and above is medium, anything lower is low.
const HIGH_BAND_MIN: f64 = 0.9;
const MEDIUM_BAND_MIN: f64 = 0.7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityBand {
    High,
    Medium,
    Low,
}

impl QualityBand {
    fn of(ocr_quality: f64) -> Self {
        if ocr_quality >= HIGH_BAND_MIN {
            QualityBand::High
        } else if ocr_quality >= MEDIUM_BAND_MIN {
            QualityBand::Medium
        } else {
            QualityBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityBandCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn quality_bands(store: &Store) -> Result<QualityBandCounts, QueryError> {
    let canonicals = store.scan_canonicals()?;
    let mut counts = QualityBandCounts::default();
    for doc in &canonicals {
        match QualityBand::of(doc.ocr_quality) {
            QualityBand::High => counts.high += 1,
            QualityBand::Medium => counts.medium += 1,
            QualityBand::Low => counts.low += 1,
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn band_boundaries_are_inclusive_on_the_low_end() {
        assert_eq!(QualityBand::of(0.9), QualityBand::High);
        assert_eq!(QualityBand::of(0.89), QualityBand::Medium);
        assert_eq!(QualityBand::of(0.7), QualityBand::Medium);
        assert_eq!(QualityBand::of(0.69), QualityBand::Low);
    }

    #[test]
    fn empty_store_has_zeroed_bands() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("index.redb")).unwrap();
        assert_eq!(quality_bands(&store).unwrap(), QualityBandCounts::default());
    }
}
