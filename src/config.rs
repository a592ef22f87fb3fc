//! Configuration parameters for windowing, streaming and dataset builds

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RfiError, RfiResult};
use crate::io::capture::SampleFormat;

/// Complex samples per frame (one spectral snapshot)
pub const FRAME_WIDTH: usize = 1536;

/// Energy window extraction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of columns kept around the energy peak (default: 600)
    pub extraction_window: usize,

    /// Moving-average width used to smooth the energy profile (default: 5)
    pub moving_avg_window: usize,

    /// Columns always dropped from the start of each row (default: 80)
    pub leading_guard: usize,

    /// Columns always dropped from the end of each row (default: 30)
    pub trailing_guard: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extraction_window: 600,
            moving_avg_window: 5,
            leading_guard: 80,
            trailing_guard: 30,
        }
    }
}

impl ExtractionConfig {
    /// Config with the given window sizes and the default guard margins.
    pub fn new(extraction_window: usize, moving_avg_window: usize) -> Self {
        Self {
            extraction_window,
            moving_avg_window,
            ..Default::default()
        }
    }

    /// Reject parameters the extractor cannot work with.
    pub fn validate(&self) -> RfiResult<()> {
        if self.extraction_window == 0 {
            return Err(RfiError::InvalidInput(
                "extraction_window must be > 0".to_string(),
            ));
        }
        if self.moving_avg_window == 0 {
            return Err(RfiError::InvalidInput(
                "moving_avg_window must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Streaming classification session parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frames accumulated before each dispatch; 1 disables buffering
    pub time_window: usize,

    /// Complex samples per frame (default: 1536)
    pub frame_width: usize,

    /// Extraction applied to every dispatched payload
    pub extraction: ExtractionConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            time_window: 1,
            frame_width: FRAME_WIDTH,
            extraction: ExtractionConfig {
                moving_avg_window: 30,
                ..Default::default()
            },
        }
    }
}

impl StreamConfig {
    /// Samples needed for one dispatch: `time_window * frame_width`.
    pub fn threshold(&self) -> usize {
        self.time_window * self.frame_width
    }

    /// Whether the session accumulates samples across calls.
    pub fn is_buffered(&self) -> bool {
        self.time_window > 1
    }

    /// Reject parameters a session cannot work with.
    pub fn validate(&self) -> RfiResult<()> {
        if self.time_window == 0 {
            return Err(RfiError::InvalidInput("time_window must be > 0".to_string()));
        }
        if self.frame_width == 0 {
            return Err(RfiError::InvalidInput("frame_width must be > 0".to_string()));
        }
        self.extraction.validate()
    }
}

/// Dataset build parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Maximum number of chunk CSVs written per capture file (default: 1)
    pub num_files_per_capture: usize,

    /// Maximum frames read from each capture file (default: 10)
    pub max_rows: usize,

    /// Integer encoding of the capture files (default: signed 16-bit)
    pub sample_format: SampleFormat,

    /// Extraction applied to every capture
    pub extraction: ExtractionConfig,

    /// Worker threads; `None` uses the available parallelism
    pub workers: Option<usize>,

    /// Per-task deadline in seconds; `None` disables it
    pub task_timeout_secs: Option<f64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            num_files_per_capture: 1,
            max_rows: 10,
            sample_format: SampleFormat::I16,
            extraction: ExtractionConfig::default(),
            workers: None,
            task_timeout_secs: None,
        }
    }
}

impl DatasetConfig {
    /// Per-task deadline, if configured.
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Worker count actually used by the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.filter(|&n| n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Reject parameters a build cannot work with.
    pub fn validate(&self) -> RfiResult<()> {
        if self.num_files_per_capture == 0 {
            return Err(RfiError::InvalidInput(
                "num_files_per_capture must be > 0".to_string(),
            ));
        }
        if self.max_rows == 0 {
            return Err(RfiError::InvalidInput("max_rows must be > 0".to_string()));
        }
        self.extraction.validate()
    }
}

/// Load any of the configuration structs from a JSON file.
///
/// Missing fields fall back to their defaults.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> RfiResult<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RfiError::MissingResource(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| RfiError::io(path, e))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.extraction_window, 600);
        assert_eq!(c.moving_avg_window, 5);
        assert_eq!((c.leading_guard, c.trailing_guard), (80, 30));

        let s = StreamConfig::default();
        assert_eq!(s.threshold(), 1536);
        assert!(!s.is_buffered());
    }

    #[test]
    fn test_threshold() {
        let s = StreamConfig {
            time_window: 2,
            ..Default::default()
        };
        assert_eq!(s.threshold(), 3072);
        assert!(s.is_buffered());
    }

    #[test]
    fn test_validation() {
        assert!(ExtractionConfig::new(0, 5).validate().is_err());
        assert!(ExtractionConfig::new(600, 0).validate().is_err());
        let d = DatasetConfig {
            num_files_per_capture: 0,
            ..Default::default()
        };
        assert!(d.validate().is_err());
        assert!(DatasetConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let d: DatasetConfig =
            serde_json::from_str(r#"{"max_rows": 4, "task_timeout_secs": 2.5}"#).unwrap();
        assert_eq!(d.max_rows, 4);
        assert_eq!(d.num_files_per_capture, 1);
        assert_eq!(d.task_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(d.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_worker_count_never_zero() {
        let d = DatasetConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert!(d.worker_count() >= 1);
    }
}
