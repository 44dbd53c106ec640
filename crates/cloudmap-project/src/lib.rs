use anyhow::{Context, Result, bail};
use cloudmap_core::Dataset;
use std::fs;
use std::path::{Path, PathBuf};

pub mod sample;
pub mod settings;

pub use sample::{SAMPLE_ROOT, sample_dataset};
pub use settings::ViewSettings;

/// Where the current dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Sample,
    File(PathBuf),
}

pub struct Project {
    pub dataset: Dataset,
    pub source: DatasetSource,
}

impl Project {
    pub fn load(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let dataset: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("parsing dataset {}", path.display()))?;

        if !dataset.duplicate_ids().is_empty() {
            tracing::warn!(
                "Dataset {:?} repeats ids {:?}; keeping the first occurrence",
                path,
                dataset.duplicate_ids()
            );
        }
        if !dataset.contains(dataset.root()) {
            bail!(
                "dataset {} has no node for root id {}",
                path.display(),
                dataset.root()
            );
        }

        tracing::info!("Loaded {} nodes from {:?}", dataset.len(), path);
        Ok(Self {
            dataset,
            source: DatasetSource::File(path),
        })
    }

    pub fn sample() -> Self {
        Self {
            dataset: sample_dataset(),
            source: DatasetSource::Sample,
        }
    }

    /// Loads `path` when given, otherwise the bundled sample.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::sample()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.dataset)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
