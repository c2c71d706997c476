//! JSON persistence for fitted pipelines

use crate::error::Result;
use crate::training::FraudPipeline;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write the pipeline to `path`, replacing any existing file
pub fn save_model(pipeline: &FraudPipeline, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, pipeline)?;
    writer.flush()?;

    info!(path = %path.display(), model = %pipeline.kind(), "Saved model");
    Ok(())
}

/// Read a pipeline previously written by [`save_model`]
pub fn load_model(path: impl AsRef<Path>) -> Result<FraudPipeline> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let pipeline: FraudPipeline = serde_json::from_reader(reader)?;
    info!(path = %path.display(), model = %pipeline.kind(), "Loaded model");
    Ok(pipeline)
}
