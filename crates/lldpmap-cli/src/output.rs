//! Static outputs: DOT file and rendered image.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use lldpmap_core::{Error, Graph, MapConfig, Result};
use lldpmap_dot::{render_diagram, render_image};

/// Files written by [`write_outputs`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub dot_file: Option<PathBuf>,
    pub image_file: Option<PathBuf>,
}

/// Write the configured diagram outputs, if any.
pub fn write_outputs(graph: &Graph, config: &MapConfig) -> Result<WrittenFiles> {
    let mut written = WrittenFiles::default();
    if config.dot_file.is_none() && config.image_file.is_none() {
        return Ok(written);
    }

    let render_start = Instant::now();
    let dot = render_diagram(graph, config);
    info!(
        "Diagram rendering: {:.2}s",
        render_start.elapsed().as_secs_f64()
    );

    if let Some(path) = &config.dot_file {
        write_file(path, &dot)?;
        info!(path = %path.display(), "dot file written");
        written.dot_file = Some(path.clone());
    }
    if let Some(path) = &config.image_file {
        render_image(config.layout, &dot, path)?;
        written.image_file = Some(path.clone());
    }
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|err| {
        Error::from(err)
            .with_operation("output::write_file")
            .with_context("path", path.display().to_string())
    })
}
