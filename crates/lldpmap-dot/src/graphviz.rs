//! Graphviz process adapter: layout via `-Tplain`, image rendering via `-T<fmt>`.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use lldpmap_core::{Canvas, Graph, LayoutEngine, LayoutProgram, Point, RawLayout};
use lldpmap_error::{Error, Result};
use tracing::{debug, info};

use crate::dot::DotBuilder;

/// Graphviz reports plain-format coordinates in inches.
const POINTS_PER_INCH: f64 = 72.0;
const DPI: u32 = 100;
const DEFAULT_IMAGE_FORMAT: &str = "png";

/// Lays out a graph by running a Graphviz program.
///
/// Nodes are passed to Graphviz under synthetic ids (`n<ordinal>`), so
/// arbitrary system names never need quoting on the way back.
#[derive(Debug, Clone)]
pub struct GraphvizLayout {
    program: LayoutProgram,
    command: PathBuf,
}

impl GraphvizLayout {
    pub fn new(program: LayoutProgram) -> Self {
        Self {
            program,
            command: PathBuf::from(program.as_str()),
        }
    }

    /// Run a specific executable instead of looking the program up on `PATH`.
    pub fn with_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.command = command.into();
        self
    }
}

impl LayoutEngine for GraphvizLayout {
    fn layout(&self, graph: &Graph, canvas: Canvas) -> Result<RawLayout> {
        let start = Instant::now();
        let document = layout_document(graph, canvas);
        let output = run_graphviz(&self.command, &["-Tplain"], &document).map_err(|err| {
            Error::layout_failed(self.program.as_str(), err.message().to_string())
                .with_operation("graphviz::layout")
                .set_source(err)
        })?;
        let text = String::from_utf8_lossy(&output);
        let by_id = parse_plain(&text).map_err(|err| err.with_operation("graphviz::layout"))?;

        let ordinals = graph.ordinals();
        let layout: RawLayout = graph
            .nodes()
            .iter()
            .filter_map(|node| {
                let ordinal = ordinals.get(&node.key)?;
                let point = by_id.get(&synthetic_id(ordinal))?;
                Some((node.key.clone(), *point))
            })
            .collect();

        info!(
            "graphviz {} placed {}/{} nodes in {:.2}s",
            self.program,
            layout.len(),
            graph.node_count(),
            start.elapsed().as_secs_f64()
        );
        Ok(layout)
    }
}

fn synthetic_id(ordinal: u32) -> String {
    format!("n{ordinal}")
}

/// The document handed to Graphviz for layout, with canvas hints.
pub fn layout_document(graph: &Graph, canvas: Canvas) -> String {
    let size = format!(
        "{},{}!",
        f64::from(canvas.width) / f64::from(DPI),
        f64::from(canvas.height) / f64::from(DPI)
    );
    let ordinals = graph.ordinals();

    let mut dot = DotBuilder::new("layout");
    dot.attr("dpi", &DPI.to_string())
        .attr("size", &size)
        .attr("ratio", "fill")
        .blank();
    for node in graph.nodes() {
        if let Some(ordinal) = ordinals.get(&node.key) {
            dot.node(&synthetic_id(ordinal), &[("label", node.label.clone())]);
        }
    }
    for edge in graph.edges() {
        if let (Some(tail), Some(head)) = (ordinals.get(&edge.tail), ordinals.get(&edge.head)) {
            dot.edge(&synthetic_id(tail), &synthetic_id(head), &[]);
        }
    }
    dot.build()
}

/// Parse the `node` records of Graphviz `-Tplain` output into points.
///
/// `node name x y width height label ...`; anything else is ignored.
pub fn parse_plain(text: &str) -> Result<RawLayout> {
    let mut points = RawLayout::new();
    for (lineno, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("node") {
            continue;
        }
        let (Some(name), Some(x), Some(y)) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed(lineno, line));
        };
        let (Ok(x), Ok(y)) = (x.parse::<f64>(), y.parse::<f64>()) else {
            return Err(malformed(lineno, line));
        };
        let name = name.trim_matches('"');
        points.insert(
            name.to_string(),
            Point::new(x * POINTS_PER_INCH, y * POINTS_PER_INCH),
        );
    }
    Ok(points)
}

fn malformed(lineno: usize, line: &str) -> Error {
    Error::layout_failed("plain", "malformed node record in Graphviz output")
        .with_context("line", (lineno + 1).to_string())
        .with_context("record", line.to_string())
}

/// Image format for `path`, taken from its extension.
pub fn image_format(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_IMAGE_FORMAT.to_string())
}

/// Render `dot` to `path` with the given program.
pub fn render_image(program: LayoutProgram, dot: &str, path: &Path) -> Result<()> {
    render_image_with(Path::new(program.as_str()), dot, path)
}

/// Like [`render_image`], with an explicit executable.
pub fn render_image_with(command: &Path, dot: &str, path: &Path) -> Result<()> {
    let start = Instant::now();
    let format = format!("-T{}", image_format(path));
    let out = format!("-o{}", path.display());
    run_graphviz(command, &[format.as_str(), out.as_str()], dot).map_err(|err| {
        Error::render_failed(command.display().to_string(), err.message().to_string())
            .with_operation("graphviz::render_image")
            .with_context("path", path.display().to_string())
            .set_source(err)
    })?;
    info!(
        "rendered {} in {:.2}s",
        path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Feed `input` to `command` on stdin and return its stdout.
fn run_graphviz(command: &Path, args: &[&str], input: &str) -> Result<Vec<u8>> {
    debug!(command = %command.display(), ?args, "spawning graphviz");
    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| {
            Error::from(err)
                .with_context("command", command.display().to_string())
                .with_context("hint", "is Graphviz installed and on PATH?")
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).map_err(Error::from)?;
    }

    let output = child.wait_with_output().map_err(Error::from)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::unexpected(format!(
            "{} exited with {}: {}",
            command.display(),
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}
