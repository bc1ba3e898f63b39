//! `silhouette trace`: silhouette loops and SVG output.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use mesh_silhouette::svg::SvgPath;
use mesh_silhouette::{
    draw_silhouette, save_svg, MeshTopology, SilhouetteLoop, SilhouetteParams, TieBreakPolicy,
};
use nalgebra::Vector3;
use serde::Serialize;
use tracing::info;

use crate::output;
use crate::OutputFormat;

/// How branch points in the silhouette are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TieBreakArg {
    Reject,
    MinTurningAngle,
    LowestEdgeId,
}

impl From<TieBreakArg> for TieBreakPolicy {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Reject => TieBreakPolicy::Reject,
            TieBreakArg::MinTurningAngle => TieBreakPolicy::MinTurningAngle,
            TieBreakArg::LowestEdgeId => TieBreakPolicy::LowestEdgeId,
        }
    }
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Mesh file (.obj or .stl)
    pub input: PathBuf,

    /// Material id to draw
    #[arg(long)]
    pub material: Option<u32>,

    /// Direction toward the viewer, as x,y,z
    #[arg(long, value_parser = parse_view, allow_hyphen_values = true)]
    pub view: Option<Vector3<f64>>,

    /// Branch point resolution
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreakArg>,

    /// Parameter file (TOML); command-line flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the silhouette as an SVG document
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_view(s: &str) -> Result<Vector3<f64>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got '{}'", s));
    };
    let parse = |v: &str| v.parse::<f64>().map_err(|e| format!("'{}': {}", v, e));
    let view = Vector3::new(parse(*x)?, parse(*y)?, parse(*z)?);
    if view.norm_squared() == 0.0 || !view.iter().all(|c| c.is_finite()) {
        return Err("view direction must be finite and non-zero".to_string());
    }
    Ok(view)
}

#[derive(Debug, Serialize)]
struct LoopOutput {
    vertices: Vec<u32>,
    winding: String,
    signed_area: f64,
}

#[derive(Debug, Serialize)]
struct TraceOutput {
    input: String,
    material: u32,
    view_direction: [f64; 3],
    tie_break: String,
    loops: Vec<LoopOutput>,
    svg: Option<String>,
}

impl TraceOutput {
    fn new(
        input: &Path,
        params: &SilhouetteParams,
        loops: &[SilhouetteLoop],
        svg: Option<&Path>,
    ) -> Self {
        let v = params.view_direction;
        Self {
            input: input.display().to_string(),
            material: params.material,
            view_direction: [v.x, v.y, v.z],
            tie_break: params.tie_break.to_string(),
            loops: loops
                .iter()
                .map(|l| LoopOutput {
                    vertices: l.vertices.clone(),
                    winding: l.winding.to_string(),
                    signed_area: l.signed_area(),
                })
                .collect(),
            svg: svg.map(|p| p.display().to_string()),
        }
    }
}

/// Config file first, then any flags given on the command line.
fn resolve_params(args: &TraceArgs) -> Result<SilhouetteParams> {
    let mut params = match &args.config {
        Some(path) => SilhouetteParams::from_toml_file(path)
            .with_context(|| format!("failed to read parameters from {}", path.display()))?,
        None => SilhouetteParams::default(),
    };

    if let Some(material) = args.material {
        params.material = material;
    }
    if let Some(view) = args.view {
        params.view_direction = view;
    }
    if let Some(tie_break) = args.tie_break {
        params.tie_break = tie_break.into();
    }

    Ok(params)
}

pub fn run(args: &TraceArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let params = resolve_params(args)?;

    let topology = MeshTopology::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    if !topology.materials().contains(&params.material) {
        let known: Vec<String> = topology.materials().iter().map(|m| m.to_string()).collect();
        output::warning(
            &format!(
                "material {} not present (materials: {})",
                params.material,
                known.join(", ")
            ),
            format,
            quiet,
        );
    }

    let loops = topology
        .silhouette(&params)
        .context("failed to trace silhouette")?;
    info!("{} silhouette loops for material {}", loops.len(), params.material);

    if let Some(path) = &args.output {
        let mut svg = SvgPath::new();
        let drawn = draw_silhouette(&topology, &params, &mut svg)?;
        if drawn != loops.len() {
            bail!("emitted {} subpaths for {} loops", drawn, loops.len());
        }
        save_svg(&svg, path).with_context(|| format!("failed to write {}", path.display()))?;
    }

    match format {
        OutputFormat::Text => {
            if loops.is_empty() {
                output::warning("nothing visible: no silhouette loops", format, quiet);
            }
            for (i, l) in loops.iter().enumerate() {
                output::info(
                    &format!(
                        "  loop {}: {} vertices, {}, area {:.3}",
                        i,
                        l.len(),
                        l.winding,
                        l.signed_area()
                    ),
                    format,
                    quiet,
                );
            }
            let msg = match &args.output {
                Some(path) => format!("Traced {} loops, wrote {}", loops.len(), path.display()),
                None => format!("Traced {} loops", loops.len()),
            };
            output::success(&msg, format, quiet);
        }
        OutputFormat::Json => output::print(
            &TraceOutput::new(&args.input, &params, &loops, args.output.as_deref()),
            format,
            quiet,
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(config: Option<PathBuf>) -> TraceArgs {
        TraceArgs {
            input: PathBuf::from("mesh.obj"),
            material: None,
            view: None,
            tie_break: None,
            config,
            output: None,
        }
    }

    #[test]
    fn test_parse_view() {
        assert_eq!(parse_view("1, -2,3").unwrap(), Vector3::new(1.0, -2.0, 3.0));
        assert!(parse_view("1,2").is_err());
        assert!(parse_view("0,0,0").is_err());
        assert!(parse_view("a,b,c").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "material = 2\ntie_break = \"reject\"").unwrap();

        let mut a = args(Some(file.path().to_path_buf()));
        let params = resolve_params(&a).unwrap();
        assert_eq!(params.material, 2);
        assert_eq!(params.tie_break, TieBreakPolicy::Reject);

        a.material = Some(5);
        a.tie_break = Some(TieBreakArg::LowestEdgeId);
        let params = resolve_params(&a).unwrap();
        assert_eq!(params.material, 5);
        assert_eq!(params.tie_break, TieBreakPolicy::LowestEdgeId);
    }

    #[test]
    fn test_defaults_without_config() {
        let params = resolve_params(&args(None)).unwrap();
        assert_eq!(params, SilhouetteParams::default());
    }
}
