use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use retouch_core::pipeline::uniform;
use retouch_core::{AdjustmentDelta, Param, PresetEngine};
use retouch_session::{
    ConfigHandle, EditOrchestrator, EditingSession, SessionConfig, Unavailable,
};

#[derive(Parser, Debug)]
#[command(name = "retouch", version, about = "Non-destructive photo adjustments")]
pub struct Cli {
    /// Session config JSON.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra preset library JSON, registered after the built-ins.
    #[arg(long, global = true)]
    presets: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an image with adjustments applied.
    Render(RenderArgs),
    /// Print the render plan for a set of adjustments as JSON.
    Plan(PlanArgs),
    /// List available presets.
    Presets,
    /// Upscale an image towards the configured pixel target.
    Upscale(UpscaleArgs),
}

#[derive(Args, Debug, Default)]
struct AdjustArgs {
    /// Start from this preset instead of defaults.
    #[arg(long)]
    preset: Option<String>,

    /// JSON object of adjustments merged onto the preset, e.g. {"exposure": 110}.
    #[arg(long)]
    adjustments: Option<PathBuf>,

    /// Single override applied last, e.g. --set contrast=120.
    #[arg(long = "set", value_parser = parse_assignment)]
    set: Vec<(Param, f32)>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    input: PathBuf,
    output: PathBuf,

    #[command(flatten)]
    adjust: AdjustArgs,

    /// Render at preview size instead of full resolution.
    #[arg(long)]
    preview: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    adjust: AdjustArgs,

    /// Also write the packed GPU stage records to this file.
    #[arg(long)]
    uniforms: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UpscaleArgs {
    input: PathBuf,
    output: PathBuf,

    /// Override the target pixel count.
    #[arg(long)]
    target: Option<u64>,
}

fn parse_assignment(s: &str) -> Result<(Param, f32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PARAM=VALUE, got {s:?}"))?;
    let param = Param::from_name(name.trim())
        .ok_or_else(|| format!("unknown adjustment {:?}", name.trim()))?;
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|err| format!("invalid value for {}: {err}", param.name()))?;
    Ok((param, value))
}

pub async fn run(cli: Cli) -> Result<()> {
    let handle = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => ConfigHandle::default(),
    };
    for warning in &handle.warnings {
        warn!(%warning, "config");
    }
    if let Some(source) = &handle.source {
        info!(path = %source.display(), "loaded config");
    }

    let mut presets = PresetEngine::new();
    if let Some(path) = &cli.presets {
        presets.load_file(path)?;
    }
    let session = EditingSession::new(handle.config)?.with_presets(presets);

    match cli.cmd {
        Command::Render(args) => cmd_render(session, args),
        Command::Plan(args) => cmd_plan(session, args),
        Command::Presets => cmd_presets(&session),
        Command::Upscale(args) => cmd_upscale(session, args).await,
    }
}

fn apply_adjustments(session: &mut EditingSession, args: &AdjustArgs) -> Result<()> {
    if let Some(name) = &args.preset {
        session.apply_preset(name)?;
    }
    if let Some(path) = &args.adjustments {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read adjustments: {}", path.display()))?;
        let delta: AdjustmentDelta = serde_json::from_str(&json)
            .with_context(|| format!("parse adjustments: {}", path.display()))?;
        session.merge_adjustments(&delta);
    }
    for &(param, value) in &args.set {
        let stored = session.set_adjustment(param, value);
        if stored != value {
            warn!(param = param.name(), requested = value, stored, "value clamped");
        }
    }
    Ok(())
}

fn load(session: &mut EditingSession, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    session.load_bytes(bytes)?;
    Ok(())
}

fn cmd_render(mut session: EditingSession, args: RenderArgs) -> Result<()> {
    load(&mut session, &args.input)?;
    apply_adjustments(&mut session, &args.adjust)?;
    info!(stages = ?session.render_plan().names(), "rendering");
    let out = if args.preview {
        session.render_preview()?
    } else {
        session.render_full()?
    };
    out.to_rgb8()
        .save(&args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(path = %args.output.display(), width = out.width, height = out.height, "wrote image");
    Ok(())
}

fn cmd_plan(mut session: EditingSession, args: PlanArgs) -> Result<()> {
    apply_adjustments(&mut session, &args.adjust)?;
    let plan = session.render_plan();
    println!("{}", serde_json::to_string_pretty(&plan)?);
    if let Some(path) = &args.uniforms {
        let records = uniform::pack(&plan);
        std::fs::write(path, uniform::as_bytes(&records))
            .with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), stages = records.len(), "wrote stage uniforms");
    }
    Ok(())
}

fn cmd_presets(session: &EditingSession) -> Result<()> {
    for preset in session.presets().presets() {
        let fields: Vec<String> = preset
            .delta
            .iter()
            .map(|(p, v)| format!("{}={v}", p.name()))
            .collect();
        println!("{:<14} {}", preset.name, fields.join(" "));
    }
    Ok(())
}

async fn cmd_upscale(session: EditingSession, args: UpscaleArgs) -> Result<()> {
    if args.target == Some(0) {
        bail!("--target must be positive");
    }
    let mut config = session.config().clone();
    if let Some(target) = args.target {
        config.upscale_target_pixels = target;
    }
    let mut session = EditingSession::new(config)?;
    load(&mut session, &args.input)?;

    let orch = EditOrchestrator::new(session, Unavailable, Unavailable);
    let report = orch.upscale().await?;
    let session = orch.into_session();
    session
        .source()
        .context("upscaled session has no image")?
        .decode_dynamic()?
        .save(&args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(
        width = report.width,
        height = report.height,
        factor = report.scale_factor,
        committed = report.version.is_some(),
        "upscale done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_parses_name_and_value() {
        assert_eq!(parse_assignment("contrast=120").unwrap(), (Param::Contrast, 120.0));
        assert_eq!(
            parse_assignment(" HIGHLIGHTSSAT = 40 ").unwrap().0,
            Param::HighlightsSat
        );
    }

    #[test]
    fn assignment_errors() {
        assert!(parse_assignment("contrast").is_err());
        assert!(parse_assignment("clarity=3").is_err());
        assert!(parse_assignment("contrast=lots").is_err());
    }

    #[test]
    fn cli_parses_render() {
        let cli = Cli::try_parse_from([
            "retouch", "render", "in.jpg", "out.png", "--preset", "Warm", "--set", "blur=2",
        ])
        .unwrap();
        let Command::Render(args) = cli.cmd else {
            panic!("expected render");
        };
        assert_eq!(args.adjust.preset.as_deref(), Some("Warm"));
        assert_eq!(args.adjust.set, vec![(Param::Blur, 2.0)]);
    }

    #[test]
    fn adjustments_layer_preset_then_overrides() {
        let mut session = EditingSession::new(SessionConfig::default()).unwrap();
        let args = AdjustArgs {
            preset: Some("Warm".into()),
            adjustments: None,
            set: vec![(Param::Exposure, 500.0)],
        };
        apply_adjustments(&mut session, &args).unwrap();
        assert_eq!(session.adjustments().get(Param::Warmth), 20.0);
        assert_eq!(
            session.adjustments().get(Param::Exposure),
            *Param::Exposure.range().end()
        );
    }
}
