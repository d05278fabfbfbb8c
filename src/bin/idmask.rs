use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use idmask::{
    ALPHA_OUTPUT, GraphAdapter, IdSystem, Identifier, ImageTextureSource, MaterialDocument,
    MaterialId, MemoryHost, RGB_OUTPUT,
};

#[derive(Parser, Debug)]
#[command(name = "idmask", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the gray-level preset table.
    Presets,
    /// Build a material's core graph in memory and print its topology.
    Compile(CompileArgs),
    /// Evaluate the packed outputs of a material's core for given masks.
    Eval(EvalArgs),
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Input material config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Material name (overrides the one in the file).
    #[arg(long)]
    material: Option<String>,

    /// Print the full topology snapshot as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Input material config JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Mask value per identifier, `ID=VALUE` (repeatable). Unset masks are 0.
    #[arg(long = "mask", value_parser = parse_mask)]
    masks: Vec<(u32, f32)>,
}

fn parse_mask(s: &str) -> Result<(u32, f32), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{s}'"))?;
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad identifier '{id}': {e}"))?;
    let value = value
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("bad mask value '{value}': {e}"))?;
    Ok((id, value))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Presets => cmd_presets(),
        Command::Compile(args) => cmd_compile(args),
        Command::Eval(args) => cmd_eval(args),
    }
}

fn read_document(
    path: &std::path::Path,
    material: Option<String>,
) -> anyhow::Result<(MaterialId, MaterialDocument)> {
    let doc = MaterialDocument::from_path(path)
        .with_context(|| format!("load material config '{}'", path.display()))?;
    let material = match material {
        Some(name) => MaterialId::new(name)?,
        None => match &doc.material {
            Some(m) => m.clone(),
            None => MaterialId::new("Material")?,
        },
    };
    Ok((material, doc))
}

fn cmd_presets() -> anyhow::Result<()> {
    for (n, levels) in idmask::preset_table() {
        let levels: Vec<String> = levels.iter().map(|v| format!("{v}")).collect();
        println!("{n}: [{}]", levels.join(", "));
    }
    Ok(())
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let (material, doc) = read_document(&args.in_path, args.material)?;
    let mut sys = IdSystem::new(MemoryHost::new()).with_mask_images(ImageTextureSource::default());
    let core = sys
        .rebuild_core(&material, &doc.config)
        .with_context(|| format!("rebuild core for '{material}'"))?;
    let snapshot = sys.adapter().snapshot(core.graph)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let split = doc.config.split();
    println!("graph: {}", snapshot.name);
    println!(
        "split: R={} G={} B={} A={}",
        split[0], split[1], split[2], split[3]
    );
    println!("nodes: {}", snapshot.nodes.len());
    println!("links: {}", snapshot.links.len());
    println!("fingerprint: {}", snapshot.fingerprint());
    Ok(())
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<()> {
    let (material, doc) = read_document(&args.in_path, None)?;
    let mut sys = IdSystem::new(MemoryHost::new());
    let core = sys
        .rebuild_core(&material, &doc.config)
        .with_context(|| format!("rebuild core for '{material}'"))?;

    for (id, value) in args.masks {
        let id = Identifier::new(id)?;
        sys.adapter_mut()
            .set_default_scalar(&core.mask_input(id), value)
            .with_context(|| format!("set mask {id}"))?;
    }

    let host = sys.adapter();
    let rgb = host.evaluate_socket(&core.rgb_output())?.as_color();
    let alpha = host.evaluate_socket(&core.alpha_output())?.as_scalar();
    println!("{RGB_OUTPUT}: [{}, {}, {}]", rgb[0], rgb[1], rgb[2]);
    println!("{ALPHA_OUTPUT}: {alpha}");
    Ok(())
}
