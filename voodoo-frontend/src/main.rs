use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use std::fs;
use std::path::PathBuf;
use voodoo_core::Voodoo;
use voodoo_frontend::config::{read_config, ReplayConfig};
use voodoo_frontend::{output, trace};

#[derive(Debug, Parser)]
struct Args {
    /// Register trace to replay
    #[arg(short = 't', long = "trace", required = true)]
    trace_path: PathBuf,
    /// TOML replay config; defaults are used if missing or invalid
    #[arg(short = 'c', long = "config")]
    config_path: Option<PathBuf>,
    /// Overrides the output image path from the config
    #[arg(short = 'o', long = "output")]
    output_path: Option<PathBuf>,
    /// Write a save state of the chip after the replay
    #[arg(short = 's', long = "save-state")]
    save_state_path: Option<PathBuf>,
}

fn load_config(args: &Args) -> ReplayConfig {
    let Some(path) = &args.config_path else {
        return ReplayConfig::default();
    };

    match read_config(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{err:#}; using default config");
            ReplayConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = load_config(&args);
    if let Some(output_path) = &args.output_path {
        config.output.path.clone_from(output_path);
    }

    let mut voodoo = Voodoo::new(config.chip)?;

    log::info!("Replaying trace from '{}'", args.trace_path.display());

    let trace_text = fs::read_to_string(&args.trace_path)
        .with_context(|| format!("Error reading trace from '{}'", args.trace_path.display()))?;
    let commands = trace::parse_trace(&trace_text, |name| voodoo.find_register(name))?;
    trace::replay(&mut voodoo, &commands);

    let stats = voodoo.statistics();
    log::info!(
        "Replayed {} commands: {} triangles, {} pixels in, {} pixels out, {} chroma fail, {} depth fail, {} alpha fail",
        commands.len(),
        voodoo.triangles_out(),
        stats.pixels_in,
        stats.pixels_out,
        stats.chroma_fail,
        stats.zfunc_fail,
        stats.afunc_fail
    );

    output::write_ppm(
        &voodoo,
        config.output.buffer.to_select(),
        config.output.width,
        config.output.height,
        &config.output.path,
    )?;

    if let Some(path) = &args.save_state_path {
        let state = voodoo.save_state()?;
        fs::write(path, state)
            .with_context(|| format!("Error writing save state to '{}'", path.display()))?;
        log::info!("Wrote save state to '{}'", path.display());
    }

    Ok(())
}
