use ledger_plot::dump::LedgerDump;
use ledger_plot::export::{Animation, write_animation, write_block_detail};
use ledger_plot::{LedgerView, PlotConfig, Plotter};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn parse_hex_array<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s).map_err(|_| "bad hex")?;
    if bytes.len() != N {
        return Err(format!("expected {} bytes hex, got {}", N, bytes.len()));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  ledger-plot render <ledger_dump.json> <out.json> [--config <config.json>]");
    eprintln!("  ledger-plot detail <ledger_dump.json> <block_hash_hex32> <out.json>");
}

fn create(path: &PathBuf) -> Result<BufWriter<File>, String> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

fn handle_render(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        return Err("render requires <ledger_dump.json> <out.json>".into());
    }
    let dump_path = PathBuf::from(&args[0]);
    let out_path = PathBuf::from(&args[1]);

    let mut config = PlotConfig::default();
    let mut idx = 2;
    while idx < args.len() {
        match args[idx].as_str() {
            "--config" => {
                if idx + 1 >= args.len() {
                    return Err("missing value for --config".into());
                }
                let text = std::fs::read_to_string(&args[idx + 1]).map_err(|e| format!("{}", e))?;
                config = serde_json::from_str(&text).map_err(|e| format!("{}", e))?;
                idx += 2;
            }
            other => return Err(format!("unknown arg {}", other)),
        }
    }

    let dump = LedgerDump::from_path(&dump_path).map_err(|e| format!("{}", e))?;
    let plotter = Plotter::new(dump.header.node_id.clone(), config);
    dump.replay_into(&plotter).map_err(|e| format!("{}", e))?;

    plotter.with_timeline(|timeline| {
        let animation = Animation::from_timeline(timeline, plotter.node_id(), plotter.config());
        write_animation(&animation, create(&out_path)?).map_err(|e| format!("{}", e))?;
        println!(
            "Rendered {} snapshots of {} -> {}",
            timeline.len(),
            dump_path.display(),
            out_path.display()
        );
        Ok(())
    })
}

fn handle_detail(args: &[String]) -> Result<(), String> {
    if args.len() < 3 {
        return Err("detail requires <ledger_dump.json> <block_hash_hex32> <out.json>".into());
    }
    let dump_path = PathBuf::from(&args[0]);
    let hash = parse_hex_array::<32>(&args[1])?;
    let out_path = PathBuf::from(&args[2]);

    let dump = LedgerDump::from_path(&dump_path).map_err(|e| format!("{}", e))?;
    let ledger = dump.load().map_err(|e| format!("{}", e))?;
    let block = ledger
        .lookup(&hash)
        .ok_or_else(|| format!("block {} not in {}", args[1], dump_path.display()))?;

    let plotter = Plotter::new(dump.header.node_id.clone(), PlotConfig::default());
    let detail = plotter.block_detail(block);
    write_block_detail(&detail, create(&out_path)?).map_err(|e| format!("{}", e))?;
    println!("Block #{} -> {}", detail.block_id, out_path.display());
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "ledger_plot=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args: Vec<String> = env::args().collect();
    let _bin = args.remove(0);
    if args.is_empty() {
        usage();
        std::process::exit(1);
    }

    let cmd = args.remove(0);
    let result: Result<(), String> = match cmd.as_str() {
        "render" => handle_render(&args),
        "detail" => handle_detail(&args),
        _ => {
            usage();
            Err("unknown command".into())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
