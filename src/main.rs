use clap::Parser;
use tracing_subscriber::EnvFilter;
use with_conditions::{with_conditions, Invoke, Script};

/// Run a with-conditions script and print what the target received.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Script file (JSON), or `-` to read stdin
    script: String,
    /// Also report whether the target responds to this call name
    #[arg(long)]
    check: Option<String>,
    /// More logging (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let script = match Script::load(&args.script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid script: {e}");
            std::process::exit(1);
        }
    };

    let target = script.recorder();
    if let Err(e) = script.run(&target) {
        eprintln!("Script failed: {e}");
        std::process::exit(1);
    }

    if let Some(name) = args.check.as_deref() {
        // Asked through an empty scope: the answer must still be the target's.
        let responds = with_conditions(&target, (), ()).responds_to(name);
        eprintln!("{name}: {}", if responds { "accepted" } else { "unknown" });
    }

    match serde_json::to_string_pretty(&target.calls()) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Cannot render calls: {e}");
            std::process::exit(1);
        }
    }
}
