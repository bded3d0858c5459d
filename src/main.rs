use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sheetcheck::engine::{Engine, EngineConfig, Scope, attach};
use sheetcheck::report::Level;
use sheetcheck::rules::model::RuleDoc;
use sheetcheck::rules::{RuleWatcher, file};
use sheetcheck::Result;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetcheck")]
#[command(about = "Rule-based validator for sheet-shaped JSON data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a message once and print it with `validation` attached.
    Check(CheckArgs),

    /// Validate, then re-validate whenever the rule file changes.
    Watch(CheckArgs),

    /// Read or overwrite rule files under a trusted root directory.
    Rules {
        #[command(subcommand)]
        cmd: RulesCommands,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Input message (JSON object).
    #[arg(long)]
    input: PathBuf,

    /// Rule file (.json): a rule array or {"rules": [...]}.
    #[arg(long)]
    rules: PathBuf,

    /// Dot path to the data root within the message.
    #[arg(long, default_value = "data")]
    path: String,

    /// Scope holding the data root (flow/global need an embedding host).
    #[arg(long, default_value = "msg")]
    scope: Scope,

    /// Level for rules that do not set one.
    #[arg(long, default_value = "info")]
    default_level: Level,

    /// Write the augmented message here instead of stdout.
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Print the rule array found in a file under the trusted root.
    Get {
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Rule file path, relative to the root.
        #[arg(long)]
        path: PathBuf,
    },

    /// Overwrite a rule file under the trusted root.
    Set {
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long)]
        path: PathBuf,

        /// File holding the new rule array.
        #[arg(long)]
        from: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Check(args) => {
            let engine = build_engine(&args, false)?;
            run_once(&engine, &args)?;
        }
        Commands::Watch(args) => {
            let engine = build_engine(&args, true)?;
            run_once(&engine, &args)?;

            let watcher = RuleWatcher::new(&args.rules)
                .with_context(|| format!("watch rule file {}", args.rules.display()))?;
            let cache = engine.rule_cache();

            while watcher.wait().is_some() {
                // A failed reload keeps the previous snapshot in effect.
                if let Some(rules) = file::try_load(&args.rules) {
                    cache.swap(Some(rules));
                    engine.rules_reloaded();
                }
                run_once(&engine, &args)?;
            }
        }
        Commands::Rules { cmd } => match cmd {
            RulesCommands::Get { root, path } => {
                let abs = file::guard_json_path(&root, &path)?;
                let rules = file::read_rules(&abs)?;
                println!("{}", serde_json::to_string_pretty(&rules)?);
            }
            RulesCommands::Set { root, path, from } => {
                let abs = file::guard_json_path(&root, &path)?;
                let text = std::fs::read_to_string(&from)
                    .with_context(|| format!("read {}", from.display()))?;
                let doc: RuleDoc = serde_json::from_str(&text)
                    .with_context(|| format!("parse {}", from.display()))?;
                file::write_rules(&abs, &doc.into_rules())?;
                println!("Wrote {}", abs.display());
            }
        },
    }

    Ok(())
}

fn build_engine(args: &CheckArgs, use_rules_file: bool) -> Result<Engine> {
    // `check` loads strictly, so a broken rule file fails loudly up front.
    // `watch` goes through the engine's lenient file cache instead and
    // keeps running across later reload failures.
    let rules = if use_rules_file {
        Vec::new()
    } else {
        file::read_rules(&args.rules)?
    };

    Ok(Engine::new(EngineConfig {
        scope: args.scope,
        source_path: args.path.clone(),
        default_level: args.default_level,
        rules,
        use_rules_file,
        rules_path: use_rules_file.then(|| args.rules.clone()),
    }))
}

fn run_once(engine: &Engine, args: &CheckArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read input {}", args.input.display()))?;
    let mut msg: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parse input {}", args.input.display()))?;

    let result = engine.run(&msg);
    log::info!(
        "validated: E:{} W:{} I:{}",
        result.counts.error,
        result.counts.warning,
        result.counts.info
    );

    attach(&mut msg, &result);
    let rendered = serde_json::to_string_pretty(&msg)?;
    match &args.out {
        Some(out) => {
            write_output(out, &rendered)?;
            println!("Wrote {}", out.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
