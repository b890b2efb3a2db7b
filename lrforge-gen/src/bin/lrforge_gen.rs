//! Command-line interface for the grammar compiler.

#[cfg(feature = "cli")]
mod real {
    use clap::Parser;
    use lrforge::ConfigError;
    use std::path::PathBuf;
    use std::process::ExitCode;

    #[derive(Parser)]
    #[command(about = "Compile an lrforge grammar into a parse table")]
    struct Args {
        /// Path to the input grammar file.
        #[arg(short = 'g', long)]
        grammar: PathBuf,

        /// Path to the output table file.
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Also write a report of rules, item sets and conflicts.
        #[arg(short = 'r', long)]
        report: Option<PathBuf>,

        /// Enable debug logging (off by default).
        #[arg(short = 'd', long)]
        debug: bool,
    }

    pub fn main() -> ExitCode {
        let args = Args::parse();
        let level = if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();

        match lrforge_gen::compile(args.grammar, args.output, args.report) {
            Ok(summary) => {
                println!(
                    "{} rules, {} symbols, {} states",
                    summary.rules, summary.symbols, summary.states
                );
                ExitCode::SUCCESS
            }
            Err(err) => {
                if let Some(ConfigError::Conflicts(conflicts)) = err.downcast_ref::<ConfigError>() {
                    for conflict in conflicts {
                        eprintln!("{}", conflict);
                    }
                    eprintln!("{} conflicts, no table written", conflicts.len());
                } else {
                    eprintln!("error: {:#}", err);
                }
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> std::process::ExitCode {
    real::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("lrforge-gen disabled (compiled without `cli` feature)");
}
