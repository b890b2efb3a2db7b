//! Command-line interface for the calculator.
//!
//! `calc eval` parses and evaluates expressions, one per line, from an
//! argument or a file. `calc tables` compiles the calculator grammar offline
//! and writes its parse table, which `calc eval --table` can load instead of
//! configuring the grammar at startup.

#[cfg(feature = "cli")]
mod real {
    use anyhow::{bail, Context};
    use clap::{Parser as ClapParser, Subcommand};
    use lrforge::{write_table, ConfigError};
    use lrforge_calc::grammar::{self, CalcSymbols};
    use lrforge_calc::{CalcParser, Env};
    use std::io::BufReader;
    use std::path::PathBuf;

    #[derive(ClapParser, Debug)]
    #[command(version, about, long_about = None)]
    struct Args {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand, Debug)]
    enum Commands {
        /// Evaluates expressions
        Eval {
            /// Expression to evaluate.
            #[arg(short, long, conflicts_with = "input")]
            expr: Option<String>,

            /// File with one expression per line.
            #[arg(short, long)]
            input: Option<PathBuf>,

            /// Variable binding, `name=value`; repeatable.
            #[arg(short = 's', long = "set")]
            vars: Vec<String>,

            /// Parse table written by `calc tables`.
            #[arg(short, long)]
            table: Option<PathBuf>,

            /// Print the grouped tree instead of the value.
            #[arg(long)]
            tree: bool,
        },
        /// Writes the calculator's parse table
        Tables {
            /// Output table file.
            #[arg(short, long)]
            output: PathBuf,

            /// Precedence of unary minus.
            #[arg(long, default_value_t = grammar::NEG_PREC)]
            neg_prec: i32,
        },
    }

    fn bind(env: &mut Env, binding: &str) -> anyhow::Result<()> {
        let Some((name, value)) = binding.split_once('=') else {
            bail!("expected name=value, got {:?}", binding);
        };
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("bad value in {:?}", binding))?;
        env.set(name.trim(), value);
        Ok(())
    }

    fn eval_lines(parser: &mut CalcParser, env: &Env, text: &str, tree: bool) -> bool {
        let mut ok = true;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let result = parser.parse(line).and_then(|node| {
                if tree {
                    Ok(node.to_string())
                } else {
                    env.eval(&node).map(|x| x.to_string())
                }
            });
            match result {
                Ok(out) => println!("{}", out),
                Err(err) => {
                    eprintln!("{}: {}", line, err);
                    ok = false;
                }
            }
        }
        ok
    }

    fn tables(output: PathBuf, neg_prec: i32) -> anyhow::Result<bool> {
        let symbols = CalcSymbols::new()?;
        let g = match grammar::configured_grammar(&symbols, neg_prec) {
            Ok(g) => g,
            Err(ConfigError::Conflicts(conflicts)) => {
                for conflict in &conflicts {
                    eprintln!("{}", conflict);
                }
                eprintln!("{} conflicts, no table written", conflicts.len());
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        let mut table = Vec::new();
        write_table(&g, &mut table)?;
        std::fs::write(&output, table).with_context(|| format!("writing {}", output.display()))?;
        log::info!("wrote {} states to {}", g.states().len(), output.display());
        Ok(true)
    }

    pub fn main() -> anyhow::Result<bool> {
        env_logger::init();
        let args = Args::parse();

        match args.command {
            Commands::Eval {
                expr,
                input,
                vars,
                table,
                tree,
            } => {
                let mut env = Env::new();
                for binding in &vars {
                    bind(&mut env, binding)?;
                }
                let text = match (expr, input) {
                    (Some(expr), _) => expr,
                    (None, Some(path)) => std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?,
                    (None, None) => bail!("one of --expr or --input is required"),
                };
                let ok = match table {
                    Some(path) => {
                        let symbols = CalcSymbols::new()?;
                        let file = std::fs::File::open(&path)
                            .with_context(|| format!("opening {}", path.display()))?;
                        let g = grammar::load_grammar(&symbols, BufReader::new(file))?;
                        eval_lines(&mut CalcParser::with_grammar(&g), &env, &text, tree)
                    }
                    None => eval_lines(&mut CalcParser::new()?, &env, &text, tree),
                };
                Ok(ok)
            }
            Commands::Tables { output, neg_prec } => tables(output, neg_prec),
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> std::process::ExitCode {
    match real::main() {
        Ok(true) => std::process::ExitCode::SUCCESS,
        Ok(false) => std::process::ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("calc disabled (compiled without `cli` feature)");
}
