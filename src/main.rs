use std::process;

use clap::Parser;
use colored::Colorize;
use kmermerge::{cli::Args, run};

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            process::exit(code);
        }
    };

    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if !args.quiet {
        eprintln!(
            "{}: {}",
            "samples".bold(),
            args.list.display().to_string().underline().bold().blue()
        );
        eprintln!("{}: {}", "format".bold(), args.format.to_string().blue().bold());
        eprintln!();
    }

    if let Err(e) = run::run(&args.list, args.format) {
        eprintln!(
            "{}\n {}",
            "Application error:".blue().bold(),
            e.to_string().blue()
        );
        process::exit(1);
    }
}
