// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod dts_gen;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Xtask {
    /// Log debug output from the generator
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate board symbols from a devicetree and its bindings
    DtsGen {
        /// Reduced-ready tree in JSON form
        #[arg(long, value_name = "FILE")]
        tree: PathBuf,

        /// Binding directories, searched in the order given
        #[arg(long, value_name = "DIR", num_args = 1.., required = true)]
        bindings: Vec<PathBuf>,

        /// TOML file overriding the chosen selectors and pin tag
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Text appended to the include file before its closing guard
        #[arg(long, value_name = "FILE")]
        fixup: Option<PathBuf>,

        /// Write NAME=value lines instead of a C include file
        #[arg(long)]
        keyvalue: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the structured records as JSON
        #[arg(long, value_name = "FILE")]
        records: Option<PathBuf>,

        /// Write the boot-time pin configuration table
        #[arg(long, value_name = "FILE")]
        pinctrl: Option<PathBuf>,

        /// Directory receiving one <compatible>_init.h per driver template
        #[arg(long, value_name = "DIR")]
        driver_init: Option<PathBuf>,
    },
}

fn main() {
    let cli = Xtask::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // Logs go to stderr so generated text on stdout stays clean.
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialize logging: {err}");
    }

    let result = match &cli.xtask {
        Commands::DtsGen {
            tree,
            bindings,
            config,
            fixup,
            keyvalue,
            output,
            records,
            pinctrl,
            driver_init,
        } => dts_gen::generate(&dts_gen::DtsGenArgs {
            tree,
            bindings,
            config: config.as_deref(),
            fixup: fixup.as_deref(),
            keyvalue: *keyvalue,
            output: output.as_deref(),
            records: records.as_deref(),
            pinctrl: pinctrl.as_deref(),
            driver_init: driver_init.as_deref(),
        }),
    };
    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(-1);
    }
}
