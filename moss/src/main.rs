use std::path::PathBuf;

use clap::Parser as ClapParser;
use log::{error, info};
use moss::display::color_choice;
use moss::repl::Repl;
use mosscore::prelude::*;

/// Build mail queries interactively and search a mailbox with them
#[derive(ClapParser)]
#[command(version, about, long_about = None, override_usage = "moss <mailbox/maildir path>")]
pub struct Arguments {
    /// Path to an mbox file or a maildir
    mailbox: PathBuf,

    /// Configuration file (default: $MOSS_CONFIG, then ~/.config/moss/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Arguments::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    let store = match open_mailbox(&args.mailbox) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    info!("Opened mailbox {}", args.mailbox.display());

    let session = Session::new(store, ExternalViewer::new(config.viewer.clone()));
    let color = color_choice(config.color, args.no_color);
    let result = Repl::new(session, &config, color).and_then(|mut repl| repl.run());
    if let Err(err) = result {
        error!("{err}");
        std::process::exit(1);
    }
}
