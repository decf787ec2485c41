mod app;
mod cli;
mod config;
mod event;
mod fetch;
mod logging;
mod terminal;
mod ui;

use app::App;
use clap::Parser;
use cli::CliArgs;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();

    let config = config::init_app_config()?;
    let headless = args.headless || !is_terminal();
    logging::init_tracing(&config, headless)?;
    tracing::info!(variant = config.variant().as_str(), headless, "starting dashboard");

    let mut app = App::new(config, args.filter.clone());

    if headless {
        return event::run_headless(&mut app, args.json).await;
    }

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    result
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
