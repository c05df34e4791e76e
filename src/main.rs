use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    init_logging();

    let args = cli::Args::parse();

    let ctx = match &args.project {
        Some(path) => denv::Context::for_path(path)?,
        None => denv::Context::for_cwd()?,
    };
    let paths = denv::PlatformPaths::discover()?;

    match args.command {
        cli::Command::Init => {
            denv::init(&ctx, &paths)?;
            eprintln!("Initialized configuration for {}", ctx.project_name);
        }
        cli::Command::Show => {
            let config = denv::resolve(&ctx, &paths)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var_os("DENV_DEBUG").is_some() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
