fn main() -> anyhow::Result<()> {
    // Load .env early; ignore if missing.
    dotenvy::dotenv().ok();

    let cli = match gantt_filter::parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    gantt_filter::cli::init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if let Err(err) = runtime.block_on(gantt_filter::run_with_parsed(cli)) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
