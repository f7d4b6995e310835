mod cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--devices") => cli::list_devices(),
        Some(path) => cli::play_moving_source(path),
        None => {
            eprintln!("Usage: {} <sound file> | --devices", args[0]);
            Ok(())
        }
    }
}
