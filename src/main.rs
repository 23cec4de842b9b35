use backdrop::cli::CliArgs;
use backdrop::config::BackdropConfig;
use backdrop::logging;

const DEFAULT_CONFIG_PATH: &str = "config/backdrop.json";

fn main() {
    logging::init();

    let args = match CliArgs::parse_from_env() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };

    let mut config = match args.config_path() {
        Some(path) => BackdropConfig::load_or_default(path),
        None => BackdropConfig::load_or_default(DEFAULT_CONFIG_PATH),
    };
    config.apply_overrides(&args.into_config_overrides());

    if let Err(err) = backdrop::run(config) {
        log::error!("fatal: {err:#}");
        std::process::exit(1);
    }
}
