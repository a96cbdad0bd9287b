use chat_chess::config::Config;

fn main() {
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    log::info!("Chess bot starting: {config:?}");

    chat_chess::mock::run_interactive_terminal(&config);
}
