use std::process;

use clap::{value_t, App, Arg};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use seabattle_server::{start_server, ServerConfig};

fn main() {
    let matches = App::new("Sea Battle Server")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Hosts two-player battleship games over WebSocket.")
        .arg(
            Arg::with_name("host")
                .long("host")
                .value_name("HOST")
                .help("address to listen on")
                .takes_value(true)
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("port to listen on")
                .takes_value(true)
                .default_value("8080"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("SEED")
                .help("fixed seed for ids, first turns and random strikes")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .value_name("FILTER")
                .help("log filter used when RUST_LOG is not set")
                .takes_value(true)
                .default_value("info"),
        )
        .get_matches();

    let port = value_t!(matches, "port", u16).unwrap_or_else(|e| e.exit());
    let seed = if matches.is_present("seed") {
        Some(value_t!(matches, "seed", u64).unwrap_or_else(|e| e.exit()))
    } else {
        None
    };
    let log = matches.value_of("log").unwrap_or("info");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log)))
        .with(fmt::layer())
        .init();

    let config = ServerConfig {
        host: matches.value_of("host").unwrap_or("127.0.0.1").to_owned(),
        port,
        seed,
    };
    let (handle, addr) = match start_server(config) {
        Ok(started) => started,
        Err(err) => {
            error!(error = %err, "failed to start server");
            process::exit(1);
        }
    };
    info!(%addr, "listening for websocket clients");
    handle.join();
}
