//! Web server: JSON API for tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! PLAYERS_CSV loads the player directory at startup; SHUFFLE_SEED fixes all shuffles.

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use std::fs::File;
use std::io;
use tennis_tournaments::{api, config::Config, read_players_csv, Database, Store, TournamentService};

fn load_database(config: &Config) -> io::Result<Database> {
    let mut db = Database::new();
    if let Some(path) = &config.players_csv {
        let file = File::open(path)?;
        let players = read_players_csv(file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        for player in players {
            db.insert_player(player);
        }
        log::info!(
            "Loaded {} player(s) from {}",
            db.player_count(),
            path.display()
        );
    } else {
        log::warn!("PLAYERS_CSV not set; player directory is empty");
    }
    Ok(db)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config =
        Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let db = load_database(&config)?;
    if config.shuffle_seed.is_some() {
        log::info!("Using fixed shuffle seed");
    }
    let state = Data::new(TournamentService::new(Store::new(db), config.shuffle_seed));

    let (host, port) = config.bind_addr();
    log::info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
