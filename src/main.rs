use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use pinroute::config::Config;
use pinroute::console::{parse_command, ConsoleSurface, HELP};
use pinroute::engine::{Controller, Message};
use pinroute::error::Error;
use pinroute::external::{GoogleMapsClient, OsrmDirectionsClient};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let geocoder = GoogleMapsClient::from_config(&config).map_err(|err| {
        tracing::error!("GOOGLE_MAPS_API_KEY is not set");
        err
    })?;
    let directions = OsrmDirectionsClient::new(config.osrm_url.clone());

    let mut controller = Controller::new(
        config,
        Arc::new(geocoder),
        Arc::new(directions),
        ConsoleSurface::new(),
    );

    let sender = controller.sender();

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("{}", HELP);

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!("stdin: {}", err);
                    break;
                }
            };

            match parse_command(&line) {
                Ok(Some(message)) => {
                    let quit = matches!(message, Message::Quit);
                    if sender.send(message).await.is_err() || quit {
                        return;
                    }
                }
                Ok(None) => {}
                Err(_) => println!("{}", HELP),
            }
        }

        sender.send(Message::Quit).await.ok();
    });

    controller.run().await
}
