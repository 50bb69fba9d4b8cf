use std::{
    error::Error as StdError,
    fs,
    io::{Error as IoError, ErrorKind},
    net::{Ipv4Addr, SocketAddr},
};

use clap::{Arg as ClapArg, Command};
use log::{self, error, info};
use serde::Deserialize;
use sylvia_iot_sdk::util::logger;
use tokio;

use weather_server::{libs, routes};

#[derive(Deserialize)]
struct AppConfig {
    #[serde(default)]
    log: logger::Config,
    #[serde(default, rename = "weatherServer")]
    weather_server: libs::config::Config,
}

const PROJ_NAME: &'static str = env!("CARGO_PKG_NAME");
const PROJ_VER: &'static str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> std::io::Result<()> {
    const FN_NAME: &'static str = "main";

    let conf = match init_config() {
        Err(e) => {
            let conf = &logger::Config {
                ..Default::default()
            };
            logger::init(PROJ_NAME, &conf);
            error!("[{}] read config error: {}", FN_NAME, e);
            return Err(IoError::new(ErrorKind::InvalidInput, e.to_string()));
        }
        Ok(conf) => conf,
    };

    logger::init(PROJ_NAME, &conf.log);

    let server_conf = libs::config::apply_default(&conf.weather_server);
    let state = match routes::new_state(&server_conf).await {
        Err(e) => {
            error!("[{}] new state error: {}", FN_NAME, e);
            return Err(IoError::new(ErrorKind::Other, e.to_string()));
        }
        Ok(state) => state,
    };
    let app = routes::new_service(&state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, server_conf.port.unwrap()));
    info!("[{}] listening on {}", FN_NAME, addr);
    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!("[{}] listener error: {}", FN_NAME, e);
        return Err(e);
    }
    Ok(())
}

fn init_config() -> Result<AppConfig, Box<dyn StdError>> {
    let mut args = Command::new(PROJ_NAME).version(PROJ_VER).arg(
        ClapArg::new("file")
            .short('f')
            .long("file")
            .help("config file")
            .num_args(1),
    );
    args = logger::reg_args(args);
    args = libs::config::reg_args(args);
    let args = args.get_matches();

    if let Some(v) = args.get_one::<String>("file") {
        let conf_str = fs::read_to_string(v)?;
        return Ok(json5::from_str(conf_str.as_str())?);
    }

    Ok(AppConfig {
        log: logger::read_args(&args),
        weather_server: libs::config::read_args(&args),
    })
}
