//! Program configurations.

use std::env;

use clap::{Arg, ArgMatches, Command, value_parser};
use serde::Deserialize;

/// Configuration file object.
#[derive(Default, Deserialize)]
pub struct Config {
    /// Listening port on all interfaces.
    pub port: Option<u16>,
    /// The shared secret that the `pw` form value must equal.
    pub password: Option<String>,
    /// Directory for `data-<id>.csv` files.
    #[serde(rename = "dataDir")]
    pub data_dir: Option<String>,
}

pub const DEF_PORT: u16 = 8080;
pub const DEF_PASSWORD: &'static str = "555541";
pub const DEF_DATA_DIR: &'static str = ".";

/// To register Clap arguments.
///
/// No default values are registered here so that environment variables can still take effect.
pub fn reg_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("weather-server.port")
            .long("weather-server.port")
            .help("listening port (default 8080)")
            .num_args(1)
            .value_parser(value_parser!(u16)),
    )
    .arg(
        Arg::new("weather-server.password")
            .long("weather-server.password")
            .help("shared secret for the `pw` form value")
            .num_args(1),
    )
    .arg(
        Arg::new("weather-server.data-dir")
            .long("weather-server.data-dir")
            .help("directory to store device CSV files (default `.`)")
            .num_args(1),
    )
}

/// To read input arguments from command-line arguments and environment variables.
///
/// This function will call [`apply_default()`] to fill missing values so you do not need call it
/// again.
pub fn read_args(args: &ArgMatches) -> Config {
    apply_default(&Config {
        port: match args.get_one::<u16>("weather-server.port") {
            None => match env::var("WEATHER_SERVER_PORT") {
                Err(_) => None,
                Ok(v) => match v.parse::<u16>() {
                    Err(_) => None,
                    Ok(v) => Some(v),
                },
            },
            Some(v) => Some(*v),
        },
        password: match args.get_one::<String>("weather-server.password") {
            None => match env::var("WEATHER_SERVER_PASSWORD") {
                Err(_) => None,
                Ok(v) => Some(v),
            },
            Some(v) => Some(v.clone()),
        },
        data_dir: match args.get_one::<String>("weather-server.data-dir") {
            None => match env::var("WEATHER_SERVER_DATA_DIR") {
                Err(_) => None,
                Ok(v) => Some(v),
            },
            Some(v) => Some(v.clone()),
        },
    })
}

/// Fill missing configuration with default values.
pub fn apply_default(config: &Config) -> Config {
    Config {
        port: match config.port {
            None => Some(DEF_PORT),
            Some(port) => Some(port),
        },
        password: match config.password.as_ref() {
            None => Some(DEF_PASSWORD.to_string()),
            Some(password) => Some(password.clone()),
        },
        data_dir: match config.data_dir.as_ref() {
            None => Some(DEF_DATA_DIR.to_string()),
            Some(dir) => Some(dir.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_default_fills_missing() {
        let conf = apply_default(&Config::default());
        assert_eq!(conf.port, Some(DEF_PORT));
        assert_eq!(conf.password.as_deref(), Some(DEF_PASSWORD));
        assert_eq!(conf.data_dir.as_deref(), Some(DEF_DATA_DIR));
    }

    #[test]
    fn apply_default_keeps_values() {
        let conf = apply_default(&Config {
            port: Some(9000),
            password: Some("secret".to_string()),
            data_dir: None,
        });
        assert_eq!(conf.port, Some(9000));
        assert_eq!(conf.password.as_deref(), Some("secret"));
        assert_eq!(conf.data_dir.as_deref(), Some(DEF_DATA_DIR));
    }

    #[test]
    fn read_args_from_command_line() {
        let cmd = reg_args(Command::new("test"));
        let args = cmd
            .try_get_matches_from([
                "test",
                "--weather-server.port",
                "9090",
                "--weather-server.password",
                "abc",
                "--weather-server.data-dir",
                "/tmp/weather",
            ])
            .unwrap();
        let conf = read_args(&args);
        assert_eq!(conf.port, Some(9090));
        assert_eq!(conf.password.as_deref(), Some("abc"));
        assert_eq!(conf.data_dir.as_deref(), Some("/tmp/weather"));
    }

    #[test]
    fn json5_config_file() {
        let conf: Config =
            json5::from_str("{ port: 8081, password: 'pw', dataDir: 'logs' }").unwrap();
        assert_eq!(conf.port, Some(8081));
        assert_eq!(conf.password.as_deref(), Some("pw"));
        assert_eq!(conf.data_dir.as_deref(), Some("logs"));
    }
}
