use std::{
    error::Error as StdError,
    io::{Error as IoError, ErrorKind},
    path::Path,
};

use axum::{Router, routing};

mod ingest;

use crate::libs::{
    config::{self, Config},
    device_log::DeviceLog,
};

/// The resources used by this service.
#[derive(Clone)]
pub struct State {
    /// The shared secret compared with the `pw` form value.
    pub password: String,
    pub device_log: DeviceLog,
}

/// To create resources for the service.
pub async fn new_state(conf: &Config) -> Result<State, Box<dyn StdError>> {
    let conf = config::apply_default(conf);
    let data_dir = conf.data_dir.as_ref().unwrap();
    if !Path::new(data_dir).is_dir() {
        return Err(Box::new(IoError::new(
            ErrorKind::NotFound,
            format!("data directory {} does not exist", data_dir),
        )));
    }

    Ok(State {
        password: conf.password.as_ref().unwrap().clone(),
        device_log: DeviceLog::new(data_dir),
    })
}

/// To register service URIs.
///
/// The ingest handler serves `/` and every other path, with any method.
pub fn new_service(state: &State) -> Router {
    Router::new()
        .route("/", routing::any(ingest::ingest))
        .fallback(ingest::ingest)
        .with_state(state.clone())
}
