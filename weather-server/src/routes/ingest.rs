use axum::{
    body::{self, Body},
    extract::{Request, State},
    http::{HeaderMap, Method, header},
};
use chrono::Utc;
use log::{debug, info, warn};
use multer::{Constraints, Multipart, SizeLimit};
use url::form_urlencoded;

use super::State as AppState;
use crate::libs::Reading;

/// Upper bound of a form body. A larger body contributes no values.
pub const MAX_FORM_SIZE: usize = 10 << 20;

const FORM_CONTENT_TYPE: &'static str = "application/x-www-form-urlencoded";
const MULTIPART_CONTENT_TYPE: &'static str = "multipart/form-data";
const MSG_IGNORED: &'static str = "message igmored\n";

enum FormBody {
    None,
    UrlEncoded,
    Multipart(String),
}

/// `ANY /`
///
/// Always responds `200 OK`:
/// - Wrong password: empty body.
/// - Log file cannot be opened: `message igmored`.
/// - Otherwise: the timestamp, the device ID and the temperature in three lines.
pub async fn ingest(State(state): State<AppState>, req: Request) -> String {
    const FN_NAME: &'static str = "ingest";
    let now = Utc::now();

    let (parts, body) = req.into_parts();
    let form = read_form(&parts.method, &parts.headers, parts.uri.query(), body).await;
    if form_value(&form, "pw") != state.password.as_str() {
        debug!("[{}] password mismatch, ignore request", FN_NAME);
        return String::new();
    }

    let reading = Reading::new(form_value(&form, "id"), form_value(&form, "t"), now);
    if let Err(e) = state.device_log.append(&reading).await {
        warn!(
            "[{}] open log for device {} error: {}",
            FN_NAME, reading.device_id, e
        );
        return MSG_IGNORED.to_string();
    }
    info!(
        "[{}] device {} temperature {}",
        FN_NAME, reading.device_id, reading.temperature
    );

    format!(
        "{}\nid: {}\ntemp: {}\n",
        reading.time_str(),
        reading.device_id,
        reading.temperature
    )
}

/// Collects form pairs from the query string and the body.
///
/// URL-encoded body pairs of `POST`, `PUT` and `PATCH` requests come before the query string
/// pairs. Multipart body pairs of any method come after them, and file parts are skipped. A body
/// that is malformed or exceeds [`MAX_FORM_SIZE`] contributes nothing.
async fn read_form(
    method: &Method,
    headers: &HeaderMap,
    query: Option<&str>,
    body: Body,
) -> Vec<(String, String)> {
    let mut query_form: Vec<(String, String)> = match query {
        None => vec![],
        Some(query) => form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
    };

    match form_body(method, headers) {
        FormBody::None => query_form,
        FormBody::UrlEncoded => {
            let mut form = read_urlencoded(body).await;
            form.append(&mut query_form);
            form
        }
        FormBody::Multipart(boundary) => {
            query_form.append(&mut read_multipart(body, boundary).await);
            query_form
        }
    }
}

fn form_body(method: &Method, headers: &HeaderMap) -> FormBody {
    let content_type = match headers.get(header::CONTENT_TYPE) {
        None => return FormBody::None,
        Some(value) => match value.to_str() {
            Err(_) => return FormBody::None,
            Ok(value) => value,
        },
    };
    let mime = match content_type.split(';').next() {
        None => return FormBody::None,
        Some(mime) => mime.trim(),
    };

    if mime.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        if *method == Method::POST || *method == Method::PUT || *method == Method::PATCH {
            FormBody::UrlEncoded
        } else {
            FormBody::None
        }
    } else if mime.eq_ignore_ascii_case(MULTIPART_CONTENT_TYPE) {
        match multer::parse_boundary(content_type) {
            Err(_) => FormBody::None,
            Ok(boundary) => FormBody::Multipart(boundary),
        }
    } else {
        FormBody::None
    }
}

async fn read_urlencoded(body: Body) -> Vec<(String, String)> {
    const FN_NAME: &'static str = "read_urlencoded";

    match body::to_bytes(body, MAX_FORM_SIZE).await {
        Err(e) => {
            warn!("[{}] read form body error: {}", FN_NAME, e);
            vec![]
        }
        Ok(bytes) => form_urlencoded::parse(&bytes).into_owned().collect(),
    }
}

async fn read_multipart(body: Body, boundary: String) -> Vec<(String, String)> {
    const FN_NAME: &'static str = "read_multipart";

    let constraints =
        Constraints::new().size_limit(SizeLimit::new().whole_stream(MAX_FORM_SIZE as u64));
    let mut multipart =
        Multipart::with_constraints(body.into_data_stream(), boundary, constraints);
    let mut form = vec![];
    loop {
        let field = match multipart.next_field().await {
            Err(e) => {
                warn!("[{}] read multipart field error: {}", FN_NAME, e);
                return vec![];
            }
            Ok(None) => break,
            Ok(Some(field)) => field,
        };
        if field.file_name().is_some() {
            continue;
        }
        let name = match field.name() {
            None => continue,
            Some(name) => name.to_string(),
        };
        match field.text().await {
            Err(e) => {
                warn!("[{}] read multipart value error: {}", FN_NAME, e);
                return vec![];
            }
            Ok(value) => form.push((name, value)),
        }
    }
    form
}

/// The first value of the key, or an empty string.
fn form_value<'a>(form: &'a [(String, String)], key: &str) -> &'a str {
    match form.iter().find(|(k, _)| k.as_str() == key) {
        None => "",
        Some((_, v)) => v.as_str(),
    }
}
