//! `fetch` requests to the mask server.
//!
//! Every request is a same-origin `POST`. Non-2xx statuses are treated
//! as failures so an error page is never shown as a mask.

use demark_control::{ControlError, ImageRequest};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, Headers, Request, RequestInit, Response};
use web_time::Instant;

/// Errors that can occur while talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// `fetch` rejected, e.g. the server is unreachable.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("{endpoint} answered HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    /// The response body could not be read or decoded.
    #[error("unreadable response body: {0}")]
    Body(String),

    /// The request body could not be built.
    #[error(transparent)]
    Control(#[from] ControlError),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RequestError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// What a request sends.
#[derive(Debug, Clone, Copy)]
enum Payload<'a> {
    /// No body and no content type.
    Nothing,
    /// No body, but labelled as JSON like the page's other requests.
    EmptyJson,
    Json(&'a str),
}

#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
async fn post(endpoint: &'static str, payload: Payload<'_>) -> Result<Response, RequestError> {
    let window = web_sys::window()
        .ok_or_else(|| RequestError::JsError("no global window".into()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    if !matches!(payload, Payload::Nothing) {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        init.set_headers(&headers);
    }
    if let Payload::Json(body) = payload {
        init.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(endpoint, &init)?;

    let started = Instant::now();
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| RequestError::Network(format!("{e:?}")))?;
    let response: Response = value
        .dyn_into()
        .map_err(|_| RequestError::JsError("fetch did not resolve to a Response".into()))?;
    log::debug!(
        "POST {endpoint} -> {} in {} ms",
        response.status(),
        started.elapsed().as_millis()
    );

    if !response.ok() {
        return Err(RequestError::Status {
            endpoint,
            status: response.status(),
        });
    }
    Ok(response)
}

/// Post an image request and return the image payload.
///
/// # Errors
///
/// Returns a [`RequestError`] if the body cannot be encoded, the
/// request fails, or the payload cannot be read.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn post_for_image(request: &ImageRequest) -> Result<Blob, RequestError> {
    let body = request.body()?;
    let response = post(request.endpoint(), Payload::Json(&body)).await?;
    let blob = JsFuture::from(response.blob()?)
        .await
        .map_err(|e| RequestError::Body(format!("{e:?}")))?;
    blob.dyn_into::<Blob>()
        .map_err(|_| RequestError::Body("response body is not a Blob".into()))
}

/// Post a bodiless mutation and return its JSON acknowledgement.
///
/// # Errors
///
/// Returns a [`RequestError`] if the request fails or the body is not
/// JSON.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn post_for_ack(endpoint: &'static str) -> Result<serde_json::Value, RequestError> {
    let response = post(endpoint, Payload::EmptyJson).await?;
    let value = JsFuture::from(response.json()?)
        .await
        .map_err(|e| RequestError::Body(format!("acknowledgement is not JSON: {e:?}")))?;
    let text: String = js_sys::JSON::stringify(&value)?.into();
    serde_json::from_str(&text).map_err(|e| RequestError::Body(e.to_string()))
}

/// Post to `endpoint` with no body, ignoring the response.
///
/// # Errors
///
/// Returns a [`RequestError`] if the request fails.
#[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
pub async fn post_empty(endpoint: &'static str) -> Result<(), RequestError> {
    post(endpoint, Payload::Nothing).await.map(drop)
}
