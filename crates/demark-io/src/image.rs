//! The mask `<img>` element.
//!
//! Wraps the element together with its [`DisplayedImage`] model so
//! every source change goes through the model and stale completions
//! get logged.

use std::cell::RefCell;

use demark_control::{DisplayUpdate, DisplayedImage, Freshness, ImageSource, Ticket};
use web_sys::{Blob, HtmlImageElement, Url};

use crate::http::RequestError;

/// Create a `blob:` URL over an image payload.
///
/// # Errors
///
/// Returns [`RequestError::JsError`] if `URL.createObjectURL` fails.
pub fn object_url(blob: &Blob) -> Result<ImageSource, RequestError> {
    Ok(ImageSource::ObjectUrl(Url::create_object_url_with_blob(blob)?))
}

pub struct MaskImage {
    element: HtmlImageElement,
    state: RefCell<DisplayedImage>,
}

impl MaskImage {
    #[must_use]
    pub fn new(element: HtmlImageElement) -> Self {
        Self {
            element,
            state: RefCell::new(DisplayedImage::new()),
        }
    }

    /// Reserve a ticket before sending a request that ends in an image change.
    pub fn begin(&self) -> Ticket {
        self.state.borrow_mut().begin()
    }

    /// Apply a completed request. Failures are logged and leave the
    /// image as it was.
    pub fn complete(
        &self,
        ticket: Ticket,
        result: Result<ImageSource, RequestError>,
        origin: &str,
    ) {
        let update = self.state.borrow_mut().complete(ticket, result);
        match update {
            DisplayUpdate::Replaced {
                src,
                revoke,
                freshness,
            } => {
                if let Freshness::Stale { superseded_by } = freshness {
                    // Responses are applied in completion order; an older
                    // request overwrote a newer image.
                    log::warn!(
                        "{origin}: response #{} landed after #{}; showing it anyway",
                        ticket.get(),
                        superseded_by.get()
                    );
                }
                self.element.set_src(&src);
                if let Some(old) = revoke
                    && let Err(e) = Url::revoke_object_url(&old)
                {
                    log::debug!("failed to revoke {old}: {e:?}");
                }
            }
            DisplayUpdate::Failed(e) => log::error!("{origin} failed: {e}"),
        }
    }
}
