//! The displayed mask image and the ordering of its updates.
//!
//! Every request that ends by changing the mask image takes a
//! [`Ticket`] when it is issued. Responses are applied in completion
//! order, not issue order: a slow older response that lands after a
//! newer one still replaces the image. That race is kept as is and
//! reported through [`Freshness::Stale`] so the controller can log it.

/// Issue-order position of an image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Whether an applied response was the newest one seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Latest,
    /// A response issued after this one was already applied.
    Stale { superseded_by: Ticket },
}

/// Where the mask image's `src` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A `blob:` URL over a response payload. Owned by the image and
    /// revoked when replaced.
    ObjectUrl(String),
    /// A server path fetched by the image element itself.
    Endpoint(String),
}

impl ImageSource {
    #[must_use]
    pub fn src(&self) -> &str {
        match self {
            Self::ObjectUrl(url) | Self::Endpoint(url) => url,
        }
    }
}

/// What the controller must do to the image element after a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUpdate<E> {
    Replaced {
        src: String,
        /// Previous object URL to revoke.
        revoke: Option<String>,
        freshness: Freshness,
    },
    /// The request failed; the image is untouched.
    Failed(E),
}

/// Model of the single mask `<img>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedImage {
    source: Option<ImageSource>,
    issued: u64,
    newest_applied: Option<Ticket>,
}

impl DisplayedImage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current source, `None` until the first successful response.
    #[must_use]
    pub const fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    /// Reserve a ticket for a request that is about to be sent.
    pub const fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply the outcome of the request holding `ticket`.
    ///
    /// Successful responses always replace the source, stale or not.
    pub fn complete<E>(
        &mut self,
        ticket: Ticket,
        result: Result<ImageSource, E>,
    ) -> DisplayUpdate<E> {
        let next = match result {
            Ok(next) => next,
            Err(e) => return DisplayUpdate::Failed(e),
        };

        let freshness = match self.newest_applied {
            Some(newest) if newest > ticket => Freshness::Stale {
                superseded_by: newest,
            },
            _ => {
                self.newest_applied = Some(ticket);
                Freshness::Latest
            }
        };

        let src = next.src().to_owned();
        let revoke = match self.source.replace(next) {
            Some(ImageSource::ObjectUrl(old)) if old != src => Some(old),
            _ => None,
        };

        DisplayUpdate::Replaced {
            src,
            revoke,
            freshness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(n: u32) -> ImageSource {
        ImageSource::ObjectUrl(format!("blob:mask-{n}"))
    }

    #[test]
    fn success_replaces_source() {
        let mut image = DisplayedImage::new();
        let ticket = image.begin();
        let update = image.complete::<()>(ticket, Ok(blob(1)));
        assert_eq!(
            update,
            DisplayUpdate::Replaced {
                src: "blob:mask-1".into(),
                revoke: None,
                freshness: Freshness::Latest,
            }
        );
        assert_eq!(image.source(), Some(&blob(1)));
    }

    #[test]
    fn failure_leaves_image_unchanged_and_reports_once() {
        let mut image = DisplayedImage::new();
        let first = image.begin();
        image.complete::<&str>(first, Ok(blob(1)));
        let before = image.clone();

        let failed = image.begin();
        let update = image.complete(failed, Err("network error"));
        assert_eq!(update, DisplayUpdate::Failed("network error"));
        assert_eq!(image.source(), before.source());
    }

    #[test]
    fn replacing_object_url_revokes_previous() {
        let mut image = DisplayedImage::new();
        let a = image.begin();
        image.complete::<()>(a, Ok(blob(1)));
        let b = image.begin();
        let update = image.complete::<()>(b, Ok(blob(2)));
        assert!(matches!(
            update,
            DisplayUpdate::Replaced { revoke: Some(ref old), .. } if old == "blob:mask-1"
        ));
    }

    #[test]
    fn endpoint_sources_are_never_revoked() {
        let mut image = DisplayedImage::new();
        let a = image.begin();
        let endpoint = || ImageSource::Endpoint("/get_dilate_erode_mask/".into());
        image.complete::<()>(a, Ok(endpoint()));
        let b = image.begin();
        let update = image.complete::<()>(b, Ok(endpoint()));
        assert!(
            matches!(update, DisplayUpdate::Replaced { revoke: None, .. })
        );
    }

    // Known latent race: responses are not sequenced by issue order, so a
    // slow older response overwrites a newer image. Kept deliberately.
    #[test]
    fn stale_response_still_overwrites_newer_image() {
        let mut image = DisplayedImage::new();
        let older = image.begin();
        let newer = image.begin();

        image.complete::<()>(newer, Ok(blob(2)));
        let update = image.complete::<()>(older, Ok(blob(1)));

        assert!(matches!(
            update,
            DisplayUpdate::Replaced {
                freshness: Freshness::Stale { superseded_by },
                ..
            } if superseded_by == newer
        ));
        assert_eq!(image.source(), Some(&blob(1)), "last completion wins");
    }

    #[test]
    fn tickets_increase_in_issue_order() {
        let mut image = DisplayedImage::new();
        let a = image.begin();
        let b = image.begin();
        assert!(a < b);
        assert_eq!(b.get(), a.get() + 1);
    }
}
