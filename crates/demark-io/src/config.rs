//! Reading [`ControllerConfig`] from the page.

use demark_control::ControlError;
use demark_control::ControllerConfig;
use demark_control::config::CONFIG_ELEMENT_ID;

/// Load the configuration embedded in `#demark-config`.
///
/// A page without the element gets [`ControllerConfig::default`].
///
/// # Errors
///
/// Returns [`ControlError::InvalidConfig`] if the element's text is not
/// a valid configuration.
pub fn load(document: &web_sys::Document) -> Result<ControllerConfig, ControlError> {
    document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .map_or_else(
            || Ok(ControllerConfig::default()),
            |element| ControllerConfig::from_json(&element.text_content().unwrap_or_default()),
        )
}
