//! WebSocket transport for the progress channel.
//!
//! Frames are decoded by [`ProgressChannel`]; this module only moves
//! text between the socket and the channel and writes progress values
//! into the `<progress>` element. There is no reconnect: the channel
//! lives and dies with the page.
//!
//! The server must accept WebSocket connections on its Socket.IO path.
//! There is no long-polling fallback; a refused upgrade is logged with
//! the close code and a hint.

use std::cell::RefCell;
use std::rc::Rc;

use demark_control::progress::socket_url;
use demark_control::{ChannelAction, ControllerConfig, ProgressChannel};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, HtmlProgressElement, MessageEvent, WebSocket};

use crate::dom::DomError;

/// An open progress WebSocket and the handlers attached to it.
///
/// Dropping it closes the socket.
pub struct ProgressSocket {
    socket: WebSocket,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
}

impl ProgressSocket {
    /// Connect to the Socket.IO endpoint on the page's own host.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::JsError`] if the location cannot be read or
    /// the WebSocket cannot be created.
    pub fn open(
        config: &ControllerConfig,
        indicator: HtmlProgressElement,
    ) -> Result<Self, DomError> {
        let location = web_sys::window().ok_or(DomError::NoWindow)?.location();
        let secure = location.protocol()? == "https:";
        let url = socket_url(secure, &location.host()?, &config.socket_path);

        let socket = WebSocket::new(&url)?;
        log::debug!("progress channel connecting to {url}");

        let channel = Rc::new(RefCell::new(ProgressChannel::new(
            config.progress_event.clone(),
        )));
        let close_channel = Rc::clone(&channel);
        let reply_socket = socket.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(frame) = event.data().as_string() else {
                log::debug!("ignoring binary progress frame");
                return;
            };
            let action = channel.borrow_mut().on_frame(&frame);
            match action {
                Ok(ChannelAction::Send(reply)) => {
                    if let Err(e) = reply_socket.send_with_str(reply) {
                        log::error!("progress channel send failed: {e:?}");
                    }
                }
                Ok(ChannelAction::Progress(value)) => indicator.set_value(value),
                Ok(ChannelAction::Connected) => log::info!("progress channel connected"),
                Ok(ChannelAction::Disconnected) => log::info!("progress channel disconnected"),
                Ok(ChannelAction::Rejected(message)) => {
                    log::error!("progress channel refused: {message}");
                }
                Ok(ChannelAction::Ignored) => {}
                Err(e) => log::warn!("{e}"),
            }
        });

        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            match close_channel.borrow().close_hint() {
                Some(hint) => log::error!(
                    "progress channel closed before the handshake (code {}): {hint}",
                    event.code()
                ),
                None => log::info!(
                    "progress channel closed (code {}, {:?})",
                    event.code(),
                    event.reason()
                ),
            }
        });

        let onerror = Closure::<dyn FnMut(Event)>::new(|_: Event| {
            log::error!("progress channel error");
        });

        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(Self {
            socket,
            _onmessage: onmessage,
            _onclose: onclose,
            _onerror: onerror,
        })
    }
}

impl Drop for ProgressSocket {
    fn drop(&mut self) {
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        self.socket.set_onerror(None);
        let _ = self.socket.close();
    }
}
