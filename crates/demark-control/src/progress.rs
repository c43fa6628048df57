//! Progress push channel: Socket.IO v5 over Engine.IO v4 text frames.
//!
//! The server announces background-task progress as Socket.IO events
//! named `progress_update` with a `{"progress": <number>}` payload.
//! [`ProgressChannel`] consumes raw WebSocket text frames and tells
//! the caller what to send back and which progress values arrived.
//!
//! Only the default namespace `/` is joined. Packets addressed to any
//! other namespace are ignored.
//!
//! Only the WebSocket transport is spoken, without the HTTP long-polling
//! fallback. A Flask-SocketIO server therefore needs WebSocket support
//! (`simple-websocket` installed, or an eventlet/gevent async mode);
//! otherwise the upgrade is refused and the socket closes before the
//! handshake. [`ProgressChannel::close_hint`] reports that case.
//!
//! Frame layout (text only; binary attachments are not used here):
//!
//! ```text
//! Engine.IO:  <type digit><data>
//!             0 open  1 close  2 ping  3 pong  4 message  5 upgrade  6 noop
//! Socket.IO:  (inside an Engine.IO message)
//!             <type digit>[/<namespace>,][<ack id>][<json>]
//!             0 connect  1 disconnect  2 event  3 ack  4 connect error
//! ```

use serde::Deserialize;

use crate::error::ControlError;

/// Engine.IO protocol revision spoken by the server.
pub const ENGINE_IO_VERSION: u8 = 4;

/// Socket.IO namespace the page listens on.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Build the WebSocket URL of the push channel.
///
/// `secure` selects `wss:`; `host` includes the port if any.
#[must_use]
pub fn socket_url(secure: bool, host: &str, path: &str) -> String {
    let scheme = if secure { "wss" } else { "ws" };
    format!("{scheme}://{host}{path}?EIO={ENGINE_IO_VERSION}&transport=websocket")
}

/// A decoded Engine.IO packet borrowing its data from the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePacket<'a> {
    /// Handshake; data is the JSON session description.
    Open(&'a str),
    Close,
    Ping(&'a str),
    Pong(&'a str),
    /// Carries a Socket.IO packet.
    Message(&'a str),
    Upgrade,
    Noop,
}

impl<'a> EnginePacket<'a> {
    /// # Errors
    ///
    /// Returns [`ControlError::Protocol`] for empty frames and unknown
    /// packet types.
    pub fn decode(frame: &'a str) -> Result<Self, ControlError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ControlError::Protocol("empty frame".into()))?;
        let data = chars.as_str();
        match kind {
            '0' => Ok(Self::Open(data)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(data)),
            '3' => Ok(Self::Pong(data)),
            '4' => Ok(Self::Message(data)),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ControlError::Protocol(format!(
                "unknown Engine.IO packet type {other:?}"
            ))),
        }
    }
}

/// A decoded Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect,
    Disconnect,
    Event {
        name: String,
        payload: serde_json::Value,
    },
    ConnectError(String),
    /// Acks and binary packets; nothing on this page uses them.
    Other(u8),
}

/// A Socket.IO packet and the namespace it is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketMessage<'a> {
    /// [`DEFAULT_NAMESPACE`] when the packet names none.
    pub namespace: &'a str,
    pub packet: SocketPacket,
}

impl SocketPacket {
    /// Decode the body of an Engine.IO message.
    ///
    /// Ack ids are accepted and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Protocol`] for empty bodies, unknown
    /// types and event data that is not a JSON array starting with a
    /// string name.
    pub fn decode(body: &str) -> Result<SocketMessage<'_>, ControlError> {
        let kind = body
            .bytes()
            .next()
            .filter(u8::is_ascii_digit)
            .ok_or_else(|| ControlError::Protocol(format!("bad Socket.IO packet {body:?}")))?
            - b'0';
        let rest = &body[1..];

        let (namespace, rest) = if rest.starts_with('/') {
            rest.split_once(',').unwrap_or((rest, ""))
        } else {
            (DEFAULT_NAMESPACE, rest)
        };
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());

        let packet = match kind {
            0 => Self::Connect,
            1 => Self::Disconnect,
            2 => decode_event(rest)?,
            4 => Self::ConnectError(connect_error_message(rest)),
            3 | 5 | 6 => Self::Other(kind),
            other => {
                return Err(ControlError::Protocol(format!(
                    "unknown Socket.IO packet type {other}"
                )));
            }
        };
        Ok(SocketMessage { namespace, packet })
    }
}

fn decode_event(data: &str) -> Result<SocketPacket, ControlError> {
    let mut args: Vec<serde_json::Value> = serde_json::from_str(data)
        .map_err(|e| ControlError::Protocol(format!("event data is not a JSON array: {e}")))?;
    if args.is_empty() {
        return Err(ControlError::Protocol("event without a name".into()));
    }
    let payload = if args.len() > 1 {
        args.swap_remove(1)
    } else {
        serde_json::Value::Null
    };
    match args.swap_remove(0) {
        serde_json::Value::String(name) => Ok(SocketPacket::Event { name, payload }),
        other => Err(ControlError::Protocol(format!(
            "event name is not a string: {other}"
        ))),
    }
}

fn connect_error_message(data: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorData {
        message: String,
    }

    serde_json::from_str::<ErrorData>(data)
        .map(|d| d.message)
        .or_else(|_| serde_json::from_str::<String>(data))
        .unwrap_or_else(|_| data.to_owned())
}

/// Payload of a `progress_update` event.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProgressUpdate {
    pub progress: f64,
}

/// What the caller should do after feeding a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelAction {
    /// Write this text frame back to the socket.
    Send(&'static str),
    /// The namespace connection was accepted.
    Connected,
    /// Set the progress indicator to this value.
    Progress(f64),
    /// The server closed the session or the namespace.
    Disconnected,
    /// The server refused the namespace connection.
    Rejected(String),
    /// Valid but irrelevant traffic.
    Ignored,
}

/// Socket.IO client state for the progress channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChannel {
    event: String,
    opened: bool,
    connected: bool,
}

impl ProgressChannel {
    /// Listen for events named `event`.
    #[must_use]
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            opened: false,
            connected: false,
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Explanation for a socket that closed before the Engine.IO
    /// handshake, or `None` once the server has opened a session.
    #[must_use]
    pub const fn close_hint(&self) -> Option<&'static str> {
        if self.opened {
            None
        } else {
            Some(
                "the server refused the WebSocket transport; Flask-SocketIO needs \
                 simple-websocket installed or an eventlet/gevent async mode",
            )
        }
    }

    /// Consume one text frame from the WebSocket.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Protocol`] for frames that cannot be
    /// decoded, including `progress_update` events without a numeric
    /// `progress` field. The channel state is unchanged on error.
    pub fn on_frame(&mut self, frame: &str) -> Result<ChannelAction, ControlError> {
        match EnginePacket::decode(frame)? {
            // The default namespace must be joined explicitly in v5.
            EnginePacket::Open(_) => {
                self.opened = true;
                Ok(ChannelAction::Send("40"))
            }
            EnginePacket::Ping(_) => Ok(ChannelAction::Send("3")),
            EnginePacket::Close => {
                self.connected = false;
                Ok(ChannelAction::Disconnected)
            }
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
                Ok(ChannelAction::Ignored)
            }
            EnginePacket::Message(body) => self.on_message(body),
        }
    }

    fn on_message(&mut self, body: &str) -> Result<ChannelAction, ControlError> {
        let message = SocketPacket::decode(body)?;
        if message.namespace != DEFAULT_NAMESPACE {
            return Ok(ChannelAction::Ignored);
        }
        match message.packet {
            SocketPacket::Connect => {
                self.connected = true;
                Ok(ChannelAction::Connected)
            }
            SocketPacket::Disconnect => {
                self.connected = false;
                Ok(ChannelAction::Disconnected)
            }
            SocketPacket::ConnectError(message) => {
                self.connected = false;
                Ok(ChannelAction::Rejected(message))
            }
            SocketPacket::Event { name, payload } if name == self.event => {
                let update: ProgressUpdate = serde_json::from_value(payload).map_err(|e| {
                    ControlError::Protocol(format!("bad {name} payload: {e}"))
                })?;
                Ok(ChannelAction::Progress(update.progress))
            }
            SocketPacket::Event { .. } | SocketPacket::Other(_) => Ok(ChannelAction::Ignored),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn channel() -> ProgressChannel {
        ProgressChannel::new("progress_update")
    }

    #[test]
    fn socket_url_matches_scheme() {
        assert_eq!(
            socket_url(false, "localhost:5000", "/socket.io/"),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        let secure = socket_url(true, "example.org", "/socket.io/");
        assert!(secure.starts_with("wss://example.org/"));
    }

    #[test]
    fn handshake_joins_default_namespace() {
        let mut ch = channel();
        let open = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;
        assert_eq!(ch.on_frame(open).unwrap(), ChannelAction::Send("40"));
        assert!(!ch.is_connected());
        assert_eq!(
            ch.on_frame(r#"40{"sid":"xyz"}"#).unwrap(),
            ChannelAction::Connected
        );
        assert!(ch.is_connected());
    }

    #[test]
    fn ping_is_answered_with_pong() {
        let mut ch = channel();
        assert_eq!(ch.on_frame("2").unwrap(), ChannelAction::Send("3"));
    }

    #[test]
    fn progress_event_yields_value() {
        let mut ch = channel();
        let action = ch
            .on_frame(r#"42["progress_update",{"progress":40}]"#)
            .unwrap();
        assert_eq!(action, ChannelAction::Progress(40.0));
    }

    #[test]
    fn ack_id_is_skipped() {
        let mut ch = channel();
        let action = ch
            .on_frame(r#"4217["progress_update",{"progress":12.5}]"#)
            .unwrap();
        assert_eq!(action, ChannelAction::Progress(12.5));
    }

    #[test]
    fn explicit_default_namespace_is_accepted() {
        let mut ch = channel();
        let action = ch
            .on_frame(r#"42/,["progress_update",{"progress":3}]"#)
            .unwrap();
        assert_eq!(action, ChannelAction::Progress(3.0));
    }

    #[test]
    fn other_namespaces_are_ignored() {
        let mut ch = channel();
        assert_eq!(
            ch.on_frame(r#"40/admin,{"sid":"a"}"#).unwrap(),
            ChannelAction::Ignored
        );
        assert!(
            !ch.is_connected(),
            "joining /admin must not connect the page"
        );

        let action = ch
            .on_frame(r#"42/tasks,17["progress_update",{"progress":12.5}]"#)
            .unwrap();
        assert_eq!(action, ChannelAction::Ignored);

        ch.on_frame("40").unwrap();
        assert_eq!(ch.on_frame("41/admin").unwrap(), ChannelAction::Ignored);
        assert!(ch.is_connected());
    }

    #[test]
    fn namespace_is_reported() {
        let message = SocketPacket::decode(r#"2/tasks,["x"]"#).unwrap();
        assert_eq!(message.namespace, "/tasks");
        assert_eq!(
            SocketPacket::decode("0").unwrap().namespace,
            DEFAULT_NAMESPACE
        );
    }

    #[test]
    fn close_before_handshake_gets_a_hint() {
        let mut ch = channel();
        assert!(ch.close_hint().is_some());
        ch.on_frame(r#"0{"sid":"abc"}"#).unwrap();
        assert_eq!(ch.close_hint(), None);
    }

    #[test]
    fn other_events_are_ignored() {
        let mut ch = channel();
        assert_eq!(
            ch.on_frame(r#"42["status",{"progress":99}]"#).unwrap(),
            ChannelAction::Ignored
        );
    }

    #[test]
    fn non_numeric_progress_is_an_error() {
        let mut ch = channel();
        let err = ch
            .on_frame(r#"42["progress_update",{"progress":"half"}]"#)
            .unwrap_err();
        assert!(matches!(err, ControlError::Protocol(_)));
        let err = ch.on_frame(r#"42["progress_update"]"#).unwrap_err();
        assert!(matches!(err, ControlError::Protocol(_)));
    }

    #[test]
    fn disconnects_clear_connected_flag() {
        let mut ch = channel();
        ch.on_frame("40").unwrap();
        assert_eq!(ch.on_frame("41").unwrap(), ChannelAction::Disconnected);
        assert!(!ch.is_connected());

        ch.on_frame("40").unwrap();
        assert_eq!(ch.on_frame("1").unwrap(), ChannelAction::Disconnected);
        assert!(!ch.is_connected());
    }

    #[test]
    fn connect_error_carries_message() {
        let mut ch = channel();
        assert_eq!(
            ch.on_frame(r#"44{"message":"Not authorized"}"#).unwrap(),
            ChannelAction::Rejected("Not authorized".into())
        );
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let mut ch = channel();
        for frame in ["", "9", "4", "4x", "42not json", "42[]", "42[7,{}]"] {
            assert!(ch.on_frame(frame).is_err(), "frame {frame:?} should fail");
        }
    }

    #[test]
    fn engine_packet_decoding() {
        assert_eq!(
            EnginePacket::decode("3probe").unwrap(),
            EnginePacket::Pong("probe")
        );
        assert_eq!(EnginePacket::decode("6").unwrap(), EnginePacket::Noop);
        assert_eq!(
            EnginePacket::decode("4abc").unwrap(),
            EnginePacket::Message("abc")
        );
    }
}
