//! BridgeRegistry: one virtual device per remote-provider token.
//!
//! A remote provider first opens a bridge under a token it chose, then sends
//! intents tagged with that token.  The registry owns every open
//! [`EventTranslator`] and routes each control-channel message to the right
//! one.  It is not internally synchronised; the control server shares it
//! behind a `tokio::sync::Mutex`.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use tvremote_core::{
    protocol::messages::{BridgeOpenFailedMessage, MessageType},
    BridgeMessage, BridgeToken, DeviceConfig,
};

use crate::application::translate_input::{EventTranslator, InputError};
use crate::application::virtual_device::{DeviceError, InjectionBackend, VirtualDevice};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no bridge is open for token {0}")]
    UnknownBridge(BridgeToken),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A reply-only message arrived on the inbound path.
    #[error("unexpected inbound message {0:?}")]
    UnexpectedMessage(MessageType),
}

/// Open bridges keyed by token.
pub struct BridgeRegistry {
    backend: Arc<dyn InjectionBackend>,
    bridges: HashMap<BridgeToken, EventTranslator>,
}

impl BridgeRegistry {
    pub fn new(backend: Arc<dyn InjectionBackend>) -> Self {
        Self {
            backend,
            bridges: HashMap::new(),
        }
    }

    /// Opens a device for `token`.
    ///
    /// Returns `Ok(false)` without touching the backend if the token already
    /// has a bridge.  An empty unique id is replaced by `tvremote:<token>`.
    pub fn open(&mut self, token: BridgeToken, mut config: DeviceConfig) -> Result<bool, DeviceError> {
        if self.bridges.contains_key(&token) {
            debug!(%token, "bridge already open");
            return Ok(false);
        }
        if config.unique_id.is_empty() {
            config.unique_id = format!("tvremote:{token}");
        }

        let device = VirtualDevice::open(self.backend.as_ref(), config)?;
        self.bridges.insert(token, EventTranslator::new(device));
        info!(%token, open = self.bridges.len(), "bridge opened");
        Ok(true)
    }

    /// Closes and forgets the bridge.  Returns `false` for unknown tokens.
    ///
    /// The bridge is removed even if device teardown reports an error.
    pub fn close(&mut self, token: BridgeToken) -> Result<bool, DeviceError> {
        let Some(translator) = self.bridges.remove(&token) else {
            return Ok(false);
        };
        info!(%token, "bridge closed");
        translator.close()?;
        Ok(true)
    }

    /// Closes every bridge, logging teardown failures.
    pub fn close_all(&mut self) {
        for (token, translator) in self.bridges.drain() {
            if let Err(e) = translator.close() {
                warn!(%token, "bridge teardown failed: {e}");
            }
        }
    }

    /// Runs `clear` on the token's translator.
    pub fn clear(&mut self, token: BridgeToken) -> Result<(), BridgeError> {
        self.translator(token)?.clear().map_err(BridgeError::from)
    }

    /// Direct access to a bridge's translator.
    pub fn translator(&mut self, token: BridgeToken) -> Result<&mut EventTranslator, BridgeError> {
        self.bridges
            .get_mut(&token)
            .ok_or(BridgeError::UnknownBridge(token))
    }

    pub fn is_open(&self, token: BridgeToken) -> bool {
        self.bridges.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// Routes one inbound control-channel message.
    ///
    /// Open failures are answered with `BridgeOpenFailed` rather than
    /// returned as errors, so the provider learns why.  Every other failure
    /// is returned to the caller, which logs it and keeps the session alive.
    pub fn dispatch(&mut self, message: &BridgeMessage) -> Result<Option<BridgeMessage>, BridgeError> {
        match message {
            BridgeMessage::OpenBridge(open) => {
                let token = open.token;
                let reply = match self.open(token, open.device_config()) {
                    Ok(_) => BridgeMessage::BridgeOpened { token },
                    Err(e) => {
                        warn!(%token, "bridge open failed: {e}");
                        BridgeMessage::BridgeOpenFailed(BridgeOpenFailedMessage {
                            token,
                            reason: e.to_string(),
                        })
                    }
                };
                Ok(Some(reply))
            }
            BridgeMessage::CloseBridge { token } => {
                if !self.close(*token)? {
                    debug!(%token, "close for unknown bridge ignored");
                }
                Ok(None)
            }
            BridgeMessage::ClearBridge { token } => self.clear(*token).map(|()| None),
            BridgeMessage::Ping(value) => Ok(Some(BridgeMessage::Pong(*value))),

            BridgeMessage::Timestamp(m) => {
                self.translator(m.token)?.timestamp(m.timestamp_ms)?;
                Ok(None)
            }
            BridgeMessage::Key(m) => {
                self.translator(m.token)?.key(m.key_code, m.down)?;
                Ok(None)
            }
            BridgeMessage::PointerDown(m) => {
                self.translator(m.token)?.contact_down(m.pointer_id, m.x, m.y)?;
                Ok(None)
            }
            BridgeMessage::PointerUp(m) => {
                self.translator(m.token)?.contact_up(m.pointer_id)?;
                Ok(None)
            }
            BridgeMessage::PointerSync { token } => {
                self.translator(*token)?.sync()?;
                Ok(None)
            }
            BridgeMessage::MouseButton(m) => {
                self.translator(m.token)?.mouse_button(m.button, m.down)?;
                Ok(None)
            }
            BridgeMessage::MouseMove(m) => {
                self.translator(m.token)?.mouse_move(m.dx, m.dy)?;
                Ok(None)
            }
            BridgeMessage::MouseWheel(m) => {
                self.translator(m.token)?.mouse_wheel(m.x, m.y)?;
                Ok(None)
            }
            BridgeMessage::AxisEvent(m) => {
                self.translator(m.token)?.axis(m.x, m.y, m.axis)?;
                Ok(None)
            }

            BridgeMessage::BridgeOpened { .. }
            | BridgeMessage::BridgeOpenFailed(_)
            | BridgeMessage::Pong(_) => Err(BridgeError::UnexpectedMessage(message.message_type())),
        }
    }
}

impl Drop for BridgeRegistry {
    fn drop(&mut self) {
        if !self.bridges.is_empty() {
            self.close_all();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::uinput::MockInjectionBackend;
    use tvremote_core::protocol::messages::{
        AxisEventMessage, KeyMessage, OpenBridgeMessage, PointerDownMessage,
    };
    use tvremote_core::{DeviceProfile, RawEvent};
    use uuid::Uuid;

    fn registry() -> (Arc<MockInjectionBackend>, BridgeRegistry) {
        let backend = Arc::new(MockInjectionBackend::new());
        let registry = BridgeRegistry::new(backend.clone());
        (backend, registry)
    }

    fn open_msg(token: Uuid, max_contacts: u16) -> BridgeMessage {
        BridgeMessage::OpenBridge(OpenBridgeMessage {
            token,
            name: "Remote".into(),
            unique_id: String::new(),
            width: 1280,
            height: 720,
            max_contacts,
            profile: DeviceProfile::Touchpad,
        })
    }

    #[test]
    fn test_open_is_idempotent_per_token() {
        // Arrange
        let (backend, mut reg) = registry();
        let token = Uuid::new_v4();

        // Act
        let first = reg.dispatch(&open_msg(token, 2)).unwrap();
        let second = reg.dispatch(&open_msg(token, 2)).unwrap();

        // Assert
        assert_eq!(first, Some(BridgeMessage::BridgeOpened { token }));
        assert_eq!(second, Some(BridgeMessage::BridgeOpened { token }));
        assert_eq!(backend.device_count(), 1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_empty_unique_id_defaults_to_token() {
        let (backend, mut reg) = registry();
        let token = Uuid::new_v4();

        reg.dispatch(&open_msg(token, 1)).unwrap();

        let phys = backend.device(0).unwrap().capabilities.phys;
        assert_eq!(phys, format!("tvremote:{token}"));
    }

    #[test]
    fn test_invalid_open_replies_with_failure() {
        let (backend, mut reg) = registry();
        let token = Uuid::new_v4();

        let reply = reg.dispatch(&open_msg(token, 0)).unwrap();

        assert!(matches!(
            reply,
            Some(BridgeMessage::BridgeOpenFailed(ref f)) if f.token == token && !f.reason.is_empty()
        ));
        assert_eq!(backend.device_count(), 0);
        assert!(!reg.is_open(token));
    }

    #[test]
    fn test_intents_route_to_their_own_bridge() {
        // Arrange
        let (backend, mut reg) = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        reg.dispatch(&open_msg(a, 2)).unwrap();
        reg.dispatch(&open_msg(b, 2)).unwrap();

        // Act
        reg.dispatch(&BridgeMessage::Key(KeyMessage {
            token: b,
            key_code: 19,
            down: true,
        }))
        .unwrap();
        reg.dispatch(&BridgeMessage::PointerSync { token: a }).unwrap();

        // Assert
        assert_eq!(backend.events(0), vec![RawEvent::sync()]);
        assert_eq!(backend.events(1), vec![RawEvent::key(103, true)]);
    }

    #[test]
    fn test_unknown_token_is_rejected_without_events() {
        let (backend, mut reg) = registry();
        reg.dispatch(&open_msg(Uuid::new_v4(), 1)).unwrap();
        let stranger = Uuid::new_v4();

        let result = reg.dispatch(&BridgeMessage::PointerDown(PointerDownMessage {
            token: stranger,
            pointer_id: 1,
            x: 0,
            y: 0,
        }));

        assert!(matches!(result, Err(BridgeError::UnknownBridge(t)) if t == stranger));
        assert!(backend.events(0).is_empty());
    }

    #[test]
    fn test_translator_errors_surface_through_dispatch() {
        let (_backend, mut reg) = registry();
        let token = Uuid::new_v4();
        reg.dispatch(&open_msg(token, 1)).unwrap();

        let result = reg.dispatch(&BridgeMessage::AxisEvent(AxisEventMessage {
            token,
            x: 0,
            y: 0,
            axis: 9,
        }));

        assert!(matches!(
            result,
            Err(BridgeError::Input(InputError::UnknownAxisGroup(9)))
        ));
    }

    #[test]
    fn test_close_destroys_and_unknown_close_is_noop() {
        let (backend, mut reg) = registry();
        let token = Uuid::new_v4();
        reg.dispatch(&open_msg(token, 1)).unwrap();

        assert!(reg.close(token).unwrap());
        assert!(!reg.close(token).unwrap());
        assert_eq!(backend.destroy_calls(0), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_ping_is_answered_with_same_value() {
        let (_backend, mut reg) = registry();
        assert_eq!(
            reg.dispatch(&BridgeMessage::Ping(77)).unwrap(),
            Some(BridgeMessage::Pong(77))
        );
    }

    #[test]
    fn test_reply_messages_are_rejected_inbound() {
        let (_backend, mut reg) = registry();
        let result = reg.dispatch(&BridgeMessage::Pong(1));
        assert!(matches!(
            result,
            Err(BridgeError::UnexpectedMessage(MessageType::Pong))
        ));
    }

    #[test]
    fn test_dropping_registry_closes_all_bridges() {
        let (backend, mut reg) = registry();
        reg.dispatch(&open_msg(Uuid::new_v4(), 1)).unwrap();
        reg.dispatch(&open_msg(Uuid::new_v4(), 1)).unwrap();

        drop(reg);

        assert_eq!(backend.live_devices(), 0);
    }
}
