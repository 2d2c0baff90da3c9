//! Does all communication related stuff with the web sockets. Uses ewebsock, which works natively and in the browser.

use crate::traits::{Transport, TransportEvent, TransportFactory};
use ewebsock::WsEvent::{Closed, Error, Message, Opened};
use ewebsock::{WsMessage, WsReceiver, WsSender};

/// A live web socket link to the authority. Dropping it drops sender and receiver, which closes the socket.
pub struct WebSocketTransport {
    sender: WsSender,
    receiver: WsReceiver,
}

impl Transport for WebSocketTransport {
    fn send(&mut self, frame: String) {
        self.sender.send(WsMessage::Text(frame));
    }

    fn poll(&mut self) -> Option<TransportEvent> {
        loop {
            match self.receiver.try_recv()? {
                Opened => return Some(TransportEvent::Opened),
                Message(WsMessage::Text(text)) => return Some(TransportEvent::Text(text)),
                Message(WsMessage::Binary(data)) => {
                    tracing::warn!(len = data.len(), "Ignoring binary frame from authority.");
                }
                Message(_) => {} // Pings, pongs and unknown frames carry nothing for us.
                Closed => {
                    return Some(TransportEvent::Closed(
                        "Connection closed by server".to_string(),
                    ));
                }
                Error(context) => return Some(TransportEvent::Error(context)),
            }
        }
    }
}

/// Opens [`WebSocketTransport`] links.
#[derive(Default)]
pub struct WebSocketFactory {
    options: ewebsock::Options,
}

impl TransportFactory for WebSocketFactory {
    type Link = WebSocketTransport;

    fn open(&mut self, endpoint: &str) -> Result<WebSocketTransport, String> {
        let (sender, receiver) = ewebsock::connect(endpoint, self.options.clone())
            .map_err(|e| format!("Could not reach websocket api: {e}"))?;
        Ok(WebSocketTransport { sender, receiver })
    }
}
