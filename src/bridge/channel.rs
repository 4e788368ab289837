use log::{debug, error};
use serde::Deserialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::{ShellError, ShellResult};
use crate::host::MainThread;

/// Messages page script can send to native code
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeMessage {
    /// Save `url` as `filename` through the download dispatcher.
    DownloadImage { url: String, filename: String },
}

/// Sending half, shared with command handlers on any thread.
#[derive(Debug, Clone)]
pub struct BridgeSender {
    tx: UnboundedSender<BridgeMessage>,
}

impl BridgeSender {
    pub fn send(&self, message: BridgeMessage) -> ShellResult<()> {
        self.tx.send(message).map_err(|_| ShellError::BridgeClosed)
    }
}

#[derive(Debug)]
pub struct BridgeReceiver {
    rx: UnboundedReceiver<BridgeMessage>,
}

impl BridgeReceiver {
    pub async fn recv(&mut self) -> Option<BridgeMessage> {
        self.rx.recv().await
    }
}

pub fn bridge_channel() -> (BridgeSender, BridgeReceiver) {
    let (tx, rx) = unbounded_channel();
    (BridgeSender { tx }, BridgeReceiver { rx })
}

/// Forward every inbound message to `handler` on the UI thread.
///
/// Returns once all senders are dropped.
pub async fn pump<M, F>(mut receiver: BridgeReceiver, main_thread: M, handler: F)
where
    M: MainThread,
    F: Fn(BridgeMessage) + Clone + Send + 'static,
{
    while let Some(message) = receiver.recv().await {
        debug!("Bridge: {:?}", message);
        let handler = handler.clone();
        if let Err(e) = main_thread.post(Box::new(move || handler(message))) {
            error!("Bridge: failed to reach the UI thread: {}", e);
        }
    }
    debug!("Bridge: channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// Runs tasks inline and counts posts.
    #[derive(Clone, Default)]
    struct InlineMainThread {
        posts: Arc<Mutex<usize>>,
    }

    impl MainThread for InlineMainThread {
        fn post(&self, task: Box<dyn FnOnce() + Send + 'static>) -> ShellResult<()> {
            *self.posts.lock().unwrap() += 1;
            task();
            Ok(())
        }
    }

    fn download(n: u32) -> BridgeMessage {
        BridgeMessage::DownloadImage {
            url: format!("https://res.cloudinary.com/x/{n}.jpg"),
            filename: format!("{n}.jpg"),
        }
    }

    #[test]
    fn send_fails_once_receiver_is_gone() {
        let (tx, rx) = bridge_channel();
        drop(rx);
        assert!(matches!(tx.send(download(1)), Err(ShellError::BridgeClosed)));
    }

    #[tokio::test]
    async fn pump_posts_each_message_from_other_threads() {
        let (tx, rx) = bridge_channel();
        let main_thread = InlineMainThread::default();
        let handled: Arc<Mutex<Vec<BridgeMessage>>> = Arc::default();

        let producer = {
            let tx = tx.clone();
            thread::spawn(move || {
                for n in 0..3 {
                    tx.send(download(n)).unwrap();
                }
            })
        };
        producer.join().unwrap();
        drop(tx);

        let sink = handled.clone();
        pump(rx, main_thread.clone(), move |message| {
            sink.lock().unwrap().push(message);
        })
        .await;

        assert_eq!(
            *handled.lock().unwrap(),
            vec![download(0), download(1), download(2)]
        );
        assert_eq!(*main_thread.posts.lock().unwrap(), 3);
    }

    #[test]
    fn deserializes_tagged_payload() {
        let message: BridgeMessage = serde_json::from_str(
            r#"{"type":"downloadImage","url":"https://res.cloudinary.com/a.jpg","filename":"a.jpg"}"#,
        )
        .unwrap();
        assert_eq!(
            message,
            BridgeMessage::DownloadImage {
                url: "https://res.cloudinary.com/a.jpg".to_string(),
                filename: "a.jpg".to_string(),
            }
        );
    }
}
