use tokio::sync::watch;
use tracing::info;

/// Watches for ctrl-c and fans the signal out to anyone holding a handle.
pub struct ShutdownHandler {
    rx: watch::Receiver<bool>,
}

impl ShutdownHandler {
    /// Install the signal listener on the current runtime.
    pub fn install() -> Self {
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
                let _ = tx.send(true);
            }
        });

        Self { rx }
    }

    /// Resolve once shutdown has been requested.
    pub async fn wait(mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                break;
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }
}
