//! Wiring from process signals and the run timeout to the cancellation token.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancels `token` on Ctrl-C or SIGTERM.
pub(super) fn cancel_on_shutdown(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            () = shutdown_signal() => {
                tracing::warn!("received shutdown signal, cancelling run");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    });
}

/// Cancels `token` after `secs` seconds. `0` disables the timeout.
pub(super) fn cancel_after(token: CancellationToken, secs: u64) {
    if secs == 0 {
        return;
    }
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(secs)) => {
                tracing::warn!(timeout_secs = secs, "run timeout reached, cancelling run");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
