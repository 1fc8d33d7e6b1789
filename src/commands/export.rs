use crate::app_state::AppEvent;
use crate::export::{ExportSink, ExportStatus};
use crate::storage::RecordStore;
use tokio::sync::mpsc;

pub async fn run(
    passphrase: &str,
    sink: &ExportSink,
    store: &dyn RecordStore,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    let status = sink.export_all(passphrase).await;
    let succeeded = matches!(status, ExportStatus::Success { .. });
    let _ = evt_tx.send(AppEvent::Log(status.message()));
    let _ = evt_tx.send(AppEvent::Export(status));

    if succeeded {
        crate::app_service::refresh_count(store, &evt_tx).await;
    }
}
