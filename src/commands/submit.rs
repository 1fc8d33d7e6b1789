use crate::app_state::AppEvent;
use crate::kiosk::NewSurveyResponse;
use crate::storage::RecordStore;
use log::{error, info};
use tokio::sync::mpsc;

pub async fn run(
    response: NewSurveyResponse,
    store: &dyn RecordStore,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    let result = store.insert(response).await;
    match &result {
        Ok(stored) => {
            info!("✓ 问卷已入库 [ID: {}]", stored.id);
            let _ = evt_tx.send(AppEvent::Log(format!("✓ Response #{} saved", stored.id)));
        }
        Err(e) => {
            error!("✗ 问卷入库失败: {}", e);
            let _ = evt_tx.send(AppEvent::Error(format!("✗ Save failed: {}", e)));
        }
    }
    let _ = evt_tx.send(AppEvent::Persisted(result));
}
