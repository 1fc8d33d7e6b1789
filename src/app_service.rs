use crate::app_state::AppEvent;
use crate::commands::AppCommand;
use crate::export::ExportSink;
use crate::media::VideoPlayer;
use crate::storage::RecordStore;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub async fn refresh_count(store: &dyn RecordStore, tx: &mpsc::UnboundedSender<AppEvent>) {
    match store.count().await {
        Ok(n) => {
            let _ = tx.send(AppEvent::RecordCount(n));
        }
        Err(e) => {
            warn!("统计记录数失败: {}", e);
            let _ = tx.send(AppEvent::Error(format!("⚠ Cannot count responses: {}", e)));
        }
    }
}

/// 后台单 actor：串行处理存储、导出与视频播放命令
pub fn spawn_command_actor(
    store: Arc<dyn RecordStore>,
    sink: Arc<ExportSink>,
    player: VideoPlayer,
    mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // 当前播放任务，离开视频页时中止
        let mut playback: Option<JoinHandle<()>> = None;

        while let Some(cmd) = cmd_rx.recv().await {
            info!("命令: {}", cmd.name());
            match cmd {
                AppCommand::Persist(response) => {
                    // 写入期间不处理下一条命令，UI 侧已置忙
                    crate::commands::submit::run(response, store.as_ref(), evt_tx.clone()).await;
                }
                AppCommand::Export { passphrase } => {
                    let sink = sink.clone();
                    let store = store.clone();
                    let tx = evt_tx.clone();
                    tokio::spawn(async move {
                        crate::commands::export::run(&passphrase, &sink, store.as_ref(), tx).await;
                    });
                }
                AppCommand::PlayVideo => {
                    if let Some(handle) = playback.take() {
                        handle.abort();
                    }
                    let tx = evt_tx.clone();
                    playback = Some(player.play(move |signal| {
                        let _ = tx.send(AppEvent::Media(signal));
                    }));
                }
                AppCommand::StopVideo => {
                    if let Some(handle) = playback.take() {
                        handle.abort();
                    }
                }
                AppCommand::RefreshCount => {
                    refresh_count(store.as_ref(), &evt_tx).await;
                }
                AppCommand::Quit => {
                    if let Some(handle) = playback.take() {
                        handle.abort();
                    }
                    break;
                }
            }
        }
        info!("命令 actor 退出");
    })
}
