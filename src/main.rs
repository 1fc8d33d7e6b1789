mod app_service;
mod app_state;
mod commands;
mod config;
mod export;
mod kiosk;
mod media;
mod storage;
mod ui;

use anyhow::Context;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::app_service::spawn_command_actor;
use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::KioskConfig;
use crate::export::ExportSink;
use crate::kiosk::{KioskController, TimerFired};
use crate::media::VideoPlayer;
use crate::storage::{RecordStore, SqliteRecordStore};
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join(format!("kiosk-{}.log", ts)))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Warn)
        .filter_module("expokiosk", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .init();

    let (config, mut startup_notes) = KioskConfig::from_env();
    info!("配置: {:?}", config);

    let db = storage::establish_connection(&config.database_url)
        .await
        .with_context(|| format!("数据库连接失败: {}", config.database_url))?;
    startup_notes.push("✓ 数据库连接成功".to_string());
    let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::new(Arc::new(db)));

    // 导出目录在后台准备，未就绪前导出返回 NotReady
    let sink = Arc::new(ExportSink::new(
        store.clone(),
        &config.export_dir,
        config.export_passphrase.clone(),
    ));
    {
        let sink = sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.prepare().await {
                error!("导出目录不可用: {}", e);
            }
        });
    }

    let player = VideoPlayer::new(
        &config.video_path,
        config.video_player.clone(),
        Duration::from_secs(config.video_secs),
    );

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (timer_tx, timer_rx) = mpsc::unbounded_channel::<TimerFired>();

    let actor = spawn_command_actor(store, sink, player, cmd_rx, evt_tx);

    // TUI 初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let controller = KioskController::new(config.timings, timer_tx);
    let mut app = App::new(controller, startup_notes, cmd_tx.clone(), evt_rx);

    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx, timer_rx).await,
        None => Ok(()),
    };

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let _ = cmd_tx.send(AppCommand::Quit);
    let _ = actor.await;
    info!("应用退出");

    res.context("界面循环异常退出")
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    mut timer_rx: mpsc::UnboundedReceiver<TimerFired>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.apply_event(event);
        }
        while let Ok(fired) = timer_rx.try_recv() {
            app.apply_timer(fired);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key) {
                    return Ok(());
                }
            }
        }
    }
}
