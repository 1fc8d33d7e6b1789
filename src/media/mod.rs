use log::{info, warn};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// 宣传视频只通过结束/失败两种信号与控制器交互
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSignal {
    Ended,
    Failed(String),
}

#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("video asset not found: {0}")]
    Missing(PathBuf),
    #[error("cannot start player: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("player exited with {0}")]
    Exit(std::process::ExitStatus),
}

#[derive(Debug, Clone)]
pub struct VideoPlayer {
    path: PathBuf,
    // 外部播放器命令，如 ["mpv", "--fs"]；为空时按固定时长模拟播放
    command: Vec<String>,
    simulated: Duration,
}

impl VideoPlayer {
    pub fn new(path: impl Into<PathBuf>, command: Vec<String>, simulated: Duration) -> Self {
        Self {
            path: path.into(),
            command,
            simulated,
        }
    }

    /// 后台播放，结束后把信号交给 on_signal；abort 句柄即终止播放
    pub fn play<F>(&self, on_signal: F) -> JoinHandle<()>
    where
        F: FnOnce(MediaSignal) + Send + 'static,
    {
        let player = self.clone();
        tokio::spawn(async move {
            let signal = match player.run().await {
                Ok(()) => MediaSignal::Ended,
                Err(e) => {
                    warn!("视频播放失败: {}", e);
                    MediaSignal::Failed(e.to_string())
                }
            };
            on_signal(signal);
        })
    }

    async fn run(&self) -> Result<(), MediaError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(MediaError::Missing(self.path.clone()));
        }

        let Some((program, args)) = self.command.split_first() else {
            info!("模拟播放 {} ({:?})", self.path.display(), self.simulated);
            sleep(self.simulated).await;
            return Ok(());
        };

        info!("启动播放器: {} {}", program, self.path.display());
        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::Exit(status))
        }
    }
}

pub fn parse_player_command(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
