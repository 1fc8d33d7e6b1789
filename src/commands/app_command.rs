use crate::kiosk::NewSurveyResponse;

/// UI 线程发往后台 actor 的命令
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// 写入一份已通过校验的问卷
    Persist(NewSurveyResponse),
    Export {
        passphrase: String,
    },
    PlayVideo,
    StopVideo,
    RefreshCount,
    Quit,
}

impl AppCommand {
    pub fn name(&self) -> &'static str {
        match self {
            AppCommand::Persist(_) => "persist",
            AppCommand::Export { .. } => "export",
            AppCommand::PlayVideo => "play-video",
            AppCommand::StopVideo => "stop-video",
            AppCommand::RefreshCount => "refresh-count",
            AppCommand::Quit => "quit",
        }
    }
}
