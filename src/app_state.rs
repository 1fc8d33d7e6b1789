use crate::commands::AppCommand;
use crate::export::ExportStatus;
use crate::kiosk::questions::{rating_factors, QuestionKind, CONTACT_FIELDS, FOLLOWUP_YES, QUESTIONS};
use crate::kiosk::{
    KioskController, MultiKey, PartnerFactor, Rating, Screen, SingleKey, StoredResponse,
    SurveyForm, TimerFired,
};
use crate::media::MediaSignal;
use crate::storage::StoreError;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio::time::Instant;

const MAX_LOG_LINES: usize = 200;

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    AdminPrompt,
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Error(String),
    Persisted(Result<StoredResponse, StoreError>),
    Media(MediaSignal),
    Export(ExportStatus),
    RecordCount(u64),
}

/// 问卷页上可获得焦点的条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyItem {
    Multi { key: MultiKey, option: &'static str },
    Single { key: SingleKey, option: &'static str },
    Rating(PartnerFactor),
    Text(SingleKey, &'static str),
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyLine {
    Header(&'static str),
    Item(SurveyItem),
}

/// 按当前答案展开问卷：联系信息只在选择跟进时插在 Yes 选项之后
pub fn survey_layout(form: &SurveyForm) -> Vec<SurveyLine> {
    let mut lines = Vec::new();
    for q in QUESTIONS {
        lines.push(SurveyLine::Header(q.title));
        match q.kind {
            QuestionKind::Multi(key) => {
                for option in q.options {
                    lines.push(SurveyLine::Item(SurveyItem::Multi { key, option }));
                }
            }
            QuestionKind::Single(key) => {
                for option in q.options {
                    lines.push(SurveyLine::Item(SurveyItem::Single { key, option }));
                    if key == SingleKey::Followup && *option == FOLLOWUP_YES && form.wants_followup()
                    {
                        for (field, label) in CONTACT_FIELDS {
                            lines.push(SurveyLine::Item(SurveyItem::Text(*field, label)));
                        }
                    }
                }
            }
            QuestionKind::Ratings => {
                for factor in rating_factors() {
                    lines.push(SurveyLine::Item(SurveyItem::Rating(*factor)));
                }
            }
        }
    }
    lines.push(SurveyLine::Item(SurveyItem::Submit));
    lines
}

fn survey_items(form: &SurveyForm) -> Vec<SurveyItem> {
    survey_layout(form)
        .into_iter()
        .filter_map(|line| match line {
            SurveyLine::Item(item) => Some(item),
            SurveyLine::Header(_) => None,
        })
        .collect()
}

pub struct App {
    pub controller: KioskController,
    pub input_mode: InputMode,
    pub survey_cursor: usize,
    pub admin_input: String,
    pub admin_status: Option<String>,
    pub record_count: Option<u64>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        controller: KioskController,
        startup_notes: Vec<String>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["Kiosk started".to_string()];
        log_messages.extend(startup_notes);

        App {
            controller,
            input_mode: InputMode::Normal,
            survey_cursor: 0,
            admin_input: String::new(),
            admin_status: None,
            record_count: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_LINES {
            let overflow = self.log_messages.len() - MAX_LOG_LINES;
            self.log_messages.drain(..overflow);
        }
    }

    pub fn current_item(&self) -> Option<SurveyItem> {
        survey_items(self.controller.form())
            .get(self.survey_cursor)
            .copied()
    }

    /// 调用控制器并根据屏幕变化驱动播放器与焦点
    fn observe<R>(&mut self, f: impl FnOnce(&mut KioskController) -> R) -> R {
        let before = self.controller.screen();
        let out = f(&mut self.controller);
        let after = self.controller.screen();
        if before != after {
            self.on_transition(before, after);
        }
        out
    }

    fn on_transition(&mut self, from: Screen, to: Screen) {
        if from == Screen::Video {
            let _ = self.cmd_tx.send(AppCommand::StopVideo);
        }
        if from == Screen::Start {
            self.close_admin_prompt();
        }
        match to {
            Screen::Video => {
                let _ = self.cmd_tx.send(AppCommand::PlayVideo);
            }
            Screen::Survey => self.survey_cursor = 0,
            Screen::Start | Screen::ThankYou => {}
        }
    }

    pub fn apply_timer(&mut self, fired: TimerFired) {
        self.observe(|c| c.on_timer(fired));
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) => self.add_log(msg),
            AppEvent::Error(msg) => self.add_log(msg),
            AppEvent::Persisted(result) => {
                if let Err(e) = self.observe(|c| c.complete_submission(result)) {
                    warn!("提交未完成: {}", e);
                }
            }
            AppEvent::Media(MediaSignal::Ended) => {
                self.observe(|c| c.video_finished());
            }
            AppEvent::Media(MediaSignal::Failed(reason)) => {
                self.add_log(format!("⚠ Video unavailable: {}", reason));
                self.observe(|c| c.video_failed());
            }
            AppEvent::Export(status) => {
                self.admin_status = Some(status.message());
            }
            AppEvent::RecordCount(n) => self.record_count = Some(n),
        }
    }

    pub fn submit(&mut self) {
        let response = match self.controller.request_submit() {
            Ok(r) => r,
            Err(e) => {
                info!("提交被拒绝: {}", e);
                return;
            }
        };
        if self.cmd_tx.send(AppCommand::Persist(response)).is_err() {
            let err = StoreError::Unavailable("background worker stopped".to_string());
            let _ = self.observe(|c| c.complete_submission(Err(err)));
        }
    }

    fn close_admin_prompt(&mut self) {
        self.input_mode = InputMode::Normal;
        self.admin_input.clear();
    }

    /// 返回 true 表示退出应用
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.input_mode == InputMode::AdminPrompt {
            match key.code {
                KeyCode::Esc => self.close_admin_prompt(),
                KeyCode::Enter => {
                    let passphrase = std::mem::take(&mut self.admin_input);
                    self.admin_status = Some("Exporting...".to_string());
                    let _ = self.cmd_tx.send(AppCommand::Export { passphrase });
                }
                KeyCode::Backspace => {
                    self.admin_input.pop();
                }
                KeyCode::Char(c) => self.admin_input.push(c),
                _ => {}
            }
            return false;
        }

        match self.controller.screen() {
            Screen::Start => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.observe(|c| c.begin());
                }
                KeyCode::Char('a') => {
                    if self.controller.register_admin_tap(Instant::now()) {
                        info!("管理员手势触发");
                        self.input_mode = InputMode::AdminPrompt;
                        self.admin_input.clear();
                        self.admin_status = None;
                        let _ = self.cmd_tx.send(AppCommand::RefreshCount);
                    }
                }
                _ => {}
            },
            Screen::Video => match key.code {
                KeyCode::Char('s') | KeyCode::Esc | KeyCode::Enter => {
                    self.observe(|c| c.skip_video());
                }
                _ => {}
            },
            Screen::Survey => self.handle_survey_key(key.code),
            Screen::ThankYou => {}
        }
        false
    }

    fn move_cursor(&mut self, forward: bool) {
        let len = survey_items(self.controller.form()).len();
        if forward {
            if self.survey_cursor + 1 < len {
                self.survey_cursor += 1;
            }
        } else {
            self.survey_cursor = self.survey_cursor.saturating_sub(1);
        }
    }

    fn handle_survey_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::BackTab => return self.move_cursor(false),
            KeyCode::Down | KeyCode::Tab => return self.move_cursor(true),
            _ => {}
        }

        let Some(item) = self.current_item() else {
            return;
        };
        match (item, code) {
            (SurveyItem::Multi { key, option }, KeyCode::Char(' ') | KeyCode::Enter) => {
                let included = !self.controller.form().multi(key).contains(option);
                self.controller.toggle_multi(key, option, included);
            }
            (SurveyItem::Single { key, option }, KeyCode::Char(' ') | KeyCode::Enter) => {
                self.controller.set_single(key, option);
                // 联系信息块可能在上方展开或收起，焦点跟随所选选项
                if let Some(pos) = survey_items(self.controller.form())
                    .iter()
                    .position(|i| *i == item)
                {
                    self.survey_cursor = pos;
                }
            }
            (SurveyItem::Rating(factor), code) => {
                let current = self.controller.form().rating(factor).map(|r| r.value());
                let next = match code {
                    KeyCode::Right => Some(current.map_or(Rating::MIN, |v| (v + 1).min(Rating::MAX))),
                    KeyCode::Left => current.and_then(|v| v.checked_sub(1)),
                    KeyCode::Char(d @ '1'..='5') => d.to_digit(10).map(|v| v as u8),
                    KeyCode::Char('0') | KeyCode::Backspace | KeyCode::Delete => None,
                    _ => return,
                };
                self.controller.set_rating(factor, next.and_then(Rating::new));
            }
            (SurveyItem::Text(key, _), KeyCode::Char(c)) => {
                let mut value = self.controller.form().single(key).to_string();
                value.push(c);
                self.controller.set_single(key, value);
            }
            (SurveyItem::Text(key, _), KeyCode::Backspace) => {
                let mut value = self.controller.form().single(key).to_string();
                value.pop();
                self.controller.set_single(key, value);
            }
            (SurveyItem::Text(..), KeyCode::Enter) => self.move_cursor(true),
            (SurveyItem::Submit, KeyCode::Char(' ') | KeyCode::Enter) => self.submit(),
            _ => {}
        }
    }
}
