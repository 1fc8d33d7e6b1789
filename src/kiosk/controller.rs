use crate::kiosk::admin::AdminGesture;
use crate::kiosk::form::{MultiKey, SingleKey, SurveyForm};
use crate::kiosk::model::{NewSurveyResponse, PartnerFactor, Rating, StoredResponse};
use crate::kiosk::timer::{TimerFired, TimerKind, TimerSlot};
use crate::kiosk::validation::{self, Violation};
use crate::storage::store::{RecordStore, StoreError};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Video,
    Survey,
    ThankYou,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub start_delay: Duration,
    pub video_grace: Duration,
    pub tick: Duration,
    pub countdown_secs: u32,
    pub admin_taps: u32,
    pub admin_window: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(300),
            video_grace: Duration::from_millis(2000),
            tick: Duration::from_secs(1),
            countdown_secs: 7,
            admin_taps: 5,
            admin_window: Duration::from_millis(1500),
        }
    }
}

/// 展示给访客的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Validation(Vec<Violation>),
    Persistence(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Validation(v) => validation::summarize(v),
            Notice::Persistence(_) => {
                "Unable to save your response. Please try again.".to_string()
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("survey screen is not active")]
    NotOnSurvey,
    #[error("a submission is already in progress")]
    Busy,
    #[error("no submission in flight")]
    NotInFlight,
    #[error("{}", validation::summarize(.0))]
    Invalid(Vec<Violation>),
    #[error("unable to save response: {0}")]
    Store(#[from] StoreError),
}

/// 控制器可观测状态，用于渲染与比较
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    pub screen: Screen,
    pub form: SurveyForm,
    pub animations: bool,
    pub video_error: bool,
    pub busy: bool,
    pub notice: Option<Notice>,
    pub countdown: u32,
    pub pending_timer: Option<TimerKind>,
    pub admin_taps: u32,
}

/// 屏幕状态机：start -> video -> survey -> thankyou -> start
pub struct KioskController {
    screen: Screen,
    form: SurveyForm,
    animations: bool,
    video_error: bool,
    busy: bool,
    notice: Option<Notice>,
    countdown: u32,
    timer: TimerSlot,
    admin: AdminGesture,
    timings: Timings,
}

impl KioskController {
    pub fn new(mut timings: Timings, timer_tx: mpsc::UnboundedSender<TimerFired>) -> Self {
        timings.countdown_secs = timings.countdown_secs.max(1);
        Self {
            screen: Screen::Start,
            form: SurveyForm::default(),
            animations: true,
            video_error: false,
            busy: false,
            notice: None,
            countdown: timings.countdown_secs,
            timer: TimerSlot::new(timer_tx),
            admin: AdminGesture::new(timings.admin_taps, timings.admin_window),
            timings,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn form(&self) -> &SurveyForm {
        &self.form
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations
    }

    pub fn video_error(&self) -> bool {
        self.video_error
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn state(&self) -> ControllerState {
        ControllerState {
            screen: self.screen,
            form: self.form.clone(),
            animations: self.animations,
            video_error: self.video_error,
            busy: self.busy,
            notice: self.notice.clone(),
            countdown: self.countdown,
            pending_timer: self.timer.pending_kind(),
            admin_taps: self.admin.count(),
        }
    }

    /// 访客点击开始：关闭装饰动画，延迟后进入视频
    pub fn begin(&mut self) -> bool {
        if self.screen != Screen::Start
            || self.timer.pending_kind() == Some(TimerKind::StartDebounce)
        {
            return false;
        }
        self.animations = false;
        self.timer.schedule(TimerKind::StartDebounce, self.timings.start_delay);
        true
    }

    pub fn video_finished(&mut self) -> bool {
        self.leave_video("finished")
    }

    pub fn skip_video(&mut self) -> bool {
        self.leave_video("skipped")
    }

    /// 视频失败：显示提示，宽限期后进入问卷
    pub fn video_failed(&mut self) -> bool {
        if self.screen != Screen::Video || self.video_error {
            return false;
        }
        warn!("视频播放失败，{:?} 后进入问卷", self.timings.video_grace);
        self.video_error = true;
        self.timer.schedule(TimerKind::VideoFallback, self.timings.video_grace);
        true
    }

    fn leave_video(&mut self, trigger: &str) -> bool {
        if self.screen != Screen::Video {
            return false;
        }
        info!("视频结束 ({})", trigger);
        self.enter(Screen::Survey);
        true
    }

    pub fn on_timer(&mut self, fired: TimerFired) -> bool {
        if !self.timer.claim(&fired) {
            debug!("忽略过期定时器: {:?}", fired);
            return false;
        }
        match (fired.kind, self.screen) {
            (TimerKind::StartDebounce, Screen::Start) => {
                self.enter(Screen::Video);
                true
            }
            (TimerKind::VideoFallback, Screen::Video) => {
                self.enter(Screen::Survey);
                true
            }
            (TimerKind::CountdownTick, Screen::ThankYou) => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.reset_to_start();
                } else {
                    self.timer.schedule(TimerKind::CountdownTick, self.timings.tick);
                }
                true
            }
            (kind, screen) => {
                warn!("定时器 {:?} 与当前屏幕 {:?} 不匹配", kind, screen);
                false
            }
        }
    }

    pub fn set_single(&mut self, key: SingleKey, value: impl Into<String>) -> bool {
        if self.screen != Screen::Survey {
            return false;
        }
        self.form.set_single(key, value);
        true
    }

    pub fn toggle_multi(&mut self, key: MultiKey, value: &str, included: bool) -> bool {
        if self.screen != Screen::Survey {
            return false;
        }
        self.form.toggle_multi(key, value, included);
        true
    }

    pub fn set_rating(&mut self, factor: PartnerFactor, rating: Option<Rating>) -> bool {
        if self.screen != Screen::Survey {
            return false;
        }
        self.form.set_rating(factor, rating);
        true
    }

    /// 提交前半段：校验并置忙，返回待写入快照
    pub fn request_submit(&mut self) -> Result<NewSurveyResponse, SubmitError> {
        if self.screen != Screen::Survey {
            return Err(SubmitError::NotOnSurvey);
        }
        if self.busy {
            return Err(SubmitError::Busy);
        }
        let violations = validation::validate(&self.form);
        if !violations.is_empty() {
            info!("问卷校验未通过: {:?}", violations);
            self.notice = Some(Notice::Validation(violations.clone()));
            return Err(SubmitError::Invalid(violations));
        }
        self.busy = true;
        self.notice = None;
        Ok(self.form.to_response())
    }

    /// 提交后半段：根据存储结果切换到感谢页或保留在问卷页
    pub fn complete_submission(
        &mut self,
        result: Result<StoredResponse, StoreError>,
    ) -> Result<StoredResponse, SubmitError> {
        if self.screen != Screen::Survey || !self.busy {
            warn!("收到无对应提交的存储结果");
            return Err(SubmitError::NotInFlight);
        }
        match result {
            Ok(stored) => {
                info!("✓ 问卷已保存 [ID: {}] {}", stored.id, stored.timestamp);
                self.enter(Screen::ThankYou);
                self.countdown = self.timings.countdown_secs;
                self.timer.schedule(TimerKind::CountdownTick, self.timings.tick);
                Ok(stored)
            }
            Err(e) => {
                error!("✗ 问卷保存失败: {}", e);
                self.busy = false;
                self.notice = Some(Notice::Persistence(e.to_string()));
                Err(SubmitError::Store(e))
            }
        }
    }

    pub async fn submit(&mut self, store: &dyn RecordStore) -> Result<StoredResponse, SubmitError> {
        let response = self.request_submit()?;
        let result = store.insert(response).await;
        self.complete_submission(result)
    }

    /// 回到欢迎页，清空本轮访客的所有状态
    pub fn reset_to_start(&mut self) {
        self.enter(Screen::Start);
        self.form.reset();
        self.animations = true;
        self.video_error = false;
        self.busy = false;
        self.notice = None;
        self.countdown = self.timings.countdown_secs;
        self.admin.reset();
    }

    pub fn register_admin_tap(&mut self, now: Instant) -> bool {
        if self.screen != Screen::Start {
            return false;
        }
        self.admin.register_tap(now)
    }

    fn enter(&mut self, next: Screen) {
        self.timer.cancel();
        if self.screen != next {
            info!("屏幕切换: {:?} -> {:?}", self.screen, next);
        }
        self.screen = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::testing::MemoryStore;

    type Rx = mpsc::UnboundedReceiver<TimerFired>;

    fn controller() -> (KioskController, Rx) {
        let (tx, rx) = mpsc::unbounded_channel();
        (KioskController::new(Timings::default(), tx), rx)
    }

    async fn pump(c: &mut KioskController, rx: &mut Rx) -> (TimerFired, bool) {
        let fired = rx.recv().await.expect("timer channel closed");
        let applied = c.on_timer(fired);
        (fired, applied)
    }

    async fn reach_survey(c: &mut KioskController, rx: &mut Rx) {
        assert!(c.begin());
        pump(c, rx).await;
        assert_eq!(c.screen(), Screen::Video);
        assert!(c.skip_video());
        assert_eq!(c.screen(), Screen::Survey);
    }

    fn fill_scenario(c: &mut KioskController) {
        c.toggle_multi(MultiKey::Sector, "Mining", true);
        c.toggle_multi(MultiKey::Solution, "Temporary / Rental Power", true);
        c.set_single(SingleKey::Capacity, "Below 1 MW");
        c.set_single(SingleKey::Seeking, "Not at the moment");
        c.set_single(SingleKey::Followup, "No");
    }

    #[tokio::test(start_paused = true)]
    async fn begin_waits_for_debounce_then_shows_video() {
        let (mut c, mut rx) = controller();
        let t0 = Instant::now();
        assert!(c.begin());
        assert!(!c.animations_enabled());
        assert_eq!(c.screen(), Screen::Start);
        assert!(!c.begin(), "repeated begin during debounce is ignored");

        let (fired, applied) = pump(&mut c, &mut rx).await;
        assert!(applied);
        assert_eq!(fired.kind, TimerKind::StartDebounce);
        assert_eq!(c.screen(), Screen::Video);
        assert!(t0.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn finish_and_skip_lead_to_identical_state() {
        let (mut a, mut rx_a) = controller();
        let (mut b, mut rx_b) = controller();
        a.begin();
        pump(&mut a, &mut rx_a).await;
        b.begin();
        pump(&mut b, &mut rx_b).await;

        assert!(a.video_finished());
        assert!(b.skip_video());
        assert_eq!(a.state(), b.state());
        assert!(!a.video_finished(), "second trigger is a no-op");
    }

    #[tokio::test(start_paused = true)]
    async fn video_error_falls_back_after_grace_and_clears_on_reset() {
        let (mut c, mut rx) = controller();
        c.begin();
        pump(&mut c, &mut rx).await;

        let t0 = Instant::now();
        assert!(c.video_failed());
        assert!(c.video_error());
        assert_eq!(c.screen(), Screen::Video);
        assert!(!c.video_failed(), "grace period is not restarted");

        let (fired, applied) = pump(&mut c, &mut rx).await;
        assert!(applied);
        assert_eq!(fired.kind, TimerKind::VideoFallback);
        assert!(t0.elapsed() >= Duration::from_millis(2000));
        assert_eq!(c.screen(), Screen::Survey);
        assert!(c.video_error());

        c.reset_to_start();
        assert!(!c.video_error());
    }

    #[tokio::test(start_paused = true)]
    async fn skip_before_fallback_cancels_timer() {
        let (mut c, mut rx) = controller();
        c.begin();
        pump(&mut c, &mut rx).await;
        c.video_failed();
        assert!(c.skip_video());
        assert_eq!(c.screen(), Screen::Survey);
        assert_eq!(c.state().pending_timer, None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        let forged = TimerFired {
            generation: 0,
            kind: TimerKind::VideoFallback,
        };
        assert!(!c.on_timer(forged));
        assert_eq!(c.screen(), Screen::Survey);
    }

    #[tokio::test(start_paused = true)]
    async fn valid_submission_is_stored_once_and_thanks_visitor() {
        let (mut c, mut rx) = controller();
        let store = MemoryStore::default();
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);

        let stored = c.submit(&store).await.unwrap();
        assert_eq!(store.insert_calls(), 1);
        assert!(stored.id > 0);
        assert!(!stored.timestamp.is_empty());
        assert_eq!(c.screen(), Screen::ThankYou);
        assert_eq!(c.countdown(), 7);
        assert_eq!(c.state().pending_timer, Some(TimerKind::CountdownTick));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_required_fields_never_reach_store() {
        let setters: Vec<Box<dyn Fn(&mut KioskController)>> = vec![
            Box::new(|c| {
                c.toggle_multi(MultiKey::Sector, "Mining", false);
            }),
            Box::new(|c| {
                c.toggle_multi(MultiKey::Solution, "Temporary / Rental Power", false);
            }),
            Box::new(|c| {
                c.set_single(SingleKey::Capacity, "");
            }),
            Box::new(|c| {
                c.set_single(SingleKey::Seeking, "");
            }),
            Box::new(|c| {
                c.set_single(SingleKey::Followup, "");
            }),
        ];

        for clear in setters {
            let (mut c, mut rx) = controller();
            let store = MemoryStore::default();
            reach_survey(&mut c, &mut rx).await;
            fill_scenario(&mut c);
            clear(&mut c);

            let err = c.submit(&store).await.unwrap_err();
            assert!(matches!(err, SubmitError::Invalid(_)));
            assert_eq!(store.insert_calls(), 0);
            assert_eq!(c.screen(), Screen::Survey);
            assert!(!c.is_busy());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn followup_without_contact_is_rejected() {
        let (mut c, mut rx) = controller();
        let store = MemoryStore::default();
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);
        c.set_single(SingleKey::Followup, "Yes");
        c.set_single(SingleKey::Name, "Dana");
        c.set_single(SingleKey::Company, "Acme Mining");

        let err = c.submit(&store).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(ref v) if v == &[Violation::MissingContact]));
        assert_eq!(store.insert_calls(), 0);
        assert_eq!(c.screen(), Screen::Survey);
        let notice = c.notice().expect("notice shown");
        assert!(notice.message().contains("WhatsApp"));
    }

    #[tokio::test(start_paused = true)]
    async fn double_tap_creates_single_record() {
        let (mut c, mut rx) = controller();
        let store = MemoryStore::default();
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);

        let first = c.request_submit().unwrap();
        assert!(c.is_busy());
        assert!(matches!(c.request_submit(), Err(SubmitError::Busy)));

        let result = store.insert(first).await;
        c.complete_submission(result).unwrap();
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(c.screen(), Screen::ThankYou);
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_keeps_answers_for_retry() {
        let (mut c, mut rx) = controller();
        let store = MemoryStore::failing();
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);
        let before = c.form().clone();

        let err = c.submit(&store).await.unwrap_err();
        assert!(matches!(err, SubmitError::Store(_)));
        assert_eq!(c.screen(), Screen::Survey);
        assert!(!c.is_busy());
        assert_eq!(c.form(), &before);
        assert!(matches!(c.notice(), Some(Notice::Persistence(_))));

        store
            .fail_inserts
            .store(false, std::sync::atomic::Ordering::SeqCst);
        c.submit(&store).await.unwrap();
        assert_eq!(store.insert_calls(), 2);
        assert_eq!(c.screen(), Screen::ThankYou);
        assert_eq!(c.notice(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_returns_to_start_exactly_once() {
        let (mut c, mut rx) = controller();
        let store = MemoryStore::default();
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);
        c.submit(&store).await.unwrap();

        let t0 = Instant::now();
        let mut last = None;
        for expected in (0..7).rev() {
            let (fired, applied) = pump(&mut c, &mut rx).await;
            assert!(applied);
            assert_eq!(c.countdown(), if expected == 0 { 7 } else { expected });
            last = Some(fired);
        }
        assert!(t0.elapsed() >= Duration::from_secs(7));
        assert_eq!(c.screen(), Screen::Start);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err(), "no timer left after reset");
        assert!(!c.on_timer(last.unwrap()), "duplicate tick is ignored");
        assert_eq!(c.screen(), Screen::Start);
    }

    #[tokio::test(start_paused = true)]
    async fn late_tick_after_manual_reset_is_noop() {
        let (mut c, mut rx) = controller();
        let store = MemoryStore::default();
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);
        c.submit(&store).await.unwrap();

        let late = rx.recv().await.unwrap();
        c.reset_to_start();
        c.begin();
        assert!(!c.on_timer(late));
        assert_eq!(c.screen(), Screen::Start);
        assert_eq!(c.state().pending_timer, Some(TimerKind::StartDebounce));
    }

    #[tokio::test(start_paused = true)]
    async fn returning_to_start_matches_fresh_controller() {
        let (fresh, _fresh_rx) = controller();
        let (mut c, mut rx) = controller();
        let store = MemoryStore::default();

        c.register_admin_tap(Instant::now());
        reach_survey(&mut c, &mut rx).await;
        fill_scenario(&mut c);
        c.toggle_multi(MultiKey::Challenges, "High Power Costs", true);
        c.set_rating(PartnerFactor::CostEfficiency, Rating::new(4));
        c.submit(&store).await.unwrap();
        for _ in 0..7 {
            pump(&mut c, &mut rx).await;
        }

        assert_eq!(c.state(), fresh.state());
    }

    #[tokio::test(start_paused = true)]
    async fn form_is_read_only_outside_survey() {
        let (mut c, _rx) = controller();
        assert!(!c.toggle_multi(MultiKey::Sector, "Mining", true));
        assert!(!c.set_single(SingleKey::Capacity, "Below 1 MW"));
        assert!(c.form().sector.is_empty());
        assert!(matches!(c.request_submit(), Err(SubmitError::NotOnSurvey)));
    }

    #[tokio::test(start_paused = true)]
    async fn admin_gesture_only_on_start_screen() {
        let (mut c, mut rx) = controller();
        let t0 = Instant::now();
        for i in 0..4 {
            assert!(!c.register_admin_tap(t0 + Duration::from_millis(i * 100)));
        }
        assert!(c.register_admin_tap(t0 + Duration::from_millis(400)));

        reach_survey(&mut c, &mut rx).await;
        for i in 0..10 {
            assert!(!c.register_admin_tap(Instant::now() + Duration::from_millis(i)));
        }
    }
}
