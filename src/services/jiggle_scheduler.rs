use crate::debug_if_enabled;
use crate::error::{JigglerError, Result};
use crate::services::diagnostics::DiagnosticSink;
use crate::services::injector::InputInjector;
use crate::services::jiggle_config::{validate_interval, JiggleConfig, MotionProfile};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Paused,
}

/// Счётчики тиков и инъекций с момента создания планировщика
#[derive(Debug, Default)]
pub struct JiggleStats {
    ticks: AtomicU64,
    injected: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub injected: u64,
    pub failed: u64,
}

impl JiggleStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            injected: self.injected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Работающая задача тиков
struct TickTask {
    handle: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

/// Всё, что нужно телу тика; переезжает в задачу целиком
struct TickContext {
    injector: Arc<dyn InputInjector>,
    sink: Arc<dyn DiagnosticSink>,
    profile: MotionProfile,
    stats: Arc<JiggleStats>,
    zig: bool,
}

pub struct JiggleScheduler {
    injector: Arc<dyn InputInjector>,
    sink: Arc<dyn DiagnosticSink>,
    profile: MotionProfile,
    stats: Arc<JiggleStats>,
    // Единственное разделяемое изменяемое состояние: читается задачей тиков на каждом тике
    config: watch::Sender<JiggleConfig>,
    task: Mutex<Option<TickTask>>,
}

impl JiggleScheduler {
    pub fn new(
        injector: Arc<dyn InputInjector>,
        sink: Arc<dyn DiagnosticSink>,
        profile: MotionProfile,
    ) -> Self {
        info!("Инициализация JiggleScheduler (инжектор: {})", injector.name());

        let (config, _) = watch::channel(JiggleConfig::default());

        Self {
            injector,
            sink,
            profile,
            stats: Arc::new(JiggleStats::default()),
            config,
            task: Mutex::new(None),
        }
    }

    /// Запустить тики с заданной конфигурацией. Первый тик через полный интервал.
    pub fn start(&self, config: JiggleConfig) -> Result<()> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return Err(JigglerError::AlreadyRunning);
        }

        validate_interval(config.interval_seconds())?;

        self.config.send_replace(config);
        info!("Запуск JiggleScheduler: {}", config);

        let ctx = TickContext {
            injector: Arc::clone(&self.injector),
            sink: Arc::clone(&self.sink),
            profile: self.profile,
            stats: Arc::clone(&self.stats),
            zig: false,
        };
        let config_rx = self.config.subscribe();
        let (shutdown, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(Self::tick_loop(ctx, config_rx, shutdown_rx));
        *task = Some(TickTask { handle, shutdown });

        Ok(())
    }

    /// Остановить тики. После возврата ни один тик больше не сработает.
    pub async fn stop(&self) {
        let task = self.task.lock().take();

        let Some(task) = task else {
            debug_if_enabled!("JiggleScheduler уже остановлен");
            return;
        };

        let _ = task.shutdown.send(());
        if let Err(e) = task.handle.await {
            if !e.is_cancelled() {
                error!("Задача тиков завершилась с ошибкой: {}", e);
            }
        }

        info!("JiggleScheduler остановлен");
    }

    pub fn pause(&self) {
        self.set_enabled(false);
    }

    pub fn resume(&self) {
        self.set_enabled(true);
    }

    pub fn set_enabled(&self, enabled: bool) {
        if self.config.send_if_modified(|c| {
            let changed = c.enabled() != enabled;
            c.set_enabled(enabled);
            changed
        }) {
            info!("Подёргивание {}", if enabled { "включено" } else { "на паузе" });
        }
    }

    /// Переключить включение, вернуть новое значение
    pub fn toggle(&self) -> bool {
        let mut enabled = false;
        self.config.send_modify(|c| {
            enabled = !c.enabled();
            c.set_enabled(enabled);
        });
        info!("Подёргивание {}", if enabled { "включено" } else { "на паузе" });
        enabled
    }

    pub fn set_invisible(&self, invisible: bool) {
        if self.config.send_if_modified(|c| {
            let changed = c.invisible() != invisible;
            c.set_invisible(invisible);
            changed
        }) {
            info!("Zen режим {}", if invisible { "включён" } else { "выключен" });
        }
    }

    /// Переключить zen режим, вернуть новое значение
    pub fn toggle_invisible(&self) -> bool {
        let mut invisible = false;
        self.config.send_modify(|c| {
            invisible = !c.invisible();
            c.set_invisible(invisible);
        });
        info!("Zen режим {}", if invisible { "включён" } else { "выключен" });
        invisible
    }

    /// Сменить интервал. Таймер перезапускается сразу; тот же интервал ничего не меняет.
    pub fn reconfigure(&self, interval_seconds: u64) -> Result<()> {
        validate_interval(interval_seconds)?;

        let mut result = Ok(());
        let changed = self.config.send_if_modified(|c| {
            if c.interval_seconds() == interval_seconds {
                return false;
            }
            result = c.set_interval_seconds(interval_seconds);
            result.is_ok()
        });

        if changed {
            info!("Интервал изменён на {} с", interval_seconds);
        }
        result
    }

    pub fn config(&self) -> JiggleConfig {
        *self.config.borrow()
    }

    pub fn state(&self) -> SchedulerState {
        let running = self
            .task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished());

        match (running, self.config().enabled()) {
            (false, _) => SchedulerState::Stopped,
            (true, true) => SchedulerState::Running,
            (true, false) => SchedulerState::Paused,
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn ticker(period: Duration) -> Interval {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Задача тиков: тело тика выполняется целиком до следующего, параллельных тиков нет
    async fn tick_loop(
        mut ctx: TickContext,
        mut config_rx: watch::Receiver<JiggleConfig>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let mut period = config_rx.borrow_and_update().interval();
        let mut ticker = Self::ticker(period);

        debug_if_enabled!("Задача тиков запущена, интервал: {:?}", period);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => break,

                changed = config_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let new_period = config_rx.borrow_and_update().interval();
                    if new_period != period {
                        period = new_period;
                        ticker = Self::ticker(period);
                        debug_if_enabled!("Таймер перезапущен с интервалом {:?}", period);
                    }
                }

                _ = ticker.tick() => {
                    let config = *config_rx.borrow();
                    ctx.on_tick(&config);
                }
            }
        }

        debug_if_enabled!("Задача тиков завершена");
    }
}

impl TickContext {
    fn on_tick(&mut self, config: &JiggleConfig) {
        let tick = self.stats.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        if !config.enabled() {
            debug_if_enabled!("Тик #{}: на паузе, пропускаем", tick);
            return;
        }

        let delta = self.profile.delta(config.invisible(), &mut self.zig);
        match self.injector.inject(delta) {
            Ok(()) => {
                self.stats.injected.fetch_add(1, Ordering::Relaxed);
                debug_if_enabled!("Тик #{}: сдвиг {} отправлен", tick, delta);
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                self.sink.injection_failed("inject", &e);
            }
        }
    }
}

impl Drop for JiggleScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InjectionError;
    use std::collections::HashSet;
    use tokio::time::sleep;

    /// Записывает все сдвиги; падает на тех вызовах, номера которых (с 1) указаны
    #[derive(Default)]
    struct RecordingInjector {
        calls: Mutex<Vec<i32>>,
        fail_on: HashSet<usize>,
    }

    impl RecordingInjector {
        fn failing_on(calls: &[usize]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: calls.iter().copied().collect(),
            }
        }

        fn calls(&self) -> Vec<i32> {
            self.calls.lock().clone()
        }
    }

    impl InputInjector for RecordingInjector {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn inject(&self, delta: i32) -> std::result::Result<(), InjectionError> {
            let mut calls = self.calls.lock();
            calls.push(delta);
            if self.fail_on.contains(&calls.len()) {
                return Err(InjectionError::new(87));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(&'static str, i32)>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn injection_failed(&self, operation: &'static str, error: &InjectionError) {
            self.events.lock().push((operation, error.code));
        }
    }

    fn scheduler_with(
        injector: Arc<RecordingInjector>,
    ) -> (JiggleScheduler, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let scheduler = JiggleScheduler::new(injector, sink.clone(), MotionProfile::default());
        (scheduler, sink)
    }

    fn config(enabled: bool, interval_seconds: u64) -> JiggleConfig {
        JiggleConfig::new(enabled, interval_seconds, false).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_seconds_five_visible_jiggles() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        sleep(Duration::from_millis(5_500)).await;

        assert_eq!(injector.calls(), vec![1; 5]);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_full_interval() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 10)).unwrap();
        sleep(Duration::from_millis(9_900)).await;
        assert!(injector.calls().is_empty());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(injector.calls().len(), 1);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zen_applies_from_next_tick() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        sleep(Duration::from_millis(2_500)).await;
        scheduler.set_invisible(true);
        sleep(Duration::from_secs(2)).await;

        assert_eq!(injector.calls(), vec![1, 1, 0, 0]);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_never_injects_but_keeps_ticking() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(false, 1)).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Paused);

        sleep(Duration::from_millis(5_500)).await;

        assert!(injector.calls().is_empty());
        assert_eq!(scheduler.stats().ticks, 5);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_without_restarting_timer() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 2)).unwrap();
        sleep(Duration::from_millis(2_500)).await;
        scheduler.pause();
        sleep(Duration::from_secs(4)).await;
        assert_eq!(injector.calls().len(), 1);

        // t = 6.5, следующий тик по старому расписанию в t = 8
        scheduler.resume();
        sleep(Duration::from_millis(1_600)).await;
        assert_eq!(injector.calls().len(), 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_future_ticks() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        sleep(Duration::from_millis(2_500)).await;
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(injector.calls().len(), 2);

        // Повторная остановка безопасна
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_on_never_started_scheduler_is_noop() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_does_not_stop_next_tick() {
        let injector = Arc::new(RecordingInjector::failing_on(&[2]));
        let (scheduler, sink) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        sleep(Duration::from_millis(3_500)).await;

        assert_eq!(injector.calls().len(), 3);
        assert_eq!(*sink.events.lock(), vec![("inject", 87)]);

        let stats = scheduler.stats();
        assert_eq!(stats.injected, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(scheduler.state(), SchedulerState::Running);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_changes_spacing() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 10)).unwrap();
        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(injector.calls().len(), 1);

        // Таймер перезапускается: тики в t = 12.5 и t = 14.5
        scheduler.reconfigure(2).unwrap();
        sleep(Duration::from_millis(4_500)).await;
        assert_eq!(injector.calls().len(), 3);
        assert_eq!(scheduler.config().interval_seconds(), 2);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_to_same_interval_keeps_schedule() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 4)).unwrap();
        sleep(Duration::from_secs(3)).await;
        scheduler.reconfigure(4).unwrap();
        sleep(Duration::from_millis(1_500)).await;

        assert_eq!(injector.calls().len(), 1);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_rejects_out_of_range() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 5)).unwrap();
        assert!(matches!(
            scheduler.reconfigure(0),
            Err(JigglerError::InvalidInterval(0))
        ));
        assert!(scheduler.reconfigure(10_801).is_err());
        assert_eq!(scheduler.config().interval_seconds(), 5);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_reaches_running() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        assert!(JiggleConfig::new(true, 0, false).is_err());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_is_rejected_and_restart_after_stop_works() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        assert!(matches!(
            scheduler.start(config(true, 1)),
            Err(JigglerError::AlreadyRunning)
        ));

        scheduler.stop().await;
        scheduler.start(config(true, 1)).unwrap();
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(injector.calls().len(), 1);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_intervals_within_tolerance() {
        for interval_seconds in [1u64, 7, 60, 10_800] {
            let injector = Arc::new(RecordingInjector::default());
            let (scheduler, _) = scheduler_with(injector.clone());
            let n = 4u64;

            scheduler.start(config(true, interval_seconds)).unwrap();
            sleep(Duration::from_secs(interval_seconds * n)).await;

            let calls = injector.calls().len() as u64;
            assert!(calls + 1 >= n && calls <= n + 1, "интервал {}: {} вызовов", interval_seconds, calls);
            scheduler.stop().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_flips_enabled() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        assert!(!scheduler.toggle());
        assert_eq!(scheduler.state(), SchedulerState::Paused);
        assert!(scheduler.toggle());
        assert_eq!(scheduler.state(), SchedulerState::Running);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_invisible_switches_delta() {
        let injector = Arc::new(RecordingInjector::default());
        let (scheduler, _) = scheduler_with(injector.clone());

        scheduler.start(config(true, 1)).unwrap();
        sleep(Duration::from_millis(1_500)).await;

        assert!(scheduler.toggle_invisible());
        assert!(scheduler.config().invisible());
        sleep(Duration::from_secs(1)).await;

        assert!(!scheduler.toggle_invisible());
        assert!(!scheduler.config().invisible());
        sleep(Duration::from_secs(1)).await;

        assert_eq!(injector.calls(), vec![1, 0, 1]);
        scheduler.stop().await;
    }
}
