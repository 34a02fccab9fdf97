use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, Overrides};
use error::JigglerError;
use services::control::{create_control_sources, JiggleController};
use services::{create_injector, JiggleScheduler, TracingSink};
use utils::InstanceGuard;

#[derive(Parser, Debug)]
#[command(name = "idle-jiggler", version)]
#[command(about = "Периодически чуть сдвигает курсор, чтобы компьютер не считался простаивающим")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "jiggler.toml")]
    config: PathBuf,

    /// Начать с включённым подёргиванием
    #[arg(short, long)]
    jiggle: bool,

    /// Начать в zen (невидимом) режиме
    #[arg(short, long)]
    zen: bool,

    /// Интервал подёргивания в секундах
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=10_800))]
    seconds: Option<u64>,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Не читать команды из stdin
    #[arg(long)]
    no_stdin: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            enabled: self.jiggle.then_some(true),
            zen: self.zen.then_some(true),
            interval_seconds: self.seconds,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let mut config = Config::load(&args.config)?;
    config.apply_overrides(args.overrides())?;

    // Инициализация системы логирования
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(log_level, &config.logging.format)?;

    info!("Запуск Idle Jiggler v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {:?}", args.config);

    // Только один экземпляр может работать с подсистемой ввода
    let _instance = match InstanceGuard::acquire(&config.instance.name) {
        Ok(guard) => guard,
        Err(JigglerError::AlreadyRunningInstance(owner)) => {
            eprintln!("Idle Jiggler уже запущен ({}). Прерывание.", owner);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    } else {
        // Проверка прав доступа
        #[cfg(target_os = "linux")]
        utils::permissions::check_permissions()?;
    }

    // Инициализация компонентов
    let injector = create_injector(&config.injector, args.dry_run)?;
    let sink = Arc::new(TracingSink::new(config.diagnostics.escalate_after));
    let scheduler = Arc::new(JiggleScheduler::new(injector, sink, config.motion_profile()));

    scheduler.start(config.jiggle_config()?)?;

    let controller = Arc::new(JiggleController::new(
        scheduler.clone(),
        config.clone(),
        args.config.clone(),
    ));

    let handles: Vec<_> = create_control_sources(controller.clone(), !args.no_stdin)?
        .into_iter()
        .map(|source| {
            tokio::spawn(async move {
                if let Err(e) = source.run().await {
                    error!("Ошибка в источнике управления: {}", e);
                }
            })
        })
        .collect();

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения или команды quit
    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        },
        _ = controller.shutdown_requested() => {}
    }

    info!("Завершение работы...");

    // После возврата stop() ни один тик больше не сработает
    scheduler.stop().await;

    for handle in &handles {
        handle.abort();
    }

    info!("Idle Jiggler завершил работу ({})", controller.status());
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}
