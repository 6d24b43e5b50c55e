//! Magic Formula 스크리너 CLI.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use screener_collector::{
    CollectorConfig, CollectorError, JobExecutor, LocalExecutor, RemoteExecutor, Result,
    RunOutcome, Workflow, EXIT_FAILURE, EXIT_FETCH_FAILURE, EXIT_SUCCESS,
};
use screener_core::{init_logging, FieldCatalog, LogConfig, ScreenerConfig};
use screener_data::{DocumentFetcher, FundamentalsStore, HttpFetcher, InMemoryStore, PgFundamentalsStore};
use screener_notification::{
    LogPublisher, MessagePublisher, PublishError, TelegramConfig, TelegramPublisher,
};
use screener_ranking::RankingEngine;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Magic Formula Fundamentals Screener", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// 설정 파일 (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 통계 필드 카탈로그 파일 (TOML, 없으면 내장 카탈로그)
    #[arg(long, global = true)]
    field_catalog: Option<PathBuf>,

    /// PostgreSQL 연결 URL (없으면 DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 업종/종목/통계 수집 및 저장
    Fetch {
        /// 저장하지 않고 메모리에서만 실행
        #[arg(long)]
        dry_run: bool,
    },

    /// 수집 → 저장 → 랭킹 → 발행
    Predict(PublishArgs),

    /// 저장된 스냅샷 랭킹 → 발행
    Rank(PublishArgs),
}

#[derive(Args)]
struct PublishArgs {
    /// 선정 종목 수 (기본: 설정의 top_n, 15)
    #[arg(short = 'n', long = "num-stocks")]
    num_stocks: Option<usize>,

    /// 랭킹 전략 (magic_formula, return_on_capital_yield)
    #[arg(long)]
    strategy: Option<String>,

    /// 발행하지 않고 로그로 출력 (predict는 메모리 저장소 사용)
    #[arg(long)]
    dry_run: bool,

    /// 텔레그램 봇 토큰 (없으면 TELEGRAM_BOT_TOKEN)
    #[arg(long)]
    telegram_token: Option<String>,

    /// 텔레그램 채팅 ID (없으면 TELEGRAM_CHAT_ID)
    #[arg(long)]
    telegram_chat_id: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Predict,
    Rank,
}

/// 명령 공통 설정
struct Setup {
    settings: ScreenerConfig,
    collector: CollectorConfig,
    catalog: Arc<FieldCatalog>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(LogConfig::new(cli.log_level.clone()).with_env_format()) {
        eprintln!("로깅 초기화 실패: {}", e);
    }

    info!("Screener 시작");

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("종료 신호 수신, 진행 중인 작업을 마친 뒤 종료합니다");
            signal_token.cancel();
        }
    });

    let code = match &cli.command {
        Commands::Fetch { dry_run } => run_fetch(&cli, *dry_run, cancel).await,
        Commands::Predict(args) => run_publish(&cli, args, Mode::Predict, cancel).await,
        Commands::Rank(args) => run_publish(&cli, args, Mode::Rank, cancel).await,
    };

    info!(exit_code = code, "Screener 종료");
    std::process::exit(code);
}

async fn run_fetch(cli: &Cli, dry_run: bool, cancel: CancellationToken) -> i32 {
    match fetch_command(cli, dry_run, cancel).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!(error = %e, "수집 실패");
            EXIT_FETCH_FAILURE
        }
    }
}

async fn fetch_command(cli: &Cli, dry_run: bool, cancel: CancellationToken) -> Result<()> {
    let setup = load_setup(cli)?;
    let store = open_store(&setup, dry_run).await?;
    build_workflow(&setup, store, cancel)?.harvest().await?;
    Ok(())
}

async fn run_publish(cli: &Cli, args: &PublishArgs, mode: Mode, cancel: CancellationToken) -> i32 {
    match publish_command(cli, args, mode, cancel).await {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::Published { message, .. } => info!(message = %message, "발행 완료"),
                RunOutcome::NothingEligible => info!("적격 종목이 없어 발행하지 않았습니다"),
                RunOutcome::Failed(e) => error!(error = %e, "실행 실패"),
            }
            outcome.exit_code()
        }
        Err(e) => {
            error!(error = %e, "실행 준비 실패");
            EXIT_FAILURE
        }
    }
}

async fn publish_command(
    cli: &Cli,
    args: &PublishArgs,
    mode: Mode,
    cancel: CancellationToken,
) -> Result<RunOutcome> {
    let setup = load_setup(cli)?;
    let ranking = &setup.settings.ranking;

    let strategy = args.strategy.as_deref().unwrap_or(&ranking.strategy);
    let engine = RankingEngine::with_strategy(strategy, ranking)?
        .with_top_n(args.num_stocks.unwrap_or(ranking.top_n))?;
    info!(strategy = engine.strategy_name(), top_n = engine.top_n(), "랭킹 엔진 구성");

    let publisher: Box<dyn MessagePublisher> = if args.dry_run {
        Box::new(LogPublisher::new())
    } else {
        Box::new(telegram_publisher(args)?)
    };

    let store = open_store(&setup, args.dry_run && mode == Mode::Predict).await?;
    let workflow = build_workflow(&setup, store, cancel)?;

    Ok(match mode {
        Mode::Predict => workflow.predict(&engine, publisher.as_ref()).await,
        Mode::Rank => workflow.rank_persisted(&engine, publisher.as_ref()).await,
    })
}

fn load_setup(cli: &Cli) -> Result<Setup> {
    let settings = ScreenerConfig::load(cli.config.as_deref())?;

    let mut collector = CollectorConfig::from_env()?;
    if let Some(url) = &cli.database_url {
        collector.database_url = Some(url.clone());
    }

    let catalog = match &cli.field_catalog {
        Some(path) => FieldCatalog::from_path(path)?,
        None => FieldCatalog::embedded()?,
    };
    debug!(fields = catalog.len(), "필드 카탈로그 로드 완료");

    Ok(Setup {
        settings,
        collector,
        catalog: Arc::new(catalog),
    })
}

async fn open_store(setup: &Setup, in_memory: bool) -> Result<Arc<dyn FundamentalsStore>> {
    if in_memory {
        info!("dry run: 메모리 저장소 사용");
        return Ok(Arc::new(InMemoryStore::new(setup.catalog.as_ref().clone())));
    }

    let url = setup.collector.require_database_url()?;
    let store = PgFundamentalsStore::connect(url, setup.catalog.as_ref().clone()).await?;
    store.migrate().await?;
    info!("데이터베이스 연결 성공");

    Ok(Arc::new(store))
}

fn build_workflow(
    setup: &Setup,
    store: Arc<dyn FundamentalsStore>,
    cancel: CancellationToken,
) -> Result<Workflow> {
    let collector = &setup.collector;
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(HttpFetcher::new(collector.http_timeout)?);

    let executor: Arc<dyn JobExecutor> = match &collector.pipeline.remote_endpoint {
        Some(endpoint) => {
            let chunk = u32::try_from(collector.pipeline.chunk_size).unwrap_or(u32::MAX);
            let timeout = collector.http_timeout.saturating_mul(chunk);
            info!(endpoint = %endpoint, "원격 실행기 사용");
            Arc::new(
                RemoteExecutor::new(endpoint.clone(), timeout)
                    .map_err(|e| CollectorError::Config(e.to_string()))?,
            )
        }
        None => Arc::new(LocalExecutor::new(
            fetcher.clone(),
            setup.settings.source.clone(),
            setup.catalog.clone(),
        )),
    };

    Ok(Workflow::new(
        setup.settings.clone(),
        collector.clone(),
        fetcher,
        executor,
        store,
    )
    .with_cancellation(cancel))
}

fn telegram_publisher(args: &PublishArgs) -> std::result::Result<TelegramPublisher, PublishError> {
    match (&args.telegram_token, &args.telegram_chat_id) {
        (Some(token), Some(chat_id)) => {
            let mut config = TelegramConfig::new(token.clone(), chat_id.clone());
            if let Ok(api_base) = std::env::var("TELEGRAM_API_BASE") {
                config = config.with_api_base(api_base);
            }
            TelegramPublisher::new(config)
        }
        (None, None) => TelegramPublisher::from_env(),
        _ => Err(PublishError::InvalidConfig(
            "--telegram-token과 --telegram-chat-id는 함께 지정해야 합니다".to_string(),
        )),
    }
}
