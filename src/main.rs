use anyhow::Context;
use clap::Parser;
use em_booking::core::controller::{ControllerEvent, NoticeLevel};
use em_booking::domain::model::ServiceType;
use em_booking::utils::error::ErrorSeverity;
use em_booking::utils::{logger, validation::Validate};
use em_booking::{
    CliConfig, ConsoleHost, FormConfig, HttpMailer, SubmissionController, SubmissionStatus,
    SubmitAttempt, TokioScheduler,
};
use std::sync::Arc;
use tracing::Instrument;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let span = logger::booking_span("cli", &cli.page_url);
    run(cli).instrument(span).await
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    tracing::info!("🚖 Starting em-booking CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match &cli.config {
        Some(path) => FormConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => FormConfig::default(),
    };
    config.apply_env_overrides();

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(e.severity()));
    }

    let page_url = Url::parse(&cli.page_url).context("--page-url is not a valid URL")?;
    let endpoint = config.resolve_endpoint(&page_url)?;
    tracing::info!(
        "📮 Mail endpoint: {} ({})",
        endpoint.url,
        if endpoint.local_dev { "local development" } else { "deployed" }
    );

    let mailer = HttpMailer::new(endpoint.url.clone(), config.request_timeout())?;
    let settings = config.controller_settings(&endpoint)?;
    let controller = SubmissionController::new(
        mailer,
        Arc::new(TokioScheduler::current()?),
        ConsoleHost::new(cli.hash.clone()),
        config.catalog(),
        settings,
    );
    let mut events = controller.subscribe();

    if controller.mount() {
        tracing::info!("🔗 Service pre-selected from link: {}", controller.draft().service_type);
    }

    for (field, value) in cli.edits() {
        if let Err(e) = controller.update_field(field, value) {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    }

    let service = controller.draft().service_type;
    if !service.is_empty() && !ServiceType::is_known(&service) {
        tracing::warn!("Service '{}' is not one of the listed offers", service);
    }

    let attempt = controller.submit().await;
    tracing::debug!("Submission attempt: {:?}", attempt);

    // 等待控制器回到 Idle；送達時也要等交接結束，否則 runtime 關閉會丟掉交接計時器
    let mut awaiting_handoff = matches!(
        attempt,
        SubmitAttempt::Completed(em_booking::SubmissionOutcome::Delivered)
    );
    let mut back_to_idle = false;
    while let Some(event) = events.recv().await {
        match event {
            ControllerEvent::Notice(notice) => match notice.level {
                NoticeLevel::Success => println!("✅ {}", notice.text),
                NoticeLevel::Warning => println!("⚠️  {}", notice.text),
                NoticeLevel::Error => eprintln!("❌ {}", notice.text),
            },
            ControllerEvent::PopupBlocked(link) => {
                println!("🔗 {}", link);
                awaiting_handoff = false;
            }
            ControllerEvent::HandoffOpened(_) => awaiting_handoff = false,
            ControllerEvent::StatusChanged(SubmissionStatus::Idle) => back_to_idle = true,
            ControllerEvent::StatusChanged(_) => {}
        }
        if back_to_idle && !awaiting_handoff {
            break;
        }
    }

    match attempt {
        SubmitAttempt::Completed(em_booking::SubmissionOutcome::Delivered) => Ok(()),
        SubmitAttempt::Invalid(_) => std::process::exit(exit_code(ErrorSeverity::Low)),
        _ => std::process::exit(exit_code(ErrorSeverity::Medium)),
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 3,
        ErrorSeverity::Critical => 4,
    }
}
