use clap::Parser;
use court_lookup::config::{CliArgs, LookupConfig, OutputFormat};
use court_lookup::utils::error::ErrorSeverity;
use court_lookup::utils::{logger, validation::Validate};
use court_lookup::{
    build_request, parse, to_case_key, CaseKey, CaseKeyResolver, CaseLookupResult,
    CourtApiClient, CourtDirectory, InfoKind, LookupError, LookupOutcome, LookupRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(args.verbose);
            exit_with(&e);
        }
    };

    // 初始化日誌
    logger::init_logger(config.logging.format, &config.logging.level, args.verbose);

    tracing::info!("Starting court-lookup CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let courts = config.court_directory();

    if args.list_courts {
        for (name, code) in courts.entries() {
            println!("{}\t{}", code, name);
        }
        return Ok(());
    }

    if let Err(e) = run(&args, &config, &courts).await {
        tracing::error!(
            "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn run(
    args: &CliArgs,
    config: &LookupConfig,
    courts: &CourtDirectory,
) -> court_lookup::Result<()> {
    let court = args.court.as_deref().unwrap_or_default();
    let office = courts.resolve(court)?;
    let kinds = args.info_kinds()?;

    // 所有驗證都在網路呼叫之前完成
    let key = match (&args.key, &args.case_number) {
        (Some(key), _) => key.parse::<CaseKey>()?,
        (None, Some(raw)) => to_case_key(&parse(raw)?)?,
        (None, None) => {
            return Err(LookupError::MalformedIdentifier {
                input: String::new(),
                reason: "either --case or --key is required".to_string(),
            })
        }
    };
    let request = build_request(&office, &key)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        for kind in &kinds {
            println!(
                "POST {}{}\n{}",
                config.upstream.base_url.trim_end_matches('/'),
                kind.endpoint_path(),
                serde_json::to_string(&request)?
            );
        }
        return Ok(());
    }

    let client = CourtApiClient::new(&config.upstream)?;
    let resolver = CaseKeyResolver::new(client);

    let outcome = lookup_with_retry(&resolver, &request, &kinds, config).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome, courts, &kinds),
    }

    Ok(())
}

/// 網路錯誤由呼叫端決定是否重試，這裡採線性退避
async fn lookup_with_retry(
    resolver: &CaseKeyResolver<CourtApiClient>,
    request: &LookupRequest,
    kinds: &[InfoKind],
    config: &LookupConfig,
) -> court_lookup::Result<LookupOutcome> {
    let mut attempt = 0;
    loop {
        match resolver.lookup_kinds(request, kinds).await {
            Err(e) if e.is_retryable() && attempt < config.retry.attempts => {
                attempt += 1;
                let delay = config.retry_delay() * attempt;
                tracing::warn!(
                    "🔄 Retry {}/{} in {:?}: {}",
                    attempt,
                    config.retry.attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

fn print_outcome(outcome: &LookupOutcome, courts: &CourtDirectory, kinds: &[InfoKind]) {
    let result = match outcome {
        LookupOutcome::Empty => {
            println!("조회 결과가 없습니다. 사건번호와 법원을 확인하세요.");
            return;
        }
        LookupOutcome::Found(result) => result,
    };

    let court_name = courts
        .name_for(result.court_office.as_str())
        .unwrap_or(result.court_office.as_str());
    println!("✅ 조회 완료: {} {}", court_name, result.case_key);

    for kind in kinds {
        println!("\n📋 {}", kind.label());
        match kind {
            InfoKind::CaseDetail => print_summary(result),
            InfoKind::Schedule => {
                if result.schedule.is_empty() {
                    println!("기일내역이 없습니다.");
                }
                for entry in &result.schedule {
                    println!(
                        "- {} | {} | {}",
                        or_dash(&entry.date),
                        or_dash(&entry.result),
                        or_dash(&entry.place)
                    );
                }
            }
            InfoKind::DocumentDelivery => {
                if result.documents.is_empty() {
                    println!("문건송달내역이 없습니다.");
                }
                for entry in &result.documents {
                    println!(
                        "- {} | 송달: {} | 수령: {}",
                        or_dash(&entry.document_name),
                        or_dash(&entry.sent_on),
                        or_dash(&entry.received_on)
                    );
                }
            }
        }
    }
}

fn print_summary(result: &CaseLookupResult) {
    let Some(summary) = &result.summary else {
        println!("사건내역 정보가 없습니다.");
        return;
    };

    println!("- 소재지: {}", or_dash(&summary.address));
    println!("- 물건종류: {}", or_dash(&summary.property_type));
    if let Some(name) = &summary.building_name {
        println!("- 건물명: {}", name);
    }
    if let Some(area) = summary.area_m2 {
        println!("- 면적: {}㎡", area);
    }
    if let Some(price) = summary.appraisal_price {
        println!("- 감정가: {}원", format_won(price));
    }
    if let Some(price) = summary.minimum_price {
        println!("- 최저가: {}원", format_won(price));
    }
    if let Some(rate) = summary.discount_rate() {
        println!("- 할인율: {}%", rate);
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn exit_with(e: &LookupError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
