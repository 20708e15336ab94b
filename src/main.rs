//! is-antibot 命令行工具
//! 对 HAR 文件、JSON 交换记录或命令行给出的 Header/Body/URL 执行检测，按行输出 JSON 结论

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use is_antibot::{
    AntibotDetector, DetectorConfig, Exchange, ExchangeRecord, HarLoader, HeaderCase,
    HeaderConverter, Verdict,
};

#[derive(Parser, Debug)]
#[command(name = "is-antibot", version, about = "Detect anti-bot, CAPTCHA and WAF challenge responses")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Header 名称按原样精确匹配
    #[arg(long, global = true)]
    exact_header_case: bool,

    /// body/url 参与匹配的最大字节数
    #[arg(long, global = true)]
    max_scan_bytes: Option<usize>,

    /// 格式化输出 JSON
    #[arg(long, global = true)]
    pretty: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 检测 HAR 文件（取第一条记录），多个文件并发处理
    Har {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// 检测 JSON 交换记录：{"headers": {...}, "body": "...", "url": "..."}，"-" 表示标准输入
    Json { file: PathBuf },
    /// 检测命令行给出的 Header/Body/URL
    Check {
        /// Header 行，格式 "name: value"，可重复
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// 响应体文件
        #[arg(long)]
        body_file: Option<PathBuf>,
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'a str,
    verdict: &'a Verdict,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli).await?;
    let detector = AntibotDetector::with_config(config);

    match &cli.command {
        Command::Har { files } => run_har(&detector, files, cli.pretty).await,
        Command::Json { file } => {
            let json = read_input(file).await?;
            let record = ExchangeRecord::from_json(&json)
                .with_context(|| format!("invalid exchange record: {}", file.display()))?;
            print_json(&detector.classify(&record.as_exchange()), cli.pretty)
        }
        Command::Check {
            headers,
            body_file,
            url,
        } => {
            let headers = HeaderConverter::parse_lines(headers.iter().map(String::as_str));
            let body = match body_file {
                Some(path) => tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read body file: {}", path.display()))?,
                None => String::new(),
            };
            let exchange = Exchange::new()
                .with_headers(&headers)
                .with_body(&body)
                .with_url(url.as_deref().unwrap_or(""));
            print_json(&detector.classify(&exchange), cli.pretty)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 配置文件 → 命令行参数覆盖
async fn load_config(cli: &Cli) -> Result<DetectorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            DetectorConfig::from_json(&json)
                .with_context(|| format!("invalid config: {}", path.display()))?
        }
        None => DetectorConfig::default(),
    };

    if cli.exact_header_case {
        config.header_case = HeaderCase::Exact;
    }
    if cli.max_scan_bytes.is_some() {
        config.max_scan_bytes = cli.max_scan_bytes;
    }
    config.validate()?;
    Ok(config)
}

async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("failed to read stdin")?;
        return Ok(input);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read input: {}", path.display()))
}

/// 每个文件一个任务，按输入顺序输出；单个文件失败不影响其他文件
async fn run_har(detector: &AntibotDetector, files: &[PathBuf], pretty: bool) -> Result<()> {
    let handles: Vec<_> = files
        .iter()
        .cloned()
        .map(|path| {
            let detector = detector.clone();
            tokio::spawn(async move {
                let har = tokio::fs::read_to_string(&path).await?;
                let record = HarLoader::parse(&har)?;
                Ok::<_, is_antibot::AntibotError>(detector.classify(&record.as_exchange()))
            })
        })
        .collect();

    let mut failed = 0usize;
    for (path, handle) in files.iter().zip(handles) {
        let source = path.display().to_string();
        match handle.await {
            Ok(Ok(verdict)) => print_json(&Report { source: &source, verdict: &verdict }, pretty)?,
            Ok(Err(e)) => {
                failed += 1;
                tracing::error!(source = %source, error = %e, "HAR classification failed");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(source = %source, error = %e, "HAR task aborted");
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} HAR files failed", failed, files.len()));
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let line = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", line);
    Ok(())
}
