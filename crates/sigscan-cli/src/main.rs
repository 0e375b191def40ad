use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sigscan_core::{load_options, EngineOptions, TaskEngine, TaskStatus};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

mod shell;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "sigscan", version, about = "按已知特征扫描目录中的恶意文件")]
struct Cli {
    /// 配置文件（TOML，读取其中的 [engine] 表）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 扫描线程数（"auto"=CPU 核心数，否则为不小于 1 的整数）
    #[arg(long, global = true, value_parser = parse_threads)]
    threads: Option<Threads>,

    #[command(subcommand)]
    command: Commands,
}

/// 线程数参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threads {
    Auto,
    Fixed(usize),
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描一个文件或目录，等待完成后输出统计
    Scan {
        /// 文件或目录路径，可使用 %userprofile% 代表主目录
        path: String,

        /// 以 JSON 输出最终状态
        #[arg(long)]
        json: bool,
    },
    /// 交互模式：scan / status / help / exit
    Shell,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let opts = build_options(cli.config.as_ref(), cli.threads)?;
    let engine = TaskEngine::new(&opts).context("start scan engine")?;

    match cli.command {
        Commands::Scan { path, json } => {
            info!(%path, "starting scan");
            let created = engine.create_task(&path);
            let status = engine
                .wait(created.id)
                .with_context(|| format!("task {} missing from registry", created.id))?;

            let mut out = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &status).context("write json status")?;
                writeln!(out)?;
            } else {
                writeln!(out, "{status}")?;
            }
            out.flush().ok();

            if let TaskStatus::Faulted { id, error } = &status {
                error!(task = id, %error, "scan failed");
                std::process::exit(1);
            }
        }
        Commands::Shell => {
            let stdin = io::stdin();
            let mut out = io::stdout().lock();
            shell::run(&engine, stdin.lock(), &mut out).context("interactive shell")?;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 只留给报告
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 合并配置文件与命令行参数（命令行优先）
fn build_options(config: Option<&PathBuf>, threads: Option<Threads>) -> Result<EngineOptions> {
    let mut opts = match config {
        Some(path) => load_options(path).with_context(|| format!("load config {}", path.display()))?,
        None => EngineOptions::default(),
    };
    match threads {
        Some(Threads::Auto) => opts.threads = None,
        Some(Threads::Fixed(n)) => opts.threads = Some(n),
        None => {}
    }
    Ok(opts)
}

/// 解析线程参数；0 与非数字直接报错，不回退为 auto
fn parse_threads(s: &str) -> Result<Threads, String> {
    if s.eq_ignore_ascii_case("auto") { return Ok(Threads::Auto); }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Threads::Fixed(n)),
        Ok(_) => Err("thread count must be at least 1".to_string()),
        Err(_) => Err(format!("expected \"auto\" or a positive integer, got {s:?}")),
    }
}
