mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "SSM ドキュメントを作成し、安定するまで見届ける。", long_about = None)]
struct Cli {
    /// ログを詳細に出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 1回だけ呼び出して結果を表示（継続用の状態を保存）
    Reconcile(InvocationArgs),
    /// 終端状態になるまで待機しながら呼び出しを繰り返す
    Apply(InvocationArgs),
    /// 保存されている状態を表示
    Status {
        /// 状態ファイルを置くディレクトリ
        #[arg(long, default_value = ".")]
        state_dir: PathBuf,
    },
    /// バージョン情報を表示
    Version,
}

/// reconcile / apply 共通の引数
#[derive(Args, Debug, Clone)]
pub struct InvocationArgs {
    /// リソースモデルのファイル (YAML / JSON)
    #[arg(short, long)]
    pub model: PathBuf,

    /// 状態ファイルを置くディレクトリ
    #[arg(long, default_value = ".")]
    pub state_dir: PathBuf,

    /// 冪等性トークン（省略時は自動生成）
    #[arg(long, env = "DOCFLOW_REQUEST_TOKEN")]
    pub request_token: Option<String>,

    /// スタック名（名前を自動生成するときの接頭辞）
    #[arg(short, long, env = "DOCFLOW_STACK_NAME")]
    pub stack_name: Option<String>,

    /// 作成時に付与するタグ (key=value、複数指定可)
    #[arg(short, long = "tag", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// イベントを JSON で出力
    #[arg(long)]
    pub json: bool,
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("タグは key=value 形式で指定してください: {}", raw)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr へ（stdout はイベント出力に使う）
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    let succeeded = match cli.command {
        Commands::Version => {
            println!("docflow {}", env!("CARGO_PKG_VERSION"));
            true
        }
        Commands::Status { state_dir } => {
            commands::status::handle(&state_dir).await?;
            true
        }
        Commands::Reconcile(args) => commands::reconcile::handle(&args, false).await?,
        Commands::Apply(args) => commands::reconcile::handle(&args, true).await?,
    };

    if !succeeded {
        eprintln!("{}", "✗ ドキュメントの作成に失敗しました".red().bold());
        std::process::exit(1);
    }

    Ok(())
}
