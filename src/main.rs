//! # 相机采集工具 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与结果打印。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slm_camera::camera::{
    AcquisitionKind, CameraConfig, CameraService, CleanupReport, FileLibrarySource, RequestId,
    TempArtifactJanitor,
};
use slm_camera::error::AppError;
use slm_camera::{settings, storage};

#[derive(Parser)]
#[command(name = "slm-camera")]
#[command(about = "Acquire one image and turn it into a Base64 payload or a temp file")]
#[command(version)]
struct Cli {
    /// JSON settings file (tempDir, filePrefix, galleryDir, maxDecodedPixels, profile)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Override the temp artifact directory
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Acquire an image and print the response record as JSON
    Capture {
        /// Acquisition source
        #[arg(long, value_enum, default_value_t = Source::Library)]
        from: Source,

        /// Image file picked from the library; omitted means the user cancelled
        #[arg(long)]
        input: Option<PathBuf>,

        /// Options record, e.g. '{"quality":80,"targetWidth":640,"returnType":"fileURI"}'
        #[arg(long, default_value = "{}")]
        options: String,

        /// Correlation id; generated when omitted
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Remove every temp artifact and print the count
    Cleanup,
    /// Print temp directory usage
    Info,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    Camera,
    Library,
}

impl From<Source> for AcquisitionKind {
    fn from(source: Source) -> Self {
        match source {
            Source::Camera => AcquisitionKind::Camera,
            Source::Library => AcquisitionKind::Library,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = build_config(&cli)?;

    match cli.command {
        Command::Capture {
            from,
            input,
            options,
            request_id,
        } => {
            let options: serde_json::Value = serde_json::from_str(&options)
                .map_err(|e| AppError::Settings(format!("--options 不是合法 JSON: {}", e)))?;
            let request_id = request_id.map(RequestId::from).unwrap_or_else(RequestId::generate);

            let source = FileLibrarySource::new(input, config.max_decoded_pixels);
            let service = CameraService::new(config, source);
            let response = service.acquire(from.into(), request_id, &options).await?;
            print_json(&response)
        }
        Command::Cleanup => {
            let janitor = TempArtifactJanitor::new(config.temp_dir, config.file_prefix);
            print_json(&CleanupReport {
                cleaned: janitor.sweep(),
            })
        }
        Command::Info => print_json(&storage::temp_dir_info(&config.temp_dir, &config.file_prefix)),
    }
}

fn build_config(cli: &Cli) -> Result<CameraConfig, AppError> {
    let mut config = settings::load_config(cli.settings.as_deref())?;
    if let Some(dir) = &cli.temp_dir {
        config.temp_dir = dir.clone();
    }
    config.temp_dir = storage::resolve_temp_dir(Some(&config.temp_dir))?;
    Ok(config)
}

fn print_json(value: &impl Serialize) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Storage(format!("序列化输出失败: {}", e)))?;
    println!("{}", json);
    Ok(())
}
