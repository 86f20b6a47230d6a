use std::path::PathBuf;

use dxforge_config::{AppConfig, ConfigError, ResourceConfig};
use dxforge_core::document::Document;
use dxforge_io::{DocumentSaver, DxfSaver, LibraryFile};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod demo;

fn main() {
    let mut args = std::env::args().skip(1);
    let mut config_override: Option<PathBuf> = None;
    let mut output_override: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` 需要提供配置文件路径");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            "--output" => {
                let Some(path) = args.next() else {
                    eprintln!("`--output` 需要提供输出文件路径");
                    std::process::exit(1);
                };
                output_override = Some(PathBuf::from(path));
            }
            other => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
        }
    }

    let config = load_configuration(config_override);
    init_logging(&config);
    info!("启动 DXForge 演示应用");

    let mut document = Document::new();
    apply_resource_files(&config.resources, &mut document);

    if let Err(err) = demo::populate_demo_document(&mut document) {
        error!(error = %err, "构建演示图形失败");
        std::process::exit(1);
    }

    let target = output_override.unwrap_or_else(|| config.output.target.clone());
    if let Err(err) = DxfSaver::new().save_document(&mut document, &target) {
        error!(path = %target.display(), error = %err, "写出图形文件失败");
        std::process::exit(1);
    }
    info!(
        path = %target.display(),
        model_entities = document.model_space().entities().len(),
        paper_entities = document.paper_space().entities().len(),
        blocks = document.blocks().len(),
        "演示图形已写出"
    );
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}

/// 用配置指向的词典文件覆盖文档里的内置图案与线型定义。
fn apply_resource_files(resources: &ResourceConfig, document: &mut Document) {
    if let Some(path) = resources.pattern_file.as_deref() {
        match LibraryFile::open(path) {
            Ok(mut library) => match library.get(demo::DEMO_PATTERN) {
                Ok(record) => {
                    document.pattern_resource_mut().insert(record.clone());
                    info!(path = %path.display(), pattern = demo::DEMO_PATTERN, "已加载外部填充图案");
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "词典文件缺少演示所需图案，改用内置定义");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "无法打开图案词典文件，改用内置定义");
            }
        }
    }
    if let Some(path) = resources.linetype_file.as_deref() {
        match LibraryFile::open(path) {
            Ok(mut library) => match library.get(demo::DEMO_LINE_TYPE) {
                Ok(record) => {
                    document.line_type_resource_mut().insert(record.clone());
                    info!(path = %path.display(), line_type = demo::DEMO_LINE_TYPE, "已加载外部线型");
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "词典文件缺少演示所需线型，改用内置定义");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "无法打开线型词典文件，改用内置定义");
            }
        }
    }
}
