//! NFG 徽章命令行工具
//!
//! 运维用入口：对指定人员评估徽章、统计持有者、列出已注册徽章。
//! 结果以 JSON 输出到 stdout，日志输出到 stderr。

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use badges_control::{Badge, BadgesHandler, BearerCount, CatalogTranslator, Person};
use badges_shared::{config::AppConfig, database::Database, observability};
use nfg_badges::{
    MemoryNfgRepository, NAMESPACE, NfgBadgesProvider, NfgProfileCounter, PersonProfileLookup,
    PgNfgRepository,
};

const SERVICE_NAME: &str = "nfg-badges";

/// NFG 徽章工具
#[derive(Parser, Debug)]
#[command(name = "nfg-badges")]
#[command(version, about = "NFG 徽章评估与持有者统计")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 评估指定人员可获得的徽章
    Evaluate {
        /// 人员 ID
        #[arg(short, long)]
        person_id: i64,
    },

    /// 统计徽章持有者
    ///
    /// 不指定徽章时统计全部徽章
    Bearers {
        /// 徽章名称，可带命名空间（如 nfg.nfg_access_lvl）
        #[arg(short, long)]
        badge: Option<String>,

        /// 过滤值（如访问等级 2），按 JSON 解析，失败时作为字符串
        #[arg(short, long, requires = "badge")]
        filter: Option<String>,
    },

    /// 列出已注册的徽章
    Describe,
}

/// 持有者统计输出行
#[derive(Debug, Serialize)]
struct BearerRow {
    badge: Badge,
    count: BearerCount,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..Default::default()
        }
    });

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    observability::init(&obs_config)?;

    info!(
        environment = %config.environment,
        locale = %config.badges.locale,
        "Configuration loaded"
    );

    let translator = match &config.badges.translations_path {
        Some(path) => CatalogTranslator::from_file(path)
            .with_context(|| format!("loading translations from {}", path.display()))?,
        None => {
            warn!("No translations configured, descriptions fall back to keys");
            CatalogTranslator::new()
        }
    };

    if let Commands::Describe = cli.command {
        // 列出徽章不需要访问数据库
        let repo = Arc::new(MemoryNfgRepository::new());
        let handler = build_handler(&translator, repo.clone(), repo)?;
        return print_json(&handler.available_badges());
    }

    let db = Database::connect(&config.database).await?;
    let repo = Arc::new(PgNfgRepository::new(db.pool().clone()));
    let handler = build_handler(&translator, repo.clone(), repo)?;

    let result = run(&handler, cli.command).await;
    db.close().await;
    result
}

/// 组装提供者与调度器
fn build_handler<L, S>(
    translator: &CatalogTranslator,
    lookup: Arc<L>,
    store: Arc<S>,
) -> Result<BadgesHandler>
where
    L: PersonProfileLookup + 'static,
    S: NfgProfileCounter + 'static,
{
    let provider = NfgBadgesProvider::new(translator, lookup, store)?;
    let mut handler = BadgesHandler::new();
    handler.register(Arc::new(provider))?;
    Ok(handler)
}

async fn run(handler: &BadgesHandler, command: Commands) -> Result<()> {
    match command {
        Commands::Evaluate { person_id } => {
            let event = handler.evaluate(Person::new(person_id)).await?;
            print_json(&event.into_badges())
        }
        Commands::Bearers { badge, filter } => {
            let filter_badge = badge.map(|name| parse_badge(&name, filter.as_deref()));
            let event = handler.list_bearers(filter_badge).await?;
            let rows: Vec<BearerRow> = event
                .into_counts()
                .into_iter()
                .map(|(badge, count)| BearerRow { badge, count })
                .collect();
            print_json(&rows)
        }
        Commands::Describe => print_json(&handler.available_badges()),
    }
}

/// 解析 `namespace.name` 或 `name`（默认 nfg 命名空间）
fn parse_badge(name: &str, filter: Option<&str>) -> Badge {
    let badge = match name.split_once('.') {
        Some((namespace, name)) => Badge::new(namespace, name),
        None => Badge::new(NAMESPACE, name),
    };

    match filter {
        Some(raw) => {
            let data = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            badge.with_data(data)
        }
        None => badge,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
