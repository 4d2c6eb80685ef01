//! 授权记录服务主入口

use entitlements_service::{
    config::{AppConfig, StorageBackend},
    db,
    middleware::AppState,
    repository::{EntitlementRepository, EntitlementStore, MemoryEntitlementStore},
    routes, telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// 运行模式
enum Command {
    Serve,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    let command = match args.get(1).map(String::as_str) {
        None | Some("serve") => Command::Serve,
        Some("migrate") => Command::Migrate,
        Some("--version") => {
            println!("entitlements-service {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--help") => {
            print_help();
            return Ok(());
        }
        Some(other) => {
            eprintln!("未知参数: {}", other);
            print_help();
            std::process::exit(1);
        }
    };

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("ENT_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config);

    match command {
        Command::Migrate => migrate(&config).await,
        Command::Serve => serve(config).await,
    }
}

/// 只执行迁移然后退出
async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    pool.close().await;
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Entitlements service starting...");

    // 3. 存储后端
    let store: Arc<dyn EntitlementStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            if config.database.auto_migrate {
                db::run_migrations(&pool).await?;
            }
            Arc::new(EntitlementRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data will not survive a restart");
            Arc::new(MemoryEntitlementStore::new())
        }
    };

    // 4. 构建应用状态与路由
    let app_state = Arc::new(AppState::new(config.clone(), store));
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        prefix = %config.api.prefix,
        "Server listening"
    );

    // 6. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("entitlements-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: entitlements-service [命令|选项]");
    println!();
    println!("命令:");
    println!("  serve         启动 HTTP 服务（默认）");
    println!("  migrate       执行数据库迁移后退出");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  所有配置通过 ENT_ 前缀的环境变量完成");
    println!("  可用选项请参考 .env.example");
}
