// ==========================================
// 节拍排程内核 - 命令行入口
// ==========================================
// 用法: takt-planner <command> [payload_json]
// 无参数时打印可用命令
// ==========================================

use anyhow::{anyhow, Result};

use takt_planner::app::{dispatch, AppState, COMMANDS};
use takt_planner::logging;

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        println!("==================================================");
        println!("{} v{}", takt_planner::APP_NAME, takt_planner::VERSION);
        println!("==================================================");
        println!();
        println!("用法: takt-planner <command> [payload_json]");
        println!();
        println!("可用命令:");
        for name in COMMANDS {
            println!("  {}", name);
        }
        return Ok(());
    };
    let payload = args.next().unwrap_or_default();

    let state = AppState::from_env().map_err(|e| anyhow!("无法初始化AppState: {}", e))?;
    tracing::info!(command = %command, db_path = ?state.db_path, "执行命令");

    match dispatch(&state, &command, &payload) {
        Ok(body) => {
            println!("{}", body);
            Ok(())
        }
        Err(body) => {
            eprintln!("{}", body);
            std::process::exit(1);
        }
    }
}
