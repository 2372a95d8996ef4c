// ==========================================
// 精密报价系统 - 命令行入口
// ==========================================
// 用法: precision-quote [db_path] <groups | show <quote_id> | settings>
// 输出: JSON
// ==========================================

use std::error::Error;

use precision_quote::app::{get_default_db_path, AppState};
use precision_quote::logging;

const USAGE: &str = "用法: precision-quote [db_path] <groups | show <quote_id> | settings>";

/// 解析后的命令
enum Command {
    Groups,
    Show(i64),
    Settings,
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    match args {
        [cmd] if cmd == "groups" => Ok(Command::Groups),
        [cmd] if cmd == "settings" => Ok(Command::Settings),
        [cmd, id] if cmd == "show" => id
            .parse::<i64>()
            .map(Command::Show)
            .map_err(|e| format!("报价ID无效 {}: {}", id, e)),
        _ => Err(USAGE.to_string()),
    }
}

/// 第一个参数不是命令名时视为数据库路径
fn split_db_path(args: Vec<String>) -> (Option<String>, Vec<String>) {
    let starts_with_command = args
        .first()
        .map(|first| matches!(first.as_str(), "groups" | "show" | "settings"))
        .unwrap_or(true);

    if starts_with_command {
        return (None, args);
    }

    let mut rest = args;
    let db_path = rest.remove(0);
    (Some(db_path), rest)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, rest) = split_db_path(args);
    let command = parse_command(&rest)?;

    let db_path = db_path.unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{} 使用数据库: {}", precision_quote::APP_NAME, precision_quote::VERSION, db_path);

    let state = AppState::new(db_path)?;

    let output = match command {
        Command::Groups => serde_json::to_string_pretty(&state.quote_api.list_quote_groups()?)?,
        Command::Show(quote_id) => serde_json::to_string_pretty(&state.quote_api.load_quote(quote_id)?)?,
        Command::Settings => serde_json::to_string_pretty(&state.catalog_api.get_rate_settings()?)?,
    };
    println!("{}", output);

    Ok(())
}
