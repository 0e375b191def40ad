//! 交互模式：逐行读取命令并直接调用引擎
use sigscan_core::{TaskEngine, TaskId};
use std::io::{self, BufRead, Write};

const PROMPT: &str = "> ";

/// 单行命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Scan(String),
    /// None 表示全部任务
    Status(Option<TaskId>),
    Help,
    Exit,
    Empty,
    Invalid(String),
}

/// 解析一行输入；`scan` 之后的整段文本都作为路径（允许包含空格）
pub(crate) fn parse(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    match word {
        "" => Command::Empty,
        "scan" if rest.is_empty() => Command::Invalid("usage: scan <path>".to_string()),
        "scan" => Command::Scan(rest.to_string()),
        "status" if rest.is_empty() || rest == "all" => Command::Status(None),
        "status" => match rest.parse::<TaskId>() {
            Ok(id) => Command::Status(Some(id)),
            Err(_) => Command::Invalid(format!("Invalid task id: {rest}")),
        },
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        _ => Command::Invalid("Unrecognised command".to_string()),
    }
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\"scan <path>\" - create new scan task")?;
    writeln!(out, "\"status <id>\" - get info on specific task by id")?;
    writeln!(out, "\"status all\" - get info on all tasks in this session")?;
    writeln!(out, "\"exit\" or \"quit\" - stop the shell.")
}

/// 运行交互循环，直到 exit/quit 或输入结束
pub(crate) fn run<R: BufRead, W: Write>(engine: &TaskEngine, input: R, out: &mut W) -> io::Result<()> {
    writeln!(out, "Scanner shell started....")?;
    print_help(out)?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        match parse(&line?) {
            Command::Exit => break,
            Command::Empty => {}
            Command::Help => print_help(out)?,
            Command::Scan(path) => writeln!(out, "{}", engine.create_task(&path))?,
            Command::Status(Some(id)) => writeln!(out, "{}", engine.status_of(id))?,
            Command::Status(None) => {
                for status in engine.list_statuses() {
                    writeln!(out, "{status}")?;
                }
            }
            Command::Invalid(msg) => writeln!(out, "{msg}")?,
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigscan_core::{EngineOptions, NO_TASKS_MESSAGE};
    use std::io::Cursor;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("scan /tmp/My Files"), Command::Scan("/tmp/My Files".into()));
        assert_eq!(parse("  status 1234 "), Command::Status(Some(1234)));
        assert_eq!(parse("status all"), Command::Status(None));
        assert_eq!(parse("status"), Command::Status(None));
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("quit"), Command::Exit);
        assert_eq!(parse("exit"), Command::Exit);
        assert_eq!(parse(""), Command::Empty);
        assert!(matches!(parse("status abc"), Command::Invalid(_)));
        assert!(matches!(parse("scan"), Command::Invalid(_)));
        assert_eq!(parse("rescan"), Command::Invalid("Unrecognised command".into()));
    }

    #[test]
    fn test_session() {
        let engine = TaskEngine::new(&EngineOptions { threads: Some(1), ..Default::default() }).unwrap();
        let input = Cursor::new("status all\nscan \nscan   \nstatus 99\nbogus\nexit\nstatus all\n");
        let mut out = Vec::new();
        run(&engine, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(NO_TASKS_MESSAGE));
        assert!(text.contains("usage: scan <path>"));
        assert!(text.contains("Could not find task with id=99"));
        assert!(text.contains("Unrecognised command"));
        // exit 之后的输入不再处理
        assert_eq!(text.matches(NO_TASKS_MESSAGE).count(), 1);
        assert_eq!(engine.task_count(), 0);
    }

    #[test]
    fn test_scan_reports_created_task() {
        let engine = TaskEngine::new(&EngineOptions { threads: Some(1), ..Default::default() }).unwrap();
        let dir = tempfile::TempDir::new().unwrap();
        let input = Cursor::new(format!("scan {}\n", dir.path().display()));
        let mut out = Vec::new();
        run(&engine, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("Task {} successfully created.", sigscan_core::DEFAULT_FIRST_ID)));
    }
}
