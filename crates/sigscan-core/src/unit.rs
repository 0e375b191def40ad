//! 单文件扫描单元
//!
//! 逐行读取并按整行查特征表，命中第一条即停止；一个文件最多归入一种检出类型。
//! 打开或读取失败只计入 `io_errors`，不会向外传播，也不影响同一任务的其它单元。
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::signatures::{DetectionKind, SignatureTable};
use crate::stats::ScanCounters;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 单元的结束方式（计数器已在单元内更新，此值仅用于汇合与日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Clean,
    Detected(DetectionKind),
    Failed,
}

/// 扫描单个文件并更新计数器
pub fn scan_file(path: &Path, table: &SignatureTable, counters: &ScanCounters) -> UnitOutcome {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to open file");
            counters.record_io_error();
            return UnitOutcome::Failed;
        }
    };
    counters.record_opened();

    let is_script = table.is_script_file(path);
    match first_match(BufReader::new(file), table, is_script) {
        Ok(Some(kind)) => {
            counters.record_detection(kind);
            debug!(path = %path.display(), ?kind, "signature detected");
            UnitOutcome::Detected(kind)
        }
        Ok(None) => UnitOutcome::Clean,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read file");
            counters.record_io_error();
            UnitOutcome::Failed
        }
    }
}

/// 一次读行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineRead {
    Line,
    /// 行超过上限，已丢弃到下一个换行符
    TooLong,
    Eof,
}

/// 读取一行（含结尾 `\n`）到 `buf`，最多保留 `cap` 字节。
/// 超长行不再累积，只继续消费输入直到换行，内存占用不超过 `cap` 加上 reader 自身的缓冲区。
pub(crate) fn read_line_capped<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    cap: usize,
) -> io::Result<LineRead> {
    buf.clear();
    let mut read_any = false;
    let mut too_long = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(b) => b,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if available.is_empty() {
            break;
        }
        read_any = true;
        let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };
        let used = chunk.len();
        if !too_long {
            if buf.len() + used <= cap {
                buf.extend_from_slice(chunk);
            } else {
                too_long = true;
                buf.clear();
            }
        }
        reader.consume(used);
        if done {
            break;
        }
    }
    Ok(match (read_any, too_long) {
        (false, _) => LineRead::Eof,
        (true, true) => LineRead::TooLong,
        (true, false) => LineRead::Line,
    })
}

/// 返回第一条命中行的类型；读到 EOF 仍无命中则为 None
pub(crate) fn first_match<R: BufRead>(
    mut reader: R,
    table: &SignatureTable,
    is_script: bool,
) -> io::Result<Option<DetectionKind>> {
    // 最长特征 + BOM + "\r\n"
    let cap = table.max_line_len() + UTF8_BOM.len() + 2;
    let mut buf = Vec::with_capacity(cap);
    let mut first = true;
    loop {
        match read_line_capped(&mut reader, &mut buf, cap)? {
            LineRead::Eof => return Ok(None),
            LineRead::TooLong => {
                first = false;
                continue;
            }
            LineRead::Line => {}
        }
        let mut line = trim_line_ending(&buf);
        if first {
            line = line.strip_prefix(UTF8_BOM).unwrap_or(line);
            first = false;
        }
        if let Some(kind) = table.detect(line, is_script) {
            return Ok(Some(kind));
        }
    }
}

// 去掉 "\n" 或 "\r\n"
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
