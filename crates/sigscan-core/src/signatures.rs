//! 特征表：整行精确匹配 → 检出类型
//!
//! 表在引擎启动时构建一次，之后只读，通过 `Arc` 在所有扫描单元之间共享，无需加锁。
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// 检出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    /// 注入的脚本标签（仅对 `.js` 文件有效）
    ScriptInjection,
    /// 破坏性 shell 命令
    DestructiveCommand,
    /// 恶意加载器调用
    MaliciousLoader,
}

impl DetectionKind {
    pub const ALL: [DetectionKind; 3] = [
        DetectionKind::ScriptInjection,
        DetectionKind::DestructiveCommand,
        DetectionKind::MaliciousLoader,
    ];

    /// 该类型是否只在脚本文件中生效
    pub fn requires_script_file(self) -> bool {
        matches!(self, DetectionKind::ScriptInjection)
    }
}

/// 内置特征（行内容, 类型）
const BUILTIN: [(&str, DetectionKind); 3] = [
    ("<script>evil_script()</script>", DetectionKind::ScriptInjection),
    (r"rm -rf %userprofile%\Documents", DetectionKind::DestructiveCommand),
    ("Rundll32 sus.dll SusEntry", DetectionKind::MaliciousLoader),
];

/// 不可变特征表
#[derive(Debug)]
pub struct SignatureTable {
    entries: HashMap<Box<[u8]>, DetectionKind>,
    max_line_len: usize,
}

impl SignatureTable {
    /// 构建内置的三条特征
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(line, kind)| (line.as_bytes().to_vec().into_boxed_slice(), *kind))
            .collect();
        let max_line_len = BUILTIN.iter().map(|(line, _)| line.len()).max().unwrap_or(0);
        Self { entries, max_line_len }
    }

    /// 按整行精确查找（不做任何条件判断）
    pub fn lookup(&self, line: &[u8]) -> Option<DetectionKind> {
        self.entries.get(line).copied()
    }

    /// 最长特征行的字节数；更长的行不可能命中
    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// 判断路径是否为脚本文件（文件名以 `.js` 结尾，按原始字节比较）
    pub fn is_script_file(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|n| n.as_encoded_bytes().ends_with(b".js"))
    }

    /// 查找并应用类型条件：ScriptInjection 仅在 `is_script` 为真时命中
    pub fn detect(&self, line: &[u8], is_script: bool) -> Option<DetectionKind> {
        self.lookup(line)
            .filter(|kind| !kind.requires_script_file() || is_script)
    }

}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::builtin()
    }
}
