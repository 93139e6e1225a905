//! 知识库存储
//!
//! - 写：save_entry(query, body) 生成「时间戳_slug_随机后缀.md」，先写同目录临时文件再 no-clobber 落盘，
//!   读者永远看不到半写的文件，也不会覆盖已有条目（同一查询重复保存得到不同路径）
//! - 读：read / list_recent / search 只扫描目录，不做修改；没有更新与删除操作

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use thiserror::Error;

/// 文件名中 slug 的最大长度
const MAX_SLUG_CHARS: usize = 60;
/// 文件名冲突时重新生成后缀的次数
const MAX_NAME_ATTEMPTS: usize = 8;

/// 文件名时间戳前缀长度（`YYYYmmdd-HHMMSS-mmm`）
const TIMESTAMP_CHARS: usize = 19;

const QUERY_PREFIX: &str = "**Query**: ";
const CREATED_PREFIX: &str = "**Created**: ";
const BODY_SEPARATOR: &str = "\n---\n\n";

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Knowledge store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed knowledge entry: {0}")]
    Malformed(PathBuf),

    #[error("Could not allocate a unique file name under {0}")]
    NameExhausted(PathBuf),
}

/// 一条已保存的报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub path: PathBuf,
    pub query: String,
    pub created_at: DateTime<FixedOffset>,
    pub body: String,
}

impl KnowledgeEntry {
    /// 正文前 max_chars 个字符（列表展示用）
    pub fn preview(&self, max_chars: usize) -> String {
        if self.body.chars().count() > max_chars {
            self.body.chars().take(max_chars).collect::<String>() + "..."
        } else {
            self.body.clone()
        }
    }
}

/// 知识库：持有根目录，克隆开销只是一个 PathBuf
#[derive(Debug, Clone)]
pub struct KnowledgeRepository {
    base: PathBuf,
}

impl KnowledgeRepository {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// 保存一条报告并返回其路径；目录不存在时自动创建
    pub fn save_entry(&self, query: &str, content: &str) -> Result<PathBuf, KnowledgeError> {
        std::fs::create_dir_all(&self.base)?;
        let created_at = Utc::now();

        let mut tmp = tempfile::Builder::new()
            .prefix(".entry-")
            .suffix(".tmp")
            .tempfile_in(&self.base)?;
        tmp.write_all(render_entry(query, &created_at, content).as_bytes())?;
        tmp.as_file().sync_all()?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let path = self.base.join(entry_file_name(query, &created_at));
            match tmp.persist_noclobber(&path) {
                Ok(_) => {
                    tracing::info!(path = %path.display(), "knowledge entry saved");
                    return Ok(path);
                }
                Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    tmp = e.file;
                }
                Err(e) => return Err(e.error.into()),
            }
        }
        Err(KnowledgeError::NameExhausted(self.base.clone()))
    }

    /// 读取单条报告，正文与保存时完全一致
    pub fn read(&self, path: &Path) -> Result<KnowledgeEntry, KnowledgeError> {
        let text = std::fs::read_to_string(path)?;
        parse_entry(path, &text).ok_or_else(|| KnowledgeError::Malformed(path.to_path_buf()))
    }

    /// 最近的报告（新在前），最多 limit 条；跳过临时文件与无法解析的文件
    pub fn list_recent(&self, limit: usize) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        self.scan(limit, |_| true)
    }

    /// 按关键词（不区分大小写）过滤查询与正文，新在前，最多 limit 条
    pub fn search(&self, term: &str, limit: usize) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        let needle = term.to_lowercase();
        self.scan(limit, |e| {
            e.query.to_lowercase().contains(&needle) || e.body.to_lowercase().contains(&needle)
        })
    }

    fn scan(
        &self,
        limit: usize,
        keep: impl Fn(&KnowledgeEntry) -> bool,
    ) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        if !self.base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files: Vec<(String, std::time::SystemTime, PathBuf)> = std::fs::read_dir(&self.base)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                let name = path.file_name()?.to_str()?.to_string();
                if name.starts_with('.') || path.extension().map_or(true, |ext| ext != "md") {
                    return None;
                }
                let modified = e.metadata().and_then(|m| m.modified()).ok()?;
                Some((name, modified, path))
            })
            .collect();
        // 先比文件名中的时间戳前缀（毫秒），同一毫秒内再比修改时间，最后才比文件名
        files.sort_by(|a, b| {
            timestamp_prefix(&b.0)
                .cmp(timestamp_prefix(&a.0))
                .then(b.1.cmp(&a.1))
                .then(b.0.cmp(&a.0))
        });

        let mut entries = Vec::new();
        for (_, _, path) in files {
            if entries.len() >= limit {
                break;
            }
            match self.read(&path) {
                Ok(entry) if keep(&entry) => entries.push(entry),
                Ok(_) => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping knowledge entry"),
            }
        }
        Ok(entries)
    }
}

/// 文件名开头的 `YYYYmmdd-HHMMSS-mmm`；不符合格式的文件名整体参与比较
fn timestamp_prefix(name: &str) -> &str {
    name.get(..TIMESTAMP_CHARS).unwrap_or(name)
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[^a-z0-9]+").expect("static pattern"))
}

/// 查询转为文件名片段：小写、非字母数字折叠为 `-`、最多 60 字符，空时为 entry
fn slugify(query: &str) -> String {
    let lower = query.to_lowercase();
    let slug = slug_pattern().replace_all(&lower, "-");
    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_CHARS).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "entry".to_string()
    } else {
        slug.to_string()
    }
}

fn entry_file_name(query: &str, created_at: &DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}.md",
        created_at.format("%Y%m%d-%H%M%S-%3f"),
        slugify(query),
        &suffix[..8]
    )
}

fn render_entry(query: &str, created_at: &DateTime<Utc>, body: &str) -> String {
    format!(
        "# Research Report\n\n{QUERY_PREFIX}{}\n{CREATED_PREFIX}{}\n{BODY_SEPARATOR}{body}",
        escape_query(query),
        created_at.to_rfc3339()
    )
}

/// 查询写在单行头部：反斜杠与换行转义，读取时可逆还原
fn escape_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_entry(path: &Path, text: &str) -> Option<KnowledgeEntry> {
    let (header, body) = text.split_once(BODY_SEPARATOR)?;
    let query = unescape_query(header.lines().find_map(|l| l.strip_prefix(QUERY_PREFIX))?);
    let created_at = header
        .lines()
        .find_map(|l| l.strip_prefix(CREATED_PREFIX))
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())?;
    Some(KnowledgeEntry {
        path: path.to_path_buf(),
        query,
        created_at,
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path().join("kb").join("nested"));
        let path = repo.save_entry("Rust vs Go", "# Report").unwrap();
        assert!(path.exists());
        assert!(path.starts_with(repo.base_dir()));
    }

    #[test]
    fn test_same_query_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        let first = repo.save_entry("X", "report1").unwrap();
        let second = repo.save_entry("X", "report2").unwrap();
        assert_ne!(first, second);
        assert_eq!(repo.read(&first).unwrap().body, "report1");
        assert_eq!(repo.read(&second).unwrap().body, "report2");
    }

    #[test]
    fn test_entry_contains_query_and_body() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        let body = "## Summary\n\n---\n\nsection after a rule\n";
        let path = repo.save_entry("What is\nWASI?", body).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("**Query**: What is\\nWASI?\n"));
        assert!(raw.ends_with(body));

        let entry = repo.read(&path).unwrap();
        assert_eq!(entry.query, "What is\nWASI?");
        assert_eq!(entry.body, body);
    }

    #[test]
    fn test_file_name_shape() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        let path = repo.save_entry("Edge AI: 2026 outlook!", "b").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        let re = Regex::new(r"^\d{8}-\d{6}-\d{3}_edge-ai-2026-outlook_[0-9a-f]{8}\.md$").unwrap();
        assert!(re.is_match(name), "unexpected file name {name}");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello, World  "), "hello-world");
        assert_eq!(slugify("日本語"), "entry");
        assert_eq!(slugify(&"a b ".repeat(50)).len(), 59);
    }

    #[test]
    fn test_list_recent_newest_first_and_capped() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        for i in 0..4 {
            repo.save_entry(&format!("query {i}"), &format!("body {i}")).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("zzz-garbage.md"), "not an entry").unwrap();

        let recent = repo.list_recent(3).unwrap();
        let queries: Vec<&str> = recent.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["query 3", "query 2", "query 1"]);
    }

    #[test]
    fn test_query_escaping_is_reversible() {
        for query in ["plain", "a\\nb", "line1\r\nline2", "trailing\\", "  spaced  out  "] {
            assert_eq!(unescape_query(&escape_query(query)), query);
            assert!(!escape_query(query).contains('\n'));
        }
    }

    #[test]
    fn test_same_millisecond_saves_ordered_by_write_time() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        let created_at = Utc::now();
        let base = std::time::SystemTime::now();

        // 同一毫秒写入，slug 的字母序与写入顺序相反
        let writes = [("zzz first", "zzz-first_0000aaaa"), ("aaa second", "aaa-second_ffffffff")];
        for (i, (query, tail)) in writes.iter().enumerate() {
            let path = dir.path().join(format!("20261018-052512-957_{tail}.md"));
            std::fs::write(&path, render_entry(query, &created_at, "body")).unwrap();
            let file = std::fs::File::options().write(true).open(&path).unwrap();
            file.set_modified(base + std::time::Duration::from_secs(i as u64)).unwrap();
        }

        let queries: Vec<String> = repo.list_recent(10).unwrap().into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["aaa second", "zzz first"]);
    }

    #[test]
    fn test_list_recent_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path().join("absent"));
        assert!(repo.list_recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_search_matches_query_or_body() {
        let dir = TempDir::new().unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        repo.save_entry("Kubernetes cost", "node pools").unwrap();
        repo.save_entry("Serverless", "Cold starts on LAMBDA").unwrap();
        repo.save_entry("Databases", "postgres").unwrap();

        assert_eq!(repo.search("lambda", 10).unwrap().len(), 1);
        assert_eq!(repo.search("KUBERNETES", 10).unwrap()[0].query, "Kubernetes cost");
        assert!(repo.search("mongodb", 10).unwrap().is_empty());
    }

    #[test]
    fn test_read_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.md");
        std::fs::write(&path, "just text").unwrap();
        let repo = KnowledgeRepository::new(dir.path());
        assert!(matches!(repo.read(&path), Err(KnowledgeError::Malformed(_))));
    }

    #[test]
    fn test_preview() {
        let entry = KnowledgeEntry {
            path: PathBuf::from("p.md"),
            query: "q".into(),
            created_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00+00:00").unwrap(),
            body: "abcdef".into(),
        };
        assert_eq!(entry.preview(3), "abc...");
        assert_eq!(entry.preview(10), "abcdef");
    }
}
