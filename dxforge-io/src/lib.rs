use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use dxforge_core::document::Document;
use dxforge_core::resource::ResourceRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("record {name:?} not found in library")]
    NotFound { name: String },
}

/// 词典文件：图案或线型的文本定义库，按需解析并缓存命名记录。
/// 头行形如 `*名称,说明`，其后每行是逗号分隔的数值，字母标志位忽略。
#[derive(Debug)]
pub struct LibraryFile {
    text: String,
    cache: HashMap<String, ResourceRecord>,
}

impl LibraryFile {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let text = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(text))
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cache: HashMap::new(),
        }
    }

    /// 查找命名记录，命中过的直接走缓存。
    pub fn get(&mut self, name: &str) -> Result<&ResourceRecord, LibraryError> {
        if !self.cache.contains_key(name) {
            let record = parse_record(&self.text, name).ok_or_else(|| LibraryError::NotFound {
                name: name.to_string(),
            })?;
            self.cache.insert(name.to_string(), record);
        }
        Ok(&self.cache[name])
    }
}

fn parse_record(text: &str, name: &str) -> Option<ResourceRecord> {
    let header = format!("*{name},");
    let mut lines = text.lines();
    let inform = loop {
        let line = lines.next()?;
        if let Some(rest) = line.trim_start().strip_prefix(&header) {
            break rest.trim().to_string();
        }
    };
    let mut content = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            if content.is_empty() {
                continue;
            }
            break;
        }
        let Some(row) = parse_content_row(trimmed) else {
            break;
        };
        content.push(row);
    }
    if content.is_empty() {
        return None;
    }
    Some(ResourceRecord {
        name: name.to_string(),
        inform,
        content,
    })
}

fn parse_content_row(line: &str) -> Option<Vec<f64>> {
    let mut row = Vec::new();
    for token in line.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Ok(value) = token.parse::<f64>() {
            row.push(value);
            continue;
        }
        // 字母标志位不进入数值行
        if token.chars().all(|c| c.is_ascii_alphabetic()) {
            continue;
        }
        return None;
    }
    if row.is_empty() {
        return None;
    }
    Some(row)
}

/// 文档落盘的出口。
pub trait DocumentSaver {
    fn save_document(&self, document: &mut Document, path: &Path) -> Result<(), IoError>;
}

/// 组码文本写盘器。先写同目录临时文件再改名，避免留下半成品。
#[derive(Debug, Default)]
pub struct DxfSaver;

impl DxfSaver {
    pub fn new() -> Self {
        Self
    }

    /// 渲染整张图为组码文本，结尾不带换行。
    pub fn render(&self, document: &mut Document) -> String {
        document.build().render()
    }
}

impl DocumentSaver for DxfSaver {
    fn save_document(&self, document: &mut Document, path: &Path) -> Result<(), IoError> {
        let text = self.render(document);
        let mut tmp_name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("output"));
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);
        fs::write(&tmp_path, text.as_bytes()).map_err(|source| IoError::WriteError {
            path: tmp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(IoError::WriteError {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}
