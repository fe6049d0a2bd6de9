//! ファイルI/Oユーティリティ

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{VerifyError, VerifyResult};

/// Writer wrapper to propagate flush/close errors for file outputs.
#[must_use = "call .close() to propagate IO errors"]
pub enum Writer {
    Plain(BufWriter<File>),
    Stdout(io::Stdout),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Plain(f) => f.write(buf),
            Writer::Stdout(s) => s.write(buf),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => f.flush(),
            Writer::Stdout(s) => s.flush(),
        }
    }
}

impl Writer {
    /// Finalize the stream and flush underlying file/stdout.
    pub fn close(self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => {
                let mut file = f.into_inner().map_err(|e| e.into_error())?;
                file.flush()
            }
            Writer::Stdout(mut s) => s.flush(),
        }
    }
}

/// `-` は標準出力
pub fn open_writer<P: AsRef<Path>>(path: P) -> io::Result<Writer> {
    let p = path.as_ref();
    if p.to_string_lossy() == "-" {
        return Ok(Writer::Stdout(io::stdout()));
    }
    let f = File::create(p)?;
    Ok(Writer::Plain(BufWriter::new(f)))
}

/// ファイル全体を読み込む。不正な UTF-8 は置換文字にする。
pub fn read_text(path: &Path) -> VerifyResult<String> {
    let bytes = fs::read(path).map_err(|e| VerifyError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// ファイル全体を UTF-8 として読み込む。不正なバイト列は `Io` エラー（`InvalidData`）。
pub fn read_utf8(path: &Path) -> VerifyResult<String> {
    fs::read_to_string(path).map_err(|e| VerifyError::io(path, e))
}

/// `dir` 直下で `pattern` にマッチする通常ファイルをファイル名の昇順で返す
pub fn list_artifacts(dir: &Path, pattern: &str) -> VerifyResult<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(pattern)?;
    let entries = fs::read_dir(dir).map_err(|e| VerifyError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| VerifyError::io(dir, e))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
