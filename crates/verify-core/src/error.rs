//! 検証結果パイプラインのエラー型

use std::path::PathBuf;

/// ファイル単位・環境単位のエラー。
///
/// フィールド単位の欠損はエラーにせず `None` として扱うため、ここには現れない。
#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    /// 結果ディレクトリが存在しない
    #[error("results dir not found: {}", .0.display())]
    ResultsDirMissing(PathBuf),

    /// ファイルの読み書きに失敗
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON として解釈できない
    #[error("failed to parse JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// コメント行を除去した結果が空
    #[error("no JSON content found in {}", .0.display())]
    EmptyDocument(PathBuf),

    /// トップレベルがオブジェクトでも配列でもない
    #[error("unrecognized JSON structure in {}", .0.display())]
    UnrecognizedShape(PathBuf),

    /// companion JSON のトップレベルがオブジェクトでない
    #[error("expected a JSON object in {}", .0.display())]
    NotAnObject(PathBuf),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl VerifyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// CLI の終了コード。2 は clap の使い方エラーが使う。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ResultsDirMissing(_) | Self::Pattern(_) => 1,
            Self::Io { .. }
            | Self::Json { .. }
            | Self::EmptyDocument(_)
            | Self::NotAnObject(_) => 3,
            Self::UnrecognizedShape(_) => 4,
        }
    }
}

pub type VerifyResult<T> = Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_read_and_shape_failures() {
        let read = VerifyError::io("a.json", std::io::Error::other("boom"));
        let shape = VerifyError::UnrecognizedShape(PathBuf::from("a.json"));
        let missing = VerifyError::ResultsDirMissing(PathBuf::from("results"));
        assert_eq!(read.exit_code(), 3);
        assert_eq!(shape.exit_code(), 4);
        assert_eq!(missing.exit_code(), 1);
        assert_eq!(missing.to_string(), "results dir not found: results");
    }
}
