//! # アップロード対象ファイルと進捗表示

use std::path::Path;
use std::sync::Arc;

use fabric_types::{FileInfo, UploadProgress};

use crate::FabricError;

/// 進捗通知コールバック。ファイル単位の送信が終わるたびに全体の進捗を受け取る。
pub type ProgressCallback = Arc<dyn Fn(&UploadProgress) + Send + Sync>;

/// アップロードするファイル（メタ情報と内容）。
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub info: FileInfo,
    pub data: Vec<u8>,
}

impl UploadFile {
    /// メモリ上のバイト列から作る。MIMEタイプは拡張子から推定する。
    pub fn from_bytes(path: impl Into<String>, data: Vec<u8>) -> Self {
        let path = path.into();
        let info = FileInfo {
            mime_type: mime_type_for(&path).to_string(),
            size: data.len() as u64,
            path,
        };
        Self { info, data }
    }
}

/// 拡張子からMIMEタイプを推定する。
pub fn mime_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "json" => "application/json",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// ディレクトリ内の指定ファイルを読み込む。オブジェクト内のパスはファイル名になる。
pub async fn load_files(dir: &Path, names: &[String]) -> Result<Vec<UploadFile>, FabricError> {
    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let full_path = dir.join(name);
        let data = tokio::fs::read(&full_path)
            .await
            .map_err(|e| FabricError::Io(format!("{}: {e}", full_path.display())))?;
        let object_path = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name.as_str())
            .to_string();
        tracing::debug!(path = %full_path.display(), size = data.len(), "ファイルを読み込みました");
        files.push(UploadFile::from_bytes(object_path, data));
    }
    Ok(files)
}

/// 進捗を `"<ファイル名>: <割合>%"` の行にする（ファイル名順）。
///
/// 総バイト数が0のファイルは `100.0%` と表示する。
pub fn format_progress(progress: &UploadProgress) -> Vec<String> {
    progress
        .iter()
        .map(|(name, p)| {
            let percentage = if p.total == 0 {
                "100.0%".to_string()
            } else {
                format!("{:.1}%", 100.0 * p.uploaded as f64 / p.total as f64)
            };
            format!("{name}: {percentage}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_types::FileProgress;

    #[test]
    fn test_format_progress() {
        let mut progress = UploadProgress::new();
        progress.insert("b.mp4".to_string(), FileProgress { uploaded: 1, total: 3 });
        progress.insert("a.txt".to_string(), FileProgress { uploaded: 0, total: 0 });
        progress.insert("c.png".to_string(), FileProgress { uploaded: 10, total: 10 });

        assert_eq!(
            format_progress(&progress),
            vec!["a.txt: 100.0%", "b.mp4: 33.3%", "c.png: 100.0%"]
        );
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("clip.MP4"), "video/mp4");
        assert_eq!(mime_type_for("notes.txt"), "text/plain");
        assert_eq!(mime_type_for("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_load_files() {
        let dir = std::env::temp_dir().join(format!("fabric-upload-test-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("hello.txt"), b"hello").await.unwrap();

        let files = load_files(&dir, &["hello.txt".to_string()]).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].info.path, "hello.txt");
        assert_eq!(files[0].info.size, 5);
        assert_eq!(files[0].info.mime_type, "text/plain");

        let missing = load_files(&dir, &["missing.bin".to_string()]).await;
        assert!(matches!(missing, Err(FabricError::Io(_))));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
