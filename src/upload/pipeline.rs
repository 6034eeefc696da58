// Upload pipeline
// Iterates multipart file parts, validates each by content, and streams it to disk

use super::namer::{self, FileNamer};
use super::part::FilePart;
use super::{validator, UploadedFile};
use crate::config::UploadConfig;
use crate::error::{Result, ToolkitError};
use crate::logger;
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{HeaderMap, Request};
use multer::Multipart;
use rand::rngs::StdRng;
use rand::RngCore;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Upload pipeline bound to one configuration and one name generator
///
/// Holds no state between calls besides the random generator, so a fresh
/// pipeline per request is cheap.
pub struct UploadPipeline<R = StdRng> {
    config: UploadConfig,
    namer: FileNamer<R>,
}

impl UploadPipeline<StdRng> {
    pub fn new(config: UploadConfig) -> Self {
        Self::with_namer(config, FileNamer::from_entropy())
    }
}

impl<R: RngCore> UploadPipeline<R> {
    pub const fn with_namer(config: UploadConfig, namer: FileNamer<R>) -> Self {
        Self { config, namer }
    }

    pub const fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Store every file part of a `multipart/form-data` request
    ///
    /// Parts without a file name (plain form values) are skipped. The first
    /// rejected part aborts the call; files stored for earlier parts stay on disk.
    pub async fn upload_files<B>(&mut self, req: Request<B>) -> Result<Vec<UploadedFile>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let boundary = boundary_from_headers(req.headers())?;
        self.upload_body(req.into_body(), &boundary).await
    }

    /// Like `upload_files`, but exactly one file must be uploaded
    pub async fn upload_one_file<B>(&mut self, req: Request<B>) -> Result<UploadedFile>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let mut files = self.upload_files(req).await?;
        match files.len() {
            0 => Err(ToolkitError::NoFile),
            1 => Ok(files.remove(0)),
            n => Err(ToolkitError::TooManyFiles(n)),
        }
    }

    /// Store every file part of a multipart body delimited by `boundary`
    pub async fn upload_body<B>(&mut self, body: B, boundary: &str) -> Result<Vec<UploadedFile>>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        create_dir_if_not_exist(&self.config.directory).await?;

        let limit = self.config.file_size_limit();
        let mut multipart = Multipart::new(body.into_data_stream(), boundary);
        let mut uploaded = Vec::new();

        while let Some(mut field) = multipart.next_field().await? {
            // An empty file input arrives with `filename=""` and is a plain value
            let Some(raw_name) = field
                .file_name()
                .filter(|name| !name.trim().is_empty())
                .map(ToString::to_string)
            else {
                while field.chunk().await?.is_some() {}
                continue;
            };
            let original_name = namer::base_name(&raw_name)
                .ok_or_else(|| {
                    ToolkitError::Multipart(format!("invalid file name \"{raw_name}\""))
                })?
                .to_string();

            let part = FilePart::new(field, original_name, limit);
            uploaded.push(self.store_part(part).await?);
        }

        Ok(uploaded)
    }

    async fn store_part(&mut self, mut part: FilePart<'_>) -> Result<UploadedFile> {
        let content_type = part.sniff().await?;
        if !validator::is_allowed(content_type, &self.config.allowed_types) {
            logger::log_upload_rejected(part.original_name(), content_type);
            return Err(ToolkitError::UnsupportedType(content_type.to_string()));
        }

        let (new_name, path, file) = self.open_destination(part.original_name()).await?;
        let size_bytes = match copy_part(&mut part, file).await {
            Ok(size) => size,
            Err(e @ ToolkitError::FileTooLarge { .. }) => {
                logger::log_upload_rejected(part.original_name(), &e.to_string());
                if let Err(remove_err) = fs::remove_file(&path).await {
                    logger::log_warning(&format!(
                        "Failed to remove oversized upload {}: {remove_err}",
                        path.display()
                    ));
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let file = UploadedFile {
            original_name: part.original_name().to_string(),
            new_name,
            size_bytes,
        };
        logger::log_upload_accepted(&file, content_type);
        Ok(file)
    }

    /// Create the destination file
    ///
    /// Random names never replace an existing file; kept names overwrite.
    async fn open_destination(&mut self, original_name: &str) -> Result<(String, PathBuf, File)> {
        if !self.config.rename {
            let path = self.config.directory.join(original_name);
            let file = File::create(&path).await?;
            return Ok((original_name.to_string(), path, file));
        }

        loop {
            let name = self.namer.name(original_name, true);
            let path = self.config.directory.join(&name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((name, path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    logger::log_debug(&format!("Random name collision on {name}, retrying"));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Stream the part into `file`, returning the number of bytes written
async fn copy_part(part: &mut FilePart<'_>, mut file: File) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = part.next_chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Extract the multipart boundary from the request's Content-Type
pub fn boundary_from_headers(headers: &HeaderMap) -> Result<String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(ToolkitError::MissingBoundary)?;
    multer::parse_boundary(content_type).map_err(|_| ToolkitError::MissingBoundary)
}

/// Create `path` and its parents; an existing directory is not an error
pub async fn create_dir_if_not_exist(path: impl AsRef<Path>) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);
    builder.create(path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrKind;
    use futures_util::stream;
    use http_body_util::{Full, StreamBody};
    use hyper::body::Frame;
    use rand::SeedableRng;
    use std::convert::Infallible;

    const BOUNDARY: &str = "X-WEBTOOLS-BOUNDARY";
    const PNG: &[u8] = b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06";

    /// (field name, file name, content)
    type TestPart<'a> = (&'a str, Option<&'a str>, &'a [u8]);

    fn multipart_bytes(parts: &[TestPart<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn request(parts: &[TestPart<'_>]) -> Request<Full<Bytes>> {
        Request::post("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Full::new(Bytes::from(multipart_bytes(parts))))
            .unwrap()
    }

    fn pipeline(config: UploadConfig) -> UploadPipeline<StdRng> {
        UploadPipeline::with_namer(config, FileNamer::new(StdRng::seed_from_u64(42)))
    }

    fn stored_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_upload_files_allow_list() {
        struct Case {
            name: &'static str,
            allowed: &'static [&'static str],
            rename: bool,
            error_expected: bool,
        }
        let cases = [
            Case { name: "allowed no rename", allowed: &["image/jpeg", "image/png"], rename: false, error_expected: false },
            Case { name: "allowed rename", allowed: &["image/jpeg", "image/png"], rename: true, error_expected: false },
            Case { name: "not allowed", allowed: &["image/jpeg"], rename: false, error_expected: true },
        ];

        for case in cases {
            let dir = tempfile::tempdir().unwrap();
            let upload_dir = dir.path().join("uploads");
            let config = UploadConfig::new(&upload_dir)
                .with_allowed_types(case.allowed.iter().copied())
                .with_rename(case.rename);

            let result = pipeline(config)
                .upload_files(request(&[("file", Some("testdata/img.png"), PNG)]))
                .await;

            if case.error_expected {
                let err = result.expect_err(case.name);
                assert_eq!(err.kind(), ErrKind::UnsupportedType, "{}", case.name);
                assert!(stored_files(&upload_dir).is_empty(), "{}", case.name);
                continue;
            }

            let files = result.unwrap_or_else(|e| panic!("{}: {e}", case.name));
            assert_eq!(files.len(), 1);
            let file = &files[0];
            assert_eq!(file.original_name, "img.png");
            assert_eq!(file.size_bytes, PNG.len() as u64);
            let stored = std::fs::read(upload_dir.join(&file.new_name)).unwrap();
            assert_eq!(stored, PNG);
            if case.rename {
                assert_eq!(file.new_name.len(), namer::RANDOM_NAME_LEN + ".png".len());
                assert!(file.new_name.ends_with(".png"));
            } else {
                assert_eq!(file.new_name, "img.png");
            }
        }
    }

    #[tokio::test]
    async fn test_multiple_files_get_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(&[
            ("file", Some("a.png"), PNG),
            ("title", None, b"holiday"),
            ("file", Some("b.png"), PNG),
            ("other", Some("notes.txt"), b"plain words"),
        ]);

        let files = pipeline(UploadConfig::new(dir.path()))
            .upload_files(req)
            .await
            .unwrap();

        assert_eq!(files.len(), 3);
        let mut names: Vec<_> = files.iter().map(|f| f.new_name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
        assert_eq!(stored_files(dir.path()), names);
        assert_eq!(files[2].size_bytes, 11);
    }

    #[tokio::test]
    async fn test_earlier_files_kept_when_later_part_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig::new(dir.path())
            .with_allowed_types(["image/png"])
            .with_rename(false);
        let req = request(&[
            ("file", Some("ok.png"), PNG),
            ("file", Some("evil.png"), b"#!/bin/sh\necho hi\n"),
        ]);

        let err = pipeline(config).upload_files(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrKind::UnsupportedType);
        assert!(err.to_string().contains("text/plain"));
        assert_eq!(stored_files(dir.path()), vec!["ok.png".to_string()]);
    }

    #[tokio::test]
    async fn test_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig::new(dir.path()).with_max_file_size(100);
        let big = vec![b'a'; 1000];

        let err = pipeline(config)
            .upload_files(request(&[("file", Some("big.txt"), &big)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrKind::FileTooLarge);
        assert!(stored_files(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_file_at_limit_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig::new(dir.path()).with_max_file_size(PNG.len() as u64);
        let files = pipeline(config)
            .upload_files(request(&[("file", Some("img.png"), PNG)]))
            .await
            .unwrap();
        assert_eq!(files[0].size_bytes, PNG.len() as u64);
    }

    #[tokio::test]
    async fn test_streamed_body_in_small_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = PNG.to_vec();
        content.extend(std::iter::repeat(0xAB).take(4096));
        let raw = multipart_bytes(&[("file", Some("img.png"), &content)]);

        let frames: Vec<std::result::Result<Frame<Bytes>, Infallible>> = raw
            .chunks(7)
            .map(|c| Ok(Frame::data(Bytes::copy_from_slice(c))))
            .collect();
        let body = StreamBody::new(stream::iter(frames));

        let config = UploadConfig::new(dir.path()).with_allowed_types(["image/png"]);
        let files = pipeline(config).upload_body(body, BOUNDARY).await.unwrap();

        assert_eq!(files[0].size_bytes, content.len() as u64);
        let stored = std::fs::read(dir.path().join(&files[0].new_name)).unwrap();
        assert_eq!(stored, content);
    }

    #[tokio::test]
    async fn test_empty_file_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(&[
            ("file", Some("a.txt"), b"first file"),
            ("attachment", Some(""), b""),
            ("comment", None, b"see attached"),
        ]);

        let files = pipeline(UploadConfig::new(dir.path()).with_rename(false))
            .upload_files(req)
            .await
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].new_name, "a.txt");
        assert_eq!(stored_files(dir.path()), vec!["a.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_kept_names_overwrite_within_one_call() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(&[
            ("file", Some("same.txt"), b"first version"),
            ("file", Some("same.txt"), b"second"),
        ]);

        let files = pipeline(UploadConfig::new(dir.path()).with_rename(false))
            .upload_files(req)
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.new_name == "same.txt"));
        assert_eq!(std::fs::read(dir.path().join("same.txt")).unwrap(), b"second");
        assert_eq!(files[1].size_bytes, 6);
    }

    #[tokio::test]
    async fn test_dot_file_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline(UploadConfig::new(dir.path()))
            .upload_files(request(&[("file", Some(".."), PNG)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrKind::Multipart);
    }

    #[tokio::test]
    async fn test_client_path_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let config = UploadConfig::new(&upload_dir).with_rename(false);

        let files = pipeline(config)
            .upload_files(request(&[("file", Some("../../escape.png"), PNG)]))
            .await
            .unwrap();

        assert_eq!(files[0].new_name, "escape.png");
        assert!(upload_dir.join("escape.png").exists());
        assert!(!dir.path().join("escape.png").exists());
    }

    #[tokio::test]
    async fn test_upload_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = pipeline(UploadConfig::new(dir.path()))
            .upload_one_file(request(&[("file", Some("img.png"), PNG)]))
            .await
            .unwrap();
        assert!(dir.path().join(&file.new_name).exists());

        let err = pipeline(UploadConfig::new(dir.path()))
            .upload_one_file(request(&[("title", None, b"no file")]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrKind::NoFile);

        let err = pipeline(UploadConfig::new(dir.path()))
            .upload_one_file(request(&[
                ("file", Some("a.png"), PNG),
                ("file", Some("b.png"), PNG),
            ]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrKind::TooManyFiles);
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let req = Request::post("/upload")
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let err = pipeline(UploadConfig::new(dir.path()))
            .upload_files(req)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrKind::MissingBoundary);
    }

    #[tokio::test]
    async fn test_create_dir_if_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("myDir/nested");

        create_dir_if_not_exist(&target).await.unwrap();
        create_dir_if_not_exist(&target).await.unwrap();
        assert!(target.is_dir());

        let file_path = dir.path().join("plain-file");
        std::fs::write(&file_path, b"x").unwrap();
        let err = create_dir_if_not_exist(&file_path).await.unwrap_err();
        assert_eq!(err.kind(), ErrKind::Io);
    }
}
