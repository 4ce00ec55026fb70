//! `tesseract` command line adapter.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use image::GrayImage;

use super::{RecognitionError, SegmentationMode, TextRecognizer};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Deadline applied to every call unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the `tesseract` executable once per image.
///
/// Each call writes the image to a private scratch directory, runs
/// `tesseract <image> <out> [-l <lang>] --oem <oem> --psm <psm>` and reads
/// `<out>.txt` back. A call that outlives the timeout is killed.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    timeout: Duration,
    engine_mode: u8,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            timeout: DEFAULT_TIMEOUT,
            engine_mode: 3,
        }
    }
}

impl TesseractCli {
    /// Uses `tesseract` from `PATH` with a [`DEFAULT_TIMEOUT`] deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the executable at `binary` instead of looking it up on `PATH`.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Kills calls that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `--oem` engine mode. Default: 3
    pub fn with_engine_mode(mut self, engine_mode: u8) -> Self {
        self.engine_mode = engine_mode;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True when `tesseract --version` runs successfully.
    pub fn is_available(&self) -> bool {
        let available = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !available {
            tracing::debug!(target: "ocr", binary = %self.binary.display(), "tesseract not available");
        }
        available
    }

    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>, RecognitionError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if started.elapsed() >= self.timeout {
                // The child may have exited between the poll and the kill.
                let _ = child.kill();
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// True when tesseract's diagnostics report missing language data.
pub fn is_language_error(stderr: &str) -> bool {
    stderr.contains("Failed loading language")
        || stderr.contains("Error opening data file")
        || stderr.contains("couldn't load any languages")
}

impl TextRecognizer for TesseractCli {
    fn recognize(
        &self,
        image: &GrayImage,
        language: Option<&str>,
        mode: SegmentationMode,
    ) -> Result<String, RecognitionError> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("input.png");
        let output_base = scratch.path().join("output");
        let stderr_path = scratch.path().join("stderr.log");
        image.save(&input)?;

        let mut command = Command::new(&self.binary);
        command.arg(&input).arg(&output_base);
        if let Some(language) = language {
            command.arg("-l").arg(language);
        }
        command
            .arg("--oem")
            .arg(self.engine_mode.to_string())
            .arg("--psm")
            .arg(mode.psm().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(File::create(&stderr_path)?);

        let started = Instant::now();
        let mut child = command.spawn()?;
        let Some(status) = self.wait(&mut child)? else {
            let seconds = self.timeout.as_secs();
            tracing::warn!(target: "ocr", seconds, "tesseract timed out, process killed");
            return Err(RecognitionError::Timeout { seconds });
        };

        if !status.success() {
            let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
            if let Some(language) = language {
                if is_language_error(&stderr) {
                    return Err(RecognitionError::LanguageUnavailable {
                        language: language.to_string(),
                    });
                }
            }
            return Err(RecognitionError::Engine {
                message: format!("tesseract exited with {status}: {}", stderr.trim()),
            });
        }

        let text = fs::read_to_string(output_base.with_extension("txt"))?;
        tracing::trace!(
            target: "ocr",
            width = image.width(),
            height = image.height(),
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tesseract finished"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_error_detection() {
        assert!(is_language_error(
            "Error opening data file /usr/share/tessdata/vie.traineddata\n\
             Please make sure the TESSDATA_PREFIX environment variable is set"
        ));
        assert!(is_language_error("Failed loading language 'vie'\n"));
        assert!(!is_language_error("Warning: Invalid resolution 0 dpi."));
    }

    #[test]
    fn test_calls_have_a_deadline_by_default() {
        assert_eq!(TesseractCli::new().timeout(), Duration::from_secs(60));
        let cli = TesseractCli::new().with_timeout(Duration::from_secs(5));
        assert_eq!(cli.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let cli = TesseractCli::new().with_binary("/nonexistent/tesseract-binary");
        assert!(!cli.is_available());
    }

    #[test]
    fn test_missing_binary_reports_io_error() {
        let cli = TesseractCli::new().with_binary("/nonexistent/tesseract-binary");
        let err = cli
            .recognize(&GrayImage::new(4, 4), Some("eng"), SegmentationMode::SingleBlock)
            .unwrap_err();
        assert!(matches!(err, RecognitionError::Io(_)));
    }

    #[cfg(unix)]
    mod scripted {
        use super::super::{
            RecognitionError, SegmentationMode, TesseractCli, TextRecognizer,
        };
        use image::GrayImage;
        use std::fs::{self, File};
        use std::io::Write;
        use std::path::{Path, PathBuf};
        use std::thread;
        use std::time::{Duration, Instant};
        use std::os::unix::fs::PermissionsExt;

        /// Writes an executable shell script standing in for tesseract.
        fn fake_tesseract(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-tesseract");
            let mut file = File::create(&path).unwrap();
            writeln!(file, "#!/bin/sh\n{body}").unwrap();
            file.sync_all().unwrap();
            drop(file);
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        /// Spawning a script that was just written can race with forks from other
        /// test threads (ETXTBSY); retry those spawns a few times.
        fn recognize(
            cli: &TesseractCli,
            language: Option<&str>,
        ) -> Result<String, RecognitionError> {
            let image = GrayImage::new(8, 8);
            let mut attempt = 0;
            loop {
                match cli.recognize(&image, language, SegmentationMode::SingleBlock) {
                    Err(RecognitionError::Io(e)) if e.raw_os_error() == Some(26) && attempt < 10 => {
                        attempt += 1;
                        thread::sleep(Duration::from_millis(20));
                    }
                    other => return other,
                }
            }
        }

        #[test]
        fn test_reads_output_file_and_passes_arguments() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_tesseract(dir.path(), r#"echo "args: $3 $4 $5 $6 $7 $8" > "$2.txt""#);
            let cli = TesseractCli::new().with_binary(script);
            let text = recognize(&cli, Some("vie")).unwrap();
            assert_eq!(text, "args: -l vie --oem 3 --psm 6\n");

            let text = recognize(&cli, None).unwrap();
            assert_eq!(text.trim_end(), "args: --oem 3 --psm 6");
        }

        #[test]
        fn test_missing_language_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_tesseract(
                dir.path(),
                "echo \"Failed loading language 'vie'\" >&2\nexit 1",
            );
            let cli = TesseractCli::new().with_binary(script);
            let err = recognize(&cli, Some("vie")).unwrap_err();
            assert!(matches!(
                err,
                RecognitionError::LanguageUnavailable { ref language } if language == "vie"
            ));
        }

        #[test]
        fn test_other_failures_are_engine_errors() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_tesseract(dir.path(), "echo 'Image too small' >&2\nexit 1");
            let cli = TesseractCli::new().with_binary(script);
            let err = recognize(&cli, Some("eng")).unwrap_err();
            match err {
                RecognitionError::Engine { message } => assert!(message.contains("Image too small")),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn test_slow_engine_is_killed() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_tesseract(dir.path(), "sleep 10");
            let cli = TesseractCli::new()
                .with_binary(script)
                .with_timeout(Duration::from_millis(200));
            let started = Instant::now();
            let err = recognize(&cli, None).unwrap_err();
            assert!(matches!(err, RecognitionError::Timeout { .. }));
            assert!(started.elapsed() < Duration::from_secs(5));
        }
    }
}
