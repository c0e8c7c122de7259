//! Replay of recorded traces.

use evlens_core::error::{EvlensError, Result};
use evlens_core::message::{Message, MessageSource};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Messages read from memory or from a recorded trace file.
///
/// Supported files:
/// - `.yaml` / `.yml`: a YAML sequence of messages
/// - `.json`: a JSON array of messages
/// - `.jsonl`: one JSON message per line, read lazily
pub struct ReplaySource {
    name: String,
    pending: Pending,
}

enum Pending {
    Buffered(std::vec::IntoIter<Message>),
    Lines {
        path: PathBuf,
        lines: Lines<BufReader<File>>,
        line_no: usize,
    },
}

impl ReplaySource {
    /// Replay messages held in memory.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            name: "replay".to_string(),
            pending: Pending::Buffered(messages.into_iter()),
        }
    }

    /// Open a recorded trace. The format follows the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let io_error = |e: std::io::Error| EvlensError::Io {
            path: path.to_path_buf(),
            cause: e.to_string(),
        };
        let parse_error = |cause: String| EvlensError::Parse {
            path: path.to_path_buf(),
            cause,
        };

        let pending = match extension.as_str() {
            "jsonl" => {
                let file = File::open(path).map_err(io_error)?;
                Pending::Lines {
                    path: path.to_path_buf(),
                    lines: BufReader::new(file).lines(),
                    line_no: 0,
                }
            }
            "json" => {
                let file = File::open(path).map_err(io_error)?;
                let messages: Vec<Message> = serde_json::from_reader(BufReader::new(file))
                    .map_err(|e| parse_error(e.to_string()))?;
                Pending::Buffered(messages.into_iter())
            }
            "yaml" | "yml" => {
                let text = std::fs::read_to_string(path).map_err(io_error)?;
                let messages: Vec<Message> =
                    serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?;
                Pending::Buffered(messages.into_iter())
            }
            other => {
                return Err(parse_error(format!(
                    "unsupported trace format '{other}', expected yaml, json or jsonl"
                )));
            }
        };

        debug!(path = %path.display(), format = %extension, "Opened trace file");
        Ok(Self {
            name: format!("replay:{}", path.display()),
            pending,
        })
    }
}

impl MessageSource for ReplaySource {
    fn next_message(&mut self) -> Result<Option<Message>> {
        match &mut self.pending {
            Pending::Buffered(messages) => Ok(messages.next()),
            Pending::Lines {
                path,
                lines,
                line_no,
            } => loop {
                let Some(line) = lines.next() else {
                    return Ok(None);
                };
                *line_no += 1;
                let line = line.map_err(|e| EvlensError::SourceRead {
                    cause: format!("{}:{}: {e}", path.display(), line_no),
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                let message = serde_json::from_str(&line).map_err(|e| EvlensError::SourceRead {
                    cause: format!("{}:{}: {e}", path.display(), line_no),
                })?;
                return Ok(Some(message));
            },
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn drain(source: &mut ReplaySource) -> Vec<String> {
        let mut kinds = Vec::new();
        while let Some(message) = source.next_message().unwrap() {
            kinds.push(message.kind().to_string());
        }
        kinds
    }

    #[test]
    fn in_memory() {
        let mut source = ReplaySource::from_messages(vec![
            Message::PacketBegin { stream_id: 0 },
            Message::PacketEnd { stream_id: 0 },
        ]);
        assert_eq!(source.name(), "replay");
        assert_eq!(drain(&mut source), vec!["packet_begin", "packet_end"]);
        assert!(source.next_message().unwrap().is_none());
    }

    #[test]
    fn yaml_and_json_files() {
        let yaml = write_trace(".yaml", "- type: stream_begin\n- type: stream_end\n");
        let mut source = ReplaySource::from_file(yaml.path()).unwrap();
        assert!(source.name().starts_with("replay:"));
        assert_eq!(drain(&mut source), vec!["stream_begin", "stream_end"]);

        let json = write_trace(".json", r#"[{"type": "packet_begin", "stream_id": 3}]"#);
        let mut source = ReplaySource::from_file(json.path()).unwrap();
        assert_eq!(
            source.next_message().unwrap(),
            Some(Message::PacketBegin { stream_id: 3 })
        );
    }

    #[test]
    fn jsonl_is_read_lazily() {
        let jsonl = write_trace(
            ".jsonl",
            "{\"type\": \"stream_begin\"}\n\n{\"type\": \"bogus\"\n{\"type\": \"stream_end\"}\n",
        );
        let mut source = ReplaySource::from_file(jsonl.path()).unwrap();
        assert_eq!(source.next_message().unwrap().unwrap().kind(), "stream_begin");

        // The broken line only fails once it is reached.
        let err = source.next_message().unwrap_err();
        assert_eq!(err.code(), "E301");
        assert!(err.to_string().contains(":3:"));
    }

    #[test]
    fn bad_files() {
        let broken = write_trace(".yaml", "- type: [unclosed\n");
        assert_eq!(ReplaySource::from_file(broken.path()).err().unwrap().code(), "E802");

        let unknown = write_trace(".txt", "");
        assert_eq!(ReplaySource::from_file(unknown.path()).err().unwrap().code(), "E802");

        assert_eq!(
            ReplaySource::from_file("/nonexistent/trace.json").err().unwrap().code(),
            "E901"
        );
    }
}
