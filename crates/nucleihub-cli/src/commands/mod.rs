pub mod download;
pub mod duplicate;
pub mod update;
pub mod updatecheck;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Non-blank lines of `reader`, trimmed.
pub async fn read_lines(reader: impl AsyncBufRead + Unpin) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut source = reader.lines();
    while let Some(line) = source.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_owned());
        }
    }
    Ok(lines)
}

/// Non-blank lines of standard input, trimmed.
pub async fn read_stdin_lines() -> std::io::Result<Vec<String>> {
    read_lines(BufReader::new(tokio::io::stdin())).await
}
