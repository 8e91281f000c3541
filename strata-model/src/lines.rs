/// Accumulates raw response bytes and hands out complete lines.
///
/// Network chunks may end inside a multi-byte character, so decoding waits
/// until a full `\n`-terminated line is buffered.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Next complete line, trimmed. Blank lines are returned as empty strings.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let end = self.bytes.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.bytes.drain(..=end).collect();
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stream line is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Some(line.trim().to_string())
    }
}
