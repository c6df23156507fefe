use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::{Message, SyslogError, SyslogResult};

/// Largest frame the reader accepts.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

// Enough digits for MAX_FRAME_LEN plus the separating space and stray newlines.
const MAX_PREFIX_LEN: u64 = 16;

/// Serialize `message` as an octet-counted frame: `<byte length> <message>`.
pub fn encode_frame(message: &Message) -> SyslogResult<String> {
    let body = message.to_rfc5424()?;
    Ok(format!("{} {}", body.len(), body))
}

/// Read the next octet-counted frame body from a stream.
///
/// Returns `Ok(None)` on a clean end of stream between frames.
pub async fn read_frame<R>(reader: &mut R) -> SyslogResult<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut prefix = Vec::new();
    let read = (&mut *reader)
        .take(MAX_PREFIX_LEN)
        .read_until(b' ', &mut prefix)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    let raw = String::from_utf8_lossy(&prefix);
    let digits = raw.trim_start_matches(['\r', '\n']).trim_end_matches(' ');
    if digits.is_empty() && !prefix.ends_with(b" ") {
        // Trailing newlines after the last frame.
        return Ok(None);
    }
    if !prefix.ends_with(b" ") || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(SyslogError::InvalidFrameLength(raw.into_owned()));
    }

    let len: usize = digits
        .parse()
        .map_err(|_| SyslogError::InvalidFrameLength(digits.to_string()))?;
    if len > MAX_FRAME_LEN {
        return Err(SyslogError::FrameTooLarge(len));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(String::from_utf8(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_reads_consecutive_frames() {
        let stream = b"5 hello3 abc\n2 hi";
        let mut reader = BufReader::new(&stream[..]);

        assert_eq!(read_frame(&mut reader).await.unwrap().as_deref(), Some("hello"));
        assert_eq!(read_frame(&mut reader).await.unwrap().as_deref(), Some("abc"));
        assert_eq!(read_frame(&mut reader).await.unwrap().as_deref(), Some("hi"));
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_length_counts_bytes_not_chars() {
        let frame = "6 héllo";
        assert_eq!("héllo".len(), 6);
        let mut reader = BufReader::new(frame.as_bytes());
        assert_eq!(read_frame(&mut reader).await.unwrap().as_deref(), Some("héllo"));
    }

    #[tokio::test]
    async fn test_trailing_newline_is_clean_eof() {
        let mut reader = BufReader::new(&b"2 ok\n"[..]);
        assert!(read_frame(&mut reader).await.unwrap().is_some());
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_garbage_prefix() {
        let mut reader = BufReader::new(&b"abc hello"[..]);
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(SyslogError::InvalidFrameLength(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversized_frame() {
        let mut reader = BufReader::new(&b"99999999 x"[..]);
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(SyslogError::FrameTooLarge(99_999_999))
        ));
    }

    #[tokio::test]
    async fn test_truncated_body_is_io_error() {
        let mut reader = BufReader::new(&b"10 short"[..]);
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(SyslogError::Io(_))
        ));
    }
}
