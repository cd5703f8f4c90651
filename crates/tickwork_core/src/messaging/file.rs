//! # Message File Format
//!
//! Binary record layout, repeated until EOF:
//!
//! ```text
//! +-------------+-----------+-----+------+---------+------+
//! | tick: i64le | subsystem | to  | from | command | args |
//! +-------------+-----------+-----+------+---------+------+
//!                 (each string NUL-terminated, args joined with ';')
//! ```
//!
//! A tick of `-1` marks an immediate message. Any other negative tick is
//! invalid.
//!
//! Decoding is lenient per record:
//! - A record with an empty subsystem or command is skipped
//! - A record with invalid UTF-8 is skipped
//! - A record with a tick below `-1` is skipped
//! - A truncated trailing record is skipped
//!
//! Only a non-empty input with no complete record fails the whole decode.

use super::error::{MessageFileError, MessageFileResult};
use super::message::{Message, Timer, IMMEDIATE};
use std::fs;
use std::path::Path;

const TICK_LEN: usize = std::mem::size_of::<i64>();

/// Appends one encoded record to `buf`.
pub fn encode_message(message: &Message, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&message.timer().to_raw().to_le_bytes());
    for field in [
        message.subsystem(),
        message.to(),
        message.from(),
        message.command(),
    ] {
        buf.extend_from_slice(field.as_bytes());
        buf.push(0);
    }
    buf.extend_from_slice(message.arg_string().as_bytes());
    buf.push(0);
}

/// Encodes messages back to back.
pub fn encode_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Vec<u8> {
    let mut buf = Vec::new();
    for message in messages {
        encode_message(message, &mut buf);
    }
    buf
}

/// Decodes every valid record in `bytes`, in file order.
///
/// # Errors
///
/// Returns [`MessageFileError::Unreadable`] if `bytes` is non-empty and
/// holds no complete record.
pub fn decode_messages(bytes: &[u8]) -> MessageFileResult<Vec<Message>> {
    let mut reader = RecordReader::new(bytes);
    let mut messages = Vec::new();
    let mut complete = 0usize;
    let mut skipped = 0usize;

    loop {
        match reader.next_record() {
            Record::End => break,
            Record::Truncated => {
                tracing::warn!(
                    offset = reader.pos,
                    len = bytes.len(),
                    "truncated message record skipped"
                );
                skipped += 1;
                break;
            }
            Record::Invalid => {
                complete += 1;
                skipped += 1;
                tracing::warn!(record = complete, "message record with invalid text skipped");
            }
            Record::Fields(fields) => {
                complete += 1;
                if fields.subsystem.is_empty() || fields.command.is_empty() {
                    skipped += 1;
                    tracing::warn!(record = complete, "incomplete message record skipped");
                    continue;
                }
                if fields.tick < IMMEDIATE {
                    skipped += 1;
                    tracing::warn!(
                        record = complete,
                        tick = fields.tick,
                        "negative message tick skipped"
                    );
                    continue;
                }
                messages.push(fields.into_message());
            }
        }
    }

    if complete == 0 && !bytes.is_empty() {
        return Err(MessageFileError::Unreadable { len: bytes.len() });
    }
    tracing::debug!(loaded = messages.len(), skipped, "message records decoded");
    Ok(messages)
}

/// Reads and decodes a message file.
///
/// # Errors
///
/// Fails if the file cannot be read or holds no complete record.
pub fn read_message_file(path: impl AsRef<Path>) -> MessageFileResult<Vec<Message>> {
    let bytes = fs::read(path.as_ref())?;
    decode_messages(&bytes)
}

/// Encodes messages and writes them to `path`, replacing any existing file.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn write_message_file<'a>(
    path: impl AsRef<Path>,
    messages: impl IntoIterator<Item = &'a Message>,
) -> MessageFileResult<usize> {
    let mut count = 0usize;
    let mut buf = Vec::new();
    for message in messages {
        encode_message(message, &mut buf);
        count += 1;
    }
    fs::write(path.as_ref(), &buf)?;
    Ok(count)
}

enum Record<'a> {
    End,
    Truncated,
    Invalid,
    Fields(RecordFields<'a>),
}

struct RecordFields<'a> {
    tick: i64,
    subsystem: &'a str,
    to: &'a str,
    from: &'a str,
    command: &'a str,
    args: &'a str,
}

impl RecordFields<'_> {
    fn into_message(self) -> Message {
        Message::from_parts(
            Timer::from_raw(self.tick),
            self.subsystem,
            self.to,
            self.from,
            self.command,
            self.args,
        )
    }
}

struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn next_record(&mut self) -> Record<'a> {
        let bytes = self.bytes;
        if self.pos >= bytes.len() {
            return Record::End;
        }
        let Some(tick_bytes) = bytes.get(self.pos..self.pos + TICK_LEN) else {
            return Record::Truncated;
        };
        let mut tick_buf = [0u8; TICK_LEN];
        tick_buf.copy_from_slice(tick_bytes);
        let tick = i64::from_le_bytes(tick_buf);
        let mut cursor = self.pos + TICK_LEN;

        let mut raw: [&'a [u8]; 5] = [&[]; 5];
        for slot in &mut raw {
            let tail = &bytes[cursor..];
            let Some(end) = tail.iter().position(|&b| b == 0) else {
                return Record::Truncated;
            };
            *slot = &tail[..end];
            cursor += end + 1;
        }
        self.pos = cursor;

        let mut text: [&'a str; 5] = [""; 5];
        for (out, field) in text.iter_mut().zip(raw) {
            match std::str::from_utf8(field) {
                Ok(s) => *out = s,
                Err(_) => return Record::Invalid,
            }
        }
        let [subsystem, to, from, command, args] = text;
        Record::Fields(RecordFields {
            tick,
            subsystem,
            to,
            from,
            command,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(label: &str) -> PathBuf {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("test_messages_{label}_{id}.msg"))
    }

    fn raw_record(tick: i64, fields: [&str; 5]) -> Vec<u8> {
        let mut buf = tick.to_le_bytes().to_vec();
        for field in fields {
            buf.extend_from_slice(field.as_bytes());
            buf.push(0);
        }
        buf
    }

    #[test]
    fn test_layout() {
        let msg = Message::timed(5, "audio", "play", "boom;0.5");
        let bytes = encode_messages([&msg]);

        assert_eq!(&bytes[..8], &5i64.to_le_bytes());
        assert_eq!(&bytes[8..], b"audio\0\0\0play\0boom;0.5\0");
    }

    #[test]
    fn test_immediate_encodes_as_minus_one() {
        let bytes = encode_messages([&Message::new("system", "exit", "")]);
        assert_eq!(&bytes[..8], &(-1i64).to_le_bytes());
        let decoded = decode_messages(&bytes).unwrap();
        assert_eq!(decoded[0].timer(), Timer::Immediate);
    }

    #[test]
    fn test_decode_preserves_all_fields() {
        let original = vec![
            Message::new("entities", "damage", "3").at(4).sent_to("player").sent_from("trap"),
            Message::new("render", "flash", ""),
        ];
        let decoded = decode_messages(&encode_messages(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_empty_fields_skipped() {
        let mut bytes = raw_record(1, ["", "", "", "cmd", ""]);
        bytes.extend(raw_record(2, ["sys", "", "", "", ""]));
        bytes.extend(raw_record(3, ["sys", "", "", "cmd", "a"]));

        let decoded = decode_messages(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].timer(), Timer::At(3));
    }

    #[test]
    fn test_negative_tick_record_skipped() {
        let mut bytes = raw_record(-3, ["sys", "", "", "old", ""]);
        bytes.extend(raw_record(-1, ["sys", "", "", "now", ""]));

        let decoded = decode_messages(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].command(), "now");
        assert_eq!(decoded[0].timer(), Timer::Immediate);
    }

    #[test]
    fn test_truncated_tail_skipped() {
        let mut bytes = raw_record(1, ["sys", "", "", "cmd", ""]);
        bytes.extend_from_slice(&2i64.to_le_bytes());
        bytes.extend_from_slice(b"sys\0\0\0cm");

        let decoded = decode_messages(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_partial_tick_skipped() {
        let mut bytes = raw_record(1, ["sys", "", "", "cmd", ""]);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(decode_messages(&bytes).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_utf8_skipped() {
        let mut bytes = raw_record(1, ["sys", "", "", "cmd", ""]);
        bytes.extend_from_slice(&2i64.to_le_bytes());
        bytes.extend_from_slice(b"sys\0\0\0cmd\0\xff\xfe\0");
        bytes.extend(raw_record(3, ["sys", "", "", "cmd", ""]));

        let decoded = decode_messages(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].timer(), Timer::At(3));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let result = decode_messages(b"garbage");
        assert!(matches!(result, Err(MessageFileError::Unreadable { len: 7 })));
        assert!(decode_messages(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_file_write_and_read() {
        let path = temp_path("rw");
        let messages = vec![
            Message::timed(10, "spawner", "new", "orc;1;2"),
            Message::new("system", "exit", ""),
        ];

        assert_eq!(write_message_file(&path, &messages).unwrap(), 2);
        let read = read_message_file(&path).unwrap();
        assert_eq!(read, messages);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = temp_path("missing");
        assert!(matches!(
            read_message_file(&path),
            Err(MessageFileError::Io(_))
        ));
    }
}
