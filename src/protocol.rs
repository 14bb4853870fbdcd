use crate::error::{LinkError, Result};

// Wire format: every request frame is [cmd:u8][len:i16le][payload...], where
// len counts the payload BYTES that follow in the same frame (2 for a single
// int16, 0 for none). Responses carry no command byte and no length; their
// framing is positional and known a priori from the request that was sent.
// Per-sample waveform frames carry no header at all, just the raw int16.
// There is deliberately no checksum and no resync marker.

/// The closed set of command tags understood by the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Host pushes a scalar (the sampling parameter) to the target.
    PushScalar = 1,
    /// Host asks the target to report its scalar.
    PullScalarRequest = 2,
    /// Header announcing how many bare sample frames follow.
    PushWaveformHeader = 3,
    /// Host asks the target to stream back its captured waveform.
    PullWaveformRequest = 4,
}

impl TryFrom<u8> for Command {
    type Error = LinkError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(Command::PushScalar),
            2 => Ok(Command::PullScalarRequest),
            3 => Ok(Command::PushWaveformHeader),
            4 => Ok(Command::PullWaveformRequest),
            other => Err(LinkError::UnknownCommand(other)),
        }
    }
}

fn frame_with_payload(cmd: Command, value: i16) -> [u8; 5] {
    let v = value.to_le_bytes();
    [cmd as u8, 2, 0, v[0], v[1]]
}

fn frame_empty(cmd: Command) -> [u8; 3] {
    [cmd as u8, 0, 0]
}

/// `[01][02 00][value]`, 5 bytes. The caller checks its declared bound
/// before invoking this; any i16 is representable on the wire.
pub fn encode_scalar_push(value: i16) -> [u8; 5] {
    frame_with_payload(Command::PushScalar, value)
}

/// `[02][00 00]`, 3 bytes, no payload.
pub fn encode_scalar_pull_request() -> [u8; 3] {
    frame_empty(Command::PullScalarRequest)
}

/// `[03][02 00][count]`, 5 bytes. The samples that follow are sent as bare
/// 2-byte frames with no header.
pub fn encode_waveform_push_header(count: i16) -> [u8; 5] {
    frame_with_payload(Command::PushWaveformHeader, count)
}

/// `[04][00 00]`, 3 bytes, no payload.
pub fn encode_waveform_pull_request() -> [u8; 3] {
    frame_empty(Command::PullWaveformRequest)
}

/// A bare per-sample frame: the little-endian int16, nothing else.
pub fn encode_sample(value: i16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Decodes a single little-endian int16 response.
pub fn decode_i16(bytes: &[u8]) -> Result<i16> {
    if bytes.len() < 2 {
        return Err(LinkError::IncompleteResponse {
            expected: 2,
            got: bytes.len(),
        });
    }
    Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Decodes exactly `count` little-endian int16 values. All-or-nothing: a
/// byte count other than 2*count rejects the whole run, no samples are
/// returned.
pub fn decode_i16_sequence(bytes: &[u8], count: usize) -> Result<Vec<i16>> {
    let expected = count * 2;
    if bytes.len() != expected {
        return Err(LinkError::IncompleteResponse {
            expected,
            got: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_push_literal_bytes() {
        assert_eq!(encode_scalar_push(42), [0x01, 0x02, 0x00, 0x2A, 0x00]);
    }

    #[test]
    fn scalar_pull_request_literal_bytes() {
        assert_eq!(encode_scalar_pull_request(), [0x02, 0x00, 0x00]);
    }

    #[test]
    fn waveform_frames_literal_bytes() {
        assert_eq!(
            encode_waveform_push_header(200),
            [0x03, 0x02, 0x00, 0xC8, 0x00]
        );
        assert_eq!(encode_waveform_pull_request(), [0x04, 0x00, 0x00]);
        assert_eq!(encode_sample(-1), [0xFF, 0xFF]);
    }

    #[test]
    fn scalar_payload_round_trips() {
        for v in [-32768i16, -1, 0, 42, 100, 32767] {
            let frame = encode_scalar_push(v);
            assert_eq!(decode_i16(&frame[3..5]).unwrap(), v);
        }
    }

    #[test]
    fn decode_i16_rejects_short_input() {
        let err = decode_i16(&[0x2A]).unwrap_err();
        assert!(matches!(
            err,
            LinkError::IncompleteResponse { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn decode_sequence_is_all_or_nothing() {
        // 150 bytes when 200 are required: nothing comes back.
        let short = vec![0u8; 150];
        let err = decode_i16_sequence(&short, 100).unwrap_err();
        assert!(matches!(
            err,
            LinkError::IncompleteResponse {
                expected: 200,
                got: 150
            }
        ));
    }

    #[test]
    fn decode_sequence_preserves_order() {
        let bytes = [0x01, 0x00, 0xFE, 0xFF, 0x00, 0x08];
        assert_eq!(decode_i16_sequence(&bytes, 3).unwrap(), vec![1, -2, 2048]);
    }

    #[test]
    fn command_tags_are_a_closed_set() {
        assert_eq!(Command::try_from(1).unwrap(), Command::PushScalar);
        assert_eq!(Command::try_from(4).unwrap(), Command::PullWaveformRequest);
        for tag in [0u8, 5, 0xFF] {
            assert!(matches!(
                Command::try_from(tag),
                Err(LinkError::UnknownCommand(t)) if t == tag
            ));
        }
    }
}
