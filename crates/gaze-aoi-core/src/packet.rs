//! Gaze packet decoding
//!
//! A packet is a JSON object naming the surface the gaze was mapped onto and
//! carrying every sample gathered since the previous packet:
//!
//! ```json
//! {"srf": "screen",
//!  "data": [{"norm_pos": [0.51, 0.49], "confidence": 0.97, "timestamp": 4021.337}]}
//! ```
//!
//! Unknown fields are ignored.

use serde::Deserialize;

use crate::error::{GazeError, Result};
use crate::types::{GazeSample, GazeUpdate, NormalizedPosition};

#[derive(Debug, Deserialize)]
struct RawPacket {
    srf: Option<String>,
    data: Option<Vec<RawSample>>,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    norm_pos: Option<Vec<f64>>,
    confidence: Option<f64>,
    timestamp: Option<f64>,
}

/// Decode one network message into a [`GazeUpdate`].
pub fn decode(message: &[u8]) -> Result<GazeUpdate> {
    let packet: RawPacket = serde_json::from_slice(message)
        .map_err(|e| GazeError::MalformedPacket(e.to_string()))?;

    let surface = packet
        .srf
        .ok_or_else(|| GazeError::MalformedPacket("missing 'srf'".to_string()))?;
    let data = packet
        .data
        .ok_or_else(|| GazeError::MalformedPacket("missing 'data' array".to_string()))?;
    if data.is_empty() {
        return Err(GazeError::MalformedPacket("empty 'data' array".to_string()));
    }

    let samples = data
        .into_iter()
        .enumerate()
        .map(|(index, raw)| decode_sample(&surface, index, raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(GazeUpdate::new(surface, samples))
}

fn decode_sample(surface: &str, index: usize, raw: RawSample) -> Result<GazeSample> {
    let missing = |field: &str| GazeError::MalformedPacket(format!("sample {}: missing '{}'", index, field));

    let position = match raw.norm_pos.as_deref() {
        Some([x, y]) => NormalizedPosition::new(*x, *y),
        Some(other) => {
            return Err(GazeError::MalformedPacket(format!(
                "sample {}: 'norm_pos' has {} elements, expected 2",
                index,
                other.len()
            )))
        }
        None => return Err(missing("norm_pos")),
    };

    Ok(GazeSample {
        surface: surface.to_string(),
        timestamp: raw.timestamp.ok_or_else(|| missing("timestamp"))?,
        position,
        confidence: raw.confidence.ok_or_else(|| missing("confidence"))?,
    })
}
