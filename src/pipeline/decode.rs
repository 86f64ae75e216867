use crate::error::DecodeError;

/// Field delimiters, tried in order. Field sensors ship `-` separated
/// payloads, older firmware revisions used `;`, `,` or plain spaces.
const DELIMITERS: [char; 4] = ['-', ';', ',', ' '];

/// `name`, `device_id`, `temperature`, `humidity`
const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReading {
    pub name: String,
    /// Secondary hardware identifier, accepted for schema
    /// compatibility and used for log context only.
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
}

/// Decodes a raw payload like `GreenhouseA-X01773374-25.50-60.30`.
///
/// Stateless and total: every failure path is a `DecodeError`, never a
/// panic. Undecodable bytes are replaced instead of rejected, and a
/// comma decimal separator is accepted in the numeric fields.
pub fn decode_payload(payload: &[u8]) -> Result<DecodedReading, DecodeError> {
    let text = String::from_utf8_lossy(payload);
    let text = text.trim();

    let fields = split_fields(text).ok_or_else(|| DecodeError::FieldCount(text.to_owned()))?;

    let name = fields[0].trim();
    if name.is_empty() {
        // an empty name would auto-provision a nameless sensor
        return Err(DecodeError::EmptyName(text.to_owned()));
    }

    let temperature = parse_decimal(fields[2]).ok_or_else(|| DecodeError::InvalidNumber {
        field: "temperature",
        value: fields[2].to_owned(),
    })?;
    let humidity = parse_decimal(fields[3]).ok_or_else(|| DecodeError::InvalidNumber {
        field: "humidity",
        value: fields[3].to_owned(),
    })?;

    Ok(DecodedReading {
        name: name.to_owned(),
        device_id: fields[1].trim().to_owned(),
        temperature,
        humidity,
    })
}

/// First delimiter yielding exactly [`FIELD_COUNT`] fields wins.
fn split_fields(text: &str) -> Option<Vec<&str>> {
    DELIMITERS.iter().find_map(|delimiter| {
        let fields: Vec<&str> = text.split(*delimiter).collect();
        if fields.len() == FIELD_COUNT {
            Some(fields)
        } else {
            None
        }
    })
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}
