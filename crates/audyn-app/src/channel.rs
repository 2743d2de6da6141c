//! Newline-delimited JSON transport for gateway calls.
//!
//! Request: `{"id": <any>, "method": "<name>", "args": <null|string|object>}`.
//! Response: `{"id": <same>, "ok": <value>}` or
//! `{"id": <same>, "error": {"code": "<CODE>", "message": "<text>"}}`.
//! Bytes travel as `{"base64": "<standard base64>"}` in both directions.

use audyn_gateway::{ArgValue, Arguments, GatewayError, Reply, TorrentGateway};
use audyn_torrent_core::TorrentEngine;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

const BYTES_KEY: &str = "base64";
const CLEANUP_METHOD: &str = "cleanupSession";

#[derive(Debug, Deserialize)]
struct ChannelRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChannelResponse {
    Ok { id: Value, ok: Value },
    Err { id: Value, error: ChannelError },
}

#[derive(Debug, Serialize)]
struct ChannelError {
    code: &'static str,
    message: String,
}

impl ChannelResponse {
    fn failure(id: Value, err: &GatewayError) -> Self {
        Self::Err {
            id,
            error: ChannelError {
                code: err.code(),
                message: err.message(),
            },
        }
    }

    /// Answer for a line that is not a request at all.
    fn malformed() -> Self {
        Self::failure(
            Value::Null,
            &GatewayError::InvalidValue {
                field: "request",
                reason: "must be a JSON object with a method",
            },
        )
    }
}

/// Serve gateway calls from `reader` until EOF, then clean up the session.
///
/// Every non-blank line gets exactly one response line. Cleanup also runs when
/// the channel fails.
///
/// # Errors
///
/// Returns an error when reading a request or writing a response fails.
pub async fn serve<E, R, W>(
    gateway: &TorrentGateway<E>,
    reader: R,
    mut writer: W,
) -> AppResult<()>
where
    E: TorrentEngine,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let outcome = pump(gateway, reader, &mut writer).await;
    match &outcome {
        Ok(served) => info!(served, "request channel closed"),
        Err(err) => warn!(error = %err, "request channel failed"),
    }
    if let Err(err) = gateway.handle(CLEANUP_METHOD, &Arguments::None).await {
        warn!(error = %err.message(), "session cleanup failed at shutdown");
    }
    outcome.map(|_| ())
}

async fn pump<E, R, W>(
    gateway: &TorrentGateway<E>,
    mut reader: R,
    writer: &mut W,
) -> AppResult<u64>
where
    E: TorrentEngine,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let mut served = 0_u64;
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(|source| AppError::Io {
                operation: "channel.read",
                source,
            })?;
        if read == 0 {
            return Ok(served);
        }
        let response = match std::str::from_utf8(&line) {
            Ok(text) if text.trim().is_empty() => continue,
            Ok(text) => respond(gateway, text).await,
            Err(err) => {
                debug!(error = %err, "request line is not UTF-8");
                ChannelResponse::malformed()
            }
        };
        write_response(writer, &response).await?;
        served += 1;
    }
}

async fn respond<E: TorrentEngine>(gateway: &TorrentGateway<E>, line: &str) -> ChannelResponse {
    let request: ChannelRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "malformed request line");
            return ChannelResponse::malformed();
        }
    };

    let outcome = match arguments_from_json(request.args) {
        Ok(args) => gateway.handle(&request.method, &args).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(reply) => ChannelResponse::Ok {
            id: request.id,
            ok: reply_to_json(reply),
        },
        Err(err) => ChannelResponse::failure(request.id, &err),
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &ChannelResponse,
) -> AppResult<()> {
    let io_err = |source| AppError::Io {
        operation: "channel.write",
        source,
    };
    let mut encoded = serde_json::to_vec(response).map_err(|err| io_err(err.into()))?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await.map_err(io_err)?;
    writer.flush().await.map_err(io_err)
}

/// Convert the `args` member of a request into gateway arguments.
///
/// # Errors
///
/// Returns an invalid-argument error for top-level values other than null,
/// string, or object, and for undecodable byte blobs.
pub fn arguments_from_json(args: Value) -> Result<Arguments, GatewayError> {
    match args {
        Value::Null => Ok(Arguments::None),
        Value::String(text) => Ok(Arguments::Text(text)),
        Value::Object(map) => Ok(Arguments::Bag(
            map.into_iter()
                .map(|(key, value)| Ok((key, arg_from_json(value)?)))
                .collect::<Result<_, GatewayError>>()?,
        )),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) => Err(GatewayError::InvalidValue {
            field: "args",
            reason: "must be null, a string, or an object",
        }),
    }
}

fn arg_from_json(value: Value) -> Result<ArgValue, GatewayError> {
    Ok(match value {
        Value::Null => ArgValue::Null,
        Value::Bool(flag) => ArgValue::Bool(flag),
        Value::Number(number) => number.as_i64().map_or_else(
            || ArgValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            ArgValue::Int,
        ),
        Value::String(text) => ArgValue::Text(text),
        Value::Array(items) => ArgValue::List(
            items
                .into_iter()
                .map(arg_from_json)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => match bytes_from_object(&map)? {
            Some(bytes) => ArgValue::Bytes(bytes),
            None => ArgValue::Map(
                map.into_iter()
                    .map(|(key, value)| Ok((key, arg_from_json(value)?)))
                    .collect::<Result<_, GatewayError>>()?,
            ),
        },
    })
}

fn bytes_from_object(map: &Map<String, Value>) -> Result<Option<Vec<u8>>, GatewayError> {
    match (map.len(), map.get(BYTES_KEY)) {
        (1, Some(Value::String(encoded))) => {
            STANDARD
                .decode(encoded)
                .map(Some)
                .map_err(|_| GatewayError::InvalidValue {
                    field: BYTES_KEY,
                    reason: "must be standard base64",
                })
        }
        _ => Ok(None),
    }
}

/// Encode a gateway reply for the channel.
#[must_use]
pub fn reply_to_json(reply: Reply) -> Value {
    match reply {
        Reply::Null => Value::Null,
        Reply::Bool(flag) => Value::Bool(flag),
        Reply::Text(text) => Value::String(text),
        Reply::Bytes(bytes) => {
            let mut map = Map::new();
            map.insert(BYTES_KEY.to_string(), Value::String(STANDARD.encode(bytes)));
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arguments_follow_the_top_level_shape() -> Result<(), GatewayError> {
        assert_eq!(arguments_from_json(Value::Null)?, Arguments::None);
        assert_eq!(
            arguments_from_json(json!("album"))?,
            Arguments::Text("album".into())
        );
        assert!(matches!(arguments_from_json(json!({}))?, Arguments::Bag(bag) if bag.is_empty()));
        assert!(arguments_from_json(json!([1, 2])).is_err());
        assert!(arguments_from_json(json!(true)).is_err());
        Ok(())
    }

    #[test]
    fn base64_objects_become_bytes() -> Result<(), GatewayError> {
        let Arguments::Bag(bag) = arguments_from_json(json!({
            "torrentBytes": {"base64": "ZGU="},
            "nested": {"base64": "ZGU=", "extra": 1},
            "count": 3,
            "ratio": 0.5,
            "trackers": ["udp://a", null],
        }))?
        else {
            panic!("expected a bag");
        };
        assert_eq!(bag.get("torrentBytes"), Some(&ArgValue::Bytes(b"de".to_vec())));
        assert!(matches!(bag.get("nested"), Some(ArgValue::Map(_))));
        assert_eq!(bag.get("count"), Some(&ArgValue::Int(3)));
        assert_eq!(bag.get("ratio"), Some(&ArgValue::Float(0.5)));
        assert_eq!(
            bag.get("trackers"),
            Some(&ArgValue::List(vec![ArgValue::from("udp://a"), ArgValue::Null]))
        );
        Ok(())
    }

    #[test]
    fn bad_base64_is_an_invalid_argument() {
        let err = arguments_from_json(json!({"torrentBytes": {"base64": "!!"}})).err();
        assert_eq!(err.map(|err| err.code()), Some("INVALID_ARGUMENT"));
    }

    #[test]
    fn replies_encode_bytes_as_base64() {
        assert_eq!(reply_to_json(Reply::Null), Value::Null);
        assert_eq!(reply_to_json(Reply::Bool(true)), json!(true));
        assert_eq!(reply_to_json(Reply::Bytes(b"de".to_vec())), json!({"base64": "ZGU="}));
    }

    #[test]
    fn responses_serialize_ok_or_error() -> Result<(), serde_json::Error> {
        let ok = ChannelResponse::Ok {
            id: json!(7),
            ok: Value::Null,
        };
        assert_eq!(serde_json::to_value(&ok)?, json!({"id": 7, "ok": null}));

        let err = ChannelResponse::failure(json!("a"), &GatewayError::ExpectedMap);
        assert_eq!(
            serde_json::to_value(&err)?,
            json!({
                "id": "a",
                "error": {"code": "INVALID_ARGUMENT", "message": "expected map arguments"},
            })
        );
        Ok(())
    }
}
