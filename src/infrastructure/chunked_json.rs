// Chunked JSON streaming of snapshots
use crate::domain::snapshot::Snapshot;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use std::sync::Arc;

/// Create a chunked snapshot streaming response
pub fn chunked_snapshot_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = Arc<Snapshot>> + Send + 'static,
{
    let byte_stream = stream.then(move |snapshot| async move {
        serialize_chunk(&snapshot, compress).await
    });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding on the response.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// One snapshot as `[u32 big-endian length][payload]`
async fn serialize_chunk(snapshot: &Snapshot, compress: bool) -> Result<Bytes, std::io::Error> {
    let buffer = serde_json::to_vec(snapshot)?;

    let payload = if compress {
        brotli_compress(buffer).await?
    } else {
        buffer
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Streaming response over every snapshot the stream yields
pub fn stream_snapshots<S>(stream: S, compress: bool) -> impl IntoResponse
where
    S: Stream<Item = Arc<Snapshot>> + Send + 'static,
{
    match chunked_snapshot_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::FixedClock;
    use crate::application::sample_generator::RandomSampleGenerator;
    use crate::application::snapshot_engine::SnapshotEngine;
    use chrono::{TimeZone, Utc};

    fn snapshot() -> Snapshot {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap());
        SnapshotEngine::new(Box::new(RandomSampleGenerator::seeded(12)), Arc::new(clock))
            .produce(1)
            .unwrap()
    }

    #[tokio::test]
    async fn test_chunk_is_length_prefixed_json() {
        let snapshot = snapshot();
        let chunk = serialize_chunk(&snapshot, false).await.unwrap();

        let length = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(length, chunk.len() - 4);

        let decoded: serde_json::Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(decoded["generation"], 1);
    }

    #[tokio::test]
    async fn test_compressed_chunk_is_smaller() {
        let snapshot = snapshot();
        let plain = serialize_chunk(&snapshot, false).await.unwrap();
        let compressed = serialize_chunk(&snapshot, true).await.unwrap();
        assert!(compressed.len() < plain.len());
    }
}
