use std::convert::Infallible;
use std::sync::Arc;

use bytes::Buf;
use futures_util::TryStreamExt;
use serde::Serialize;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::process::{self, Layout, OutputMode};
use crate::store::OutputStore;

/// Uploads past this size are rejected by warp before any parsing happens.
const MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// Read-only per-process state shared by all requests. Every request gets its
/// own table and sums; nothing here is mutated after startup.
pub struct AppContext {
    pub layout: Layout,
    pub mode: OutputMode,
    pub store: OutputStore,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadOk {
    file_url: String,
}

#[derive(Serialize)]
struct UploadError {
    error: String,
}

/// All routes: the upload form, the upload endpoint, a health probe, and
/// static serving of previously produced summaries.
pub fn routes(
    ctx: Arc<AppContext>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let page = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(INDEX_HTML));

    let health = warp::path("health").and(warp::get()).and_then(health_check);

    let files = warp::fs::dir(ctx.store.dir().to_path_buf());

    let upload = warp::path("upload")
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_ctx(ctx))
        .and_then(handle_upload);

    page.or(health).or(upload).or(files)
}

fn with_ctx(
    ctx: Arc<AppContext>,
) -> impl Filter<Extract = (Arc<AppContext>,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "metersum",
    })))
}

async fn handle_upload(form: FormData, ctx: Arc<AppContext>) -> Result<Response, Rejection> {
    let upload = match read_file_part(form).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            warn!("upload request without a file part");
            return Ok(reply_error(StatusCode::BAD_REQUEST, "No file uploaded"));
        }
        Err(e) => {
            warn!(error = %e, "failed to read multipart body");
            return Ok(reply_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing the file",
            ));
        }
    };

    info!(bytes = upload.len(), "received upload");

    // The transform is CPU-bound; keep it off the async workers.
    let result = tokio::task::spawn_blocking({
        let ctx = ctx.clone();
        move || -> anyhow::Result<String> {
            let summary = process::process_data(&upload, &ctx.layout, ctx.mode)?;
            ctx.store.persist(&summary)
        }
    })
    .await;

    match result {
        Ok(Ok(file_url)) => {
            info!(%file_url, "transform complete");
            Ok(warp::reply::with_status(
                warp::reply::json(&UploadOk { file_url }),
                StatusCode::OK,
            )
            .into_response())
        }
        Ok(Err(e)) => {
            // the concrete kind stays in the log; the client gets a generic message
            warn!(error = ?e, "transform failed");
            Ok(reply_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing the file",
            ))
        }
        Err(e) => {
            warn!(error = %e, "transform task aborted");
            Ok(reply_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing the file",
            ))
        }
    }
}

fn reply_error(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(
        warp::reply::json(&UploadError {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}

/// Pull the bytes of the part named `file` out of the multipart body.
async fn read_file_part(mut form: FormData) -> Result<Option<Vec<u8>>, warp::Error> {
    while let Some(part) = form.try_next().await? {
        if part.name() == "file" {
            return Ok(Some(part_bytes(part).await?));
        }
    }
    Ok(None)
}

async fn part_bytes(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, mut buf| async move {
            while buf.has_remaining() {
                let chunk = buf.chunk();
                acc.extend_from_slice(chunk);
                buf.advance(chunk.len());
            }
            Ok(acc)
        })
        .await
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>metersum</title>
</head>
<body>
  <h1>Upload and process a meter export</h1>
  <form id="upload-form">
    <input type="file" name="file" accept=".csv,text/csv" required>
    <button type="submit">Upload</button>
  </form>
  <p id="status"></p>
  <script>
    const form = document.getElementById("upload-form");
    const status = document.getElementById("status");
    form.addEventListener("submit", async (event) => {
      event.preventDefault();
      status.textContent = "Uploading...";
      try {
        const response = await fetch("/upload", {
          method: "POST",
          body: new FormData(form),
        });
        const result = await response.json();
        if (response.ok) {
          status.innerHTML = "";
          const link = document.createElement("a");
          link.href = result.fileUrl;
          link.download = "";
          link.textContent = "Download processed file";
          status.appendChild(link);
        } else {
          status.textContent = result.error || "An error occurred during file upload.";
        }
      } catch (err) {
        status.textContent = "An unexpected error occurred.";
      }
    });
  </script>
</body>
</html>
"#;
