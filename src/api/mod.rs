pub mod request_id;

use crate::config::ApiConfig;
use crate::error::UploadError;
use crate::models::{ProcessingError, ProcessingOutcome};
use crate::monitoring::metrics;
use crate::pipeline::DocumentPipeline;
use actix_cors::Cors;
use actix_multipart::{Field, Multipart};
use actix_web::{web, App, Error, HttpMessage, HttpRequest, HttpResponse, HttpServer};
use futures_util::stream::StreamExt;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub use request_id::{RequestId, RequestIdLogger, REQUEST_ID_HEADER};

const PDF_MAGIC: &[u8] = b"%PDF";
const MAX_LANGUAGE_FIELD_BYTES: usize = 256;

/// Shared handler state: one pipeline per process.
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Arc<DocumentPipeline>, max_upload_bytes: usize) -> Self {
        Self {
            pipeline,
            max_upload_bytes,
        }
    }
}

/// A validated upload. The temp file is removed on drop.
struct UploadForm {
    file: NamedTempFile,
    language: String,
}

fn request_id_of(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| RequestId::generate().0)
}

async fn root_handler() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Document assistant is running (Actix Web)\n\nPOST a PDF to /process, see /languages for targets\n"))
}

async fn list_languages(state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(state.pipeline.languages().all()))
}

async fn health_check(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "translator": state.pipeline.translator_name(),
        "generator": state.pipeline.generator_name(),
        "languages": state.pipeline.languages().len(),
        "version": env!("CARGO_PKG_VERSION"),
        "request_id": request_id_of(&req)
    })))
}

/// GET /monitoring/metrics in Prometheus text format
async fn get_metrics() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4; charset=utf-8")
        .body(metrics::export_prometheus()))
}

async fn process_document(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let request_id = request_id_of(&req);

    let upload = match read_upload(payload, state.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Upload rejected");
            return Ok(HttpResponse::BadRequest().json(ProcessingError::new(e.to_string())));
        }
    };

    info!(request_id = %request_id, language = %upload.language, "Processing upload");
    let outcome = state
        .pipeline
        .process(upload.file.path(), &upload.language)
        .await;

    Ok(match outcome {
        ProcessingOutcome::Success(result) => HttpResponse::Ok().json(result),
        ProcessingOutcome::Failure(failure) => match failure.stage {
            Some("language") | Some("extraction") => {
                HttpResponse::UnprocessableEntity().json(failure)
            }
            Some(_) => HttpResponse::BadGateway().json(failure),
            None => HttpResponse::BadRequest().json(failure),
        },
    })
}

/// Drain the multipart body, enforcing the upload rules as bytes arrive.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<UploadForm, UploadError> {
    let mut file = None;
    let mut language = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| UploadError::Multipart(e.to_string()))?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => file = Some(store_pdf(&mut field, max_bytes).await?),
            "language" => {
                let raw = read_small_field(&mut field, MAX_LANGUAGE_FIELD_BYTES).await?;
                let value = raw.trim();
                if !value.is_empty() {
                    language = Some(value.to_string());
                }
            }
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
                }
            }
        }
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    let language = language.ok_or(UploadError::MissingLanguage)?;
    Ok(UploadForm { file, language })
}

fn looks_like_pdf(field: &Field) -> bool {
    let by_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .and_then(|name| Path::new(name).extension().and_then(|s| s.to_str()))
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    let by_type = field
        .content_type()
        .map(|mime| mime.essence_str() == "application/pdf")
        .unwrap_or(false);
    by_name || by_type
}

async fn store_pdf(field: &mut Field, max_bytes: usize) -> Result<NamedTempFile, UploadError> {
    if !looks_like_pdf(field) {
        return Err(UploadError::NotPdf);
    }

    let mut tmp = web::block(|| {
        tempfile::Builder::new()
            .prefix("docaid-")
            .suffix(".pdf")
            .tempfile()
    })
    .await
    .map_err(|e| UploadError::Multipart(e.to_string()))??;

    let mut written = 0usize;
    let mut head = Vec::with_capacity(PDF_MAGIC.len());
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
        written += data.len();
        if written > max_bytes {
            return Err(UploadError::TooLarge { limit: max_bytes });
        }
        if head.len() < PDF_MAGIC.len() {
            let take = (PDF_MAGIC.len() - head.len()).min(data.len());
            head.extend_from_slice(&data[..take]);
        }
        tmp = web::block(move || tmp.write_all(&data).map(|_| tmp))
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))??;
    }

    if written == 0 {
        return Err(UploadError::EmptyFile);
    }
    if head != PDF_MAGIC {
        return Err(UploadError::NotPdf);
    }
    tmp.flush()?;
    Ok(tmp)
}

async fn read_small_field(field: &mut Field, limit: usize) -> Result<String, UploadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
        if buf.len() + data.len() > limit {
            return Err(UploadError::Multipart(format!(
                "field longer than {} bytes",
                limit
            )));
        }
        buf.extend_from_slice(&data);
    }
    String::from_utf8(buf).map_err(|e| UploadError::Multipart(e.to_string()))
}

/// Route table, shared by the server and in-process tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/monitoring")
            .route("/health", web::get().to(health_check))
            .route("/metrics", web::get().to(get_metrics)),
    )
    .route("/", web::get().to(root_handler))
    .route("/languages", web::get().to(list_languages))
    .route("/process", web::post().to(process_document));
}

pub async fn start_api_server(
    config: &ApiConfig,
    pipeline: Arc<DocumentPipeline>,
) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let state = web::Data::new(AppState::new(pipeline, config.max_upload_bytes));

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(RequestIdLogger)
            .configure(configure)
    })
    .bind(&bind_addr)?;

    info!(addr = %bind_addr, "HTTP server listening");
    server.run().await
}
