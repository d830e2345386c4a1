use anyhow::{Context, Result};
use async_trait::async_trait;
use config::ApiConfig;
use core_types::{
    ApiError, ApiResult, ChatReply, ChatRequest, DocumentSummary, DocumentUpload, KnowledgeQuery,
    LegalApi, LegalArticle, Stats, TranslateRequest, TranslateResponse, TranslationRecord,
};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// `LegalApi` over HTTP. Every request shares the client-wide timeout.
#[derive(Debug, Clone)]
pub struct HttpLegalApi {
    client: reqwest::Client,
    api_root: String,
}

impl HttpLegalApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            client,
            api_root: format!("{}/api", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let text = self.send_raw(endpoint, request).await?;
        serde_json::from_str(&text).map_err(|err| {
            warn!(endpoint, error = %err, "unexpected response body");
            ApiError::Decode(err.to_string())
        })
    }

    async fn send_raw(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> ApiResult<String> {
        debug!(endpoint, "backend request");
        let response = request.send().await.map_err(|err| {
            let err = map_transport_error(err);
            warn!(endpoint, error = %err, "backend request failed");
            err
        })?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "backend returned error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct DocumentsEnvelope {
    #[serde(default)]
    documents: Vec<DocumentSummary>,
}

#[derive(Debug, Deserialize)]
struct TranslationsEnvelope {
    #[serde(default)]
    translations: Vec<TranslationRecord>,
}

#[derive(Debug, Deserialize)]
struct LawsEnvelope {
    #[serde(default)]
    laws: Vec<LegalArticle>,
}

#[async_trait]
impl LegalApi for HttpLegalApi {
    async fn list_documents(&self, limit: Option<u32>) -> ApiResult<Vec<DocumentSummary>> {
        let mut request = self.client.get(self.url("/documents"));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        let envelope: DocumentsEnvelope = self.send("/documents", request).await?;
        Ok(envelope.documents)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> ApiResult<()> {
        let mime = upload.mime_type();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(mime)
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let request = self
            .client
            .post(self.url("/documents/upload"))
            .multipart(Form::new().part("file", part));
        self.send_raw("/documents/upload", request).await?;
        Ok(())
    }

    async fn send_chat(&self, request: &ChatRequest) -> ApiResult<ChatReply> {
        let builder = self.client.post(self.url("/chat")).json(request);
        self.send("/chat", builder).await
    }

    async fn translate(&self, request: &TranslateRequest) -> ApiResult<TranslateResponse> {
        let builder = self.client.post(self.url("/translate")).json(request);
        self.send("/translate", builder).await
    }

    async fn list_translations(&self) -> ApiResult<Vec<TranslationRecord>> {
        let request = self.client.get(self.url("/translations"));
        let envelope: TranslationsEnvelope = self.send("/translations", request).await?;
        Ok(envelope.translations)
    }

    async fn search_legal_knowledge(
        &self,
        query: &KnowledgeQuery,
    ) -> ApiResult<Vec<LegalArticle>> {
        let request = self
            .client
            .get(self.url("/legal-knowledge"))
            .query(&query.query_pairs());
        let envelope: LawsEnvelope = self.send("/legal-knowledge", request).await?;
        Ok(envelope.laws)
    }

    async fn stats(&self) -> ApiResult<Stats> {
        let request = self.client.get(self.url("/stats"));
        self.send("/stats", request).await
    }
}
