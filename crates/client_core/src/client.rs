use std::fmt;

use reqwest::{
    header::CONTENT_TYPE,
    multipart::{Form, Part},
    Client,
};
use shared::{
    error::VectorizeError,
    protocol::{DEFAULT_ENDPOINT, IMAGE_PART},
};
use tracing::{debug, info};

use crate::{
    classify::classify,
    handler::{persist, ResponseContext, VectorizationResult},
    request::VectorizationRequest,
};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Sends requests to the remote vectorization service and stores what comes back.
#[derive(Debug, Clone)]
pub struct VectorizerClient {
    http: Client,
    endpoint: String,
    credentials: Credentials,
}

impl VectorizerClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT, credentials)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            credentials,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn vectorize(
        &self,
        request: &VectorizationRequest,
    ) -> Result<VectorizationResult, VectorizeError> {
        let image = tokio::fs::read(&request.image_path).await.map_err(|err| {
            VectorizeError::filesystem(
                format!(
                    "failed to read image {}: {err}",
                    request.image_path.display()
                ),
                Some(request.image_path.clone()),
            )
        })?;
        let file_name = request
            .image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let fields = request.form_fields();
        debug!(?fields, image = %request.image_path.display(), "sending vectorization request");

        let mut form = Form::new().part(IMAGE_PART, Part::bytes(image).file_name(file_name));
        for (name, value) in fields {
            form = form.text(name, value);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .multipart(form)
            .send()
            .await
            .map_err(|err| VectorizeError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|err| VectorizeError::Network(err.to_string()))?;

        let outcome = classify(status, &content_type, request.output_format, request.mode);
        info!(status, content_type = %content_type, ?outcome, "vectorization response received");

        persist(ResponseContext {
            outcome,
            content_type: &content_type,
            body: &body,
            output_path: &request.output_path,
            output_folder: &request.output_folder,
            palette_colors: request.palette_colors,
        })
        .await
    }
}
