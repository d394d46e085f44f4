//! Login form decoding.
//!
//! Login pages either post the form natively (`application/x-www-form-urlencoded`)
//! or send `new FormData(form)` through `fetch` (`multipart/form-data`). Both are
//! accepted; the first `password` field wins, later duplicates are ignored.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
        FromRequest, Multipart, Request,
    },
    http::{header::CONTENT_TYPE, HeaderMap},
    Form,
};
use thiserror::Error;

pub const PASSWORD_FIELD: &str = "password";

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("malformed login form: {0}")]
    Form(#[from] FormRejection),
    #[error("malformed multipart login: {0}")]
    MultipartRejected(#[from] MultipartRejection),
    #[error("malformed multipart login: {0}")]
    Multipart(#[from] MultipartError),
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

/// Decode the `password` field of a login submission.
///
/// A missing `password` field is not a decoding error; it is returned as `None`
/// and later fails the comparison like any wrong password. Bodies that are
/// neither urlencoded nor multipart are rejected by the form extractor.
pub async fn submitted_password(request: Request) -> Result<Option<String>, LoginError> {
    if is_multipart(request.headers()) {
        let mut multipart = Multipart::from_request(request, &()).await?;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some(PASSWORD_FIELD) {
                return Ok(Some(field.text().await?));
            }
        }
        return Ok(None);
    }

    let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &()).await?;
    Ok(pairs
        .into_iter()
        .find(|(name, _)| name == PASSWORD_FIELD)
        .map(|(_, value)| value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{body::Body, http::Method};

    fn post(content_type: Option<&str>, body: &'static str) -> Result<Request> {
        let mut builder = Request::builder().method(Method::POST).uri("/login");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        Ok(builder.body(Body::from(body))?)
    }

    const MULTIPART: &str = "multipart/form-data; boundary=XyZ";

    #[tokio::test]
    async fn decodes_password_field() -> Result<()> {
        let request = post(
            Some("application/x-www-form-urlencoded"),
            "password=hunter2&remember=on",
        )?;
        let password = submitted_password(request).await?;
        assert_eq!(password.as_deref(), Some("hunter2"));
        Ok(())
    }

    #[tokio::test]
    async fn decodes_percent_encoding() -> Result<()> {
        let request = post(
            Some("application/x-www-form-urlencoded"),
            "password=p%40ss+word%26",
        )?;
        let password = submitted_password(request).await?;
        assert_eq!(password.as_deref(), Some("p@ss word&"));
        Ok(())
    }

    #[tokio::test]
    async fn first_of_repeated_fields_wins() -> Result<()> {
        let request = post(
            Some("application/x-www-form-urlencoded"),
            "password=hunter2&password=x",
        )?;
        assert_eq!(submitted_password(request).await?.as_deref(), Some("hunter2"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_field_is_none() -> Result<()> {
        let request = post(Some("application/x-www-form-urlencoded"), "user=admin")?;
        assert_eq!(submitted_password(request).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn decodes_multipart_password() -> Result<()> {
        let body = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"remember\"\r\n\r\n\
            on\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"password\"\r\n\r\n\
            hunter2\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"password\"\r\n\r\n\
            x\r\n\
            --XyZ--\r\n";
        let password = submitted_password(post(Some(MULTIPART), body)?).await?;
        assert_eq!(password.as_deref(), Some("hunter2"));
        Ok(())
    }

    #[tokio::test]
    async fn multipart_without_password_is_none() -> Result<()> {
        let body = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"user\"\r\n\r\n\
            admin\r\n\
            --XyZ--\r\n";
        assert_eq!(submitted_password(post(Some(MULTIPART), body)?).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn multipart_without_boundary_is_malformed() -> Result<()> {
        let request = post(Some("multipart/form-data"), "password=hunter2")?;
        assert!(matches!(
            submitted_password(request).await,
            Err(LoginError::MultipartRejected(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_content_type_is_malformed() -> Result<()> {
        let request = post(Some("application/json"), r#"{"password":"hunter2"}"#)?;
        assert!(matches!(
            submitted_password(request).await,
            Err(LoginError::Form(_))
        ));

        let request = post(None, "password=hunter2")?;
        assert!(submitted_password(request).await.is_err());
        Ok(())
    }
}
