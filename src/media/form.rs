use std::collections::HashMap;

use axum::extract::Multipart;
use uuid::Uuid;

use super::services::UploadItem;
use crate::error::AppError;

/// Text fields plus an optional `image` file from a multipart body.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<UploadItem>,
}

impl FormData {
    pub async fn read(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();
        while let Some(field) = mp
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Malformed form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "image" {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Could not read image: {}", e)))?;
                if !body.is_empty() {
                    form.image = Some(UploadItem { body, content_type });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Could not read {}: {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            image: None,
        }
    }

    /// Trimmed value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::validation(format!("{} is required", name)))
    }

    pub fn parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|_| AppError::validation(format!("{} is invalid", name)))
            })
            .transpose()
    }

    pub fn uuid(&self, name: &str) -> Result<Option<Uuid>, AppError> {
        self.parsed::<Uuid>(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_absent() {
        let form = FormData::from_pairs(&[("title", "  "), ("subtitle", " Hi ")]);
        assert_eq!(form.text("title"), None);
        assert_eq!(form.text("subtitle").as_deref(), Some("Hi"));
        assert!(form.required("title").is_err());
    }

    #[test]
    fn parsed_reports_bad_numbers() {
        let form = FormData::from_pairs(&[("rating", "five")]);
        assert!(matches!(form.parsed::<i16>("rating"), Err(AppError::Validation(_))));
        let form = FormData::from_pairs(&[("rating", "4")]);
        assert_eq!(form.parsed::<i16>("rating").unwrap(), Some(4));
    }
}
