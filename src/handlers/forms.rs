//! Multipart form extraction shared by the signup and update endpoints.

use crate::{
    error::AppError,
    models::{AddVendorRequest, SignupRequest, UpdateUserRequest, UpdateVendorRequest, Upload},
};
use axum::extract::{FromRequest, Multipart, Request};
use std::collections::HashMap;

/// Name of the file part carrying the account image.
pub const IMAGE_FIELD: &str = "img";

/// MultipartForm
///
/// An Axum extractor that drains a `multipart/form-data` body into its text fields
/// plus the optional `img` file part. An empty file part (what browsers send when no
/// file was chosen) counts as no image.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    image: Option<Upload>,
}

impl MultipartForm {
    pub async fn parse(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Invalid multipart body: {}", e.body_text())))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read image: {}", e.body_text())))?;
                if !bytes.is_empty() {
                    form.image = Some(Upload { filename, bytes });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid field '{name}': {}", e.body_text())))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// A required text field; absent fields read as empty and fail validation later.
    fn take(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }

    fn take_optional(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn into_signup(mut self) -> SignupRequest {
        SignupRequest {
            username: self.take("username"),
            email: self.take("email"),
            phone: self.take("phone"),
            password: self.take("password"),
            image: self.image,
        }
    }

    pub fn into_add_vendor(mut self) -> AddVendorRequest {
        AddVendorRequest {
            username: self.take("username"),
            email: self.take("email"),
            phone: self.take("phone"),
            description: self.take("description"),
            image: self.image,
        }
    }

    pub fn into_user_update(mut self) -> UpdateUserRequest {
        UpdateUserRequest {
            username: self.take_optional("username"),
            image: self.image,
        }
    }

    pub fn into_vendor_update(mut self) -> UpdateVendorRequest {
        UpdateVendorRequest {
            name: self.take_optional("name"),
            description: self.take_optional("description"),
            phone: self.take_optional("phone"),
            image: self.image,
        }
    }
}

impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        Self::parse(multipart).await
    }
}
