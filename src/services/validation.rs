//! Request validation for book writes

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{CreateBook, UpdateBook},
};

pub fn validate_create(request: &CreateBook) -> AppResult<()> {
    request.validate()?;
    Ok(())
}

pub fn validate_update(request: &UpdateBook) -> AppResult<()> {
    request.validate()?;
    Ok(())
}

/// Cross-field rule: a book cannot have more copies on the shelf than it owns.
pub fn validate_copies_available(copies_available: i32, copies_total: i32) -> AppResult<()> {
    if copies_available > copies_total {
        return Err(AppError::BadRequest(
            "copies_available must be <= copies_total".to_string(),
        ));
    }
    Ok(())
}
