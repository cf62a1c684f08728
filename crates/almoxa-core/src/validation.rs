//! # Validation Module
//!
//! Input validation rules for Almoxa.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (out of scope)                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rule validation                                          │
//! │  └── Rejected input never opens a transaction                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE indexes (business key, fixed code)                         │
//! │  └── Restrictive foreign keys                                          │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewMovement, NewStockItem, NewUserAccount, NewWorkOrder, StockItemUpdate};
use crate::{MAX_DESCRIPTION_LEN, MAX_QUERY_LEN, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a stock item description.
///
/// ## Rules
/// - Must not be blank after trimming
/// - Must be at most [`MAX_DESCRIPTION_LEN`] characters
///
/// ## Returns
/// The trimmed description.
///
/// ## Example
/// ```rust
/// use almoxa_core::validation::validate_description;
///
/// assert_eq!(validate_description("  Filtro de óleo ").unwrap(), "Filtro de óleo");
/// assert!(validate_description("   ").is_err());
/// ```
pub fn validate_description(description: &str) -> ValidationResult<String> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::required("description"));
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(description.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (callers fall back to a plain listing)
/// - Maximum [`MAX_QUERY_LEN`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates a username.
///
/// ## Rules
/// - Must not be blank
/// - 3 to 40 characters
/// - Letters, digits, dots, hyphens, underscores only
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    if username.chars().count() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.chars().count() > 40 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 40,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, digits, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(username.to_string())
}

/// Validates a plaintext password (before hashing).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity that may be zero (opening quantities, movement
/// magnitudes, thresholds).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::negative(field));
    }

    Ok(())
}

/// Validates a quantity that must be strictly positive (material issues).
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a [`NewStockItem`] before the ledger transaction runs.
///
/// ## What Gets Checked
/// - description: required, trimmed, length-bounded
/// - min_stock, opening_quantity: >= 0
/// - opening_unit_cost: >= 0
/// - created_by: required (audit columns are NOT NULL)
///
/// ## Returns
/// A copy of the input with the description trimmed.
pub fn validate_new_stock_item(input: &NewStockItem) -> ValidationResult<NewStockItem> {
    let description = validate_description(&input.description)?;
    validate_non_negative("min_stock", input.min_stock)?;
    validate_non_negative("opening_quantity", input.opening_quantity)?;

    if input.opening_unit_cost.is_negative() {
        return Err(ValidationError::negative("opening_unit_cost"));
    }

    if input.created_by.trim().is_empty() {
        return Err(ValidationError::required("created_by"));
    }

    Ok(NewStockItem {
        description,
        ..input.clone()
    })
}

/// Validates a [`StockItemUpdate`].
pub fn validate_stock_item_update(input: &StockItemUpdate) -> ValidationResult<StockItemUpdate> {
    let description = validate_description(&input.description)?;
    validate_non_negative("min_stock", input.min_stock)?;

    if input.updated_by.trim().is_empty() {
        return Err(ValidationError::required("updated_by"));
    }

    Ok(StockItemUpdate {
        description,
        ..input.clone()
    })
}

/// Validates a [`NewMovement`] before it is recorded.
///
/// The quantity is a magnitude: it is validated non-negative regardless of
/// kind, and the kind's sign decides the ledger effect. Zero-quantity
/// movements are allowed and logged like any other (opening balances for
/// zero-stock items depend on this).
pub fn validate_new_movement(input: &NewMovement) -> ValidationResult<()> {
    validate_non_negative("quantity", input.quantity)?;

    if input.unit_cost.is_negative() {
        return Err(ValidationError::negative("unit_cost"));
    }

    if input.moved_by.trim().is_empty() {
        return Err(ValidationError::required("moved_by"));
    }

    Ok(())
}

/// Validates a [`NewUserAccount`] before the user+employee transaction.
pub fn validate_new_user_account(input: &NewUserAccount) -> ValidationResult<NewUserAccount> {
    let username = validate_username(&input.username)?;
    validate_password(&input.password)?;

    let full_name = input.full_name.trim();
    if full_name.is_empty() {
        return Err(ValidationError::required("full_name"));
    }

    Ok(NewUserAccount {
        username,
        full_name: full_name.to_string(),
        ..input.clone()
    })
}

/// Validates a [`NewWorkOrder`].
pub fn validate_new_work_order(input: &NewWorkOrder) -> ValidationResult<NewWorkOrder> {
    let title = input.title.trim();

    if title.is_empty() {
        return Err(ValidationError::required("title"));
    }

    if title.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(NewWorkOrder {
        title: title.to_string(),
        ..input.clone()
    })
}
