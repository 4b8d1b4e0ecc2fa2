//! Error types for the factory engine.
//!
//! Every failure of the registry, the overlay, the dispatcher and the
//! sequential executor surfaces as a [`FactoryError`]. Messages for the
//! registry and dispatch variants are stable strings.

use std::any::type_name;

use thiserror::Error;

/// Boxed error returned by user save routines and store backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while defining, creating or persisting factories.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// The process-wide context was initialized twice.
	#[error("Context is not nil")]
	AlreadyInitialized,

	/// The process-wide context was used before `init`.
	#[error("Context is nil")]
	NotInitialized,

	/// A factory name was bound twice.
	#[error("Redefinition of {name}: {value}")]
	Redefinition {
		/// Name that is already bound.
		name: String,
		/// Debug rendering of the rejected prototype.
		value: String,
	},

	/// No factory is bound under the requested name.
	#[error("Definition not found: {0}")]
	NotFound(String),

	/// An overlay named a field the factory type does not declare.
	#[error("Unknown field {field} on {type_name}")]
	UnknownField {
		/// Factory type the overlay was applied to.
		type_name: &'static str,
		/// Field name given in the overlay.
		field: String,
	},

	/// An overlay value cannot be stored in the named field.
	#[error("Type mismatch for field {field}: expected {expected}: {message}")]
	TypeMismatch {
		/// Field name given in the overlay.
		field: String,
		/// Declared type of the field.
		expected: &'static str,
		/// Decoder message.
		message: String,
	},

	/// The factory implements no persistence capability.
	#[error("Invalid Factory Interface: {0}")]
	UnsupportedFactory(&'static str),

	/// The store cannot serve the factory's capability.
	#[error("Invalid Store Interface: {0}")]
	InvalidStore(&'static str),

	/// Error returned by the factory's save routine, passed through verbatim.
	#[error(transparent)]
	Save(BoxError),

	/// The saved result and the output target have different types.
	#[error("Cannot assign {found} to {expected}")]
	AssignmentTypeMismatch {
		/// Type of the output target.
		expected: &'static str,
		/// Type of the saved result.
		found: &'static str,
	},

	/// An overlay document could not be decoded.
	#[error("Invalid attrs: {0}")]
	InvalidAttrs(#[from] serde_json::Error),

	/// A save routine panicked while running under an [`AutoExecutor`](crate::AutoExecutor).
	#[error("Factory panicked: {0}")]
	Panicked(String),
}

impl FactoryError {
	/// Builds an [`FactoryError::UnknownField`] for factory type `T`.
	pub fn unknown_field<T: ?Sized>(field: impl Into<String>) -> Self {
		Self::UnknownField {
			type_name: type_name::<T>(),
			field: field.into(),
		}
	}

	/// Builds a [`FactoryError::TypeMismatch`] for a field of declared type `T`.
	pub fn type_mismatch<T: ?Sized>(field: impl Into<String>, message: impl ToString) -> Self {
		Self::TypeMismatch {
			field: field.into(),
			expected: type_name::<T>(),
			message: message.to_string(),
		}
	}
}

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
