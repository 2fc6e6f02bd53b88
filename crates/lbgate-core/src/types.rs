//! AWS identifiers used to address the target function.

use std::fmt;

use crate::error::LbGateError;

/// Identifier of the function to invoke.
///
/// Accepts anything the Lambda `Invoke` API accepts as `FunctionName`: a bare
/// name, a partial ARN, or a full (optionally qualified) ARN. Deserialization
/// goes through [`FunctionId::new`], so an empty identifier is rejected there
/// too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct FunctionId(String);

impl FunctionId {
    /// Create a function identifier.
    ///
    /// # Errors
    /// Returns [`LbGateError::MissingFunctionId`] if the identifier is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, LbGateError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LbGateError::MissingFunctionId);
        }
        Ok(Self(id))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The region embedded in a full ARN (`arn:aws:lambda:<region>:...`), if any.
    #[must_use]
    pub fn arn_region(&self) -> Option<AwsRegion> {
        let mut parts = self.0.split(':');
        if parts.next() != Some("arn") {
            return None;
        }
        parts
            .nth(2)
            .filter(|region| !region.is_empty())
            .map(AwsRegion::new)
    }
}

impl TryFrom<String> for FunctionId {
    type Error = LbGateError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AWS Region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AwsRegion(String);

impl AwsRegion {
    /// Region used when neither configuration nor the ARN names one.
    pub const DEFAULT: &str = "us-east-1";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AwsRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for AwsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
